//! Text extraction from the supported document sources

use crate::error::{Result, ResumeAnalyzerError};
use crate::input::file_detector::FileType;
use pulldown_cmark::{Event, Parser, Tag};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::io::{Cursor, Read};
use std::sync::OnceLock;

/// An uploaded document, tagged by the format its bytes are in.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    Pdf(Vec<u8>),
    Docx(Vec<u8>),
    PlainText(String),
    Markdown(String),
}

impl DocumentSource {
    /// Wrap raw bytes according to the detected file type.
    pub fn from_bytes(file_type: FileType, bytes: Vec<u8>) -> Result<Self> {
        match file_type {
            FileType::Pdf => Ok(DocumentSource::Pdf(bytes)),
            FileType::Docx => Ok(DocumentSource::Docx(bytes)),
            FileType::Text => Ok(DocumentSource::PlainText(decode_utf8(bytes))),
            FileType::Markdown => Ok(DocumentSource::Markdown(decode_utf8(bytes))),
            FileType::Unknown => Err(ResumeAnalyzerError::UnsupportedFormat(
                "expected one of pdf, docx, txt, md".to_string(),
            )),
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            DocumentSource::Pdf(_) => FileType::Pdf,
            DocumentSource::Docx(_) => FileType::Docx,
            DocumentSource::PlainText(_) => FileType::Text,
            DocumentSource::Markdown(_) => FileType::Markdown,
        }
    }

    /// Extract the plain text of the document. Empty input yields an empty string.
    pub fn extract_text(&self) -> Result<String> {
        match self {
            DocumentSource::Pdf(bytes) => extract_pdf(bytes),
            DocumentSource::Docx(bytes) => extract_docx(bytes),
            DocumentSource::PlainText(text) => Ok(text.clone()),
            DocumentSource::Markdown(markdown) => Ok(markdown_to_text(markdown)),
        }
    }
}

fn decode_utf8(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Ok(String::new());
    }
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ResumeAnalyzerError::PdfExtraction(format!("Failed to extract text from PDF: {}", e)))
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Ok(String::new());
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ResumeAnalyzerError::DocxExtraction(format!("missing word/document.xml: {}", e)))?
        .read_to_string(&mut xml)?;

    Ok(docx_xml_to_text(&xml))
}

fn docx_xml_to_text(xml: &str) -> String {
    static BREAKS: OnceLock<Regex> = OnceLock::new();
    static TAGS: OnceLock<Regex> = OnceLock::new();

    let breaks = BREAKS.get_or_init(|| {
        Regex::new(r"</w:p>|<w:br\s*/>|<w:cr\s*/>").expect("Invalid docx break regex")
    });
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid docx tag regex"));

    let text = breaks.replace_all(xml, "\n");
    let text = text.replace("<w:tab/>", "\t");
    let text = tags.replace_all(&text, "");

    let text = decode_entities(&text);

    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Decode the XML predefined entities and numeric character references in
/// one pass, so `&amp;lt;` stays the literal text `&lt;`.
fn decode_entities(text: &str) -> Cow<'_, str> {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    let entity = ENTITY.get_or_init(|| {
        Regex::new(r"&(?:#([0-9]+)|#[xX]([0-9a-fA-F]+)|(lt|gt|quot|apos|amp));").expect("Invalid entity regex")
    });

    entity.replace_all(text, |caps: &Captures| {
        let decoded = if let Some(dec) = caps.get(1) {
            dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
        } else if let Some(hex) = caps.get(2) {
            u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
        } else {
            match caps.get(3).map(|m| m.as_str()) {
                Some("lt") => Some('<'),
                Some("gt") => Some('>'),
                Some("quot") => Some('"'),
                Some("apos") => Some('\''),
                Some("amp") => Some('&'),
                _ => None,
            }
        };
        // Out-of-range references are kept as written.
        decoded.map_or_else(|| caps[0].to_string(), String::from)
    })
}

fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(..))
            | Event::End(Tag::Item)
            | Event::End(Tag::CodeBlock(_)) => text.push('\n'),
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_plain_text_passthrough() {
        let source = DocumentSource::from_bytes(FileType::Text, b"Jane Doe\nEngineer".to_vec()).unwrap();
        assert_eq!(source.file_type(), FileType::Text);
        assert_eq!(source.extract_text().unwrap(), "Jane Doe\nEngineer");
    }

    #[test]
    fn test_markdown_strips_formatting() {
        let source = DocumentSource::Markdown("# Jane Doe\n\n**Senior** engineer with `Rust`\n\n- AWS\n- Docker".to_string());
        let text = source.extract_text().unwrap();

        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Senior engineer with Rust"));
        assert!(text.contains("AWS"));
        assert!(!text.contains("**"));
        assert!(!text.contains('#'));
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let xml = r#"<?xml version="1.0"?><w:document><w:body><w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p><w:p><w:r><w:t>R&amp;D Engineer</w:t><w:tab/><w:t>2019</w:t></w:r></w:p></w:body></w:document>"#;
        let source = DocumentSource::Docx(build_docx(xml));

        let text = source.extract_text().unwrap();
        assert_eq!(text, "Jane Doe\nR&D Engineer\t2019");
    }

    #[test]
    fn test_docx_character_references_decoded() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>Team&#8217;s lead&#xA0;role &#60;b&#x3E; &amp;lt; &#1114112;</w:t></w:r></w:p></w:body></w:document>"#;
        let source = DocumentSource::Docx(build_docx(xml));

        let text = source.extract_text().unwrap();
        assert_eq!(text, "Team\u{2019}s lead\u{a0}role <b> &lt; &#1114112;");
    }

    #[test]
    fn test_docx_without_document_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("other.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"<x/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = DocumentSource::Docx(bytes).extract_text().unwrap_err();
        assert!(matches!(err, ResumeAnalyzerError::DocxExtraction(_)));
    }

    #[test]
    fn test_empty_sources_extract_to_empty_string() {
        assert_eq!(DocumentSource::Pdf(Vec::new()).extract_text().unwrap(), "");
        assert_eq!(DocumentSource::Docx(Vec::new()).extract_text().unwrap(), "");
        assert_eq!(DocumentSource::Markdown(String::new()).extract_text().unwrap(), "");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = DocumentSource::from_bytes(FileType::Unknown, vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, ResumeAnalyzerError::UnsupportedFormat(_)));
    }
}
