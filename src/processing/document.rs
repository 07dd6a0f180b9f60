//! Document and chunk structures

use crate::input::file_detector::FileType;
use serde::{Deserialize, Serialize};

/// The extracted text of one uploaded resume. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    content: String,
    file_type: FileType,
    metadata: DocumentMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub word_count: usize,
    pub character_count: usize,
}

/// A contiguous, size-bounded piece of a document used as the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Ordinal among the chunks that survived filtering.
    pub position: usize,
    pub content: String,
    /// Character range in the source text, when the chunker tracks it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<(usize, usize)>,
}

impl Chunk {
    pub fn new(position: usize, content: impl Into<String>, span: Option<(usize, usize)>) -> Self {
        Self {
            position,
            content: content.into(),
            span,
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl Document {
    pub fn new(content: String, file_type: FileType) -> Self {
        let word_count = content.split_whitespace().count();
        let character_count = content.chars().count();
        let title = detect_title(&content);

        Self {
            content,
            file_type,
            metadata: DocumentMetadata {
                title,
                word_count,
                character_count,
            },
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// First short, non-contact line near the top of the document.
fn detect_title(content: &str) -> Option<String> {
    content
        .lines()
        .take(5)
        .map(str::trim)
        .find(|line| {
            let len = line.chars().count();
            len > 5 && len < 100 && !line.contains('@') && !line.starts_with('-')
        })
        .map(str::to_string)
}
