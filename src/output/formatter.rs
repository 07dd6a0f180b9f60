//! Output formatters: console, JSON, Markdown and HTML

use crate::config::OutputFormat;
use crate::error::Result;
use crate::llm::rating::{Grade, Rating};
use crate::output::report::AnalysisReport;
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;

/// Excerpt length shown when the report is not detailed.
const PREVIEW_GRAPHEMES: usize = 160;

pub trait OutputFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
    detailed: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

/// First `max` grapheme clusters of `text`, with an ellipsis if cut.
pub fn preview(text: &str, max: usize) -> String {
    let text = text.trim();
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(max).collect();
    if graphemes.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

fn grade_color(grade: Grade) -> Color {
    match grade {
        Grade::Excellent => Color::Green,
        Grade::Good => Color::BrightGreen,
        Grade::Average => Color::Yellow,
        Grade::BelowAverage => Color::Red,
        Grade::Poor => Color::BrightRed,
    }
}

fn grade_class(grade: Grade) -> &'static str {
    match grade {
        Grade::Excellent | Grade::Good => "score-good",
        Grade::Average => "score-fair",
        Grade::BelowAverage | Grade::Poor => "score-poor",
    }
}

/// `■■□` style bar for a sub-score.
fn score_bar(score: u32, max: u32) -> String {
    let filled = score.min(max) as usize;
    format!("{}{}", "■".repeat(filled), "□".repeat(max as usize - filled))
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_list(&self, label: &str, items: &[String]) -> String {
        if items.is_empty() {
            format!("{}: {}\n", label, self.colorize("none found", Color::BrightBlack))
        } else {
            format!("{}: {}\n", label, items.join(", "))
        }
    }

    fn format_rating(&self, rating: &Rating) -> String {
        let mut output = String::new();
        let grade = if self.use_colors {
            rating.grade.label().color(grade_color(rating.grade)).bold().to_string()
        } else {
            rating.grade.label().to_string()
        };
        output.push_str(&format!("Total: {}/10  {}\n", rating.total, grade));

        for (criterion, score) in rating.sub_scores.iter() {
            output.push_str(&format!(
                "  {:<24} {} {}/{}\n",
                criterion.label(),
                score_bar(score, criterion.max_score()),
                score,
                criterion.max_score()
            ));
        }
        if !rating.total_stated {
            output.push_str(&self.colorize("  (total computed from sub-scores)\n", Color::BrightBlack));
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📄 RESUME ANALYSIS", 1));
        output.push_str(&format!(
            "Resume: {} | Generated: {} | Processing time: {}ms\n",
            report.metadata.resume_file,
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        ));
        output.push_str(&format!("Verdict: {}\n", self.colorize(&report.verdict, Color::Cyan)));

        output.push_str(&self.format_header("Document", 2));
        if let Some(title) = &report.document.title {
            output.push_str(&format!("Title: {}\n", title));
        }
        output.push_str(&format!(
            "Words: {} | Characters: {} | Chunks: {} | Vocabulary: {} terms\n",
            report.document.word_count,
            report.document.character_count,
            report.document.chunk_count,
            report.document.vocabulary_size
        ));

        output.push_str(&self.format_header("Extracted Features", 2));
        output.push_str(&self.format_list("Skills", &report.features.skills));
        output.push_str(&self.format_list("Experience", &report.features.experience));
        output.push_str(&self.format_list("Education", &report.features.education));
        output.push_str(&self.format_list("Certifications", &report.features.certifications));
        if self.detailed {
            output.push_str(&self.format_list("Top keywords", &report.features.keywords));
        }

        if let Some(summary) = &report.summary {
            output.push_str(&self.format_header("Summary", 2));
            output.push_str(summary);
            output.push('\n');
        }

        if let Some(rating) = &report.rating {
            output.push_str(&self.format_header("Rating", 2));
            output.push_str(&self.format_rating(rating));
        }

        if !report.recommendations.is_empty() {
            output.push_str(&self.format_header("Recommendations", 2));
            for (i, rec) in report.recommendations.iter().enumerate() {
                output.push_str(&format!("{}. {}\n", i + 1, rec));
            }
        }

        if self.detailed || !report.has_generated_content() {
            output.push_str(&self.format_header("Retrieved Context", 2));
            for context in &report.retrieval {
                output.push_str(&self.format_header(&format!("{} ({})", context.kind, context.query), 3));
                if context.hits.is_empty() {
                    output.push_str("  no chunks indexed\n");
                }
                for hit in &context.hits {
                    let content = if self.detailed {
                        hit.content.clone()
                    } else {
                        preview(&hit.content, PREVIEW_GRAPHEMES)
                    };
                    output.push_str(&format!(
                        "  [{}] chunk {}: {}\n",
                        self.colorize(&format!("{:.3}", hit.score), Color::Magenta),
                        hit.position,
                        content
                    ));
                }
            }
        }

        if let Some(generator) = &report.metadata.generator {
            output.push_str(&format!(
                "\n{}\n",
                self.colorize(&format!("Generated with: {}", generator), Color::BrightBlack)
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool, detailed: bool) -> Self {
        Self {
            include_metadata,
            detailed,
        }
    }

    fn markdown_list(items: &[String]) -> String {
        if items.is_empty() {
            "_none found_".to_string()
        } else {
            items.join(", ")
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut md = String::new();

        md.push_str("# Resume Analysis\n\n");
        md.push_str(&format!("**Verdict:** {}\n\n", report.verdict));

        if self.include_metadata {
            md.push_str("| | |\n|---|---|\n");
            md.push_str(&format!("| Resume | `{}` |\n", report.metadata.resume_file));
            md.push_str(&format!(
                "| Generated | {} |\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            md.push_str(&format!("| Words | {} |\n", report.document.word_count));
            md.push_str(&format!("| Chunks | {} |\n", report.document.chunk_count));
            md.push_str(&format!("| Vocabulary | {} terms |\n", report.document.vocabulary_size));
            if let Some(generator) = &report.metadata.generator {
                md.push_str(&format!("| Generator | `{}` |\n", generator));
            }
            md.push('\n');
        }

        md.push_str("## Extracted Features\n\n");
        md.push_str(&format!("- **Skills:** {}\n", Self::markdown_list(&report.features.skills)));
        md.push_str(&format!("- **Experience:** {}\n", Self::markdown_list(&report.features.experience)));
        md.push_str(&format!("- **Education:** {}\n", Self::markdown_list(&report.features.education)));
        md.push_str(&format!(
            "- **Certifications:** {}\n\n",
            Self::markdown_list(&report.features.certifications)
        ));

        if let Some(summary) = &report.summary {
            md.push_str("## Summary\n\n");
            md.push_str(summary);
            md.push_str("\n\n");
        }

        if let Some(rating) = &report.rating {
            md.push_str("## Rating\n\n");
            md.push_str(&format!("**{}/10** {}\n\n", rating.total, rating.grade.label()));
            md.push_str("| Criterion | Score |\n|---|---|\n");
            for (criterion, score) in rating.sub_scores.iter() {
                md.push_str(&format!("| {} | {}/{} |\n", criterion.label(), score, criterion.max_score()));
            }
            md.push('\n');
        }

        if !report.recommendations.is_empty() {
            md.push_str("## Recommendations\n\n");
            for (i, rec) in report.recommendations.iter().enumerate() {
                md.push_str(&format!("{}. {}\n", i + 1, rec));
            }
            md.push('\n');
        }

        if self.detailed || !report.has_generated_content() {
            md.push_str("## Retrieved Context\n\n");
            for context in &report.retrieval {
                md.push_str(&format!("### {}\n\n", context.kind));
                md.push_str(&format!("Query: `{}`\n\n", context.query));
                for hit in &context.hits {
                    let content = if self.detailed {
                        hit.content.replace('\n', " ")
                    } else {
                        preview(&hit.content, PREVIEW_GRAPHEMES).replace('\n', " ")
                    };
                    md.push_str(&format!("> **{:.3}** (chunk {}) {}\n\n", hit.score, hit.position, content));
                }
            }
        }

        Ok(md)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

struct HtmlScore {
    label: &'static str,
    score: u32,
    max: u32,
}

struct HtmlHit {
    score: String,
    position: usize,
    content: String,
}

struct HtmlContext {
    kind: String,
    query: String,
    hits: Vec<HtmlHit>,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Resume Analysis: {{ resume_file }}</title>
    {% if include_styles %}
    <style>
        body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; max-width: 860px; margin: 2rem auto; color: #222; }
        h1 { border-bottom: 2px solid #3b82f6; padding-bottom: .3rem; }
        .verdict { font-size: 1.2rem; padding: .8rem; border-radius: 6px; background: #f1f5f9; }
        .score-good { color: #15803d; }
        .score-fair { color: #b45309; }
        .score-poor { color: #b91c1c; }
        table { border-collapse: collapse; }
        td, th { padding: .3rem .8rem; border-bottom: 1px solid #e2e8f0; text-align: left; }
        .hit { margin: .5rem 0; padding: .5rem; border-left: 3px solid #94a3b8; background: #f8fafc; }
        .meta { color: #64748b; font-size: .85rem; margin-top: 2rem; }
    </style>
    {% endif %}
</head>
<body>
    <h1>Resume Analysis</h1>
    <p class="verdict {{ grade_class }}">{{ verdict }}</p>

    <h2>Document</h2>
    <p>{{ word_count }} words, {{ chunk_count }} chunks, {{ vocabulary_size }} vocabulary terms</p>

    <h2>Extracted Features</h2>
    <ul>
        <li><strong>Skills:</strong> {{ skills }}</li>
        <li><strong>Experience:</strong> {{ experience }}</li>
        <li><strong>Education:</strong> {{ education }}</li>
        <li><strong>Certifications:</strong> {{ certifications }}</li>
    </ul>

    {% if has_summary %}
    <h2>Summary</h2>
    <p>{{ summary }}</p>
    {% endif %}

    {% if has_rating %}
    <h2>Rating: <span class="{{ grade_class }}">{{ total }}/10</span></h2>
    <table>
        <tr><th>Criterion</th><th>Score</th></tr>
        {% for s in scores %}
        <tr><td>{{ s.label }}</td><td>{{ s.score }}/{{ s.max }}</td></tr>
        {% endfor %}
    </table>
    {% endif %}

    {% if !recommendations.is_empty() %}
    <h2>Recommendations</h2>
    <ol>
        {% for rec in recommendations %}
        <li>{{ rec }}</li>
        {% endfor %}
    </ol>
    {% endif %}

    {% if show_context %}
    <h2>Retrieved Context</h2>
    {% for context in contexts %}
    <h3>{{ context.kind }}</h3>
    <p><code>{{ context.query }}</code></p>
    {% for hit in context.hits %}
    <div class="hit"><strong>{{ hit.score }}</strong> (chunk {{ hit.position }}) {{ hit.content }}</div>
    {% endfor %}
    {% endfor %}
    {% endif %}

    <div class="meta">
        <p>Generated {{ generated_at }} by resume-analyzer v{{ version }}{% if has_generator %} with {{ generator }}{% endif %}</p>
        <p>Resume: {{ resume_file }} | Processing time: {{ processing_time }}ms</p>
    </div>
</body>
</html>"#,
    ext = "html"
)]
struct HtmlTemplate {
    include_styles: bool,
    resume_file: String,
    verdict: String,
    grade_class: &'static str,
    word_count: usize,
    chunk_count: usize,
    vocabulary_size: usize,
    skills: String,
    experience: String,
    education: String,
    certifications: String,
    has_summary: bool,
    summary: String,
    has_rating: bool,
    total: u32,
    scores: Vec<HtmlScore>,
    recommendations: Vec<String>,
    show_context: bool,
    contexts: Vec<HtmlContext>,
    generated_at: String,
    version: String,
    has_generator: bool,
    generator: String,
    processing_time: u64,
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &AnalysisReport) -> HtmlTemplate {
        let join = |items: &[String]| {
            if items.is_empty() {
                "none found".to_string()
            } else {
                items.join(", ")
            }
        };

        let scores = report
            .rating
            .as_ref()
            .map(|rating| {
                rating
                    .sub_scores
                    .iter()
                    .map(|(criterion, score)| HtmlScore {
                        label: criterion.label(),
                        score,
                        max: criterion.max_score(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let contexts = report
            .retrieval
            .iter()
            .map(|context| HtmlContext {
                kind: context.kind.to_string(),
                query: context.query.clone(),
                hits: context
                    .hits
                    .iter()
                    .map(|hit| HtmlHit {
                        score: format!("{:.3}", hit.score),
                        position: hit.position,
                        content: preview(&hit.content, PREVIEW_GRAPHEMES * 2),
                    })
                    .collect(),
            })
            .collect();

        HtmlTemplate {
            include_styles: self.include_styles,
            resume_file: report.metadata.resume_file.clone(),
            verdict: report.verdict.clone(),
            grade_class: report.grade().map(grade_class).unwrap_or("score-fair"),
            word_count: report.document.word_count,
            chunk_count: report.document.chunk_count,
            vocabulary_size: report.document.vocabulary_size,
            skills: join(&report.features.skills),
            experience: join(&report.features.experience),
            education: join(&report.features.education),
            certifications: join(&report.features.certifications),
            has_summary: report.summary.is_some(),
            summary: report.summary.clone().unwrap_or_default(),
            has_rating: report.rating.is_some(),
            total: report.rating.as_ref().map(|r| r.total).unwrap_or(0),
            scores,
            recommendations: report.recommendations.clone(),
            show_context: !report.retrieval.is_empty(),
            contexts,
            generated_at: report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            version: report.metadata.analyzer_version.clone(),
            has_generator: report.metadata.generator.is_some(),
            generator: report.metadata.generator.clone().unwrap_or_default(),
            processing_time: report.metadata.processing_time_ms,
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        Ok(self.create_template_data(report).render()?)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(true, detailed),
            html_formatter: HtmlFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &AnalysisReport, format: OutputFormat) -> Result<String> {
        let formatter: &dyn OutputFormatter = match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
            OutputFormat::Html => &self.html_formatter,
        };
        formatter.format_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
    };
    format!("{}_analysis{}.{}", base_name, timestamp_suffix, extension)
}
