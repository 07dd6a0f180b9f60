//! Parse a semi-structured rating response back into scores
//!
//! The expected response looks like
//!
//! ```text
//! Content Quality: 2/2 - clear and specific
//! Formatting & Structure: 1/2 - dense layout
//! ...
//! TOTAL SCORE: 7/10
//!
//! IMPROVEMENT RECOMMENDATIONS:
//! 1. Quantify the migration project
//! 2. Move certifications above education
//! ```
//!
//! Nothing here fails. Missing scores are 0, a missing total is the sum of the
//! sub-scores, and a missing recommendations section is an empty list.

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Highest total a rating can carry.
pub const MAX_TOTAL: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    ContentQuality,
    FormattingStructure,
    SkillsPresentation,
    ExperienceDescription,
    AtsOptimization,
}

impl Criterion {
    pub const ALL: [Criterion; 5] = [
        Criterion::ContentQuality,
        Criterion::FormattingStructure,
        Criterion::SkillsPresentation,
        Criterion::ExperienceDescription,
        Criterion::AtsOptimization,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Criterion::ContentQuality => "Content Quality",
            Criterion::FormattingStructure => "Formatting & Structure",
            Criterion::SkillsPresentation => "Skills Presentation",
            Criterion::ExperienceDescription => "Experience Description",
            Criterion::AtsOptimization => "ATS Optimization",
        }
    }

    pub fn max_score(&self) -> u32 {
        2
    }

    /// Label alternatives accepted in a response, as a regex fragment.
    fn label_pattern(&self) -> &'static str {
        match self {
            Criterion::ContentQuality => r"content\s+quality",
            Criterion::FormattingStructure => r"format(?:ting)?\s*(?:&|and)\s*structure",
            Criterion::SkillsPresentation => r"skills?\s+(?:presentation|relevance)",
            Criterion::ExperienceDescription => r"experience\s+(?:description|impact)",
            Criterion::AtsOptimization => r"ats\s+(?:optimi[sz]ation|compatibility)",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub content_quality: u32,
    pub formatting_structure: u32,
    pub skills_presentation: u32,
    pub experience_description: u32,
    pub ats_optimization: u32,
}

impl SubScores {
    pub fn get(&self, criterion: Criterion) -> u32 {
        match criterion {
            Criterion::ContentQuality => self.content_quality,
            Criterion::FormattingStructure => self.formatting_structure,
            Criterion::SkillsPresentation => self.skills_presentation,
            Criterion::ExperienceDescription => self.experience_description,
            Criterion::AtsOptimization => self.ats_optimization,
        }
    }

    /// Store a score, capped at the criterion's maximum.
    pub fn set(&mut self, criterion: Criterion, score: u32) {
        let score = score.min(criterion.max_score());
        match criterion {
            Criterion::ContentQuality => self.content_quality = score,
            Criterion::FormattingStructure => self.formatting_structure = score,
            Criterion::SkillsPresentation => self.skills_presentation = score,
            Criterion::ExperienceDescription => self.experience_description = score,
            Criterion::AtsOptimization => self.ats_optimization = score,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, u32)> + '_ {
        Criterion::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    pub fn sum(&self) -> u32 {
        self.iter().map(|(_, score)| score).sum()
    }
}

/// Qualitative band for a total score. Variants are declared worst first, so
/// the derived ordering ranks better grades higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    Poor,
    BelowAverage,
    Average,
    Good,
    Excellent,
}

impl Grade {
    pub fn from_total(total: u32) -> Self {
        if total >= 9 {
            Grade::Excellent
        } else if total >= 7 {
            Grade::Good
        } else if total >= 5 {
            Grade::Average
        } else if total >= 3 {
            Grade::BelowAverage
        } else {
            Grade::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent (Job-Ready)",
            Grade::Good => "Good (Minor Improvements Needed)",
            Grade::Average => "Average (Needs Work)",
            Grade::BelowAverage => "Below Average (Significant Revision Needed)",
            Grade::Poor => "Poor (Major Overhaul Required)",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub sub_scores: SubScores,
    pub total: u32,
    /// Whether `total` was read from the response rather than summed.
    pub total_stated: bool,
    pub grade: Grade,
    pub improvements: Vec<String>,
    pub raw: String,
}

fn criterion_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        Criterion::ALL
            .iter()
            .map(|c| {
                let pattern = format!(
                    r"(?i)\b(?:{})\b[*_\s]*:[*_\s]*(\d+)\s*/\s*{}\b",
                    c.label_pattern(),
                    c.max_score()
                );
                Regex::new(&pattern).expect("criterion pattern is valid")
            })
            .collect()
    })
}

fn total_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\btotal\s+score\b[*_\s]*:[*_\s]*(\d+)\s*/\s*(\d+)").expect("total pattern is valid")
    })
}

fn improvements_header() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?im)^[\s#*_]*(?:\d+[.)]\s*)?(?:improvement\s+recommendations|recommended\s+improvements|improvements?(?:\s+suggestions)?|recommendations)[ \t*_]*(?::[ \t*_]*|$)",
        )
        .expect("improvements header pattern is valid")
    })
}

fn list_marker() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:[-*•+]+\s*|\(?\d+[.)]\s+)").expect("list marker pattern is valid")
    })
}

/// Parse a rating response. Never fails; see the module docs for defaults.
pub fn parse_rating(text: &str) -> Rating {
    let mut sub_scores = SubScores::default();
    for (criterion, pattern) in Criterion::ALL.iter().zip(criterion_patterns()) {
        let score = pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0);
        sub_scores.set(*criterion, score);
    }

    let stated_total = parse_total(text);
    let total = match stated_total {
        Some(total) => total,
        None => {
            debug!("No total score in response; summing sub-scores");
            sub_scores.sum()
        }
    };

    let improvements = match improvements_section(text) {
        Some(body) => extract_list_items(body),
        None => {
            debug!("No improvement recommendations section in response");
            Vec::new()
        }
    };

    Rating {
        sub_scores,
        total,
        total_stated: stated_total.is_some(),
        grade: Grade::from_total(total),
        improvements,
        raw: text.to_string(),
    }
}

/// `TOTAL SCORE: n/m`, rescaled to `/10` when `m` differs, capped at [`MAX_TOTAL`].
fn parse_total(text: &str) -> Option<u32> {
    let caps = total_pattern().captures(text)?;
    let score: u64 = caps.get(1)?.as_str().parse().ok()?;
    let out_of: u64 = caps.get(2)?.as_str().parse().ok()?;

    let scaled = if out_of == 0 || out_of == u64::from(MAX_TOTAL) {
        score
    } else {
        (score.saturating_mul(u64::from(MAX_TOTAL)) + out_of / 2) / out_of
    };
    Some(scaled.min(u64::from(MAX_TOTAL)) as u32)
}

/// Body of the improvement recommendations section: everything after the
/// header line up to the next heading, or up to the first plain paragraph
/// that follows a blank line once items have been seen.
pub fn improvements_section(text: &str) -> Option<&str> {
    let header = improvements_header().find(text)?;
    let rest = &text[header.end()..];

    let mut end = rest.len();
    let mut offset = 0;
    let mut bold_items: Option<bool> = None;
    let mut after_blank = false;
    // The first piece is the remainder of the header line, e.g. the first
    // item of "RECOMMENDATIONS: 1. Add metrics".
    for (i, line) in rest.split_inclusive('\n').enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            after_blank |= i > 0;
        } else if i == 0 {
            bold_items = Some(is_bold(trimmed));
        } else {
            let continues_bold_list = bold_items == Some(true) && is_bold(trimmed);
            let trailing_prose = bold_items.is_some()
                && after_blank
                && !list_marker().is_match(trimmed)
                && !continues_bold_list;
            if is_heading(trimmed, bold_items.unwrap_or(true)) || trailing_prose {
                end = offset;
                break;
            }
            bold_items.get_or_insert(is_bold(trimmed));
            after_blank = false;
        }
        offset += line.len();
    }
    Some(&rest[..end])
}

/// Non-empty lines of `body` with bullet or number markers stripped.
/// Heading lines are skipped. Bold lines count as items when the list
/// itself is written in bold.
pub fn extract_list_items(body: &str) -> Vec<String> {
    let lines: Vec<&str> = body.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
    let bold_items = lines
        .iter()
        .find(|line| !is_heading(line, true))
        .is_some_and(|line| is_bold(line));

    lines
        .into_iter()
        .filter(|line| !is_heading(line, bold_items))
        .map(|line| {
            // Unwrap "**item**" first, the bullet pattern would eat its opening stars.
            let line = strip_bold(line).map(str::trim).unwrap_or(line);
            let item = list_marker().replace(line, "");
            let item = item.trim();
            strip_bold(item).unwrap_or(item).trim().to_string()
        })
        .filter(|item| !item.is_empty())
        .collect()
}

/// Items of a free-form recommendations response: the recommendations
/// section if there is one, else every list item in the text.
pub fn extract_recommendations(text: &str) -> Vec<String> {
    extract_list_items(improvements_section(text).unwrap_or(text))
}

fn strip_bold(line: &str) -> Option<&str> {
    line.strip_prefix("**")?.strip_suffix("**")
}

fn is_bold(line: &str) -> bool {
    line.len() > 4 && strip_bold(line).is_some()
}

/// `bold_items` says whether a plain `**...**` line is a list entry rather
/// than a heading. Bold lines ending in a colon are always headings.
fn is_heading(line: &str, bold_items: bool) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return false;
    }
    if line.starts_with('#') {
        return true;
    }
    if line.starts_with("**") && (line.ends_with(':') || line.ends_with(":**")) {
        return true;
    }
    if is_bold(line) {
        return !bold_items;
    }
    // "SKILLS GAPS:" style headings.
    line.ends_with(':')
        && line.chars().any(char::is_alphabetic)
        && !line.chars().any(char::is_lowercase)
        && !list_marker().is_match(line)
}
