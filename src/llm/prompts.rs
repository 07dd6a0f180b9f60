//! Prompt templates for the three resume analyses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Skills appended to a retrieval query at most.
const MAX_QUERY_SKILLS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Summary,
    Rating,
    Recommendations,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::Summary,
        AnalysisKind::Rating,
        AnalysisKind::Recommendations,
    ];

    /// Base retrieval query for this analysis.
    pub fn base_query(&self) -> &'static str {
        match self {
            AnalysisKind::Summary => "professional summary experience skills education background",
            AnalysisKind::Rating => "achievements results experience skills education certifications format",
            AnalysisKind::Recommendations => "experience responsibilities achievements skills projects improvements",
        }
    }

    /// Retrieval query seeded with the most frequent extracted skills.
    pub fn query(&self, skills: &[String]) -> String {
        let mut query = self.base_query().to_string();
        for skill in skills.iter().take(MAX_QUERY_SKILLS) {
            query.push(' ');
            query.push_str(skill);
        }
        query
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisKind::Summary => write!(f, "summary"),
            AnalysisKind::Rating => write!(f, "rating"),
            AnalysisKind::Recommendations => write!(f, "recommendations"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub summary: String,
    pub rating: String,
    pub recommendations: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            summary: SUMMARY_TEMPLATE.to_string(),
            rating: RATING_TEMPLATE.to_string(),
            recommendations: RECOMMENDATIONS_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn template(&self, kind: AnalysisKind) -> &str {
        match kind {
            AnalysisKind::Summary => &self.summary,
            AnalysisKind::Rating => &self.rating,
            AnalysisKind::Recommendations => &self.recommendations,
        }
    }

    /// Fill `{context}` with the retrieved excerpts, separated by blank lines.
    pub fn render<S: AsRef<str>>(&self, kind: AnalysisKind, excerpts: &[S]) -> String {
        let context = excerpts
            .iter()
            .map(|e| e.as_ref().trim())
            .collect::<Vec<_>>()
            .join("\n\n");
        self.template(kind).replace("{context}", &context)
    }
}

const SUMMARY_TEMPLATE: &str = r#"TASK: Summarize the candidate described by the resume excerpts below.

<RESUME EXCERPTS>
{context}
</RESUME EXCERPTS>

Write a concise professional summary of 4-6 sentences covering the candidate's
current role, years and areas of experience, strongest skills, and education.
Use only facts stated in the excerpts."#;

const RATING_TEMPLATE: &str = r#"TASK: Rate the resume described by the excerpts below.

<RESUME EXCERPTS>
{context}
</RESUME EXCERPTS>

Score each criterion from 0 to 2 and answer in exactly this format:

Content Quality: X/2 - one-line justification
Formatting & Structure: X/2 - one-line justification
Skills Presentation: X/2 - one-line justification
Experience Description: X/2 - one-line justification
ATS Optimization: X/2 - one-line justification

TOTAL SCORE: X/10

IMPROVEMENT RECOMMENDATIONS:
1. first recommendation
2. second recommendation
3. third recommendation"#;

const RECOMMENDATIONS_TEMPLATE: &str = r#"TASK: Recommend concrete improvements to the resume described by the excerpts below.

<RESUME EXCERPTS>
{context}
</RESUME EXCERPTS>

List 5 specific, actionable improvements as a numbered list, one per line.
Reference the actual resume content above, not generic advice."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_embeds_excerpts() {
        let templates = PromptTemplates::default();
        let prompt = templates.render(
            AnalysisKind::Summary,
            &["  Senior engineer at Acme. ", "BSc Computer Science"],
        );

        assert!(prompt.contains("Senior engineer at Acme.\n\nBSc Computer Science"));
        assert!(prompt.contains("<RESUME EXCERPTS>"));
        assert!(!prompt.contains("{context}"));
    }

    #[test]
    fn test_rating_template_matches_parser_format() {
        let templates = PromptTemplates::default();
        let prompt = templates.render::<&str>(AnalysisKind::Rating, &[]);

        assert!(prompt.contains("TOTAL SCORE: X/10"));
        assert!(prompt.contains("IMPROVEMENT RECOMMENDATIONS:"));
        assert!(prompt.contains("Content Quality: X/2"));
    }

    #[test]
    fn test_query_seeded_with_skills() {
        let skills: Vec<String> = ["rust", "aws", "kafka", "sql", "docker", "helm"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let query = AnalysisKind::Rating.query(&skills);

        assert!(query.starts_with(AnalysisKind::Rating.base_query()));
        assert!(query.ends_with(" rust aws kafka sql docker"));
        assert!(!query.contains("helm"));
        assert_eq!(AnalysisKind::Summary.query(&[]), AnalysisKind::Summary.base_query());
    }

    #[test]
    fn test_every_kind_has_a_template() {
        let templates = PromptTemplates::default();
        for kind in AnalysisKind::ALL {
            assert!(templates.template(kind).contains("{context}"));
        }
    }
}
