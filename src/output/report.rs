//! Report structure shared by every output format

use crate::llm::analyzer::{ResumeAnalysis, RetrievedContext};
use crate::llm::rating::{Grade, Rating};
use crate::processing::features::ExtractedFeatures;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub document: DocumentOverview,
    pub features: ExtractedFeatures,
    /// Chunks retrieved for each analysis, best first.
    pub retrieval: Vec<RetrievedContext>,
    pub summary: Option<String>,
    pub rating: Option<Rating>,
    pub recommendations: Vec<String>,
    pub verdict: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub analyzer_version: String,
    pub resume_file: String,
    pub processing_time_ms: u64,
    /// Program that produced the generated sections, if any.
    pub generator: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOverview {
    pub title: Option<String>,
    pub word_count: usize,
    pub character_count: usize,
    pub chunk_count: usize,
    pub vocabulary_size: usize,
}

impl AnalysisReport {
    pub fn from_analysis(analysis: ResumeAnalysis, resume_file: &str) -> Self {
        let ResumeAnalysis {
            prepared,
            summary,
            rating,
            recommendations,
            generator,
            processing_time_ms,
        } = analysis;

        let verdict = Self::verdict_for(rating.as_ref(), &prepared.features);

        Self {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                analyzer_version: env!("CARGO_PKG_VERSION").to_string(),
                resume_file: resume_file.to_string(),
                processing_time_ms,
                generator,
            },
            document: DocumentOverview {
                title: prepared.metadata.title,
                word_count: prepared.metadata.word_count,
                character_count: prepared.metadata.character_count,
                chunk_count: prepared.chunks.len(),
                vocabulary_size: prepared.vocabulary_size,
            },
            features: prepared.features,
            retrieval: prepared.contexts,
            summary,
            rating,
            recommendations,
            verdict,
        }
    }

    fn verdict_for(rating: Option<&Rating>, features: &ExtractedFeatures) -> String {
        match rating {
            Some(rating) => format!("{} ({}/10)", rating.grade.label(), rating.total),
            None if features.skills.is_empty() => {
                "No recognised skills found; the resume may not have been extracted correctly".to_string()
            }
            None => format!(
                "Retrieval only: {} skills and {} certifications recognised",
                features.skills.len(),
                features.certifications.len()
            ),
        }
    }

    pub fn grade(&self) -> Option<Grade> {
        self.rating.as_ref().map(|r| r.grade)
    }

    pub fn has_generated_content(&self) -> bool {
        self.summary.is_some() || self.rating.is_some() || !self.recommendations.is_empty()
    }
}
