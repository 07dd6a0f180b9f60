//! Retrieval-augmented resume analysis
//!
//! One run goes: extract features, chunk, index the chunks, retrieve the
//! top-k chunks for each analysis, render the prompt, generate, and parse
//! the answers back into structured data.

use crate::config::Config;
use crate::error::{Result, ResumeAnalyzerError};
use crate::llm::generator::TextGenerator;
use crate::llm::prompts::{AnalysisKind, PromptTemplates};
use crate::llm::rating::{extract_recommendations, parse_rating, Rating};
use crate::processing::chunker::TextChunker;
use crate::processing::document::{Chunk, Document, DocumentMetadata};
use crate::processing::features::{ExtractedFeatures, FeatureExtractor};
use crate::processing::search::SearchHit;
use crate::processing::tokenizer::Tokenizer;
use crate::processing::vector_space::VectorService;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Chunks retrieved for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub kind: AnalysisKind,
    pub query: String,
    pub hits: Vec<SearchHit>,
}

impl RetrievedContext {
    pub fn excerpts(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.content.as_str()).collect()
    }
}

/// Everything computed before any text generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedResume {
    pub metadata: DocumentMetadata,
    pub features: ExtractedFeatures,
    pub chunks: Vec<Chunk>,
    pub vocabulary_size: usize,
    pub contexts: Vec<RetrievedContext>,
}

impl PreparedResume {
    pub fn context(&self, kind: AnalysisKind) -> Option<&RetrievedContext> {
        self.contexts.iter().find(|c| c.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub prepared: PreparedResume,
    pub summary: Option<String>,
    pub rating: Option<Rating>,
    pub recommendations: Vec<String>,
    pub generator: Option<String>,
    pub processing_time_ms: u64,
}

pub struct ResumeAnalyzer {
    chunker: TextChunker,
    extractor: FeatureExtractor,
    vectors: VectorService,
    templates: PromptTemplates,
    top_k: usize,
}

impl ResumeAnalyzer {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chunker: TextChunker::from_config(&config.processing)?,
            extractor: FeatureExtractor::new()?,
            vectors: VectorService::new(Tokenizer::new(config.processing.min_token_length)),
            templates: PromptTemplates::default(),
            top_k: config.retrieval.top_k,
        })
    }

    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieval only, no generation.
    pub fn prepare(&mut self, document: &Document) -> PreparedResume {
        let features = self.extractor.extract(document.content());
        let chunks = self.chunker.chunk(document.content());
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let index = self.vectors.build_index(&contents);

        let contexts = AnalysisKind::ALL
            .iter()
            .map(|kind| {
                let query = kind.query(&features.skills);
                let hits = index.search(&query, self.top_k);
                RetrievedContext {
                    kind: *kind,
                    query,
                    hits,
                }
            })
            .collect();

        info!(
            "Prepared resume: {} chunks, {} skills, {} vocabulary terms",
            chunks.len(),
            features.skills.len(),
            index.vocabulary().len()
        );

        PreparedResume {
            metadata: document.metadata().clone(),
            features,
            vocabulary_size: index.vocabulary().len(),
            chunks,
            contexts,
        }
    }

    /// Full analysis. The three generations run concurrently.
    pub async fn analyze<G: TextGenerator>(&mut self, document: &Document, generator: &G) -> Result<ResumeAnalysis> {
        let start = Instant::now();
        let prepared = self.prepare(document);

        if prepared.chunks.is_empty() {
            return Err(ResumeAnalyzerError::InvalidInput(
                "No text to analyze was found in the resume".to_string(),
            ));
        }

        let summary_prompt = self.prompt_for(&prepared, AnalysisKind::Summary);
        let rating_prompt = self.prompt_for(&prepared, AnalysisKind::Rating);
        let recommendations_prompt = self.prompt_for(&prepared, AnalysisKind::Recommendations);

        let (summary, rating_text, recommendations_text) = tokio::try_join!(
            generator.generate(&summary_prompt),
            generator.generate(&rating_prompt),
            generator.generate(&recommendations_prompt),
        )?;

        let rating = parse_rating(&rating_text);
        if !rating.total_stated {
            warn!("Rating response had no total score; using the sum of sub-scores");
        }

        let mut recommendations = extract_recommendations(&recommendations_text);
        if recommendations.is_empty() {
            recommendations = rating.improvements.clone();
        }

        Ok(ResumeAnalysis {
            prepared,
            summary: Some(summary.trim().to_string()).filter(|s| !s.is_empty()),
            rating: Some(rating),
            recommendations,
            generator: Some(generator.name().to_string()),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Analysis without a generator: retrieval results only.
    pub fn analyze_offline(&mut self, document: &Document) -> ResumeAnalysis {
        let start = Instant::now();
        let prepared = self.prepare(document);
        ResumeAnalysis {
            prepared,
            summary: None,
            rating: None,
            recommendations: Vec::new(),
            generator: None,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn prompt_for(&self, prepared: &PreparedResume, kind: AnalysisKind) -> String {
        let excerpts = prepared.context(kind).map(|c| c.excerpts()).unwrap_or_default();
        self.templates.render(kind, &excerpts)
    }
}
