//! Resume analyzer library
//!
//! Chunks an uploaded resume, indexes the chunks in a TF-IDF vector space,
//! retrieves the chunks most relevant to each analytical question and turns
//! the model's free-text answers back into structured ratings.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{Result, ResumeAnalyzerError};
pub use llm::rating::{parse_rating, Grade, Rating};
pub use processing::chunker::chunk_text;
pub use processing::features::{extract_features, ExtractedFeatures};
pub use processing::search::SearchHit;
pub use processing::vector_space::{TfIdfIndex, VectorService};
