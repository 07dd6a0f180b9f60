//! Text generation, prompts and response parsing

pub mod analyzer;
pub mod generator;
pub mod prompts;
pub mod rating;

pub use analyzer::{PreparedResume, ResumeAnalysis, ResumeAnalyzer};
pub use generator::{CommandGenerator, TextGenerator};
