//! Error handling for the resume analyzer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeAnalyzerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("DOCX extraction error: {0}")]
    DocxExtraction(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Programmer error: a parameter that can never produce a meaningful result.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Text generation error: {0}")]
    Generation(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ResumeAnalyzerError>;

impl From<zip::result::ZipError> for ResumeAnalyzerError {
    fn from(err: zip::result::ZipError) -> Self {
        ResumeAnalyzerError::DocxExtraction(err.to_string())
    }
}

impl From<askama::Error> for ResumeAnalyzerError {
    fn from(err: askama::Error) -> Self {
        ResumeAnalyzerError::OutputFormatting(err.to_string())
    }
}
