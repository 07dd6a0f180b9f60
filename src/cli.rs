//! CLI interface for the resume analyzer

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-analyzer")]
#[command(version)]
#[command(about = "Resume analysis with chunked retrieval and LLM-backed ratings")]
#[command(
    long_about = "Split a resume into overlapping chunks, index them in a TF-IDF vector space, retrieve the \
                  most relevant chunks for each analysis and pass them to an external text generator for a \
                  summary, a 10-point rating and improvement recommendations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a resume
    Analyze {
        /// Path to resume file (PDF, DOCX, TXT, MD)
        resume: PathBuf,

        /// Output detailed analysis
        #[arg(short, long)]
        detailed: bool,

        /// Output format: console, json, markdown, html
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file (a directory gets a generated file name)
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Skip text generation (retrieval and feature extraction only)
        #[arg(long)]
        no_llm: bool,

        /// Chunks retrieved per analysis
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Print the chunks a document is split into
    Chunk {
        /// Path to document
        file: PathBuf,

        /// Target chunk size in characters
        #[arg(long)]
        size: Option<usize>,

        /// Overlap between chunks in characters
        #[arg(long)]
        overlap: Option<usize>,

        /// Pack whole sentences instead of sliding a character window
        #[arg(long)]
        sentences: bool,
    },

    /// Rank a document's chunks against a query
    Search {
        /// Path to document
        file: PathBuf,

        /// Query text
        query: String,

        /// Number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// List skills, experience, education and certifications found in a document
    Features {
        /// Path to document
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a saved rating response
    Rate {
        /// File holding the generated rating text
        response: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, html",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
