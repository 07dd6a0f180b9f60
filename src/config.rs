//! Configuration management for the resume analyzer

use crate::error::{Result, ResumeAnalyzerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub processing: ProcessingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Target chunk length in characters.
    pub chunk_size: usize,
    /// Characters (window mode) carried over between consecutive chunks.
    pub chunk_overlap: usize,
    /// Chunks shorter than this after trimming are discarded.
    pub min_chunk_length: usize,
    /// Tokens of this many characters or fewer are not indexed.
    pub min_token_length: usize,
    pub chunking_mode: ChunkingMode,
    /// Sentence mode only: words carried over. Defaults to `chunk_overlap / 10`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap_words: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingMode {
    /// Sliding character window that prefers sentence/word boundaries.
    Window,
    /// Greedy sentence packing with a word-based overlap.
    Sentence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// External program that reads a prompt on stdin and answers on stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 700,
            chunk_overlap: 200,
            min_chunk_length: 50,
            min_token_length: 2,
            chunking_mode: ChunkingMode::Window,
            overlap_words: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processing: ProcessingConfig::default(),
            retrieval: RetrievalConfig { top_k: 3 },
            llm: LlmConfig {
                command: None,
                args: Vec::new(),
                timeout_secs: 120,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from `config_path`, writing defaults there on first use.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ResumeAnalyzerError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResumeAnalyzerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-analyzer")
            .join("config.toml")
    }

    /// Apply a `--top-k` override and re-validate.
    pub fn apply_top_k(&mut self, top_k: Option<usize>) -> Result<()> {
        if let Some(k) = top_k {
            self.retrieval.top_k = k;
        }
        self.validate()
    }

    /// Reject values that indicate a programming error rather than bad content.
    pub fn validate(&self) -> Result<()> {
        let processing = &self.processing;
        if processing.chunk_size == 0 {
            return Err(ResumeAnalyzerError::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if processing.min_chunk_length > processing.chunk_size {
            return Err(ResumeAnalyzerError::InvalidConfiguration(format!(
                "min_chunk_length ({}) cannot exceed chunk_size ({})",
                processing.min_chunk_length, processing.chunk_size
            )));
        }
        if processing.chunk_overlap >= processing.chunk_size {
            return Err(ResumeAnalyzerError::InvalidConfiguration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                processing.chunk_overlap, processing.chunk_size
            )));
        }
        if processing.min_token_length == 0 {
            return Err(ResumeAnalyzerError::InvalidConfiguration(
                "min_token_length must be greater than zero".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(ResumeAnalyzerError::InvalidConfiguration(
                "top_k must be at least 1".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ResumeAnalyzerError::InvalidConfiguration(
                "llm.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
