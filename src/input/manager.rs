//! Reads resume files from disk and caches their extracted text per path

use crate::error::{Result, ResumeAnalyzerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::DocumentSource;
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct InputManager {
    cache: HashMap<PathBuf, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Read a file from disk and wrap it in the matching document source.
    pub async fn load_source(&self, path: &Path) -> Result<DocumentSource> {
        if !path.exists() {
            return Err(ResumeAnalyzerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let file_type = FileType::from_path(path);
        if file_type == FileType::Unknown {
            return Err(ResumeAnalyzerError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                path.display()
            )));
        }

        let bytes = fs::read(path).await?;
        debug!("Read {} bytes from {} ({})", bytes.len(), path.display(), file_type);
        DocumentSource::from_bytes(file_type, bytes)
    }

    /// Extracted text of `path`, served from the cache on repeat calls.
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        if let Some(text) = self.enable_cache.then(|| self.cache.get(path)).flatten() {
            debug!("Cache hit for {}", path.display());
            return Ok(text.clone());
        }

        let source = self.load_source(path).await?;
        info!("Extracting text from {} file: {}", source.file_type(), path.display());
        let text = source.extract_text()?;

        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), text.clone());
        }

        Ok(text)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
