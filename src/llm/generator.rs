//! Text generation boundary
//!
//! The analyzer only needs "prompt in, text out". [`CommandGenerator`] gets
//! that from any local program that reads a prompt on stdin and writes its
//! answer to stdout (`ollama run llama3`, `llm -m gpt-4o`, a shell script).

use crate::config::LlmConfig;
use crate::error::{Result, ResumeAnalyzerError};
use log::{debug, info, warn};
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub trait TextGenerator: Send + Sync {
    /// Produce a completion for `prompt`.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// `None` when no command is configured.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let program = config.command.as_deref()?.trim();
        if program.is_empty() {
            return None;
        }
        Some(Self::new(
            program,
            config.args.clone(),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    async fn run(&self, prompt: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ResumeAnalyzerError::Generation(format!("Failed to start '{}': {}", self.program, e))
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            ResumeAnalyzerError::Generation(format!("No stdin handle for '{}'", self.program))
        })?;
        // Feed stdin while stdout is drained, so a program that streams its
        // answer before reading the whole prompt cannot fill the pipe and stall.
        let write_prompt = async move {
            let written = stdin.write_all(prompt.as_bytes()).await;
            // Closing stdin signals end of prompt.
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(write_prompt, child.wait_with_output());
        let output = output?;

        if let Err(e) = written {
            // A program that exits without reading its input is judged by its exit status.
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(e.into());
            }
            debug!("'{}' closed stdin before reading the whole prompt", self.program);
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResumeAnalyzerError::Generation(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            warn!("'{}' produced no output", self.program);
        }
        Ok(text)
    }
}

impl TextGenerator for CommandGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        info!("Generating with '{}' ({} prompt chars)", self.program, prompt.chars().count());
        let text = tokio::time::timeout(self.timeout, self.run(prompt))
            .await
            .map_err(|_| {
                ResumeAnalyzerError::Generation(format!(
                    "'{}' timed out after {}s",
                    self.program,
                    self.timeout.as_secs()
                ))
            })??;
        debug!("'{}' returned {} chars", self.program, text.chars().count());
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str, timeout: Duration) -> CommandGenerator {
        CommandGenerator::new("sh", vec!["-c".to_string(), script.to_string()], timeout)
    }

    #[tokio::test]
    async fn test_prompt_is_piped_through() {
        let generator = sh("cat", Duration::from_secs(10));
        let text = generator.generate("  TOTAL SCORE: 8/10\n").await.unwrap();
        assert_eq!(text, "TOTAL SCORE: 8/10");
    }

    #[tokio::test]
    async fn test_large_prompt_through_streaming_filter() {
        let generator = CommandGenerator::new("cat", vec![], Duration::from_secs(20));
        let prompt = "x".repeat(1 << 20);

        let text = generator.generate(&prompt).await.unwrap();
        assert_eq!(text.len(), prompt.len());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let generator = sh("echo boom >&2; exit 3", Duration::from_secs(10));
        let err = generator.generate("prompt").await.unwrap_err();

        match err {
            ResumeAnalyzerError::Generation(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let generator = CommandGenerator::new("definitely-not-a-real-program-42", vec![], Duration::from_secs(5));
        assert!(matches!(
            generator.generate("prompt").await,
            Err(ResumeAnalyzerError::Generation(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout() {
        let generator = sh("cat >/dev/null; sleep 5", Duration::from_millis(100));
        let err = generator.generate("prompt").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_from_config() {
        let mut config = crate::config::Config::default().llm;
        config.command = None;
        assert!(CommandGenerator::from_config(&config).is_none());

        config.command = Some("  ".to_string());
        assert!(CommandGenerator::from_config(&config).is_none());

        config.command = Some("ollama".to_string());
        config.args = vec!["run".to_string(), "llama3".to_string()];
        let generator = CommandGenerator::from_config(&config).unwrap();
        assert_eq!(generator.name(), "ollama");
        assert_eq!(generator.timeout, Duration::from_secs(config.timeout_secs));
    }
}
