//! Splitting document text into overlapping, size-bounded chunks
//!
//! Two strategies are available:
//!
//! - [`ChunkingMode::Window`] slides a character window over the text and
//!   pulls each window end back to a sentence terminator or whitespace when
//!   one lies in the second half of the window. Consecutive windows overlap
//!   by `overlap_size` characters.
//! - [`ChunkingMode::Sentence`] greedily packs whole sentences and seeds each
//!   new chunk with the last few words of the previous one.
//!
//! All lengths are measured in characters, not bytes.

use crate::config::{ChunkingMode, ProcessingConfig};
use crate::error::{Result, ResumeAnalyzerError};
use crate::processing::document::Chunk;
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_CHUNK_SIZE: usize = 700;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_MIN_CHUNK_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunker {
    target_size: usize,
    overlap_size: usize,
    min_chunk_length: usize,
    overlap_words: usize,
    mode: ChunkingMode,
}

impl TextChunker {
    /// Window-mode chunker. Fails on a zero `target_size` or an overlap that
    /// would keep the window from advancing.
    pub fn new(target_size: usize, overlap_size: usize) -> Result<Self> {
        if target_size == 0 {
            return Err(ResumeAnalyzerError::InvalidConfiguration(
                "chunk target size must be greater than zero".to_string(),
            ));
        }
        if overlap_size >= target_size {
            return Err(ResumeAnalyzerError::InvalidConfiguration(format!(
                "chunk overlap ({}) must be smaller than the target size ({})",
                overlap_size, target_size
            )));
        }

        Ok(Self {
            target_size,
            overlap_size,
            min_chunk_length: DEFAULT_MIN_CHUNK_LENGTH.min(target_size),
            overlap_words: overlap_size / 10,
            mode: ChunkingMode::Window,
        })
    }

    pub fn from_config(config: &ProcessingConfig) -> Result<Self> {
        let chunker = Self::new(config.chunk_size, config.chunk_overlap)?
            .with_mode(config.chunking_mode)
            .with_min_chunk_length(config.min_chunk_length);

        Ok(match config.overlap_words {
            Some(words) => chunker.with_overlap_words(words),
            None => chunker,
        })
    }

    pub fn with_mode(mut self, mode: ChunkingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_min_chunk_length(mut self, min_chunk_length: usize) -> Self {
        self.min_chunk_length = min_chunk_length;
        self
    }

    /// Sentence mode: number of trailing words carried into the next chunk.
    pub fn with_overlap_words(mut self, overlap_words: usize) -> Self {
        self.overlap_words = overlap_words;
        self
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn mode(&self) -> ChunkingMode {
        self.mode
    }

    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let total = text.chars().count();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        // The whole document fits: it is returned as the sole chunk and is
        // not subject to the minimum-length filter.
        if total <= self.target_size {
            return vec![Chunk::new(0, trimmed, Some((0, total)))];
        }

        let chunks = match self.mode {
            ChunkingMode::Window => self.chunk_window(text),
            ChunkingMode::Sentence => self.chunk_sentences(text),
        };

        debug!(
            "Chunked {} characters into {} chunks ({:?}, target {}, overlap {})",
            total,
            chunks.len(),
            self.mode,
            self.target_size,
            self.overlap_size
        );
        chunks
    }

    fn chunk_window(&self, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total {
            let mut end = (start + self.target_size).min(total);
            if end < total {
                end = self.find_break(&chars, start, end);
            }

            let content: String = chars[start..end].iter().collect();
            self.push_if_long_enough(&mut chunks, content.trim(), Some((start, end)));

            if end >= total {
                break;
            }
            start = end.saturating_sub(self.overlap_size).max(start + 1);
        }

        chunks
    }

    /// Pull `end` back to the last sentence terminator, or failing that the
    /// last whitespace, that lies past the middle of the window.
    fn find_break(&self, chars: &[char], start: usize, end: usize) -> usize {
        let midpoint = start + self.target_size / 2;
        let candidates = (midpoint + 1)..end;

        if let Some(i) = candidates.clone().rev().find(|&i| matches!(chars[i], '.' | '!' | '?')) {
            return i + 1;
        }
        if let Some(i) = candidates.rev().find(|&i| chars[i].is_whitespace()) {
            return i + 1;
        }
        end
    }

    fn chunk_sentences(&self, text: &str) -> Vec<Chunk> {
        let mut pieces = Vec::new();
        for sentence in split_sentences(text) {
            if char_len(&sentence) > self.target_size {
                pieces.extend(pack_words(&sentence, self.target_size));
            } else {
                pieces.push(sentence);
            }
        }

        let mut packed = Vec::new();
        let mut buffer = String::new();

        for piece in pieces {
            let piece_len = char_len(&piece);
            if !buffer.is_empty() && char_len(&buffer) + 1 + piece_len > self.target_size {
                let seed = self.overlap_tail(&buffer, piece_len);
                packed.push(std::mem::replace(&mut buffer, seed));
            }
            if !buffer.is_empty() {
                buffer.push(' ');
            }
            buffer.push_str(&piece);
        }
        if !buffer.is_empty() {
            packed.push(buffer);
        }

        let mut chunks = Vec::new();
        for content in packed {
            self.push_if_long_enough(&mut chunks, content.trim(), None);
        }
        chunks
    }

    /// Trailing words of a flushed chunk, shortened until the next chunk
    /// (overlap + next piece) fits in the target size.
    fn overlap_tail(&self, flushed: &str, next_len: usize) -> String {
        let words: Vec<&str> = flushed.split_whitespace().collect();
        let mut take = self.overlap_words.min(words.len());

        while take > 0 {
            let tail = words[words.len() - take..].join(" ");
            if char_len(&tail) + 1 + next_len <= self.target_size {
                return tail;
            }
            take -= 1;
        }
        String::new()
    }

    fn push_if_long_enough(&self, chunks: &mut Vec<Chunk>, content: &str, span: Option<(usize, usize)>) {
        if !content.is_empty() && char_len(content) >= self.min_chunk_length {
            chunks.push(Chunk::new(chunks.len(), content, span));
        }
    }
}

/// Chunk `text` in window mode and return the chunk contents.
pub fn chunk_text(text: &str, target_size: usize, overlap_size: usize) -> Result<Vec<String>> {
    let chunker = TextChunker::new(target_size, overlap_size)?;
    Ok(chunker.chunk(text).into_iter().map(|c| c.content).collect())
}

/// Sentences with their terminators, internal whitespace collapsed.
fn split_sentences(text: &str) -> Vec<String> {
    static SENTENCE: OnceLock<Regex> = OnceLock::new();
    let sentence = SENTENCE.get_or_init(|| Regex::new(r"[^.!?]+[.!?]*").expect("Invalid sentence regex"));

    sentence
        .find_iter(text)
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| s.chars().any(|c| !matches!(c, '.' | '!' | '?')))
        .collect()
}

/// Greedily pack words into pieces of at most `limit` characters. A single
/// word longer than `limit` becomes its own piece.
fn pack_words(sentence: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in sentence.split_whitespace() {
        if !current.is_empty() && char_len(&current) + 1 + char_len(word) > limit {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 400 distinct five-character words ("w000 " .. "w399 "), 2,000 characters.
    fn numbered_words() -> String {
        (0..400).map(|i| format!("w{:03} ", i)).collect()
    }

    #[test]
    fn test_two_thousand_characters_default_sizes() {
        let text = numbered_words();
        assert_eq!(text.chars().count(), 2000);

        let chunks = chunk_text(&text, 700, 200).unwrap();

        assert!((3..=4).contains(&chunks.len()), "got {} chunks", chunks.len());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 700);
        }
        assert!(chunks[0].starts_with("w000"));
        assert!(chunks[0].ends_with("w139"));
        assert!(chunks[1].starts_with("w100"));
        assert!(chunks[0].contains("w100 w101"));
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let chunks = chunk_text(&numbered_words(), 700, 200).unwrap();

        for pair in chunks.windows(2) {
            let first_word = pair[1].split_whitespace().next().unwrap();
            assert!(pair[0].contains(first_word), "no overlap between {:?} and {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_prefers_sentence_terminator() {
        let text = format!("{}. {}", "a".repeat(70), "b ".repeat(40));
        let chunker = TextChunker::new(100, 10).unwrap().with_min_chunk_length(1);

        let chunks = chunker.chunk(&text);
        assert_eq!(chunks[0].content, format!("{}.", "a".repeat(70)));
        assert_eq!(chunks[0].span, Some((0, 71)));
    }

    #[test]
    fn test_ignores_terminator_before_midpoint() {
        let text = format!("{}. {}", "a".repeat(20), "bbbb ".repeat(30));
        let chunker = TextChunker::new(100, 0).unwrap().with_min_chunk_length(1);

        let chunks = chunker.chunk(&text);
        // The period at index 20 is before the midpoint, so whitespace wins.
        assert!(chunks[0].content.len() > 50);
        assert!(chunks[0].content.ends_with("bbbb"));
    }

    #[test]
    fn test_no_boundary_uses_raw_window() {
        let text = "x".repeat(250);
        let chunker = TextChunker::new(100, 20).unwrap();

        let chunks = chunker.chunk(&text);
        assert_eq!(chunks[0].span, Some((0, 100)));
        assert_eq!(chunks[1].span, Some((80, 180)));
        assert_eq!(chunks[2].span, Some((160, 250)));
    }

    #[test]
    fn test_overlap_not_smaller_than_target_rejected() {
        for overlap in [10, 50] {
            let err = TextChunker::new(10, overlap).unwrap_err();
            assert!(matches!(err, ResumeAnalyzerError::InvalidConfiguration(_)));
        }
        assert!(TextChunker::new(10, 9).is_ok());
    }

    #[test]
    fn test_short_break_windows_still_advance() {
        let text = "a b c d e f g h i j k l m n o p q r s t u v w x y z";
        let chunker = TextChunker::new(10, 8).unwrap().with_min_chunk_length(1);

        let chunks = chunker.chunk(text);
        let spans: Vec<(usize, usize)> = chunks.iter().filter_map(|c| c.span).collect();
        assert_eq!(spans.last().map(|s| s.1), Some(text.len()));
        assert!(spans.windows(2).all(|pair| pair[1].0 > pair[0].0));
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = chunk_text("  Rust developer.  ", 700, 200).unwrap();
        assert_eq!(chunks, vec!["Rust developer.".to_string()]);
    }

    #[test]
    fn test_empty_text_gives_no_chunks() {
        assert!(chunk_text("", 700, 200).unwrap().is_empty());
        assert!(chunk_text(" \n\t ", 700, 200).unwrap().is_empty());
    }

    #[test]
    fn test_zero_target_size_rejected() {
        let err = chunk_text("anything", 0, 0).unwrap_err();
        assert!(matches!(err, ResumeAnalyzerError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_short_chunks_discarded() {
        let text = format!("{} {}", "a".repeat(95), "b".repeat(10));
        let chunker = TextChunker::new(100, 0).unwrap().with_min_chunk_length(50);

        let chunks = chunker.chunk(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].position, 0);
        assert_eq!(chunks[0].content, "a".repeat(95));
    }

    #[test]
    fn test_every_candidate_below_minimum() {
        let text = "ab ".repeat(40);
        let chunker = TextChunker::new(20, 0).unwrap().with_min_chunk_length(20);

        assert!(chunker.chunk(&text).is_empty());
    }

    #[test]
    fn test_sentence_mode_packs_and_overlaps() {
        let text = "Built data pipelines in Python. Led a team of five engineers. \
                    Migrated services to AWS Lambda. Cut hosting costs by forty percent. \
                    Mentored junior developers weekly.";
        let chunker = TextChunker::new(70, 20)
            .unwrap()
            .with_mode(ChunkingMode::Sentence)
            .with_min_chunk_length(1);

        let chunks = chunker.chunk(text);
        assert!(chunks.len() >= 3);
        assert_eq!(chunks[0].content, "Built data pipelines in Python. Led a team of five engineers.");
        assert!(chunks[1].content.starts_with("five engineers. Migrated"));
        for chunk in &chunks {
            assert!(chunk.len() <= 70, "{:?}", chunk.content);
            assert_eq!(chunk.span, None);
        }
    }

    #[test]
    fn test_sentence_mode_splits_oversized_sentence() {
        let sentence = "word ".repeat(50);
        let chunker = TextChunker::new(40, 0)
            .unwrap()
            .with_mode(ChunkingMode::Sentence)
            .with_min_chunk_length(1);

        let chunks = chunker.chunk(&sentence);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.len() <= 40));
    }

    #[test]
    fn test_sentence_mode_zero_overlap_words() {
        let text = "First sentence is here. Second sentence is here. Third sentence is here.";
        let chunker = TextChunker::new(30, 20)
            .unwrap()
            .with_mode(ChunkingMode::Sentence)
            .with_min_chunk_length(1)
            .with_overlap_words(0);

        let chunks: Vec<String> = chunker.chunk(text).into_iter().map(|c| c.content).collect();
        assert_eq!(
            chunks,
            vec!["First sentence is here.", "Second sentence is here.", "Third sentence is here."]
        );
    }

    #[test]
    fn test_from_config() {
        let config = ProcessingConfig {
            chunking_mode: ChunkingMode::Sentence,
            overlap_words: Some(3),
            ..ProcessingConfig::default()
        };

        let chunker = TextChunker::from_config(&config).unwrap();
        assert_eq!(chunker.mode(), ChunkingMode::Sentence);
        assert_eq!(chunker.target_size(), 700);
        assert_eq!(chunker.overlap_words, 3);
    }

    #[test]
    fn test_idempotent() {
        let text = numbered_words();
        assert_eq!(chunk_text(&text, 300, 50).unwrap(), chunk_text(&text, 300, 50).unwrap());
    }
}
