//! TF-IDF vector space over a set of chunks
//!
//! An index is built in one pass from a chunk set and never mutated
//! afterwards. Rebuilding means constructing a new [`TfIdfIndex`];
//! [`VectorService`] swaps the published index in one step so readers always
//! see a complete vocabulary together with its vectors.
//!
//! Weights are `tf * idf` with
//! - `tf  = occurrences of the term / tokens in the text` (no log scaling)
//! - `idf = ln(total_chunks / (chunks_containing_term + 1))`
//!
//! The IDF can be negative (every term of a single-chunk index has
//! `ln(1/2)`); that is kept as is.

use crate::processing::tokenizer::{TokenStream, Tokenizer};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Distinct terms of an index, numbered in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    index: HashMap<String, usize>,
    terms: Vec<String>,
}

impl Vocabulary {
    fn insert(&mut self, term: &str) -> usize {
        if let Some(&idx) = self.index.get(term) {
            return idx;
        }
        let idx = self.terms.len();
        self.index.insert(term.to_string(), idx);
        self.terms.push(term.to_string());
        idx
    }

    pub fn get(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[derive(Debug)]
pub struct TfIdfIndex {
    tokenizer: Tokenizer,
    chunks: Vec<String>,
    vocabulary: Vocabulary,
    document_frequencies: Vec<usize>,
    idf_cache: Vec<OnceLock<f64>>,
    vectors: Vec<Vec<f64>>,
}

impl TfIdfIndex {
    pub fn empty(tokenizer: Tokenizer) -> Self {
        Self::build::<&str>(&[], tokenizer)
    }

    pub fn build<S: AsRef<str>>(chunks: &[S], tokenizer: Tokenizer) -> Self {
        let streams: Vec<TokenStream> = chunks.iter().map(|c| tokenizer.tokenize(c.as_ref())).collect();

        let mut vocabulary = Vocabulary::default();
        let mut document_frequencies: Vec<usize> = Vec::new();
        let mut chunk_counts: Vec<HashMap<usize, usize>> = Vec::with_capacity(streams.len());

        for stream in &streams {
            let mut counts: HashMap<usize, usize> = HashMap::new();
            for term in stream.iter() {
                let idx = vocabulary.insert(term);
                if idx == document_frequencies.len() {
                    document_frequencies.push(0);
                }
                *counts.entry(idx).or_insert(0) += 1;
            }
            for &idx in counts.keys() {
                document_frequencies[idx] += 1;
            }
            chunk_counts.push(counts);
        }

        let mut index = Self {
            tokenizer,
            chunks: chunks.iter().map(|c| c.as_ref().to_string()).collect(),
            idf_cache: (0..vocabulary.len()).map(|_| OnceLock::new()).collect(),
            vocabulary,
            document_frequencies,
            vectors: Vec::new(),
        };

        let vectors = streams
            .iter()
            .zip(&chunk_counts)
            .map(|(stream, counts)| index.weigh(counts, stream.len()))
            .collect();
        index.vectors = vectors;

        debug!(
            "Built TF-IDF index: {} chunks, {} terms",
            index.chunks.len(),
            index.vocabulary.len()
        );
        index
    }

    /// Project arbitrary text into this index's vocabulary. Terms the index
    /// has never seen contribute nothing.
    pub fn vectorize(&self, text: &str) -> Vec<f64> {
        let stream = self.tokenizer.tokenize(text);
        let mut counts: HashMap<usize, usize> = HashMap::new();
        let mut total = 0;

        for term in stream.iter() {
            total += 1;
            if let Some(idx) = self.vocabulary.get(term) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }

        self.weigh(&counts, total)
    }

    fn weigh(&self, counts: &HashMap<usize, usize>, total_tokens: usize) -> Vec<f64> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        if total_tokens == 0 {
            return vector;
        }

        for (&idx, &count) in counts {
            let tf = count as f64 / total_tokens as f64;
            vector[idx] = tf * self.idf_at(idx);
        }
        vector
    }

    fn idf_at(&self, idx: usize) -> f64 {
        *self.idf_cache[idx].get_or_init(|| {
            let total = self.chunks.len() as f64;
            let containing = self.document_frequencies[idx] as f64;
            (total / (containing + 1.0)).ln()
        })
    }

    /// Inverse document frequency of a term, if it is in the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|idx| self.idf_at(idx))
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.vocabulary
            .get(term)
            .map(|idx| self.document_frequencies[idx])
            .unwrap_or(0)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn vectors(&self) -> &[Vec<f64>] {
        &self.vectors
    }

    pub fn chunk_vector(&self, position: usize) -> Option<&[f64]> {
        self.vectors.get(position).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Owns the currently published index for one analysis session.
///
/// `build_index` takes `&mut self`, so there is exactly one writer; readers
/// that need to outlive a rebuild take a [`VectorService::snapshot`].
#[derive(Debug, Clone)]
pub struct VectorService {
    tokenizer: Tokenizer,
    index: Arc<TfIdfIndex>,
}

impl Default for VectorService {
    fn default() -> Self {
        Self::new(Tokenizer::default())
    }
}

impl VectorService {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            index: Arc::new(TfIdfIndex::empty(tokenizer)),
        }
    }

    /// Build a fresh index from `chunks` and publish it, replacing any prior one.
    pub fn build_index<S: AsRef<str>>(&mut self, chunks: &[S]) -> Arc<TfIdfIndex> {
        let index = Arc::new(TfIdfIndex::build(chunks, self.tokenizer));
        info!(
            "Indexed {} chunks ({} vocabulary terms)",
            index.len(),
            index.vocabulary().len()
        );
        self.index = Arc::clone(&index);
        index
    }

    pub fn index(&self) -> &TfIdfIndex {
        &self.index
    }

    pub fn snapshot(&self) -> Arc<TfIdfIndex> {
        Arc::clone(&self.index)
    }

    pub fn vectorize(&self, text: &str) -> Vec<f64> {
        self.index.vectorize(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_vocabulary_in_first_seen_order() {
        let index = TfIdfIndex::build(&["Rust and Python", "python GO java"], Tokenizer::default());

        assert_eq!(index.vocabulary().terms(), &["rust", "and", "python", "java"]);
        assert_eq!(index.vocabulary().get("python"), Some(2));
        assert!(!index.vocabulary().contains("go"));
    }

    #[test]
    fn test_idf_formula() {
        let index = TfIdfIndex::build(
            &["rust python", "rust java", "rust kotlin", "scala"],
            Tokenizer::default(),
        );

        assert_eq!(index.document_frequency("rust"), 3);
        assert!(close(index.idf("rust").unwrap(), (4.0f64 / 4.0).ln()));
        assert!(close(index.idf("java").unwrap(), (4.0f64 / 2.0).ln()));
        assert_eq!(index.idf("haskell"), None);
    }

    #[test]
    fn test_single_chunk_idf_is_negative() {
        let index = TfIdfIndex::build(&["kubernetes docker helm"], Tokenizer::default());

        let idf = index.idf("docker").unwrap();
        assert!(close(idf, 0.5f64.ln()));
        assert!(idf < 0.0);
        assert!(index.chunk_vector(0).unwrap().iter().all(|w| *w < 0.0));
    }

    #[test]
    fn test_chunk_vector_weights() {
        let index = TfIdfIndex::build(&["aws aws lambda", "java spring", "react redux"], Tokenizer::default());

        let vector = index.chunk_vector(0).unwrap();
        assert_eq!(vector.len(), index.vocabulary().len());

        let idf = (3.0f64 / 2.0).ln();
        assert!(close(vector[0], 2.0 / 3.0 * idf));
        assert!(close(vector[1], 1.0 / 3.0 * idf));
        assert!(vector[2..].iter().all(|w| *w == 0.0));
    }

    #[test]
    fn test_query_terms_outside_vocabulary_ignored() {
        let index = TfIdfIndex::build(&["aws lambda", "java spring", "react redux"], Tokenizer::default());

        let vector = index.vectorize("AWS cloud skills");
        let idf = (3.0f64 / 2.0).ln();
        // tf divides by every query token, including unseen ones.
        assert!(close(vector[0], idf / 3.0));
        assert_eq!(vector.iter().filter(|w| **w != 0.0).count(), 1);
        assert_eq!(index.vocabulary().len(), 6);
    }

    #[test]
    fn test_empty_index() {
        let index = TfIdfIndex::build::<&str>(&[], Tokenizer::default());

        assert!(index.is_empty());
        assert!(index.vocabulary().is_empty());
        assert!(index.vectorize("anything at all").is_empty());
    }

    #[test]
    fn test_empty_query_is_zero_vector() {
        let index = TfIdfIndex::build(&["rust python", "java"], Tokenizer::default());
        let vector = index.vectorize("");

        assert_eq!(vector.len(), 3);
        assert!(vector.iter().all(|w| *w == 0.0));
    }

    #[test]
    fn test_rebuild_replaces_vocabulary() {
        let mut service = VectorService::default();
        let first = service.build_index(&["rust python", "java spring"]);
        assert!(first.vocabulary().contains("rust"));

        service.build_index(&["golang docker"]);
        assert!(!service.index().vocabulary().contains("rust"));
        assert!(service.index().vocabulary().contains("golang"));
        assert_eq!(service.vectorize("rust").len(), 2);

        // The earlier snapshot is unaffected by the rebuild.
        assert!(first.vocabulary().contains("rust"));
        assert_eq!(first.len(), 2);
    }
}
