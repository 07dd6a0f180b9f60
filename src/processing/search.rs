//! Cosine-similarity ranking of indexed chunks against a query

use crate::processing::vector_space::{TfIdfIndex, VectorService};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Position of the chunk in the index.
    pub position: usize,
    pub content: String,
    pub score: f64,
}

/// `dot(a, b) / (|a| * |b|)`, or exactly `0.0` when either norm is zero.
///
/// Both vectors are expected to come from the same index and therefore have
/// the same length; any surplus entries of the longer one are ignored.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "vectors from different vocabularies");

    let dot_product: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot_product / (norm_a * norm_b);
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

impl TfIdfIndex {
    /// Similarity of `query` to every chunk, in index order.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let query_vector = self.vectorize(query);
        self.vectors()
            .iter()
            .map(|vector| cosine_similarity(&query_vector, vector))
            .collect()
    }

    /// Up to `k` chunks ranked by descending similarity. Ties keep index
    /// order, and `k` saturates at the number of indexed chunks.
    pub fn search(&self, query: &str, k: usize) -> Vec<SearchHit> {
        if self.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<(usize, f64)> = self.scores(query).into_iter().enumerate().collect();
        // sort_by is stable, which keeps earlier chunks first on equal scores.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(k.min(self.len()));

        if let Some((position, score)) = ranked.first() {
            debug!("Top hit for {:?}: chunk {} ({:.4})", query, position, score);
        }

        ranked
            .into_iter()
            .map(|(position, score)| SearchHit {
                position,
                content: self.chunks()[position].clone(),
                score,
            })
            .collect()
    }
}

impl VectorService {
    pub fn search(&self, query: &str, k: usize) -> Vec<SearchHit> {
        self.index().search(query, k)
    }
}
