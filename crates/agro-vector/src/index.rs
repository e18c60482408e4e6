//! In-memory vector index with brute-force cosine similarity search.
//!
//! The knowledge base is a handful of passages, so O(n) search is fine.
//! Indexes are filled once while building and only read afterwards.

use serde::Serialize;

use agro_core::types::{Crop, KnowledgeEntry};

/// A single hit returned from a vector search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Stored passage text.
    pub text: String,
    /// Source identifier of the passage.
    pub source_tag: String,
    /// Crop the passage belongs to.
    pub crop: Crop,
    /// Cosine similarity score (-1.0 to 1.0).
    pub score: f64,
}

/// An entry stored in the vector index.
#[derive(Debug, Clone)]
struct VectorEntry {
    embedding: Vec<f32>,
    passage: KnowledgeEntry,
}

/// In-memory vector index using brute-force cosine similarity.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<VectorEntry>,
}

impl VectorIndex {
    /// Create a new empty vector index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a passage with its embedding.
    pub fn insert(&mut self, embedding: Vec<f32>, passage: KnowledgeEntry) {
        self.entries.push(VectorEntry { embedding, passage });
    }

    /// Search for the k nearest neighbors to the query vector by cosine similarity.
    ///
    /// Returns results sorted by descending score. Ties keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        if k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|entry| SearchHit {
                text: entry.passage.text.clone(),
                source_tag: entry.passage.source_tag.clone(),
                crop: entry.passage.crop,
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    /// Return the number of vectors currently stored in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true if the index contains no vectors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude or the lengths differ.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();

    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
