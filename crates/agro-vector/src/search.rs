//! Searchable passage index: embeds the query, then asks the vector index.

use std::sync::Arc;

use tracing::debug;

use agro_core::error::AgroError;

use crate::embedding::DynEmbeddingService;
use crate::index::{SearchHit, VectorIndex};

/// A built index together with the embedding service that built it.
///
/// Queries must be embedded by the same service as the passages, so the two
/// travel together.
#[derive(Clone)]
pub struct PassageIndex {
    name: String,
    index: VectorIndex,
    embedder: Arc<dyn DynEmbeddingService>,
}

impl std::fmt::Debug for PassageIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassageIndex")
            .field("name", &self.name)
            .field("len", &self.index.len())
            .finish()
    }
}

impl PassageIndex {
    pub fn new(name: impl Into<String>, index: VectorIndex, embedder: Arc<dyn DynEmbeddingService>) -> Self {
        Self {
            name: name.into(),
            index,
            embedder,
        }
    }

    /// Index name, e.g. "cassava" or "all".
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the `k` passages most similar to `query`, best first.
    ///
    /// An empty index returns no hits without calling the embedder. A query
    /// that embeds to the zero vector carries no features and matches nothing.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, AgroError> {
        if self.index.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let query_vec = self.embedder.embed_boxed(query).await?;
        if query_vec.iter().all(|v| *v == 0.0) {
            debug!(index = %self.name, "Query has no features");
            return Ok(Vec::new());
        }
        let hits = self.index.search(&query_vec, k);
        debug!(index = %self.name, k, hits = hits.len(), "Passage search");
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
