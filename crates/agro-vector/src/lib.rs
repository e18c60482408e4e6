//! Embedding services, the cosine vector index, and the crop index builder.
//!
//! Provides an embedding service trait with a local hashing implementation and
//! an HTTP client, a brute-force cosine index, a searchable passage index that
//! embeds queries with the same service, and the builder that produces one
//! index per crop plus an aggregate.

pub mod builder;
pub mod embedding;
pub mod index;
pub mod search;

pub use builder::{CropIndexSet, IndexBuilder};
pub use embedding::{DynEmbeddingService, EmbeddingService, HashingEmbedding, RemoteEmbedding};
pub use index::{SearchHit, VectorIndex};
pub use search::PassageIndex;
