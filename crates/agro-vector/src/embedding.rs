//! Embedding service trait and implementations.
//!
//! - `HashingEmbedding` hashes word unigrams and bigrams into a fixed number of
//!   signed buckets. Local, deterministic, no model files. Default backend.
//! - `RemoteEmbedding` calls an OpenAI-compatible `/embeddings` endpoint.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use agro_core::error::AgroError;
use agro_core::secrets::ApiKey;

/// Service for generating text embeddings.
///
/// Implementations convert text into fixed-dimensional vectors. Used both
/// when building indexes and when embedding a query at search time.
pub trait EmbeddingService: Send + Sync {
    /// Generate an embedding vector for the given text.
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, AgroError>> + Send;

    /// Return the dimensionality of vectors produced by this service.
    fn dimensions(&self) -> usize;
}

/// Object-safe version of [`EmbeddingService`] for dynamic dispatch.
///
/// `EmbeddingService::embed` returns `impl Future` and is therefore not
/// object-safe. Every `EmbeddingService` gets this trait through the blanket
/// impl below, so indexes can hold an `Arc<dyn DynEmbeddingService>`.
pub trait DynEmbeddingService: Send + Sync {
    /// Generate an embedding vector for the given text (boxed future).
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>, AgroError>> + Send + 'a>>;

    /// Return the dimensionality of vectors produced by this service.
    fn dimensions(&self) -> usize;
}

impl<T: EmbeddingService> DynEmbeddingService for T {
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>, AgroError>> + Send + 'a>> {
        Box::pin(self.embed(text))
    }

    fn dimensions(&self) -> usize {
        EmbeddingService::dimensions(self)
    }
}

// ---------------------------------------------------------------------------
// HashingEmbedding
// ---------------------------------------------------------------------------

/// Bigram weight relative to a unigram.
const BIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing bag-of-words embedding.
///
/// Lowercased alphanumeric tokens and adjacent-token bigrams are hashed into
/// `dimensions` buckets; a second hash bit picks the sign so collisions tend to
/// cancel. The result is L2-normalized, so identical texts have cosine 1.0 and
/// texts sharing vocabulary score higher than unrelated ones.
#[derive(Debug, Clone)]
pub struct HashingEmbedding {
    dimensions: usize,
}

impl HashingEmbedding {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn tokens(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        let h = hasher.finish();
        let bucket = (h % self.dimensions as u64) as usize;
        let sign = if (h >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let tokens = Self::tokens(text);

        for token in &tokens {
            self.add_feature(&mut vector, token, 1.0);
        }
        for pair in tokens.windows(2) {
            self.add_feature(&mut vector, &format!("{} {}", pair[0], pair[1]), BIGRAM_WEIGHT);
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut vector {
                *val /= norm;
            }
        }
        vector
    }
}

impl Default for HashingEmbedding {
    fn default() -> Self {
        Self::new(384)
    }
}

impl EmbeddingService for HashingEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgroError> {
        if text.trim().is_empty() {
            return Err(AgroError::Embedding("Cannot embed empty text".to_string()));
        }
        Ok(self.vectorize(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// RemoteEmbedding
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

/// OpenAI-compatible `/embeddings` client.
pub struct RemoteEmbedding {
    base_url: String,
    model: String,
    api_key: ApiKey,
    dimensions: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for RemoteEmbedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEmbedding")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl RemoteEmbedding {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: ApiKey,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Self, AgroError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgroError::Embedding(format!("HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            dimensions,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }
}

impl EmbeddingService for RemoteEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgroError> {
        if text.trim().is_empty() {
            return Err(AgroError::Embedding("Cannot embed empty text".to_string()));
        }

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .json(&EmbeddingRequest {
                input: text,
                model: &self.model,
            })
            .send()
            .await
            .map_err(|e| AgroError::Embedding(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgroError::Embedding(format!(
                "request failed with status {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AgroError::Embedding(format!("response parse failed: {}", e)))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AgroError::Embedding("response contained no embeddings".to_string()))?;

        debug!(model = %self.model, dims = embedding.len(), "Remote embedding received");
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
