//! Startup wiring: credential, embedder, indexes, policy, advisor.
//!
//! The credential check runs first. In generative mode a missing credential
//! stops startup before the knowledge base is embedded.

use std::sync::Arc;
use std::time::Duration;

use agro_chat::{policy_for, AdvisorSettings, ChatCompletionsClient, ChatError, CropAdvisor, LlmClient};
use agro_core::config::{AgroConfig, AnswerMode, EmbeddingBackend};
use agro_core::error::AgroError;
use agro_core::secrets::{self, ApiKey};
use agro_core::KnowledgeBase;
use agro_vector::{DynEmbeddingService, HashingEmbedding, IndexBuilder, RemoteEmbedding};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Core(#[from] AgroError),
    #[error(transparent)]
    Chat(#[from] ChatError),
}

/// Credentials found in the environment or the secrets file.
#[derive(Debug, Default)]
pub struct Credentials {
    pub llm: Option<ApiKey>,
    pub embedding: Option<ApiKey>,
}

impl Credentials {
    /// Look up both credentials with the given env lookup.
    pub fn resolve_with<F>(config: &AgroConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm = secrets::resolve_with(&config.secrets, &env);
        let embedding = match config.embedding.api_key_env.trim() {
            "" => llm.clone(),
            name => env(name)
                .map(ApiKey::new)
                .filter(|k| !k.expose().is_empty()),
        };
        Self { llm, embedding }
    }

    pub fn resolve(config: &AgroConfig) -> Self {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }
}

/// Build the LLM client, or `None` in extractive mode.
///
/// Fails with `MissingCredential` when the mode needs a key and none was found.
pub fn llm_client(
    config: &AgroConfig,
    credentials: &Credentials,
) -> Result<Option<Arc<dyn LlmClient>>, StartupError> {
    if config.chat.mode == AnswerMode::Extractive {
        return Ok(None);
    }
    let key = credentials
        .llm
        .clone()
        .ok_or_else(|| AgroError::MissingCredential {
            name: config.secrets.api_key_name.clone(),
        })?;
    let client = ChatCompletionsClient::new(&config.llm, key)?;
    tracing::info!(model = %config.llm.model, base_url = %config.llm.base_url, "LLM client ready");
    Ok(Some(Arc::new(client)))
}

/// Build the configured embedding backend.
pub fn embedder(
    config: &AgroConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn DynEmbeddingService>, StartupError> {
    let cfg = &config.embedding;
    match cfg.backend {
        EmbeddingBackend::Hashing => Ok(Arc::new(HashingEmbedding::new(cfg.dimensions))),
        EmbeddingBackend::Remote => {
            let name = match cfg.api_key_env.trim() {
                "" => config.secrets.api_key_name.clone(),
                name => name.to_string(),
            };
            let key = credentials
                .embedding
                .clone()
                .ok_or(AgroError::MissingCredential { name })?;
            let remote = RemoteEmbedding::new(
                &cfg.base_url,
                &cfg.model,
                key,
                cfg.dimensions,
                Duration::from_secs(cfg.timeout_secs),
            )?;
            Ok(Arc::new(remote))
        }
    }
}

/// Assemble the advisor from already-built collaborators.
///
/// The LLM client is resolved before any passage is embedded.
pub async fn build_advisor(
    config: &AgroConfig,
    credentials: &Credentials,
    embedder: Arc<dyn DynEmbeddingService>,
) -> Result<CropAdvisor, StartupError> {
    let llm = llm_client(config, credentials)?;

    let kb = KnowledgeBase::load();
    let indexes = IndexBuilder::new_dyn(embedder).build(&kb).await?;
    for (selection, size) in indexes.sizes() {
        tracing::debug!(crop = %selection, passages = size, "Index ready");
    }

    let policy = policy_for(&config.chat, config.retrieval.top_k, llm)?;
    tracing::info!(policy = policy.name(), "Answer policy selected");

    Ok(CropAdvisor::new(
        indexes,
        policy,
        AdvisorSettings::from(&config.chat),
    ))
}

/// Resolve credentials, pick the embedder and build the advisor.
pub async fn start(config: &AgroConfig) -> Result<CropAdvisor, StartupError> {
    let credentials = Credentials::resolve(config);
    let embedder = embedder(config, &credentials)?;
    build_advisor(config, &credentials, embedder).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use agro_vector::EmbeddingService;

    /// Hashing embedding that counts calls.
    struct CountingEmbedding {
        inner: HashingEmbedding,
        calls: Arc<AtomicUsize>,
    }

    impl EmbeddingService for CountingEmbedding {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, AgroError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed(text).await
        }

        fn dimensions(&self) -> usize {
            EmbeddingService::dimensions(&self.inner)
        }
    }

    fn counting() -> (Arc<dyn DynEmbeddingService>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let embedder: Arc<dyn DynEmbeddingService> = Arc::new(CountingEmbedding {
            inner: HashingEmbedding::default(),
            calls: Arc::clone(&calls),
        });
        (embedder, calls)
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn config_without_secrets_file() -> AgroConfig {
        let mut config = AgroConfig::default();
        config.secrets.secrets_file = "/nonexistent/agro/secrets.toml".to_string();
        config
    }

    #[tokio::test]
    async fn test_missing_credential_halts_before_indexing() {
        let config = config_without_secrets_file();
        let credentials = Credentials::resolve_with(&config, env_of(&[]));
        let (embedder, calls) = counting();

        let err = build_advisor(&config, &credentials, embedder).await.err().unwrap();
        match err {
            StartupError::Core(AgroError::MissingCredential { name }) => {
                assert_eq!(name, "GROQ_API_KEY")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_credential_counts_as_missing() {
        let config = config_without_secrets_file();
        let credentials = Credentials::resolve_with(&config, env_of(&[("GROQ_API_KEY", "   ")]));
        assert!(credentials.llm.is_none());
        let (embedder, calls) = counting();
        assert!(build_advisor(&config, &credentials, embedder).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generative_with_credential_builds() {
        let config = config_without_secrets_file();
        let credentials = Credentials::resolve_with(&config, env_of(&[("GROQ_API_KEY", "gsk_test")]));
        let (embedder, calls) = counting();

        let advisor = build_advisor(&config, &credentials, embedder).await.unwrap();
        assert_eq!(advisor.policy_name(), "generative");
        // Each passage is embedded exactly once.
        assert_eq!(calls.load(Ordering::SeqCst), KnowledgeBase::load().len());
    }

    #[tokio::test]
    async fn test_extractive_needs_no_credential() {
        let mut config = config_without_secrets_file();
        config.chat.mode = AnswerMode::Extractive;
        let credentials = Credentials::resolve_with(&config, env_of(&[]));
        let (embedder, _) = counting();

        let advisor = build_advisor(&config, &credentials, embedder).await.unwrap();
        assert_eq!(advisor.policy_name(), "extractive");
    }

    #[test]
    fn test_remote_embedding_key_resolution() {
        let mut config = config_without_secrets_file();
        config.embedding.backend = EmbeddingBackend::Remote;

        // Falls back to the LLM credential.
        let creds = Credentials::resolve_with(&config, env_of(&[("GROQ_API_KEY", "gsk")]));
        assert_eq!(creds.embedding.as_ref().map(ApiKey::expose), Some("gsk"));
        assert!(embedder(&config, &creds).is_ok());

        // A dedicated variable wins and is required once configured.
        config.embedding.api_key_env = "EMBED_KEY".to_string();
        let creds = Credentials::resolve_with(&config, env_of(&[("GROQ_API_KEY", "gsk")]));
        let err = embedder(&config, &creds).err().unwrap();
        assert!(err.to_string().contains("EMBED_KEY"));

        let creds = Credentials::resolve_with(&config, env_of(&[("EMBED_KEY", "sk-embed")]));
        assert_eq!(creds.embedding.as_ref().map(ApiKey::expose), Some("sk-embed"));
    }

    #[test]
    fn test_hashing_embedder_needs_no_key() {
        let config = config_without_secrets_file();
        assert!(embedder(&config, &Credentials::default()).is_ok());
    }
}
