use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AgroError, Result};

/// Top-level configuration for the crop advisor.
///
/// Loaded from `~/.agro/config.toml` by default. Every section and field has a
/// default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgroConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
}

impl AgroConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AgroConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AgroError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// HTTP port for the page and API.
    pub port: u16,
    /// Question requests accepted per second across all sessions. 0 disables the limit.
    pub max_asks_per_sec: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            port: 8501,
            max_asks_per_sec: 10,
        }
    }
}

/// Hosted LLM settings (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Model identifier, e.g. "mixtral-8x7b-32768" or "llama3-8b-8192".
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in the generated answer.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "mixtral-8x7b-32768".to_string(),
            temperature: 0.0,
            max_tokens: 512,
            timeout_secs: 60,
        }
    }
}

/// Which embedding backend builds the indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Local feature-hashing embedding, no network.
    Hashing,
    /// OpenAI-compatible `/embeddings` endpoint.
    Remote,
}

/// Embedding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    /// Vector dimensionality for the hashing backend.
    pub dimensions: usize,
    /// Remote backend base URL.
    pub base_url: String,
    /// Remote backend model name.
    pub model: String,
    /// Env var holding the remote backend key. Falls back to the LLM credential when empty.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Hashing,
            dimensions: 384,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key_env: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Passages handed to the model by the generative policy.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// How a question is turned into an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    /// Retrieve top-k passages and ask the LLM.
    Generative,
    /// Return the single nearest passage verbatim.
    Extractive,
}

/// Display convention for the transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptOrder {
    /// Oldest first.
    #[default]
    Append,
    /// Newest first.
    InsertFront,
}

/// Chat session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub mode: AnswerMode,
    pub transcript_order: TranscriptOrder,
    /// One-time greeting injected before the first answer. Empty disables it.
    pub greeting: String,
    /// Answer when retrieval finds nothing.
    pub no_information: String,
    /// Maximum question length in characters.
    pub max_question_chars: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            mode: AnswerMode::Generative,
            transcript_order: TranscriptOrder::Append,
            greeting: String::new(),
            no_information: "Sorry, I have no information on that.".to_string(),
            max_question_chars: 2000,
        }
    }
}

/// Where the LLM credential comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Name of the credential, used both as env var and secrets-file key.
    pub api_key_name: String,
    /// TOML secrets file consulted when the env var is unset.
    pub secrets_file: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            api_key_name: "GROQ_API_KEY".to_string(),
            secrets_file: ".streamlit/secrets.toml".to_string(),
        }
    }
}
