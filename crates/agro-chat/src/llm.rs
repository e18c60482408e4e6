//! Hosted LLM client (OpenAI-compatible chat completions).
//!
//! Groq, OpenRouter and OpenAI all accept the same request shape, so one
//! client covers them; only the base URL and model change.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use agro_core::config::LlmConfig;
use agro_core::secrets::ApiKey;

use crate::error::ChatError;

/// Text generation capability.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ChatError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// `POST {base_url}/chat/completions` with a bearer token.
pub struct ChatCompletionsClient {
    base_url: String,
    model: String,
    api_key: ApiKey,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl ChatCompletionsClient {
    /// Create a client with an explicit key and the given settings.
    pub fn new(config: &LlmConfig, api_key: ApiKey) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Llm(format!("HTTP client: {}", e)))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn generate(&self, prompt: &str) -> Result<String, ChatError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Llm(format!("request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            warn!(model = %self.model, %status, "LLM request rejected");
            return Err(ChatError::Llm(format!("API error {}: {}", status, body)));
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| ChatError::Llm(format!("response parse failed: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ChatError::Llm("response contained no choices".to_string()))?;

        debug!(model = %self.model, chars = text.len(), "LLM completion received");
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
