//! Answer policies: how a question plus an index become an answer.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use agro_core::types::Crop;
use agro_vector::{PassageIndex, SearchHit};

use crate::error::ChatError;
use crate::llm::LlmClient;
use crate::prompt::PromptTemplate;

/// Passage that contributed to an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub source_tag: String,
    pub crop: Crop,
    pub score: f64,
}

impl From<&SearchHit> for SourceRef {
    fn from(hit: &SearchHit) -> Self {
        Self {
            source_tag: hit.source_tag.clone(),
            crop: hit.crop,
            score: hit.score,
        }
    }
}

/// An answer and the passages behind it. `sources` is empty for the fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SourceRef>,
}

impl Answer {
    fn fallback(text: &str) -> Self {
        Self {
            text: text.to_string(),
            sources: Vec::new(),
        }
    }
}

/// `answer(question, index) -> text`.
#[async_trait]
pub trait AnswerPolicy: Send + Sync {
    async fn answer(&self, question: &str, index: &PassageIndex) -> Result<Answer, ChatError>;

    /// Short name for logs and the health endpoint.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Extractive
// =============================================================================

/// Returns the single nearest stored passage verbatim.
#[derive(Debug, Clone)]
pub struct ExtractivePolicy {
    no_information: String,
}

impl ExtractivePolicy {
    pub fn new(no_information: impl Into<String>) -> Self {
        Self {
            no_information: no_information.into(),
        }
    }
}

#[async_trait]
impl AnswerPolicy for ExtractivePolicy {
    async fn answer(&self, question: &str, index: &PassageIndex) -> Result<Answer, ChatError> {
        let hits = index.search(question, 1).await?;
        match hits.first() {
            Some(hit) => {
                debug!(index = index.name(), source = %hit.source_tag, score = hit.score, "Extractive hit");
                Ok(Answer {
                    text: hit.text.clone(),
                    sources: vec![SourceRef::from(hit)],
                })
            }
            None => Ok(Answer::fallback(&self.no_information)),
        }
    }

    fn name(&self) -> &'static str {
        "extractive"
    }
}

// =============================================================================
// Generative
// =============================================================================

/// Retrieves the top-k passages and asks the LLM to answer from them.
pub struct GenerativePolicy {
    llm: Arc<dyn LlmClient>,
    template: PromptTemplate,
    top_k: usize,
    no_information: String,
}

impl GenerativePolicy {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        template: PromptTemplate,
        top_k: usize,
        no_information: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            template,
            top_k: top_k.max(1),
            no_information: no_information.into(),
        }
    }
}

#[async_trait]
impl AnswerPolicy for GenerativePolicy {
    async fn answer(&self, question: &str, index: &PassageIndex) -> Result<Answer, ChatError> {
        let hits = index.search(question, self.top_k).await?;
        if hits.is_empty() {
            debug!(index = index.name(), "No passages retrieved; skipping LLM call");
            return Ok(Answer::fallback(&self.no_information));
        }

        let context = hits
            .iter()
            .map(|h| h.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = self.template.render(&context, question);

        info!(index = index.name(), model = self.llm.model(), passages = hits.len(), "Generating answer");
        let text = self.llm.generate(&prompt).await?;

        Ok(Answer {
            text: text.trim().to_string(),
            sources: hits.iter().map(SourceRef::from).collect(),
        })
    }

    fn name(&self) -> &'static str {
        "generative"
    }
}
