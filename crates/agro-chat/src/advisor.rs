//! Crop advisor: the interaction handler.
//!
//! Handlers take the current `SessionState` by reference and hand back the
//! next one. Nothing is stored here, so a failed interaction leaves the
//! caller's state as it was.

use std::sync::Arc;

use tracing::{debug, info};

use agro_core::config::{AnswerMode, ChatConfig, TranscriptOrder};
use agro_core::types::CropSelection;
use agro_vector::CropIndexSet;

use crate::error::ChatError;
use crate::llm::LlmClient;
use crate::policy::{Answer, AnswerPolicy, ExtractivePolicy, GenerativePolicy};
use crate::prompt::PromptTemplate;
use crate::session::SessionState;

/// Interaction settings taken from `[chat]`.
#[derive(Debug, Clone)]
pub struct AdvisorSettings {
    pub greeting: Option<String>,
    pub max_question_chars: usize,
    pub transcript_order: TranscriptOrder,
}

impl From<&ChatConfig> for AdvisorSettings {
    fn from(config: &ChatConfig) -> Self {
        Self {
            greeting: Some(config.greeting.trim().to_string()).filter(|g| !g.is_empty()),
            max_question_chars: config.max_question_chars,
            transcript_order: config.transcript_order,
        }
    }
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self::from(&ChatConfig::default())
    }
}

/// Result of one `ask`.
#[derive(Debug, Clone)]
pub struct Interaction {
    /// The session after the interaction.
    pub state: SessionState,
    /// `None` when the question was blank and nothing happened.
    pub answer: Option<Answer>,
}

/// Build the policy for the configured mode.
///
/// The generative mode needs an LLM client; the extractive mode ignores it.
pub fn policy_for(
    config: &ChatConfig,
    top_k: usize,
    llm: Option<Arc<dyn LlmClient>>,
) -> Result<Arc<dyn AnswerPolicy>, ChatError> {
    match config.mode {
        AnswerMode::Extractive => Ok(Arc::new(ExtractivePolicy::new(&config.no_information))),
        AnswerMode::Generative => {
            let llm = llm.ok_or_else(|| {
                ChatError::Llm("generative mode requires an LLM client".to_string())
            })?;
            Ok(Arc::new(GenerativePolicy::new(
                llm,
                PromptTemplate::default(),
                top_k,
                &config.no_information,
            )))
        }
    }
}

/// Owns the indexes and the answer policy; handles crop selection and questions.
pub struct CropAdvisor {
    indexes: CropIndexSet,
    policy: Arc<dyn AnswerPolicy>,
    settings: AdvisorSettings,
}

impl CropAdvisor {
    pub fn new(indexes: CropIndexSet, policy: Arc<dyn AnswerPolicy>, settings: AdvisorSettings) -> Self {
        Self {
            indexes,
            policy,
            settings,
        }
    }

    pub fn settings(&self) -> &AdvisorSettings {
        &self.settings
    }

    pub fn indexes(&self) -> &CropIndexSet {
        &self.indexes
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Attach a crop (or all crops) to the session.
    pub fn select_crop(&self, state: &SessionState, selection: CropSelection) -> SessionState {
        debug!(crop = %selection, "Crop selected");
        SessionState {
            selected_crop: Some(selection),
            ..state.clone()
        }
    }

    /// Answer a question against the session's selected crop.
    ///
    /// A blank question returns the state unchanged with no answer.
    pub async fn ask(&self, state: &SessionState, question: &str) -> Result<Interaction, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(Interaction {
                state: state.clone(),
                answer: None,
            });
        }
        if question.chars().count() > self.settings.max_question_chars {
            return Err(ChatError::QuestionTooLong(self.settings.max_question_chars));
        }
        let selection = state.selected_crop.ok_or(ChatError::NoCropSelected)?;

        let index = self.indexes.get(selection);
        let answer = self.policy.answer(question, &index).await?;
        info!(
            crop = %selection,
            policy = self.policy.name(),
            sources = answer.sources.len(),
            "Question answered"
        );

        let mut next = state.clone();
        next.record_exchange(question, &answer.text, self.settings.greeting.as_deref());
        Ok(Interaction {
            state: next,
            answer: Some(answer),
        })
    }
}
