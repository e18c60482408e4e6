//! Error types for the question-answering flow.

use agro_core::error::AgroError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("question exceeds maximum length of {0} characters")]
    QuestionTooLong(usize),
    #[error("no crop selected")]
    NoCropSelected,
    #[error("invalid prompt template: {0}")]
    Template(String),
    #[error("retrieval error: {0}")]
    Retrieval(String),
    #[error("LLM error: {0}")]
    Llm(String),
}

impl From<AgroError> for ChatError {
    fn from(err: AgroError) -> Self {
        ChatError::Retrieval(err.to_string())
    }
}
