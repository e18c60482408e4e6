//! Question answering for the crop advisor.
//!
//! Provides the prompt template, the hosted LLM client, the extractive and
//! generative answer policies, per-session transcript state, and the
//! `CropAdvisor` that ties a question to the selected crop's index.

pub mod advisor;
pub mod error;
pub mod llm;
pub mod policy;
pub mod prompt;
pub mod session;

pub use advisor::{policy_for, AdvisorSettings, CropAdvisor, Interaction};
pub use error::ChatError;
pub use llm::{ChatCompletionsClient, LlmClient};
pub use policy::{Answer, AnswerPolicy, ExtractivePolicy, GenerativePolicy, SourceRef};
pub use prompt::PromptTemplate;
pub use session::{Role, SessionState, TranscriptEntry};
