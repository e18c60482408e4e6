//! Per-session state and transcript bookkeeping.
//!
//! The transcript is always stored in causal order. `TranscriptOrder` only
//! changes how it is iterated for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agro_core::config::TranscriptOrder;
use agro_core::types::CropSelection;

/// Who said it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

/// One line of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Everything one user session owns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub selected_crop: Option<CropSelection>,
    /// Flips to true once, when the first answer is recorded with a greeting configured.
    pub greeted: bool,
    pub transcript: Vec<TranscriptEntry>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry at the causal end.
    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        self.transcript.push(TranscriptEntry {
            role,
            text: text.into(),
            at: Utc::now(),
        });
    }

    /// Record a question/answer cycle.
    ///
    /// With a greeting configured and `greeted` still false, the greeting is
    /// inserted between the question and the answer and `greeted` flips.
    pub fn record_exchange(&mut self, question: &str, answer: &str, greeting: Option<&str>) {
        self.append(Role::User, question);
        if let Some(greeting) = greeting.filter(|g| !g.trim().is_empty()) {
            if !self.greeted {
                self.append(Role::Bot, greeting);
                self.greeted = true;
            }
        }
        self.append(Role::Bot, answer);
    }

    /// Entries in display order.
    pub fn display(&self, order: TranscriptOrder) -> Vec<&TranscriptEntry> {
        match order {
            TranscriptOrder::Append => self.transcript.iter().collect(),
            TranscriptOrder::InsertFront => self.transcript.iter().rev().collect(),
        }
    }

    /// Number of questions asked in this session.
    pub fn question_count(&self) -> usize {
        self.transcript.iter().filter(|e| e.role == Role::User).count()
    }

    /// Back to a fresh session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agro_core::types::Crop;

    const HELLO: &str = "Hello! I'm your crop advisor.";

    fn texts<'a>(entries: &[&'a TranscriptEntry]) -> Vec<&'a str> {
        entries.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn test_new_session_is_empty() {
        let state = SessionState::new();
        assert!(state.selected_crop.is_none());
        assert!(!state.greeted);
        assert!(state.transcript.is_empty());
    }

    #[test]
    fn test_record_without_greeting() {
        let mut state = SessionState::new();
        state.record_exchange("q1", "a1", None);
        assert_eq!(state.transcript.len(), 2);
        assert_eq!(state.transcript[0].role, Role::User);
        assert_eq!(state.transcript[1].role, Role::Bot);
        assert!(!state.greeted);
    }

    #[test]
    fn test_greeting_injected_once() {
        let mut state = SessionState::new();
        state.record_exchange("q1", "a1", Some(HELLO));
        assert!(state.greeted);
        state.record_exchange("q2", "a2", Some(HELLO));
        assert!(state.greeted);

        let all = state.display(TranscriptOrder::Append);
        assert_eq!(texts(&all), vec!["q1", HELLO, "a1", "q2", "a2"]);
    }

    #[test]
    fn test_blank_greeting_is_disabled() {
        let mut state = SessionState::new();
        state.record_exchange("q1", "a1", Some("  "));
        assert!(!state.greeted);
        assert_eq!(state.transcript.len(), 2);
    }

    #[test]
    fn test_insert_front_reverses_display_only() {
        let mut state = SessionState::new();
        state.record_exchange("q1", "a1", None);
        state.record_exchange("q2", "a2", None);

        let front = state.display(TranscriptOrder::InsertFront);
        assert_eq!(texts(&front), vec!["a2", "q2", "a1", "q1"]);
        assert_eq!(state.transcript[0].text, "q1");
        assert!(state.transcript[0].at <= state.transcript[3].at);
    }

    #[test]
    fn test_question_count() {
        let mut state = SessionState::new();
        state.record_exchange("q1", "a1", Some(HELLO));
        state.record_exchange("q2", "a2", Some(HELLO));
        assert_eq!(state.question_count(), 2);
    }

    #[test]
    fn test_reset() {
        let mut state = SessionState::new();
        state.selected_crop = Some(Crop::Yam.into());
        state.record_exchange("q1", "a1", Some(HELLO));
        state.reset();
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn test_serializes_roles_snake_case() {
        let mut state = SessionState::new();
        state.append(Role::Bot, "hi");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["transcript"][0]["role"], "bot");
        assert!(json["selected_crop"].is_null());
    }
}
