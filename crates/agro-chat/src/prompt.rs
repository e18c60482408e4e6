//! Prompt template with `{context}` and `{question}` slots.

use crate::error::ChatError;

/// The retrieval-augmented prompt used unless configured otherwise.
pub const DEFAULT_TEMPLATE: &str = "
Use the following pieces of context to answer the question.
If you don't know the answer from the context, say \"I don't know.\"

Context:
{context}

Question:
{question}

Answer:
";

const CONTEXT_SLOT: &str = "{context}";
const QUESTION_SLOT: &str = "{question}";

/// A prompt template holding exactly the two named slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Validate and wrap a template. Both slots must be present.
    pub fn new(template: impl Into<String>) -> Result<Self, ChatError> {
        let template = template.into();
        for slot in [CONTEXT_SLOT, QUESTION_SLOT] {
            if !template.contains(slot) {
                return Err(ChatError::Template(format!("missing {}", slot)));
            }
        }
        Ok(Self { template })
    }

    /// Fill the slots.
    ///
    /// The question slot is substituted first so that a `{context}` typed by
    /// the user is not expanded.
    pub fn render(&self, context: &str, question: &str) -> String {
        let (head, tail) = match self.template.find(QUESTION_SLOT) {
            Some(pos) => self.template.split_at(pos),
            None => (self.template.as_str(), ""),
        };
        let tail = tail.strip_prefix(QUESTION_SLOT).unwrap_or(tail);
        format!(
            "{}{}{}",
            head.replace(CONTEXT_SLOT, context),
            question,
            tail.replace(CONTEXT_SLOT, context)
        )
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_render() {
        let prompt = PromptTemplate::default().render("Yam is a staple.", "Is yam a staple?");
        assert!(prompt.contains("Context:\nYam is a staple.\n"));
        assert!(prompt.contains("Question:\nIs yam a staple?\n"));
        assert!(prompt.contains("say \"I don't know.\""));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{question}"));
    }

    #[test]
    fn test_missing_slots_rejected() {
        assert!(matches!(
            PromptTemplate::new("only {context}"),
            Err(ChatError::Template(_))
        ));
        assert!(matches!(
            PromptTemplate::new("only {question}"),
            Err(ChatError::Template(_))
        ));
    }

    #[test]
    fn test_custom_template() {
        let t = PromptTemplate::new("Q: {question} | C: {context}").unwrap();
        assert_eq!(t.render("ctx", "why"), "Q: why | C: ctx");
    }

    #[test]
    fn test_question_is_not_expanded() {
        let t = PromptTemplate::new("C: {context} Q: {question}").unwrap();
        assert_eq!(t.render("facts", "what is {context}?"), "C: facts Q: what is {context}?");
    }
}
