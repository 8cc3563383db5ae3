//! UI-agnostic session state
//!
//! The generated post lives here between interactions so that every UI
//! (the TUI, the one-shot CLI) stores and replaces it the same way.

use crate::ai::TextGenerator;
use crate::cleaner::clean_output;
use crate::generator::{failure_message, try_generate_blog};
use crate::request::GenerationRequest;

pub const EMPTY_TOPIC_WARNING: &str = "Please enter a topic first.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// The topic was blank; nothing was sent.
    EmptyTopic,
    Generated,
    /// The service call failed; the warning text is now the session content.
    Failed,
}

/// Result of the most recent generation, held until the next one replaces it.
#[derive(Debug, Clone, Default)]
pub struct BlogSession {
    content: String,
    warning: Option<String>,
}

impl BlogSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// Inline warning for the last action, if it produced one.
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.warning = None;
    }

    pub async fn generate(
        &mut self,
        generator: &dyn TextGenerator,
        request: &GenerationRequest,
    ) -> GenerateOutcome {
        if request.has_blank_topic() {
            self.warning = Some(EMPTY_TOPIC_WARNING.to_string());
            return GenerateOutcome::EmptyTopic;
        }

        let (text, outcome) = match try_generate_blog(generator, request).await {
            Ok(raw) => (clean_output(&raw), GenerateOutcome::Generated),
            Err(e) => {
                tracing::error!(model = generator.model_name(), "generation failed: {e:#}");
                (failure_message(&e), GenerateOutcome::Failed)
            }
        };

        self.content = text;
        self.warning = None;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::is_warning;
    use crate::generator::testing::FakeGenerator;

    #[tokio::test]
    async fn test_blank_topic_makes_no_call() {
        let generator = FakeGenerator::replying("# Post");
        let mut session = BlogSession::new();

        for topic in ["", "   ", "\n\t"] {
            let outcome = session.generate(&generator, &GenerationRequest::new(topic)).await;
            assert_eq!(outcome, GenerateOutcome::EmptyTopic);
        }

        assert_eq!(generator.call_count(), 0);
        assert_eq!(session.warning(), Some(EMPTY_TOPIC_WARNING));
        assert!(!session.has_content());
    }

    #[tokio::test]
    async fn test_generated_text_is_cleaned_and_stored() {
        let generator = FakeGenerator::replying("<think>outline</think>\n# Post\nBody\n");
        let mut session = BlogSession::new();

        let outcome = session.generate(&generator, &GenerationRequest::new("Rust")).await;

        assert_eq!(outcome, GenerateOutcome::Generated);
        assert_eq!(session.content(), "# Post\nBody");
        assert_eq!(session.warning(), None);
    }

    #[tokio::test]
    async fn test_warning_sign_title_is_still_generated() {
        let generator = FakeGenerator::replying("⚠️ 7 Warning Signs of Burnout\n\nBody");
        let mut session = BlogSession::new();

        let outcome = session.generate(&generator, &GenerationRequest::new("Burnout")).await;

        assert_eq!(outcome, GenerateOutcome::Generated);
        assert_eq!(session.content(), "⚠️ 7 Warning Signs of Burnout\n\nBody");
    }

    #[tokio::test]
    async fn test_failure_is_stored_as_content() {
        let generator = FakeGenerator::failing("401 Unauthorized");
        let mut session = BlogSession::new();

        let outcome = session.generate(&generator, &GenerationRequest::new("Rust")).await;

        assert_eq!(outcome, GenerateOutcome::Failed);
        assert!(is_warning(session.content()));
        assert!(session.content().contains("401 Unauthorized"));
    }

    #[tokio::test]
    async fn test_blank_topic_keeps_previous_content() {
        let generator = FakeGenerator::replying("# First");
        let mut session = BlogSession::new();
        session.generate(&generator, &GenerationRequest::new("Rust")).await;

        session.generate(&generator, &GenerationRequest::new(" ")).await;

        assert_eq!(session.content(), "# First");
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_next_generation_replaces_content() {
        let mut session = BlogSession::new();
        session
            .generate(&FakeGenerator::replying("# One"), &GenerationRequest::new("a"))
            .await;
        session
            .generate(&FakeGenerator::replying("# Two"), &GenerationRequest::new("b"))
            .await;
        assert_eq!(session.content(), "# Two");

        session.clear();
        assert!(!session.has_content());
    }
}
