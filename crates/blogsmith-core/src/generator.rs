use anyhow::Result;

use crate::ai::TextGenerator;
use crate::prompt::build_prompt;
use crate::request::GenerationRequest;

/// Every failure message handed back to the UI starts with this marker.
pub const WARNING_MARKER: &str = "⚠";

pub fn is_warning(text: &str) -> bool {
    text.starts_with(WARNING_MARKER)
}

/// Build the prompt for `request` and make one generator call.
pub async fn try_generate_blog(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
) -> Result<String> {
    let prompt = build_prompt(request);
    generator.generate_content(&prompt, request.temperature).await
}

/// Text shown in place of the post when generation fails.
pub fn failure_message(error: &anyhow::Error) -> String {
    format!("{WARNING_MARKER} Could not connect to Gemini API. Error: {error}")
}

/// Like [`try_generate_blog`], but always returns text: the raw model
/// output on success, or a warning string starting with
/// [`WARNING_MARKER`] on any failure. One call, no retries.
pub async fn generate_blog(generator: &dyn TextGenerator, request: &GenerationRequest) -> String {
    match try_generate_blog(generator, request).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(model = generator.model_name(), "generation failed: {e:#}");
            failure_message(&e)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use crate::ai::TextGenerator;

    /// Generator double that records calls and replays a fixed outcome.
    pub struct FakeGenerator {
        reply: Result<String, String>,
        pub calls: AtomicUsize,
        pub last_prompt: Mutex<Option<(String, f32)>>,
    }

    impl FakeGenerator {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate_content(&self, prompt: &str, temperature: f32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some((prompt.to_string(), temperature));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(anyhow!(message.clone())),
            }
        }

        fn model_name(&self) -> &str {
            "fake-model"
        }
    }
}
