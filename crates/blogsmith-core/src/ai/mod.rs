pub mod gemini;

pub use gemini::{GeminiClient, GeminiError};

use anyhow::Result;
use async_trait::async_trait;

/// A service that turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_content(&self, prompt: &str, temperature: f32) -> Result<String>;

    /// Model identifier shown in the UI.
    fn model_name(&self) -> &str;
}
