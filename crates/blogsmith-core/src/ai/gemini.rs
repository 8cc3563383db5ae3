use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::TextGenerator;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Gemini API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("prompt was blocked: {0}")]
    Blocked(String),
    #[error("response contained no candidates")]
    NoCandidates,
    #[error("response contained no text (finish reason: {0})")]
    EmptyCandidate(String),
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiResponse {
    /// Text of the first candidate, the way the Gemini SDK's `text`
    /// accessor resolves it.
    fn into_text(self) -> Result<String, GeminiError> {
        let candidate = match self.candidates.into_iter().next() {
            Some(candidate) => candidate,
            None => {
                return Err(match self.prompt_feedback.and_then(|f| f.block_reason) {
                    Some(reason) => GeminiError::Blocked(reason),
                    None => GeminiError::NoCandidates,
                });
            }
        };

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if texts.is_empty() {
            return Err(GeminiError::EmptyCandidate(
                candidate.finish_reason.unwrap_or_else(|| "unknown".to_string()),
            ));
        }

        Ok(texts.concat())
    }
}

/// Client for one Gemini model. The model is fixed when the client is built
/// and reused for every request.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    pub fn with_model(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub async fn query(&self, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig { temperature },
        };

        tracing::info!(model = %self.model, temperature, "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, "Gemini request failed");
            return Err(GeminiError::Status { status, body }.into());
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let text = gemini_response.into_text()?;
        tracing::info!(chars = text.chars().count(), "Gemini response received");
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_content(&self, prompt: &str, temperature: f32) -> Result<String> {
        self.query(prompt, temperature).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
