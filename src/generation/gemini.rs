//! Google Gemini backend over the `generateContent` REST endpoint.

use super::{GenerationRequest, GenerativeProvider};
use crate::error::{Result, TubebriefError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini client. Accepts YouTube URLs as video input.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, api_key: &str, model: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the request body. Media comes before the prompt text.
    fn build_body(request: &GenerationRequest) -> Value {
        let parts = match request {
            GenerationRequest::Text { prompt } => vec![json!({ "text": prompt })],
            GenerationRequest::Media { url, prompt } => vec![
                json!({ "fileData": { "fileUri": url, "mimeType": "video/*" } }),
                json!({ "text": prompt }),
            ],
        };

        json!({ "contents": [{ "parts": parts }] })
    }

    /// Concatenate the text parts of the first candidate.
    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        if let Some(feedback) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(TubebriefError::Generation(format!(
                "Prompt blocked: {}",
                feedback
            )));
        }

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(TubebriefError::Generation(
                "Empty response from Gemini".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl GenerativeProvider for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let body = Self::build_body(&request);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TubebriefError::Generation(format!(
                "Gemini API error ({}): {}",
                status, body
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = Self::extract_text(parsed)?;
        debug!("Generated {} chars", text.chars().count());

        Ok(text)
    }

    fn supports_media(&self) -> bool {
        true
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
