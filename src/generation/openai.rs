//! OpenAI chat-completions backend.

use super::{GenerationRequest, GenerativeProvider};
use crate::error::{Result, TubebriefError};
use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI client. Text prompts only; media requests are rejected.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    /// Create a client that reuses the given HTTP client (and its timeout).
    pub fn new(http_client: reqwest::Client, api_key: &str, model: &str) -> Self {
        let config = OpenAIConfig::default().with_api_key(api_key);
        Self {
            client: Client::with_config(config).with_http_client(http_client),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerativeProvider for OpenAiClient {
    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let prompt = match request {
            GenerationRequest::Text { prompt } => prompt,
            GenerationRequest::Media { url, .. } => {
                return Err(TubebriefError::Generation(format!(
                    "Model {} cannot take video input ({})",
                    self.model, url
                )));
            }
        };

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| TubebriefError::OpenAI(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .temperature(0.3)
            .build()
            .map_err(|e| TubebriefError::OpenAI(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| TubebriefError::OpenAI(format!("Failed to generate response: {}", e)))?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| TubebriefError::Generation("Empty response from OpenAI".to_string()))?
            .clone();

        debug!("Generated {} chars", text.chars().count());
        Ok(text)
    }

    fn supports_media(&self) -> bool {
        false
    }
}
