//! LINE Messaging API push backend.

use super::{Message, NotificationProvider, MAX_MESSAGES_PER_PUSH};
use crate::error::{Result, TubebriefError};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://api.line.me/v2/bot";

/// Push client for the LINE Messaging API.
pub struct LineMessaging {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl LineMessaging {
    pub fn new(client: reqwest::Client, access_token: &str) -> Self {
        Self {
            client,
            access_token: access_token.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn message_json(message: &Message) -> Value {
        match message {
            Message::Text { text } => json!({ "type": "text", "text": text }),
            Message::Image { url } => json!({
                "type": "image",
                "originalContentUrl": url,
                "previewImageUrl": url,
            }),
        }
    }

    fn build_payload(recipient: &str, messages: &[Message]) -> Value {
        json!({
            "to": recipient,
            "messages": messages.iter().map(Self::message_json).collect::<Vec<_>>(),
        })
    }
}

#[async_trait]
impl NotificationProvider for LineMessaging {
    #[instrument(skip(self, recipient, messages), fields(count = messages.len()))]
    async fn push(&self, recipient: &str, messages: &[Message]) -> Result<()> {
        if messages.is_empty() || messages.len() > MAX_MESSAGES_PER_PUSH {
            return Err(TubebriefError::Notification(format!(
                "A push carries 1 to {} messages, got {}",
                MAX_MESSAGES_PER_PUSH,
                messages.len()
            )));
        }

        let response = self
            .client
            .post(format!("{}/message/push", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&Self::build_payload(recipient, messages))
            .send()
            .await
            .map_err(|e| TubebriefError::Notification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TubebriefError::Notification(format!(
                "LINE push failed ({}): {}",
                status, body
            )));
        }

        debug!("Pushed {} messages", messages.len());
        Ok(())
    }
}
