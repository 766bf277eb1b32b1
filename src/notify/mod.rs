//! Push notifications.
//!
//! [`NotificationDispatcher`] enforces the delivery rules (length guard,
//! image before text, dry run) and hands the messages to a
//! [`NotificationProvider`].

mod line;

pub use line::LineMessaging;

use crate::classifier::ClassificationResult;
use crate::error::{Result, TubebriefError};
use crate::video_source::{VideoMetadata, VideoReference};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Longest text message the provider accepts.
pub const MAX_TEXT_CHARS: usize = 5000;
/// Characters kept when a text is cut.
pub const TRUNCATED_TEXT_CHARS: usize = 4990;
/// Appended to a cut text.
pub const TRUNCATION_SUFFIX: &str = "\n...";
/// Most messages one push call may carry.
pub const MAX_MESSAGES_PER_PUSH: usize = 5;

/// A message to push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Text { text: String },
    /// An image at a publicly resolvable URL.
    Image { url: String },
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Message::Image { url: url.into() }
    }
}

/// Outcome of a side-effecting call that honours dry run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Skipped,
}

/// Trait for push-notification backends.
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Push messages to a recipient, in order.
    async fn push(&self, recipient: &str, messages: &[Message]) -> Result<()>;
}

/// Cut text longer than [`MAX_TEXT_CHARS`] to [`TRUNCATED_TEXT_CHARS`] plus a marker.
pub fn guard_text_length(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_CHARS {
        return text.to_string();
    }
    let kept: String = text.chars().take(TRUNCATED_TEXT_CHARS).collect();
    format!("{}{}", kept, TRUNCATION_SUFFIX)
}

/// Text card for a single processed video.
pub fn format_video_card(
    reference: &VideoReference,
    metadata: &VideoMetadata,
    classification: &ClassificationResult,
) -> String {
    let mut card = format!("[{}] {}\n", classification.category, metadata.title);
    if !classification.keywords.is_empty() {
        card.push_str(&format!("# {}\n", classification.keywords.join(" / ")));
    }
    card.push('\n');
    card.push_str(classification.summary.trim());
    card.push_str("\n\n");
    card.push_str(&reference.url);
    card
}

/// Delivers digests and per-video notices.
pub struct NotificationDispatcher {
    provider: Option<Arc<dyn NotificationProvider>>,
    recipient: String,
}

impl NotificationDispatcher {
    pub fn new(provider: Arc<dyn NotificationProvider>, recipient: &str) -> Self {
        Self {
            provider: Some(provider),
            recipient: recipient.to_string(),
        }
    }

    /// A dispatcher that can only run dry.
    pub fn disabled() -> Self {
        Self {
            provider: None,
            recipient: String::new(),
        }
    }

    async fn deliver(&self, messages: Vec<Message>, dry_run: bool) -> Result<Delivery> {
        if messages.len() > MAX_MESSAGES_PER_PUSH {
            return Err(TubebriefError::Notification(format!(
                "{} messages exceed the limit of {}",
                messages.len(),
                MAX_MESSAGES_PER_PUSH
            )));
        }

        if dry_run {
            debug!("Dry run: skipping push of {} messages", messages.len());
            return Ok(Delivery::Skipped);
        }

        let provider = self.provider.as_ref().ok_or_else(|| {
            TubebriefError::Notification("No notification provider configured".to_string())
        })?;
        provider.push(&self.recipient, &messages).await?;
        Ok(Delivery::Sent)
    }

    /// Send a digest, preceded by an optional illustration.
    #[instrument(skip(self, text))]
    pub async fn send_digest(
        &self,
        text: &str,
        image_url: Option<&str>,
        dry_run: bool,
    ) -> Result<Delivery> {
        let mut messages = Vec::new();
        if let Some(url) = image_url.filter(|u| !u.is_empty()) {
            messages.push(Message::image(url));
        }
        messages.push(Message::text(guard_text_length(text)));

        let delivery = self.deliver(messages, dry_run).await?;
        if delivery == Delivery::Sent {
            info!("Digest delivered");
        }
        Ok(delivery)
    }

    /// Notify about one processed video: thumbnail first, then the text card.
    #[instrument(skip_all, fields(video_id = %reference.id))]
    pub async fn notify_video(
        &self,
        reference: &VideoReference,
        metadata: &VideoMetadata,
        classification: &ClassificationResult,
        dry_run: bool,
    ) -> Result<Delivery> {
        let mut messages = Vec::new();
        if let Some(thumbnail) = metadata.thumbnail() {
            messages.push(Message::image(thumbnail));
        }
        messages.push(Message::text(guard_text_length(&format_video_card(
            reference,
            metadata,
            classification,
        ))));

        self.deliver(messages, dry_run).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Category;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProvider {
        pushes: Mutex<Vec<(String, Vec<Message>)>>,
    }

    #[async_trait]
    impl NotificationProvider for RecordingProvider {
        async fn push(&self, recipient: &str, messages: &[Message]) -> Result<()> {
            self.pushes
                .lock()
                .unwrap()
                .push((recipient.to_string(), messages.to_vec()));
            Ok(())
        }
    }

    fn metadata(thumbnail: &str) -> VideoMetadata {
        VideoMetadata {
            video_id: "dQw4w9WgXcQ".to_string(),
            title: "Launch day".to_string(),
            channel_title: "Channel".to_string(),
            published_at: "2026-10-16T00:00:00Z".to_string(),
            thumbnail_url: thumbnail.to_string(),
        }
    }

    fn classification() -> ClassificationResult {
        ClassificationResult {
            category: Category::News,
            keywords: vec!["Gemini".to_string(), "API".to_string()],
            summary: "Something shipped.".to_string(),
        }
    }

    #[test]
    fn test_guard_5200_chars() {
        let text = "あ".repeat(5200);
        let guarded = guard_text_length(&text);
        assert_eq!(guarded.chars().count(), 4994);
        assert!(guarded.ends_with("\n..."));
        assert!(guarded.chars().count() <= MAX_TEXT_CHARS);
    }

    #[test]
    fn test_guard_at_limit_unchanged() {
        let text = "a".repeat(MAX_TEXT_CHARS);
        assert_eq!(guard_text_length(&text), text);
    }

    #[test]
    fn test_video_card() {
        let card = format_video_card(
            &VideoReference::new("dQw4w9WgXcQ"),
            &metadata(""),
            &classification(),
        );
        assert!(card.starts_with("[NEWS] Launch day\n# Gemini / API\n"));
        assert!(card.contains("Something shipped."));
        assert!(card.ends_with("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
    }

    #[tokio::test]
    async fn test_digest_image_precedes_text() {
        let provider = Arc::new(RecordingProvider::default());
        let dispatcher = NotificationDispatcher::new(provider.clone(), "U123");

        let delivery = dispatcher
            .send_digest(&"x".repeat(5200), Some("https://img.example/d.png"), false)
            .await
            .unwrap();
        assert_eq!(delivery, Delivery::Sent);

        let pushes = provider.pushes.lock().unwrap();
        let (recipient, messages) = &pushes[0];
        assert_eq!(recipient, "U123");
        assert_eq!(messages[0], Message::image("https://img.example/d.png"));
        match &messages[1] {
            Message::Text { text } => assert_eq!(text.chars().count(), 4994),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dry_run_skips_push() {
        let provider = Arc::new(RecordingProvider::default());
        let dispatcher = NotificationDispatcher::new(provider.clone(), "U123");

        let delivery = dispatcher.send_digest("hello", None, true).await.unwrap();
        assert_eq!(delivery, Delivery::Skipped);
        assert!(provider.pushes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_dispatcher() {
        let dispatcher = NotificationDispatcher::disabled();
        tokio_test::assert_ok!(dispatcher.send_digest("hello", None, true).await);

        let err = dispatcher.send_digest("hello", None, false).await.unwrap_err();
        assert_eq!(err.kind(), Some(crate::error::FailureKind::NotificationFailure));
    }

    #[tokio::test]
    async fn test_notify_video_with_thumbnail() {
        let provider = Arc::new(RecordingProvider::default());
        let dispatcher = NotificationDispatcher::new(provider.clone(), "U123");

        dispatcher
            .notify_video(
                &VideoReference::new("dQw4w9WgXcQ"),
                &metadata("https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"),
                &classification(),
                false,
            )
            .await
            .unwrap();

        let pushes = provider.pushes.lock().unwrap();
        let messages = &pushes[0].1;
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], Message::Image { .. }));
        assert!(matches!(messages[1], Message::Text { .. }));
    }
}
