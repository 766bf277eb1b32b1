//! Transcript acquisition for Tubebrief.
//!
//! Transcripts come from a [`TranscriptProvider`] that lists the caption
//! tracks of a video and fetches one of them, optionally machine-translated.
//! [`TranscriptResolver`] walks a configurable fallback chain over those
//! tracks and joins the fetched entries into a single text.
//!
//! Providers may hand back entries in different shapes (a struct with a text
//! field, or a key/value mapping). Both implement [`TranscriptEntry`], so the
//! resolver never looks at the representation.

mod resolver;
mod youtube;

pub use resolver::{FallbackStep, TranscriptResolver};
pub use youtube::{CaptionSegment, YoutubeCaptions};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether a transcript was written by a person or generated by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Manual,
    Generated,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Manual => write!(f, "manual"),
            Provenance::Generated => write!(f, "generated"),
        }
    }
}

/// A caption track that can be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptHandle {
    /// Video the track belongs to.
    pub video_id: String,
    /// Language code of the track (e.g. "en").
    pub language_code: String,
    /// Human readable language name.
    pub language_name: String,
    /// Manual or auto-generated.
    pub provenance: Provenance,
    /// Whether the platform can machine-translate this track.
    pub is_translatable: bool,
    /// Provider specific locator (URL or id).
    pub locator: String,
    /// Target language when the track should be machine-translated.
    pub translate_to: Option<String>,
}

impl TranscriptHandle {
    /// A copy of this handle that fetches a translation into `language`.
    pub fn translated(&self, language: &str) -> Self {
        Self {
            translate_to: Some(language.to_string()),
            ..self.clone()
        }
    }

    /// Language of the text this handle fetches.
    pub fn effective_language(&self) -> &str {
        self.translate_to.as_deref().unwrap_or(&self.language_code)
    }
}

/// A transcript ready for summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptResult {
    pub language_code: String,
    pub provenance: Provenance,
    pub text: String,
}

/// Read access to the text of a single transcript entry.
pub trait TranscriptEntry: Send + Sync {
    /// The entry text, if the entry carries one.
    fn text(&self) -> Option<&str>;

    fn has_text(&self) -> bool {
        self.text().is_some()
    }
}

impl TranscriptEntry for HashMap<String, String> {
    fn text(&self) -> Option<&str> {
        self.get("text").map(String::as_str)
    }
}

impl TranscriptEntry for serde_json::Value {
    fn text(&self) -> Option<&str> {
        self.get("text").and_then(|v| v.as_str())
    }
}

/// Join transcript entries into one text, separated by single spaces.
///
/// Entries without text are skipped. An empty list yields an empty string.
pub fn join_entries(entries: &[Box<dyn TranscriptEntry>]) -> String {
    entries
        .iter()
        .filter_map(|entry| entry.text())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// List the caption tracks of a video.
    ///
    /// Fails with `TranscriptsDisabled` or `VideoUnavailable` when the video
    /// cannot have transcripts at all.
    async fn list_available(&self, video_id: &str) -> Result<Vec<TranscriptHandle>>;

    /// Fetch the entries of a caption track.
    async fn fetch(&self, handle: &TranscriptHandle) -> Result<Vec<Box<dyn TranscriptEntry>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_entry(text: &str) -> Box<dyn TranscriptEntry> {
        let mut map = HashMap::new();
        map.insert("text".to_string(), text.to_string());
        Box::new(map)
    }

    #[test]
    fn test_join_mapping_entries() {
        let entries = vec![map_entry("こんにちは"), map_entry("世界")];
        assert_eq!(join_entries(&entries), "こんにちは 世界");
    }

    #[test]
    fn test_join_mixed_entries() {
        let entries: Vec<Box<dyn TranscriptEntry>> = vec![
            Box::new(CaptionSegment::new(0.0, 1.5, "Hello")),
            map_entry("brave"),
            Box::new(serde_json::json!({"text": "new", "start": 3.0})),
            Box::new(CaptionSegment::new(4.0, 1.0, "World")),
        ];
        assert_eq!(join_entries(&entries), "Hello brave new World");
    }

    #[test]
    fn test_join_skips_entries_without_text() {
        let entries: Vec<Box<dyn TranscriptEntry>> = vec![
            map_entry("a"),
            Box::new(serde_json::json!({"start": 1.0})),
            Box::new(HashMap::<String, String>::new()),
            map_entry("b"),
        ];
        assert!(!entries[1].has_text());
        assert_eq!(join_entries(&entries), "a b");
    }

    #[test]
    fn test_join_empty() {
        let entries: Vec<Box<dyn TranscriptEntry>> = Vec::new();
        assert_eq!(join_entries(&entries), "");
    }

    #[test]
    fn test_translated_handle() {
        let handle = TranscriptHandle {
            video_id: "dQw4w9WgXcQ".to_string(),
            language_code: "en".to_string(),
            language_name: "English".to_string(),
            provenance: Provenance::Manual,
            is_translatable: true,
            locator: "https://example.com/track".to_string(),
            translate_to: None,
        };
        assert_eq!(handle.effective_language(), "en");
        assert_eq!(handle.translated("ja").effective_language(), "ja");
    }
}
