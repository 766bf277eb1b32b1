//! Video source abstraction for Tubebrief.
//!
//! Resolves user input into video references and fetches metadata through a
//! trait-based provider interface.

mod resolver;
mod youtube;

pub use resolver::VideoIdentifierResolver;
pub use youtube::{select_thumbnail, Thumbnail, YoutubeDataApi};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Base URL for canonical watch links.
pub const WATCH_URL: &str = "https://www.youtube.com/watch";

/// A resolved video: identifier plus canonical watch URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    /// 11-character URL-safe identifier.
    pub id: String,
    /// Canonical watch URL.
    pub url: String,
}

impl VideoReference {
    /// Build a reference from an already validated identifier.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            url: format!("{}?v={}", WATCH_URL, id),
        }
    }
}

/// Metadata about a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Video identifier.
    pub video_id: String,
    /// Title.
    pub title: String,
    /// Channel name.
    pub channel_title: String,
    /// Publication timestamp (ISO-8601, as returned by the provider).
    pub published_at: String,
    /// Best available thumbnail URL, empty if none.
    pub thumbnail_url: String,
}

impl VideoMetadata {
    /// Publication date as `YYYY-MM-DD`, if the timestamp carries one.
    pub fn published_date(&self) -> Option<&str> {
        self.published_at.get(..10).filter(|d| !d.is_empty())
    }

    /// Thumbnail URL, if any.
    pub fn thumbnail(&self) -> Option<&str> {
        Some(self.thumbnail_url.as_str()).filter(|t| !t.is_empty())
    }

    /// Channel name, if any.
    pub fn channel(&self) -> Option<&str> {
        Some(self.channel_title.as_str()).filter(|c| !c.is_empty())
    }
}

/// Trait for video metadata providers.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch metadata for a video. Fails with `VideoNotFound` if the id does
    /// not resolve.
    async fn get_info(&self, video_id: &str) -> Result<VideoMetadata>;

    /// List the latest video ids of a channel, newest first.
    async fn search_latest(&self, channel_id: &str, count: usize) -> Result<Vec<String>>;
}
