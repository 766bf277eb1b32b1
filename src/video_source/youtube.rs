//! YouTube Data API metadata provider.

use super::{MetadataProvider, VideoMetadata};
use crate::error::{Result, TubebriefError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Provider-side cap on `search.list` page size.
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Thumbnail qualities, best first.
const THUMBNAIL_PREFERENCE: [&str; 4] = ["maxres", "high", "medium", "default"];

/// A single thumbnail entry of a video snippet.
#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Pick the best available thumbnail URL, or an empty string.
pub fn select_thumbnail(thumbnails: &HashMap<String, Thumbnail>) -> String {
    THUMBNAIL_PREFERENCE
        .iter()
        .find_map(|quality| thumbnails.get(*quality))
        .map(|t| t.url.clone())
        .unwrap_or_default()
}

/// YouTube Data API v3 client.
pub struct YoutubeDataApi {
    client: reqwest::Client,
    api_key: String,
}

impl YoutubeDataApi {
    pub fn new(client: reqwest::Client, api_key: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .client
            .get(format!("{}/{}", YOUTUBE_API_BASE, endpoint))
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TubebriefError::MetadataFetch(format!(
                "YouTube API {} returned {}: {}",
                endpoint, status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MetadataProvider for YoutubeDataApi {
    #[instrument(skip(self))]
    async fn get_info(&self, video_id: &str) -> Result<VideoMetadata> {
        let response: VideoListResponse = self
            .get_json("videos", &[("part", "snippet"), ("id", video_id)])
            .await?;

        let snippet = response
            .items
            .into_iter()
            .next()
            .map(|item| item.snippet)
            .ok_or_else(|| TubebriefError::VideoNotFound(video_id.to_string()))?;

        Ok(VideoMetadata {
            video_id: video_id.to_string(),
            title: snippet.title,
            channel_title: snippet.channel_title,
            published_at: snippet.published_at,
            thumbnail_url: select_thumbnail(&snippet.thumbnails),
        })
    }

    #[instrument(skip(self))]
    async fn search_latest(&self, channel_id: &str, count: usize) -> Result<Vec<String>> {
        let max_results = count.min(MAX_SEARCH_RESULTS).to_string();

        let response: SearchListResponse = self
            .get_json(
                "search",
                &[
                    ("part", "id"),
                    ("channelId", channel_id),
                    ("order", "date"),
                    ("type", "video"),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;

        let ids: Vec<String> = response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();

        debug!("Found {} videos for channel {}", ids.len(), channel_id);
        Ok(ids)
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}
