//! YouTube caption track provider.
//!
//! Caption tracks are listed from the player response embedded in the public
//! watch page and fetched from the timed-text endpoint the track points at.

use super::{Provenance, TranscriptEntry, TranscriptHandle, TranscriptProvider};
use crate::error::{Result, TubebriefError};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, instrument};

const WATCH_PAGE_URL: &str = "https://www.youtube.com/watch";

/// A timed caption line.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionSegment {
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub text: String,
}

impl CaptionSegment {
    pub fn new(start_seconds: f64, duration_seconds: f64, text: &str) -> Self {
        Self {
            start_seconds,
            duration_seconds,
            text: text.to_string(),
        }
    }
}

impl TranscriptEntry for CaptionSegment {
    fn text(&self) -> Option<&str> {
        Some(self.text.as_str())
    }
}

/// Caption provider backed by the public YouTube watch page.
pub struct YoutubeCaptions {
    client: reqwest::Client,
    segment_regex: Regex,
    tag_regex: Regex,
    numeric_entity_regex: Regex,
}

impl YoutubeCaptions {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            segment_regex: Regex::new(
                r#"(?s)<text start="([^"]*)"(?:\s+dur="([^"]*)")?[^>]*>(.*?)</text>"#,
            )
            .expect("Invalid regex"),
            tag_regex: Regex::new(r"<[^>]*>").expect("Invalid regex"),
            numeric_entity_regex: Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);")
                .expect("Invalid regex"),
        }
    }

    /// Parse the caption track list out of a watch page.
    fn parse_tracks(&self, video_id: &str, html: &str) -> Result<Vec<TranscriptHandle>> {
        let Some((_, after)) = html.split_once("\"captions\":") else {
            if html.contains("class=\"g-recaptcha\"") {
                return Err(TubebriefError::VideoUnavailable(format!(
                    "{} (request blocked by captcha)",
                    video_id
                )));
            }
            if !html.contains("\"playabilityStatus\":") {
                return Err(TubebriefError::VideoUnavailable(video_id.to_string()));
            }
            return Err(TubebriefError::TranscriptsDisabled(video_id.to_string()));
        };

        let captions_json = after
            .split_once(",\"videoDetails")
            .map(|(json, _)| json)
            .unwrap_or(after)
            .replace('\n', "");

        let captions: CaptionsRenderer = serde_json::from_str(&captions_json)?;
        let tracks = captions
            .player_captions_tracklist_renderer
            .and_then(|r| r.caption_tracks)
            .ok_or_else(|| TubebriefError::TranscriptsDisabled(video_id.to_string()))?;

        Ok(tracks
            .into_iter()
            .map(|track| TranscriptHandle {
                video_id: video_id.to_string(),
                language_name: track.name.map(|n| n.text()).unwrap_or_default(),
                provenance: if track.kind.as_deref() == Some("asr") {
                    Provenance::Generated
                } else {
                    Provenance::Manual
                },
                is_translatable: track.is_translatable,
                locator: track.base_url.replace("&fmt=srv3", ""),
                language_code: track.language_code,
                translate_to: None,
            })
            .collect())
    }

    /// Parse timed-text XML into caption segments.
    fn parse_segments(&self, xml: &str) -> Vec<CaptionSegment> {
        self.segment_regex
            .captures_iter(xml)
            .filter_map(|caps| {
                let start = caps.get(1)?.as_str().parse().unwrap_or(0.0);
                let duration = caps
                    .get(2)
                    .and_then(|d| d.as_str().parse().ok())
                    .unwrap_or(0.0);
                let raw = caps.get(3)?.as_str();
                let text = self.decode_entities(&self.tag_regex.replace_all(raw, ""));
                let text = text.trim();
                (!text.is_empty()).then(|| CaptionSegment::new(start, duration, text))
            })
            .collect()
    }

    fn decode_entities(&self, text: &str) -> String {
        let decoded = text
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&");

        self.numeric_entity_regex
            .replace_all(&decoded, |caps: &regex::Captures| {
                let code = &caps[1];
                let value = match code.strip_prefix('x') {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => code.parse().ok(),
                };
                value
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeCaptions {
    #[instrument(skip(self))]
    async fn list_available(&self, video_id: &str) -> Result<Vec<TranscriptHandle>> {
        let html = self
            .client
            .get(WATCH_PAGE_URL)
            .query(&[("v", video_id)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let tracks = self.parse_tracks(video_id, &html)?;
        debug!("Listed {} caption tracks", tracks.len());
        Ok(tracks)
    }

    #[instrument(
        skip(self, handle),
        fields(language = %handle.language_code, provenance = %handle.provenance)
    )]
    async fn fetch(&self, handle: &TranscriptHandle) -> Result<Vec<Box<dyn TranscriptEntry>>> {
        let mut request = self.client.get(&handle.locator);
        if let Some(target) = &handle.translate_to {
            request = request.query(&[("tlang", target.as_str())]);
        }

        let response = request.send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(TubebriefError::TranscriptNotFound(format!(
                "{} ({})",
                handle.video_id,
                handle.effective_language()
            )));
        }

        let xml = response.error_for_status()?.text().await?;
        let segments = self.parse_segments(&xml);
        debug!("Fetched {} caption segments", segments.len());

        Ok(segments
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn TranscriptEntry>)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsRenderer {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    name: Option<TrackName>,
    language_code: String,
    kind: Option<String>,
    #[serde(default)]
    is_translatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

impl TrackName {
    fn text(self) -> String {
        self.simple_text.unwrap_or_else(|| {
            self.runs
                .into_iter()
                .map(|r| r.text)
                .collect::<Vec<_>>()
                .join("")
        })
    }
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}
