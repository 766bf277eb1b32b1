//! Video reference resolution.

use super::VideoReference;
use crate::error::{Result, TubebriefError};
use regex::Regex;
use url::Url;

/// Normalizes any supported YouTube reference to a canonical video identifier.
///
/// Accepted inputs:
/// - a bare 11-character identifier
/// - `https://www.youtube.com/watch?v=ID` (other query parameters ignored)
/// - `https://youtu.be/ID`
/// - `https://www.youtube.com/embed/ID`, `/shorts/ID` and `/v/ID`
///
/// Hosts may carry a `www.` or `m.` prefix.
pub struct VideoIdentifierResolver {
    id_regex: Regex,
    path_regex: Regex,
}

impl VideoIdentifierResolver {
    pub fn new() -> Self {
        let id_regex = Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("Invalid regex");
        let path_regex =
            Regex::new(r"^/(?:embed|shorts|v)/([A-Za-z0-9_-]+)").expect("Invalid regex");

        Self {
            id_regex,
            path_regex,
        }
    }

    /// Check whether `candidate` has the shape of a video identifier.
    pub fn is_video_id(&self, candidate: &str) -> bool {
        self.id_regex.is_match(candidate)
    }

    /// Resolve `input` into a [`VideoReference`].
    pub fn resolve(&self, input: &str) -> Result<VideoReference> {
        let input = input.trim();

        // A bare identifier wins over any URL interpretation.
        if self.is_video_id(input) {
            return Ok(VideoReference::new(input));
        }

        let id = self
            .extract_from_url(input)
            .filter(|id| self.is_video_id(id))
            .ok_or_else(|| TubebriefError::InvalidReference(input.to_string()))?;

        Ok(VideoReference::new(&id))
    }

    fn extract_from_url(&self, input: &str) -> Option<String> {
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&format!("https://{}", input)).ok()?
            }
            Err(_) => return None,
        };

        let host = url.host_str()?.to_ascii_lowercase();
        let host = host
            .strip_prefix("www.")
            .or_else(|| host.strip_prefix("m."))
            .unwrap_or(host.as_str());

        match host {
            "youtu.be" => url
                .path_segments()?
                .next()
                .filter(|segment| !segment.is_empty())
                .map(|segment| segment.to_string()),
            "youtube.com" => {
                if url.path() == "/watch" {
                    return url
                        .query_pairs()
                        .find(|(key, _)| key == "v")
                        .map(|(_, value)| value.into_owned());
                }

                self.path_regex
                    .captures(url.path())
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
            }
            _ => None,
        }
    }
}

impl Default for VideoIdentifierResolver {
    fn default() -> Self {
        Self::new()
    }
}
