//! Classification and summarization of video content.
//!
//! The generative backend is asked to answer with a `CATEGORY:` line, a
//! `KEYWORDS:` line and a free-form summary. Models follow that format only
//! loosely, so [`ClassificationResult::parse`] degrades gracefully: whatever
//! it cannot recognise ends up in the summary rather than being dropped.

use crate::config::Prompts;
use crate::error::Result;
use crate::generation::{GenerationRequest, GenerativeProvider};
use crate::transcript::TranscriptResult;
use crate::video_source::VideoReference;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const CATEGORY_MARKER: &str = "CATEGORY:";
const KEYWORDS_MARKER: &str = "KEYWORDS:";

/// Line appended to a transcript that was cut short.
pub const TRUNCATION_MARKER: &str = "[... transcript truncated ...]";

/// Content category of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// New information. The only category that goes into the digest.
    #[default]
    News,
    /// How to build or use something.
    Howto,
    /// General knowledge or opinion.
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::News => "NEWS",
            Category::Howto => "HOWTO",
            Category::General => "GENERAL",
        }
    }

    /// Map a free-form label onto a category. Anything unrecognised is NEWS.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_uppercase();
        if label.contains("HOWTO") {
            Category::Howto
        } else if label.contains("GENERAL") {
            Category::General
        } else {
            Category::News
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NEWS" => Ok(Category::News),
            "HOWTO" => Ok(Category::Howto),
            "GENERAL" => Ok(Category::General),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Parsed model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub keywords: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    ScanningHeaders,
    InSummary,
}

/// Value after a case-insensitive marker at the start of a line.
fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let head = line.get(..marker.len())?;
    head.eq_ignore_ascii_case(marker)
        .then(|| line[marker.len()..].trim())
}

/// Join lines, dropping blank lines at both ends.
fn join_trimmed(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

impl ClassificationResult {
    /// Parse a loosely formatted model response.
    ///
    /// Header lines are scanned from the top. Once at least one marker has
    /// been read, the first line that is not a marker (a blank line counts)
    /// starts the summary, and no later line is treated as a header. Without
    /// any marker the whole text becomes the summary.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();

        let mut state = ParseState::ScanningHeaders;
        let mut category = Category::default();
        let mut keywords = Vec::new();
        let mut seen_marker = false;
        let mut summary_start = lines.len();

        for (i, raw) in lines.iter().enumerate() {
            let line = raw.trim();

            if let Some(value) = strip_marker(line, CATEGORY_MARKER) {
                category = Category::from_label(value);
                seen_marker = true;
                summary_start = i + 1;
            } else if let Some(value) = strip_marker(line, KEYWORDS_MARKER) {
                keywords = value
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect();
                seen_marker = true;
                summary_start = i + 1;
            } else if seen_marker {
                state = ParseState::InSummary;
                summary_start = i;
                break;
            }
        }

        if !seen_marker {
            return Self {
                category,
                keywords,
                summary: text.to_string(),
            };
        }

        let summary = match state {
            ParseState::InSummary => join_trimmed(&lines[summary_start..]),
            ParseState::ScanningHeaders => String::new(),
        };

        Self {
            category,
            keywords,
            summary: if summary.is_empty() {
                text.trim().to_string()
            } else {
                summary
            },
        }
    }

    /// Whether this result goes into the digest.
    pub fn is_digest_eligible(&self) -> bool {
        self.category == Category::News
    }
}

/// Cut text to at most `max_chars` characters, marking the cut.
pub fn truncate_transcript(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}\n\n{}", &text[..byte_index], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Classifies videos through a generative backend.
pub struct ContentClassifier {
    provider: Arc<dyn GenerativeProvider>,
    prompts: Arc<Prompts>,
    max_transcript_chars: usize,
}

impl ContentClassifier {
    pub fn new(provider: Arc<dyn GenerativeProvider>, prompts: Arc<Prompts>) -> Self {
        Self {
            provider,
            prompts,
            max_transcript_chars: 100_000,
        }
    }

    pub fn with_max_transcript_chars(mut self, max_chars: usize) -> Self {
        self.max_transcript_chars = max_chars;
        self
    }

    /// Classify a video by handing its URL to the model.
    #[instrument(skip(self), fields(video_id = %reference.id))]
    pub async fn classify_video(&self, reference: &VideoReference) -> Result<ClassificationResult> {
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.classify.user, &HashMap::new());

        let response = self
            .provider
            .generate(GenerationRequest::media(&reference.url, prompt))
            .await?;

        let result = ClassificationResult::parse(&response);
        info!(
            "Classified as {} ({} keywords)",
            result.category,
            result.keywords.len()
        );
        Ok(result)
    }

    /// Summarize a transcript and classify it from the text.
    #[instrument(skip(self, transcript), fields(language = %transcript.language_code))]
    pub async fn summarize_transcript(
        &self,
        title: &str,
        transcript: &TranscriptResult,
    ) -> Result<ClassificationResult> {
        let text = truncate_transcript(&transcript.text, self.max_transcript_chars);
        if text.len() != transcript.text.len() {
            debug!(
                "Transcript truncated to {} characters",
                self.max_transcript_chars
            );
        }

        let mut vars = HashMap::new();
        vars.insert("title".to_string(), title.to_string());
        vars.insert("transcript".to_string(), text);
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.summarize.user, &vars);

        let response = self.provider.generate(GenerationRequest::text(prompt)).await?;

        let result = ClassificationResult::parse(&response);
        info!(
            "Summarized transcript as {} ({} keywords)",
            result.category,
            result.keywords.len()
        );
        Ok(result)
    }
}
