//! Configuration settings for Tubebrief.

use crate::generation::GenerationProvider;
use crate::transcript::FallbackStep;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub pipeline: PipelineSettings,
    pub transcript: TranscriptSettings,
    pub generation: GenerationSettings,
    pub digest: DigestSettings,
    pub store: StoreSettings,
    pub prompts: PromptSettings,
}

/// How the content of a video is obtained.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ContentStrategy {
    /// Hand the video URL to the model and let it classify and summarize.
    #[default]
    DirectClassify,
    /// Fetch a transcript, then summarize the text.
    TranscriptThenSummarize,
}

impl std::str::FromStr for ContentStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct-classify" | "direct" => Ok(ContentStrategy::DirectClassify),
            "transcript-then-summarize" | "transcript" => {
                Ok(ContentStrategy::TranscriptThenSummarize)
            }
            _ => Err(format!("Unknown content strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for ContentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentStrategy::DirectClassify => write!(f, "direct-classify"),
            ContentStrategy::TranscriptThenSummarize => write!(f, "transcript-then-summarize"),
        }
    }
}

/// What happens after a video has been classified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PostAction {
    /// Keep NEWS results for one digest at the end of the batch.
    #[default]
    CollectForDigest,
    /// Push a notification for every video as soon as it is processed.
    NotifyImmediately,
}

impl std::str::FromStr for PostAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "collect-for-digest" | "digest" => Ok(PostAction::CollectForDigest),
            "notify-immediately" | "immediate" => Ok(PostAction::NotifyImmediately),
            _ => Err(format!("Unknown post action: {}", s)),
        }
    }
}

impl std::fmt::Display for PostAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostAction::CollectForDigest => write!(f, "collect-for-digest"),
            PostAction::NotifyImmediately => write!(f, "notify-immediately"),
        }
    }
}

/// Pipeline behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub strategy: ContentStrategy,
    pub post_action: PostAction,
    /// Delay between consecutive videos of a batch.
    pub pacing_seconds: u64,
    /// Videos per channel when `--count` is not given.
    pub default_count: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            strategy: ContentStrategy::DirectClassify,
            post_action: PostAction::CollectForDigest,
            pacing_seconds: 3,
            default_count: 5,
        }
    }
}

/// Transcript acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Language the transcript should end up in.
    pub target_language: String,
    /// Language tried (and translated) after the target language.
    pub secondary_language: String,
    /// Order of the fallback steps.
    pub fallback_order: Vec<FallbackStep>,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            target_language: "ja".to_string(),
            secondary_language: "en".to_string(),
            fallback_order: FallbackStep::default_order(),
        }
    }
}

/// Generative backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub provider: GenerationProvider,
    /// Model name. Empty means the provider default.
    pub model: Option<String>,
    /// Transcript text is truncated to this many characters.
    pub max_transcript_chars: usize,
    pub timeout_seconds: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::Gemini,
            model: None,
            max_transcript_chars: 100_000,
            timeout_seconds: 300,
        }
    }
}

impl GenerationSettings {
    /// The configured model, or the provider default.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.provider.default_model())
    }
}

/// Digest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestSettings {
    /// UTC offset of the digest reference date.
    pub utc_offset_hours: i32,
    /// Length target handed to the digest prompt.
    pub max_chars: usize,
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            utc_offset_hours: 9,
            max_chars: 1000,
        }
    }
}

/// Notion database property names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreSettings {
    pub title: String,
    pub url: String,
    pub published: String,
    pub thumbnail: String,
    pub channel: String,
    pub category: String,
    pub summary: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            title: "タイトル".to_string(),
            url: "URL".to_string(),
            published: "公開日".to_string(),
            thumbnail: "サムネイル".to_string(),
            channel: "チャンネル名".to_string(),
            category: "カテゴリ".to_string(),
            summary: "要約".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tubebrief")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.pipeline.strategy, ContentStrategy::DirectClassify);
        assert_eq!(settings.pipeline.post_action, PostAction::CollectForDigest);
        assert_eq!(settings.pipeline.pacing_seconds, 3);
        assert_eq!(settings.pipeline.default_count, 5);
        assert_eq!(settings.transcript.target_language, "ja");
        assert_eq!(settings.transcript.fallback_order.len(), 4);
        assert_eq!(settings.generation.max_transcript_chars, 100_000);
        assert_eq!(settings.generation.model(), "gemini-2.5-flash");
        assert_eq!(settings.digest.utc_offset_hours, 9);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.pipeline.default_count, 5);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[pipeline]
strategy = "transcript-then-summarize"
post_action = "notify-immediately"

[transcript]
fallback_order = ["generated-target", "any-translated"]

[generation]
provider = "openai"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(
            settings.pipeline.strategy,
            ContentStrategy::TranscriptThenSummarize
        );
        assert_eq!(settings.pipeline.post_action, PostAction::NotifyImmediately);
        assert_eq!(settings.pipeline.pacing_seconds, 3);
        assert_eq!(
            settings.transcript.fallback_order,
            vec![FallbackStep::GeneratedTarget, FallbackStep::AnyTranslated]
        );
        assert_eq!(settings.transcript.secondary_language, "en");
        assert_eq!(settings.generation.provider, GenerationProvider::OpenAi);
        assert_eq!(settings.generation.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pipeline]\nstrategy = \"sideways\"\n").unwrap();
        assert!(Settings::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "transcript".parse::<ContentStrategy>().unwrap(),
            ContentStrategy::TranscriptThenSummarize
        );
        assert_eq!(
            "notify-immediately".parse::<PostAction>().unwrap(),
            PostAction::NotifyImmediately
        );
        assert!("later".parse::<PostAction>().is_err());
    }
}
