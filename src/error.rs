//! Error types for Tubebrief.

use thiserror::Error;

/// Library-level error type for Tubebrief operations.
#[derive(Error, Debug)]
pub enum TubebriefError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid video reference: {0}")]
    InvalidReference(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Metadata fetch failed: {0}")]
    MetadataFetch(String),

    #[error("Transcript not found: {0}")]
    TranscriptNotFound(String),

    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("Video is unavailable: {0}")]
    VideoUnavailable(String),

    #[error("No transcript available for video {0}")]
    TranscriptUnavailable(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

/// Failure taxonomy surfaced by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidReference,
    MetadataFetchFailure,
    TranscriptUnavailable,
    ClassificationFailure,
    PersistenceFailure,
    NotificationFailure,
    UnexpectedFailure,
}

impl FailureKind {
    /// Whether a failure of this kind only invalidates the current video.
    pub fn is_per_video(&self) -> bool {
        matches!(
            self,
            FailureKind::InvalidReference
                | FailureKind::MetadataFetchFailure
                | FailureKind::TranscriptUnavailable
                | FailureKind::ClassificationFailure
        )
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::InvalidReference => "InvalidReference",
            FailureKind::MetadataFetchFailure => "MetadataFetchFailure",
            FailureKind::TranscriptUnavailable => "TranscriptUnavailable",
            FailureKind::ClassificationFailure => "ClassificationFailure",
            FailureKind::PersistenceFailure => "PersistenceFailure",
            FailureKind::NotificationFailure => "NotificationFailure",
            FailureKind::UnexpectedFailure => "UnexpectedFailure",
        };
        write!(f, "{}", name)
    }
}

impl TubebriefError {
    /// The taxonomy kind of this error, if it carries one on its own.
    ///
    /// Transport and parse errors return `None`; the caller decides their
    /// kind from the stage they happened in.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            TubebriefError::InvalidReference(_) => Some(FailureKind::InvalidReference),
            TubebriefError::VideoNotFound(_) | TubebriefError::MetadataFetch(_) => {
                Some(FailureKind::MetadataFetchFailure)
            }
            TubebriefError::TranscriptNotFound(_)
            | TubebriefError::TranscriptsDisabled(_)
            | TubebriefError::VideoUnavailable(_)
            | TubebriefError::TranscriptUnavailable(_) => Some(FailureKind::TranscriptUnavailable),
            TubebriefError::Generation(_)
            | TubebriefError::Classification(_)
            | TubebriefError::OpenAI(_) => Some(FailureKind::ClassificationFailure),
            TubebriefError::Persistence(_) => Some(FailureKind::PersistenceFailure),
            TubebriefError::Notification(_) => Some(FailureKind::NotificationFailure),
            TubebriefError::Config(_) => Some(FailureKind::UnexpectedFailure),
            TubebriefError::Io(_)
            | TubebriefError::Json(_)
            | TubebriefError::TomlParse(_)
            | TubebriefError::Http(_)
            | TubebriefError::Url(_) => None,
        }
    }

    /// Whether this error only means "nothing there", which lets a fallback
    /// chain move on to its next attempt.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TubebriefError::TranscriptNotFound(_))
    }
}

/// Result type alias for Tubebrief operations.
pub type Result<T> = std::result::Result<T, TubebriefError>;
