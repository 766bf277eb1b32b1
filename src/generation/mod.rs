//! Generative-language backends.
//!
//! A [`GenerativeProvider`] turns a prompt, optionally paired with a media
//! URL, into free text. It is used for direct video classification,
//! transcript summarization and digest composition.

mod gemini;
mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Input to a generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    /// Plain text prompt.
    Text { prompt: String },
    /// A media URL the backend should watch, followed by a prompt.
    Media { url: String, prompt: String },
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        GenerationRequest::Text {
            prompt: prompt.into(),
        }
    }

    pub fn media(url: impl Into<String>, prompt: impl Into<String>) -> Self {
        GenerationRequest::Media {
            url: url.into(),
            prompt: prompt.into(),
        }
    }

    /// The prompt text of the request.
    pub fn prompt(&self) -> &str {
        match self {
            GenerationRequest::Text { prompt } | GenerationRequest::Media { prompt, .. } => prompt,
        }
    }
}

/// Which backend to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    /// Google Gemini (accepts video URLs).
    #[default]
    Gemini,
    /// OpenAI chat completions (text only).
    OpenAi,
}

impl GenerationProvider {
    /// Model used when the configuration does not name one.
    pub fn default_model(&self) -> &'static str {
        match self {
            GenerationProvider::Gemini => "gemini-2.5-flash",
            GenerationProvider::OpenAi => "gpt-4o-mini",
        }
    }
}

impl std::str::FromStr for GenerationProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(GenerationProvider::Gemini),
            "openai" => Ok(GenerationProvider::OpenAi),
            _ => Err(format!("Unknown generation provider: {}", s)),
        }
    }
}

impl std::fmt::Display for GenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationProvider::Gemini => write!(f, "gemini"),
            GenerationProvider::OpenAi => write!(f, "openai"),
        }
    }
}

/// Trait for generative-language backends.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Generate text for the request.
    async fn generate(&self, request: GenerationRequest) -> Result<String>;

    /// Whether the backend can take a media URL as input.
    fn supports_media(&self) -> bool;
}
