//! Configuration module for Tubebrief.
//!
//! Handles loading settings, prompt templates and credentials.

mod credentials;
mod prompts;
mod settings;

pub use credentials::Credentials;
pub use prompts::{ClassifyPrompts, DigestPrompts, Prompts, SummarizePrompts};
pub use settings::{
    ContentStrategy, DigestSettings, GenerationSettings, PipelineSettings, PostAction,
    PromptSettings, Settings, StoreSettings, TranscriptSettings,
};

/// Names of the credential environment variables.
pub mod keys {
    pub use super::credentials::{
        GEMINI_API_KEY, LINE_CHANNEL_ACCESS_TOKEN, LINE_USER_ID, NOTION_DATABASE_ID,
        NOTION_TOKEN, OPENAI_API_KEY, YOUTUBE_API_KEY,
    };
}
