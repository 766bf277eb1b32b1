//! API credentials, read once from the environment.

use crate::error::{Result, TubebriefError};
use crate::generation::GenerationProvider;

pub const YOUTUBE_API_KEY: &str = "YOUTUBE_API_KEY";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const LINE_CHANNEL_ACCESS_TOKEN: &str = "LINE_CHANNEL_ACCESS_TOKEN";
pub const LINE_USER_ID: &str = "LINE_USER_ID";
pub const NOTION_TOKEN: &str = "NOTION_TOKEN";
pub const NOTION_DATABASE_ID: &str = "NOTION_DATABASE_ID";

/// Secrets needed by the provider adapters.
///
/// Built at the process boundary and passed to constructors; nothing else
/// reads the environment.
#[derive(Clone, Default)]
pub struct Credentials {
    pub youtube_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub line_channel_access_token: Option<String>,
    pub line_user_id: Option<String>,
    pub notion_token: Option<String>,
    pub notion_database_id: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("youtube_api_key", &mask(&self.youtube_api_key))
            .field("gemini_api_key", &mask(&self.gemini_api_key))
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("line_channel_access_token", &mask(&self.line_channel_access_token))
            .field("line_user_id", &mask(&self.line_user_id))
            .field("notion_token", &mask(&self.notion_token))
            .field("notion_database_id", &mask(&self.notion_database_id))
            .finish()
    }
}

impl Credentials {
    /// Read credentials from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            youtube_api_key: get(YOUTUBE_API_KEY),
            gemini_api_key: get(GEMINI_API_KEY),
            openai_api_key: get(OPENAI_API_KEY),
            line_channel_access_token: get(LINE_CHANNEL_ACCESS_TOKEN),
            line_user_id: get(LINE_USER_ID),
            notion_token: get(NOTION_TOKEN),
            notion_database_id: get(NOTION_DATABASE_ID),
        }
    }

    fn value(&self, key: &str) -> Option<&str> {
        let value = match key {
            YOUTUBE_API_KEY => &self.youtube_api_key,
            GEMINI_API_KEY => &self.gemini_api_key,
            OPENAI_API_KEY => &self.openai_api_key,
            LINE_CHANNEL_ACCESS_TOKEN => &self.line_channel_access_token,
            LINE_USER_ID => &self.line_user_id,
            NOTION_TOKEN => &self.notion_token,
            NOTION_DATABASE_ID => &self.notion_database_id,
            _ => return None,
        };
        value.as_deref()
    }

    /// A credential that must be present.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.value(key)
            .ok_or_else(|| TubebriefError::Config(format!("{} is not set", key)))
    }

    /// Environment variable holding the key of a generation provider.
    pub fn generation_key_name(provider: GenerationProvider) -> &'static str {
        match provider {
            GenerationProvider::Gemini => GEMINI_API_KEY,
            GenerationProvider::OpenAi => OPENAI_API_KEY,
        }
    }

    /// Names of the credentials a run needs.
    ///
    /// A dry run only needs metadata and generation access.
    pub fn required_keys(dry_run: bool, provider: GenerationProvider) -> Vec<&'static str> {
        let mut keys = vec![YOUTUBE_API_KEY, Self::generation_key_name(provider)];
        if !dry_run {
            keys.extend([
                LINE_CHANNEL_ACCESS_TOKEN,
                LINE_USER_ID,
                NOTION_TOKEN,
                NOTION_DATABASE_ID,
            ]);
        }
        keys
    }

    /// Required credentials that are missing, in declaration order.
    pub fn missing(&self, dry_run: bool, provider: GenerationProvider) -> Vec<&'static str> {
        Self::required_keys(dry_run, provider)
            .into_iter()
            .filter(|key| self.value(key).is_none())
            .collect()
    }
}
