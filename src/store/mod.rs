//! Document store abstraction for Tubebrief.
//!
//! Every processed video becomes one page: structured properties plus a body
//! built from the summary, line by line. Text is split into fragments of at
//! most [`MAX_RICH_TEXT_CHARS`] characters instead of being cut.

mod memory;
mod notion;

pub use memory::{MemoryStore, StoredPage};
pub use notion::NotionStore;

use crate::classifier::{Category, ClassificationResult};
use crate::config::StoreSettings;
use crate::error::{Result, TubebriefError};
use crate::video_source::{VideoMetadata, VideoReference};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Longest text a single rich-text fragment may hold.
pub const MAX_RICH_TEXT_CHARS: usize = 2000;

/// Split text into consecutive fragments of at most `max_chars` characters.
///
/// The fragments concatenate back to the input. Empty text yields no fragments.
pub fn split_rich_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// A body block of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Block {
    Heading(Vec<String>),
    Bullet(Vec<String>),
    Divider,
    Paragraph(Vec<String>),
}

impl Block {
    /// The full text of the block.
    pub fn text(&self) -> String {
        match self {
            Block::Heading(parts) | Block::Bullet(parts) | Block::Paragraph(parts) => {
                parts.concat()
            }
            Block::Divider => String::new(),
        }
    }
}

const BULLET_MARKERS: [&str; 3] = ["・", "- ", "• "];

fn is_divider(line: &str) -> bool {
    line == "---" || line.chars().all(|c| c == '─') || line.chars().all(|c| c == '━')
}

/// Map each non-blank summary line to a block.
pub fn build_summary_blocks(summary: &str) -> Vec<Block> {
    summary
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if line.starts_with('【') && line.contains('】') {
                return Block::Heading(split_rich_text(line, MAX_RICH_TEXT_CHARS));
            }
            if let Some(rest) = BULLET_MARKERS.iter().find_map(|m| line.strip_prefix(m)) {
                return Block::Bullet(split_rich_text(rest.trim(), MAX_RICH_TEXT_CHARS));
            }
            if is_divider(line) {
                return Block::Divider;
            }
            Block::Paragraph(split_rich_text(line, MAX_RICH_TEXT_CHARS))
        })
        .collect()
}

/// A typed page property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Title(Vec<String>),
    RichText(Vec<String>),
    Url(String),
    /// A `YYYY-MM-DD` date.
    Date(String),
    Select(String),
    ExternalFile { name: String, url: String },
}

/// Ordered page properties keyed by property name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageProperties {
    entries: Vec<(String, PropertyValue)>,
}

impl PageProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any previous value of the same name.
    pub fn set(&mut self, name: &str, value: PropertyValue) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn with(mut self, name: &str, value: PropertyValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge another set of properties into this one.
    pub fn merge(&mut self, other: &PageProperties) {
        for (name, value) in other.iter() {
            self.set(name, value.clone());
        }
    }
}

/// A created page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub id: String,
    pub url: Option<String>,
}

/// Fields of one persisted video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub published_date: Option<String>,
    pub thumbnail_url: Option<String>,
    pub channel: Option<String>,
    pub category: Option<Category>,
}

impl VideoRecord {
    pub fn new(
        reference: &VideoReference,
        metadata: &VideoMetadata,
        classification: &ClassificationResult,
    ) -> Self {
        Self {
            title: metadata.title.clone(),
            url: reference.url.clone(),
            summary: classification.summary.clone(),
            published_date: metadata.published_date().map(String::from),
            thumbnail_url: metadata.thumbnail().map(String::from),
            channel: metadata.channel().map(String::from),
            category: Some(classification.category),
        }
    }
}

/// Trait for document store backends.
#[async_trait]
pub trait DocumentStoreProvider: Send + Sync {
    /// Create a page with properties and body blocks.
    async fn create_page(&self, properties: &PageProperties, blocks: &[Block]) -> Result<PageRef>;

    /// Update properties of an existing page.
    async fn update_page(&self, page_id: &str, properties: &PageProperties) -> Result<()>;
}

/// Saves video records through a [`DocumentStoreProvider`].
pub struct PersistenceFacade {
    provider: Option<Arc<dyn DocumentStoreProvider>>,
    names: StoreSettings,
}

impl PersistenceFacade {
    pub fn new(provider: Arc<dyn DocumentStoreProvider>, names: StoreSettings) -> Self {
        Self {
            provider: Some(provider),
            names,
        }
    }

    /// A facade that can only run dry.
    pub fn disabled() -> Self {
        Self {
            provider: None,
            names: StoreSettings::default(),
        }
    }

    /// Page properties for a record, without the summary.
    pub fn record_properties(&self, record: &VideoRecord) -> PageProperties {
        let mut properties = PageProperties::new()
            .with(
                &self.names.title,
                PropertyValue::Title(split_rich_text(&record.title, MAX_RICH_TEXT_CHARS)),
            )
            .with(&self.names.url, PropertyValue::Url(record.url.clone()));

        if let Some(date) = record.published_date.as_deref().filter(|d| !d.is_empty()) {
            properties.set(&self.names.published, PropertyValue::Date(date.to_string()));
        }
        if let Some(url) = record.thumbnail_url.as_deref().filter(|u| !u.is_empty()) {
            properties.set(
                &self.names.thumbnail,
                PropertyValue::ExternalFile {
                    name: "thumbnail".to_string(),
                    url: url.to_string(),
                },
            );
        }
        if let Some(channel) = record.channel.as_deref().filter(|c| !c.is_empty()) {
            properties.set(&self.names.channel, PropertyValue::Select(channel.to_string()));
        }
        if let Some(category) = record.category {
            properties.set(
                &self.names.category,
                PropertyValue::Select(category.to_string()),
            );
        }

        properties
    }

    /// The summary as a rich-text property update.
    pub fn summary_properties(&self, summary: &str) -> PageProperties {
        PageProperties::new().with(
            &self.names.summary,
            PropertyValue::RichText(split_rich_text(summary, MAX_RICH_TEXT_CHARS)),
        )
    }

    /// Persist a record. Returns `None` on a dry run.
    ///
    /// The summary property is written by a follow-up update; a failure of
    /// that update is logged and does not fail the save.
    #[instrument(skip_all, fields(title = %record.title))]
    pub async fn save(&self, record: &VideoRecord, dry_run: bool) -> Result<Option<PageRef>> {
        let properties = self.record_properties(record);
        let blocks = build_summary_blocks(&record.summary);

        if dry_run {
            debug!(
                "Dry run: skipping page with {} properties and {} blocks",
                properties.len(),
                blocks.len()
            );
            return Ok(None);
        }

        let provider = self.provider.as_ref().ok_or_else(|| {
            TubebriefError::Persistence("No document store configured".to_string())
        })?;

        let page = provider
            .create_page(&properties, &blocks)
            .await
            .map_err(|e| match e {
                TubebriefError::Persistence(_) => e,
                other => TubebriefError::Persistence(other.to_string()),
            })?;
        info!("Created page {}", page.id);

        if let Err(e) = provider
            .update_page(&page.id, &self.summary_properties(&record.summary))
            .await
        {
            warn!("Skipped summary property update: {}", e);
        }

        Ok(Some(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> VideoRecord {
        VideoRecord {
            title: "Launch day".to_string(),
            url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            summary: "【概要】\nSomething shipped.\n・one\n".to_string(),
            published_date: Some("2026-10-16".to_string()),
            thumbnail_url: Some("https://i.ytimg.com/x.jpg".to_string()),
            channel: Some("Channel".to_string()),
            category: Some(Category::News),
        }
    }

    #[test]
    fn test_split_rich_text_counts() {
        for (len, max) in [(0, 7), (1, 7), (7, 7), (8, 7), (4500, 2000), (6000, 2000)] {
            let text: String = "é".repeat(len);
            let chunks = split_rich_text(&text, max);
            assert_eq!(chunks.len(), len.div_ceil(max), "len={} max={}", len, max);
            assert!(chunks.iter().all(|c| c.chars().count() <= max));
            assert_eq!(chunks.concat(), text);
        }
    }

    #[test]
    fn test_split_rich_text_mixed_width() {
        let text = "ab日本語cd";
        assert_eq!(split_rich_text(text, 3), vec!["ab日", "本語c", "d"]);
    }

    #[test]
    fn test_block_kinds() {
        let summary = "【概要】\n\nplain text\n・dot bullet\n- dash bullet\n• round bullet\n---\n────\n━━━\n【no close bracket\n";
        let blocks = build_summary_blocks(summary);

        assert_eq!(
            blocks,
            vec![
                Block::Heading(vec!["【概要】".to_string()]),
                Block::Paragraph(vec!["plain text".to_string()]),
                Block::Bullet(vec!["dot bullet".to_string()]),
                Block::Bullet(vec!["dash bullet".to_string()]),
                Block::Bullet(vec!["round bullet".to_string()]),
                Block::Divider,
                Block::Divider,
                Block::Divider,
                Block::Paragraph(vec!["【no close bracket".to_string()]),
            ]
        );
    }

    #[test]
    fn test_long_line_is_fragmented_not_cut() {
        let line = "x".repeat(4100);
        let blocks = build_summary_blocks(&line);
        match &blocks[0] {
            Block::Paragraph(parts) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(blocks[0].text(), line);
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_record_properties() {
        let facade = PersistenceFacade::disabled();
        let names = StoreSettings::default();
        let properties = facade.record_properties(&record());

        assert_eq!(
            properties.get(&names.title),
            Some(&PropertyValue::Title(vec!["Launch day".to_string()]))
        );
        assert_eq!(
            properties.get(&names.published),
            Some(&PropertyValue::Date("2026-10-16".to_string()))
        );
        assert_eq!(
            properties.get(&names.category),
            Some(&PropertyValue::Select("NEWS".to_string()))
        );
        assert!(properties.get(&names.summary).is_none());
    }

    #[test]
    fn test_optional_properties_omitted() {
        let facade = PersistenceFacade::disabled();
        let names = StoreSettings::default();
        let mut rec = record();
        rec.published_date = None;
        rec.thumbnail_url = Some(String::new());
        rec.channel = None;
        rec.category = None;

        let properties = facade.record_properties(&rec);
        assert_eq!(properties.len(), 2);
        assert!(properties.get(&names.published).is_none());
        assert!(properties.get(&names.thumbnail).is_none());
    }

    #[tokio::test]
    async fn test_save_dry_run_without_provider() {
        let facade = PersistenceFacade::disabled();
        let page = facade.save(&record(), true).await.unwrap();
        assert!(page.is_none());

        let err = facade.save(&record(), false).await.unwrap_err();
        assert_eq!(err.kind(), Some(crate::error::FailureKind::PersistenceFailure));
    }

    #[tokio::test]
    async fn test_save_writes_summary_by_update() {
        let store = Arc::new(MemoryStore::new());
        let facade = PersistenceFacade::new(store.clone(), StoreSettings::default());

        let page = facade.save(&record(), false).await.unwrap().unwrap();
        let stored = store.page(&page.id).unwrap();

        assert_eq!(stored.blocks.len(), 3);
        assert_eq!(stored.updates, 1);
        assert_eq!(
            stored.properties.get("要約"),
            Some(&PropertyValue::RichText(vec![
                "【概要】\nSomething shipped.\n・one\n".to_string()
            ]))
        );
    }
}
