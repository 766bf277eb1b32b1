//! Notion database backend.

use super::{Block, DocumentStoreProvider, PageProperties, PageRef, PropertyValue};
use crate::error::{Result, TubebriefError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
/// Most children a single create or append request may carry.
const MAX_BLOCKS_PER_REQUEST: usize = 100;

/// Pages in a Notion database.
pub struct NotionStore {
    client: reqwest::Client,
    token: String,
    database_id: String,
    base_url: String,
}

impl NotionStore {
    pub fn new(client: reqwest::Client, token: &str, database_id: &str) -> Self {
        Self {
            client,
            token: token.to_string(),
            database_id: database_id.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn rich_text(parts: &[String]) -> Value {
        Value::Array(
            parts
                .iter()
                .map(|p| json!({ "type": "text", "text": { "content": p } }))
                .collect(),
        )
    }

    fn property_json(value: &PropertyValue) -> Value {
        match value {
            PropertyValue::Title(parts) => json!({ "title": Self::rich_text(parts) }),
            PropertyValue::RichText(parts) => json!({ "rich_text": Self::rich_text(parts) }),
            PropertyValue::Url(url) => json!({ "url": url }),
            PropertyValue::Date(date) => json!({ "date": { "start": date } }),
            PropertyValue::Select(name) => json!({ "select": { "name": name } }),
            PropertyValue::ExternalFile { name, url } => json!({
                "files": [{ "type": "external", "name": name, "external": { "url": url } }]
            }),
        }
    }

    fn properties_json(properties: &PageProperties) -> Value {
        let map: Map<String, Value> = properties
            .iter()
            .map(|(name, value)| (name.to_string(), Self::property_json(value)))
            .collect();
        Value::Object(map)
    }

    fn block_json(block: &Block) -> Value {
        let (kind, parts) = match block {
            Block::Heading(parts) => ("heading_2", parts),
            Block::Bullet(parts) => ("bulleted_list_item", parts),
            Block::Paragraph(parts) => ("paragraph", parts),
            Block::Divider => {
                return json!({ "object": "block", "type": "divider", "divider": {} });
            }
        };
        let mut block = Map::new();
        block.insert("object".to_string(), json!("block"));
        block.insert("type".to_string(), json!(kind));
        block.insert(kind.to_string(), json!({ "rich_text": Self::rich_text(parts) }));
        Value::Object(block)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|e| TubebriefError::Persistence(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TubebriefError::Persistence(format!(
                "Notion API error ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TubebriefError::Persistence(e.to_string()))
    }

    async fn append_blocks(&self, page_id: &str, blocks: &[Block]) -> Result<()> {
        for batch in blocks.chunks(MAX_BLOCKS_PER_REQUEST) {
            let children: Vec<Value> = batch.iter().map(Self::block_json).collect();
            self.send(
                self.client
                    .patch(format!("{}/blocks/{}/children", self.base_url, page_id))
                    .json(&json!({ "children": children })),
            )
            .await?;
            debug!("Appended {} blocks", batch.len());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    id: String,
    url: Option<String>,
}

#[async_trait]
impl DocumentStoreProvider for NotionStore {
    #[instrument(skip_all, fields(blocks = blocks.len()))]
    async fn create_page(&self, properties: &PageProperties, blocks: &[Block]) -> Result<PageRef> {
        let split = blocks.len().min(MAX_BLOCKS_PER_REQUEST);
        let (first, rest) = blocks.split_at(split);

        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": Self::properties_json(properties),
            "children": first.iter().map(Self::block_json).collect::<Vec<_>>(),
        });

        let value = self
            .send(self.client.post(format!("{}/pages", self.base_url)).json(&body))
            .await?;
        let page: PageResponse = serde_json::from_value(value)
            .map_err(|e| TubebriefError::Persistence(e.to_string()))?;

        if !rest.is_empty() {
            self.append_blocks(&page.id, rest).await?;
        }

        Ok(PageRef {
            id: page.id,
            url: page.url,
        })
    }

    #[instrument(skip(self, properties))]
    async fn update_page(&self, page_id: &str, properties: &PageProperties) -> Result<()> {
        self.send(
            self.client
                .patch(format!("{}/pages/{}", self.base_url, page_id))
                .json(&json!({ "properties": Self::properties_json(properties) })),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_json() {
        let properties = PageProperties::new()
            .with("タイトル", PropertyValue::Title(vec!["a".to_string(), "b".to_string()]))
            .with("公開日", PropertyValue::Date("2026-10-16".to_string()))
            .with(
                "サムネイル",
                PropertyValue::ExternalFile {
                    name: "thumbnail".to_string(),
                    url: "https://i.ytimg.com/x.jpg".to_string(),
                },
            )
            .with("チャンネル名", PropertyValue::Select("Channel".to_string()));

        let value = NotionStore::properties_json(&properties);
        assert_eq!(value["タイトル"]["title"][1]["text"]["content"], "b");
        assert_eq!(value["公開日"]["date"]["start"], "2026-10-16");
        assert_eq!(
            value["サムネイル"]["files"][0]["external"]["url"],
            "https://i.ytimg.com/x.jpg"
        );
        assert_eq!(value["チャンネル名"]["select"]["name"], "Channel");
    }

    #[test]
    fn test_block_json() {
        let heading = NotionStore::block_json(&Block::Heading(vec!["【概要】".to_string()]));
        assert_eq!(heading["type"], "heading_2");
        assert_eq!(heading["heading_2"]["rich_text"][0]["text"]["content"], "【概要】");

        let bullet = NotionStore::block_json(&Block::Bullet(vec!["x".to_string()]));
        assert_eq!(bullet["type"], "bulleted_list_item");

        let divider = NotionStore::block_json(&Block::Divider);
        assert_eq!(divider["type"], "divider");
        assert!(divider["divider"].as_object().unwrap().is_empty());
    }
}
