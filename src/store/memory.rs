//! In-memory document store.
//!
//! Useful for testing and dry experiments.

use super::{Block, DocumentStoreProvider, PageProperties, PageRef};
use crate::error::{Result, TubebriefError};
use async_trait::async_trait;
use std::sync::RwLock;
use uuid::Uuid;

/// A page held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
    pub id: String,
    pub properties: PageProperties,
    pub blocks: Vec<Block>,
    /// Number of property updates applied after creation.
    pub updates: usize,
}

/// In-memory document store.
pub struct MemoryStore {
    pages: RwLock<Vec<StoredPage>>,
}

impl MemoryStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self {
            pages: RwLock::new(Vec::new()),
        }
    }

    /// All pages in creation order.
    pub fn pages(&self) -> Vec<StoredPage> {
        self.pages.read().unwrap().clone()
    }

    pub fn page(&self, id: &str) -> Option<StoredPage> {
        self.pages.read().unwrap().iter().find(|p| p.id == id).cloned()
    }

    pub fn page_count(&self) -> usize {
        self.pages.read().unwrap().len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStoreProvider for MemoryStore {
    async fn create_page(&self, properties: &PageProperties, blocks: &[Block]) -> Result<PageRef> {
        let id = Uuid::new_v4().to_string();
        let mut pages = self.pages.write().unwrap();
        pages.push(StoredPage {
            id: id.clone(),
            properties: properties.clone(),
            blocks: blocks.to_vec(),
            updates: 0,
        });
        Ok(PageRef { id, url: None })
    }

    async fn update_page(&self, page_id: &str, properties: &PageProperties) -> Result<()> {
        let mut pages = self.pages.write().unwrap();
        let page = pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| TubebriefError::Persistence(format!("No page {}", page_id)))?;
        page.properties.merge(properties);
        page.updates += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PropertyValue;

    #[tokio::test]
    async fn test_create_and_update() {
        let store = MemoryStore::new();
        let properties = PageProperties::new().with("URL", PropertyValue::Url("u".to_string()));

        let page = store
            .create_page(&properties, &[Block::Divider])
            .await
            .unwrap();
        assert_eq!(store.page_count(), 1);

        let update = PageProperties::new().with("URL", PropertyValue::Url("v".to_string()));
        store.update_page(&page.id, &update).await.unwrap();

        let stored = store.page(&page.id).unwrap();
        assert_eq!(stored.properties.get("URL"), Some(&PropertyValue::Url("v".to_string())));
        assert_eq!(stored.updates, 1);
    }

    #[tokio::test]
    async fn test_update_unknown_page() {
        let store = MemoryStore::new();
        let result = store.update_page("missing", &PageProperties::new()).await;
        tokio_test::assert_err!(result);
    }
}
