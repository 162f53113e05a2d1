use std::future::Future;
use std::path::Path;
use tokio::sync::RwLock;

use crate::error::MatchError;
use crate::models::{Item, ItemType};

/// Source of items for matching
pub trait ItemRepository: Send + Sync {
    /// Every active item of `item_type`: the candidate pool for the other side
    fn active_items(&self, item_type: ItemType) -> impl Future<Output = Result<Vec<Item>, MatchError>> + Send;

    /// Every item reported by `user_email`
    fn items_for_user(&self, user_email: &str) -> impl Future<Output = Result<Vec<Item>, MatchError>> + Send;

    fn get(&self, item_id: &str) -> impl Future<Output = Result<Item, MatchError>> + Send;
}

/// In-memory item repository
#[derive(Debug, Default)]
pub struct InMemoryItems {
    items: RwLock<Vec<Item>>,
}

impl InMemoryItems {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Load a JSON array of items
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, MatchError> {
        let raw = std::fs::read_to_string(path)?;
        let items: Vec<Item> = serde_json::from_str(&raw)?;
        tracing::info!("Loaded {} items", items.len());
        Ok(Self::new(items))
    }

    pub async fn insert(&self, item: Item) {
        let mut items = self.items.write().await;
        items.retain(|existing| existing.id != item.id);
        items.push(item);
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Case-insensitive substring search over description and category,
    /// optionally limited to one item type. Newest first.
    pub async fn search(&self, query: &str, item_type: Option<ItemType>) -> Vec<Item> {
        let needle = query.trim().to_lowercase();
        let items = self.items.read().await;

        let mut results: Vec<Item> = items
            .iter()
            .filter(|item| item_type.map_or(true, |t| item.item_type == t))
            .filter(|item| {
                needle.is_empty()
                    || item.description.to_lowercase().contains(&needle)
                    || item.category.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results
    }
}

impl ItemRepository for InMemoryItems {
    async fn active_items(&self, item_type: ItemType) -> Result<Vec<Item>, MatchError> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| item.item_type == item_type && item.is_active())
            .cloned()
            .collect())
    }

    async fn items_for_user(&self, user_email: &str) -> Result<Vec<Item>, MatchError> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| item.user_email.eq_ignore_ascii_case(user_email))
            .cloned()
            .collect())
    }

    async fn get(&self, item_id: &str) -> Result<Item, MatchError> {
        let items = self.items.read().await;
        items
            .iter()
            .find(|item| item.id == item_id)
            .cloned()
            .ok_or_else(|| MatchError::NotFound(format!("item {}", item_id)))
    }
}
