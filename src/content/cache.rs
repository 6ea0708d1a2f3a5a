//! Per-topic card lists in the key-value store (`content.{topic-id}`)

use std::sync::Arc;

use super::models::ContentItem;
use crate::storage::{KvStore, StorageError};

#[derive(Clone)]
pub struct ContentCache {
    store: Arc<KvStore>,
}

impl ContentCache {
    pub fn new(store: Arc<KvStore>) -> Self {
        Self { store }
    }

    fn key(topic_id: &str) -> String {
        format!("content.{}", topic_id)
    }

    /// Stored cards for a topic. Missing or unreadable data yields an empty list.
    pub fn load(&self, topic_id: &str) -> Vec<ContentItem> {
        match self.store.get_json::<Vec<ContentItem>>(&Self::key(topic_id)) {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Ignoring unreadable content cache for {}: {}", topic_id, e);
                Vec::new()
            }
        }
    }

    /// Overwrite the full list for a topic
    pub fn save(&self, topic_id: &str, items: &[ContentItem]) -> Result<(), StorageError> {
        self.store.set_json(&Self::key(topic_id), items)
    }

    pub fn count(&self, topic_id: &str) -> usize {
        self.load(topic_id).len()
    }

    pub fn clear(&self, topic_id: &str) -> Result<(), StorageError> {
        self.store.remove(&Self::key(topic_id))
    }
}
