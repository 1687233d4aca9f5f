use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::DocumentRecord;
use crate::store::{ContentStore, StoreError};

/// In-memory content store.
///
/// Used when no database URL is configured and as the store for tests.
/// Contents do not survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<String, DocumentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError> {
        Ok(self.docs.read().await.get(id).cloned())
    }

    async fn create_if_absent(&self, id: &str, title: &str) -> Result<DocumentRecord, StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs
            .entry(id.to_string())
            .or_insert_with(|| DocumentRecord::new(id, title));
        Ok(doc.clone())
    }

    async fn update_content(&self, id: &str, content: &str) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        match docs.get_mut(id) {
            Some(doc) => {
                doc.content = content.to_string();
                doc.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert(&self, title: &str) -> Result<DocumentRecord, StoreError> {
        let doc = DocumentRecord::new(&Uuid::new_v4().to_string(), title);
        self.docs
            .write()
            .await
            .insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_TITLE;

    #[tokio::test]
    async fn create_if_absent_keeps_existing_record() {
        let store = MemoryStore::new();
        let first = store.create_if_absent("doc-1", DEFAULT_TITLE).await.unwrap();
        store.update_content("doc-1", "hello").await.unwrap();

        let second = store.create_if_absent("doc-1", "Other Title").await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.title, DEFAULT_TITLE);
        assert_eq!(second.content, "hello");
    }

    #[tokio::test]
    async fn update_content_reports_missing_documents() {
        let store = MemoryStore::new();
        assert!(!store.update_content("nope", "text").await.unwrap());

        store.create_if_absent("doc-1", DEFAULT_TITLE).await.unwrap();
        assert!(store.update_content("doc-1", "text").await.unwrap());
        let doc = store.fetch("doc-1").await.unwrap().unwrap();
        assert_eq!(doc.content, "text");
        assert!(doc.updated_at >= doc.created_at);
    }

    #[tokio::test]
    async fn insert_generates_fresh_ids() {
        let store = MemoryStore::new();
        let a = store.insert("Notes").await.unwrap();
        let b = store.insert("Notes").await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.content, "");
        assert_eq!(store.fetch(&a.id).await.unwrap().unwrap().title, "Notes");
    }
}
