use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::store::{DocStore, StoreError, UserDirectory};
use crate::models::{Document, Permission};

/// In-memory document store used for local development and tests.
#[derive(Default)]
pub struct MemoryDocStore {
    docs: RwLock<HashMap<Uuid, Document>>,
}

impl MemoryDocStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocStore for MemoryDocStore {
    async fn get(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        Ok(self.docs.read().await.get(&id).cloned())
    }

    async fn insert(&self, doc: &Document) -> Result<(), StoreError> {
        self.docs.write().await.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn update_content(
        &self,
        id: Uuid,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<Option<Document>, StoreError> {
        let mut docs = self.docs.write().await;
        let Some(doc) = docs.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = title {
            doc.title = title;
        }
        if let Some(content) = content {
            doc.content = content;
        }
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.docs.write().await.remove(&id).is_some())
    }

    async fn list_for_user(&self, uid: &str) -> Result<Vec<Document>, StoreError> {
        let docs = self.docs.read().await;
        let mut listed: Vec<Document> = docs
            .values()
            .filter(|d| d.permission_of(uid) != Permission::None)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(listed)
    }

    async fn add_seeker(&self, id: Uuid, uid: &str) -> Result<Option<bool>, StoreError> {
        let mut docs = self.docs.write().await;
        Ok(docs.get_mut(&id).map(|doc| doc.add_seeker(uid)))
    }

    async fn promote_seeker(&self, id: Uuid, uid: &str) -> Result<Option<bool>, StoreError> {
        let mut docs = self.docs.write().await;
        Ok(docs.get_mut(&id).map(|doc| doc.promote_seeker(uid)))
    }

    async fn set_share_token(&self, id: Uuid, token: &str, access_level: &str) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        let Some(doc) = docs.get_mut(&id) else {
            return Ok(false);
        };
        doc.share_token = Some(token.to_string());
        doc.share_access_level = Some(access_level.to_string());
        Ok(true)
    }
}

/// Fixed identity → name table. Unknown identities resolve to `None`.
#[derive(Default)]
pub struct StaticDirectory {
    names: RwLock<HashMap<String, String>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names<I, K, V>(names: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let names = names.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { names: RwLock::new(names) }
    }

    pub async fn set_name(&self, uid: &str, name: &str) {
        self.names.write().await.insert(uid.to_string(), name.to_string());
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn display_name(&self, uid: &str) -> Result<Option<String>, StoreError> {
        Ok(self.names.read().await.get(uid).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_only_includes_documents_with_a_tier() {
        let store = MemoryDocStore::new();
        let mine = Document::new("u1");
        let theirs = Document::new("u2");
        store.insert(&mine).await.unwrap();
        store.insert(&theirs).await.unwrap();
        store.add_seeker(theirs.id, "u1").await.unwrap();

        let listed = store.list_for_user("u1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(store.list_for_user("u3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn access_transitions_report_missing_documents() {
        let store = MemoryDocStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.add_seeker(id, "u1").await.unwrap(), None);
        assert_eq!(store.promote_seeker(id, "u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_keeps_unspecified_fields() {
        let store = MemoryDocStore::new();
        let doc = Document::new("u1");
        store.insert(&doc).await.unwrap();
        let updated = store
            .update_content(doc.id, None, Some("hello".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, doc.title);
        assert_eq!(updated.content, "hello");
    }
}
