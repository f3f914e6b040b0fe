use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Document;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("user service error: {0}")]
    UserService(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Persistence collaborator for documents.
///
/// `add_seeker` and `promote_seeker` must each apply as one atomic step so a
/// concurrent seek and grant cannot leave an identity in both lists.
#[async_trait]
pub trait DocStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Document>, StoreError>;

    async fn insert(&self, doc: &Document) -> Result<(), StoreError>;

    /// Overwrite title and content. Returns the stored document, or `None` if it is gone.
    async fn update_content(
        &self,
        id: Uuid,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<Option<Document>, StoreError>;

    /// Returns false when no document was deleted
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Documents where `uid` is owner, editor or seeker, most recently updated first
    async fn list_for_user(&self, uid: &str) -> Result<Vec<Document>, StoreError>;

    /// Add `uid` to seekers unless it already holds any tier.
    /// Returns `None` when the document does not exist, otherwise whether it changed.
    async fn add_seeker(&self, id: Uuid, uid: &str) -> Result<Option<bool>, StoreError>;

    /// Move `uid` from seekers to editors.
    /// Returns `None` when the document does not exist, otherwise whether it changed.
    async fn promote_seeker(&self, id: Uuid, uid: &str) -> Result<Option<bool>, StoreError>;

    /// Replace the document's share token. Returns false when the document does not exist.
    async fn set_share_token(&self, id: Uuid, token: &str, access_level: &str) -> Result<bool, StoreError>;
}

/// Resolves an identity to its display name
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, uid: &str) -> Result<Option<String>, StoreError>;
}
