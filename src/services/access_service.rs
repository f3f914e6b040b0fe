use tracing::info;
use uuid::Uuid;

use crate::auth::auth;
use crate::db::store::DocStore;
use crate::models::{CollabError, Permission};

/// Result of a seek or grant call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessOutcome {
    /// Whether the stored lists changed
    pub changed: bool,
    /// Tier of the affected identity afterwards
    pub permission: Permission,
}

/// Ask for edit rights. Owners, editors and existing seekers are left untouched.
pub async fn seek_edit_access(
    store: &dyn DocStore,
    doc_id: Uuid,
    uid: &str,
) -> Result<AccessOutcome, CollabError> {
    let changed = store
        .add_seeker(doc_id, uid)
        .await?
        .ok_or_else(|| CollabError::DocumentNotFound(doc_id.to_string()))?;

    let permission = if changed {
        info!("User {} requested edit access to {}", uid, doc_id);
        Permission::Seeker
    } else {
        current_permission(store, doc_id, uid).await?
    };

    Ok(AccessOutcome { changed, permission })
}

/// Promote `seeker` to editor. The caller needs write access to the document;
/// granting to someone who never asked is a no-op.
pub async fn grant_edit_access(
    store: &dyn DocStore,
    doc_id: Uuid,
    caller: &str,
    seeker: &str,
) -> Result<AccessOutcome, CollabError> {
    let doc = store
        .get(doc_id)
        .await?
        .ok_or_else(|| CollabError::DocumentNotFound(doc_id.to_string()))?;

    auth::ensure_writer(&doc, caller)?;

    // Write access is never revoked, so the check above still holds here
    let changed = store
        .promote_seeker(doc_id, seeker)
        .await?
        .ok_or_else(|| CollabError::DocumentNotFound(doc_id.to_string()))?;

    let permission = if changed {
        info!("User {} granted edit access on {} to {}", caller, doc_id, seeker);
        Permission::Editor
    } else {
        // Another grant may have landed since `doc` was read
        current_permission(store, doc_id, seeker).await?
    };

    Ok(AccessOutcome { changed, permission })
}

async fn current_permission(
    store: &dyn DocStore,
    doc_id: Uuid,
    uid: &str,
) -> Result<Permission, CollabError> {
    store
        .get(doc_id)
        .await?
        .map(|doc| doc.permission_of(uid))
        .ok_or_else(|| CollabError::DocumentNotFound(doc_id.to_string()))
}
