use crate::models::{CollabError, Document, Permission};

pub fn can_read(doc: &Document, uid: &str) -> bool {
    doc.permission_of(uid) != Permission::None
}

pub fn can_write(doc: &Document, uid: &str) -> bool {
    matches!(doc.permission_of(uid), Permission::Owner | Permission::Editor)
}

pub fn is_owner(doc: &Document, uid: &str) -> bool {
    doc.owner == uid
}

pub fn ensure_reader(doc: &Document, uid: &str) -> Result<Permission, CollabError> {
    if can_read(doc, uid) {
        return Ok(doc.permission_of(uid));
    }
    Err(CollabError::Authorization("Unauthorized access to document.".to_string()))
}

pub fn ensure_writer(doc: &Document, uid: &str) -> Result<Permission, CollabError> {
    if can_write(doc, uid) {
        return Ok(doc.permission_of(uid));
    }
    Err(CollabError::Authorization(
        "Only owners and editors can modify this document.".to_string(),
    ))
}

/// `action` completes "Only the owner can ... this document."
pub fn ensure_owner(doc: &Document, uid: &str, action: &str) -> Result<(), CollabError> {
    if is_owner(doc, uid) {
        return Ok(());
    }
    Err(CollabError::Authorization(format!(
        "Only the owner can {} this document.",
        action
    )))
}
