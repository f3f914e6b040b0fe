use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "Untitled Document";

/// A persisted document together with its authorization lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub owner: String,
    pub editors: Vec<String>,
    pub seekers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Token of the current share link, if one was generated
    pub share_token: Option<String>,
    pub share_access_level: Option<String>,
}

/// Permission tier of one identity on one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Owner,
    Editor,
    Seeker,
    None,
}

/// Access a share link is meant to hand out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ShareAccessLevel {
    #[default]
    Viewer,
    Editor,
}

impl ShareAccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ShareAccessLevel::Viewer => "viewer",
            ShareAccessLevel::Editor => "editor",
        }
    }
}

impl Document {
    /// A fresh document. The owner is listed as an editor from the start.
    pub fn new(owner: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: DEFAULT_TITLE.to_string(),
            content: String::new(),
            owner: owner.to_string(),
            editors: vec![owner.to_string()],
            seekers: Vec::new(),
            created_at: now,
            updated_at: now,
            share_token: None,
            share_access_level: None,
        }
    }

    pub fn permission_of(&self, uid: &str) -> Permission {
        if self.owner == uid {
            Permission::Owner
        } else if self.editors.iter().any(|e| e == uid) {
            Permission::Editor
        } else if self.seekers.iter().any(|s| s == uid) {
            Permission::Seeker
        } else {
            Permission::None
        }
    }

    /// Record an edit-access request. Returns false when nothing changed.
    pub fn add_seeker(&mut self, uid: &str) -> bool {
        if self.permission_of(uid) != Permission::None {
            return false;
        }
        self.seekers.push(uid.to_string());
        true
    }

    /// Move `uid` from seekers to editors. Returns false when `uid` was not a seeker.
    pub fn promote_seeker(&mut self, uid: &str) -> bool {
        let before = self.seekers.len();
        self.seekers.retain(|s| s != uid);
        if self.seekers.len() == before {
            return false;
        }
        if !self.editors.iter().any(|e| e == uid) {
            self.editors.push(uid.to_string());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_lists_owner_as_editor() {
        let doc = Document::new("u1");
        assert_eq!(doc.title, DEFAULT_TITLE);
        assert_eq!(doc.editors, vec!["u1".to_string()]);
        assert_eq!(doc.permission_of("u1"), Permission::Owner);
    }

    #[test]
    fn owner_keeps_rights_without_editor_entry() {
        let mut doc = Document::new("u1");
        doc.editors.clear();
        assert_eq!(doc.permission_of("u1"), Permission::Owner);
    }

    #[test]
    fn seeking_is_idempotent_and_skips_editors() {
        let mut doc = Document::new("u1");
        assert!(doc.add_seeker("u2"));
        assert!(!doc.add_seeker("u2"));
        assert!(!doc.add_seeker("u1"));
        assert_eq!(doc.seekers, vec!["u2".to_string()]);
    }

    #[test]
    fn promotion_moves_seeker_exactly_once() {
        let mut doc = Document::new("u1");
        doc.add_seeker("u2");
        assert!(doc.promote_seeker("u2"));
        assert!(!doc.promote_seeker("u2"));
        assert!(doc.seekers.is_empty());
        assert_eq!(doc.editors.iter().filter(|e| *e == "u2").count(), 1);
        assert_eq!(doc.permission_of("u2"), Permission::Editor);
    }

    #[test]
    fn promoting_a_stranger_changes_nothing() {
        let mut doc = Document::new("u1");
        let before = doc.clone();
        assert!(!doc.promote_seeker("u9"));
        assert_eq!(doc, before);
    }
}
