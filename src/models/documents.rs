use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Permission, ShareAccessLevel};

/// Response returned after creating a document
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentResponse {
    pub success: bool,
    pub id: Uuid,
}

/// One entry of the caller's document list
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: Uuid,
    pub title: String,
    pub owner: String,
    pub last_modified: DateTime<Utc>,
    pub user_permission: Permission,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct SeekerView {
    pub id: String,
    pub name: String,
}

/// A document as seen by one caller
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub owner: String,
    pub updated_at: DateTime<Utc>,
    pub user_permission: Permission,
    pub is_owner: bool,
    pub is_authorized_to_edit: bool,
    /// Pending access requests, only listed for the owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_seekers: Option<Vec<SeekerView>>,
}

/// Request payload for updating a document
#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
pub struct UpdateDocumentRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Request payload for granting edit access
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GrantAccessRequest {
    pub seeker_id: String,
}

/// Result of a seek or grant call
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub success: bool,
    /// Whether the call changed the stored lists
    pub changed: bool,
    pub permission: Permission,
}

/// Response returned after deleting a document
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct DocumentDeleteResponse {
    pub success: bool,
}

/// Optional body of a share-link request
#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinkRequest {
    #[serde(default)]
    pub access_level: ShareAccessLevel,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinkResponse {
    pub success: bool,
    pub message: String,
    pub share_link: String,
}
