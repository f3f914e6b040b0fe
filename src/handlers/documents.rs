use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::auth;
use crate::models::{
    CollabError, CreateDocumentResponse, Document, DocumentDeleteResponse, DocumentSummary,
    DocumentView, SeekerView, ShareLinkRequest, ShareLinkResponse, UpdateDocumentRequest,
};
use crate::services::auth_service::AuthUser;
use crate::state::AppState;

pub(crate) fn parse_doc_id(doc_id: &str) -> Result<Uuid, CollabError> {
    Uuid::parse_str(doc_id).map_err(|e| {
        error!("Invalid document UUID '{}': {}", doc_id, e);
        CollabError::InvalidDocumentId(doc_id.to_string())
    })
}

pub(crate) async fn load_document(state: &AppState, doc_id: Uuid) -> Result<Document, CollabError> {
    state
        .store
        .get(doc_id)
        .await?
        .ok_or_else(|| CollabError::DocumentNotFound(doc_id.to_string()))
}

/// Create an empty document owned by the caller
pub async fn create_document(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<(StatusCode, Json<CreateDocumentResponse>), CollabError> {
    let doc = Document::new(&user.user_id);
    state.store.insert(&doc).await?;
    info!("User {} created document {}", user.user_id, doc.id);

    Ok((
        StatusCode::CREATED,
        Json(CreateDocumentResponse { success: true, id: doc.id }),
    ))
}

/// List the documents the caller owns, edits or has asked to edit
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<(StatusCode, Json<Vec<DocumentSummary>>), CollabError> {
    let docs = state.store.list_for_user(&user.user_id).await?;
    let summaries = docs
        .into_iter()
        .map(|doc| DocumentSummary {
            user_permission: doc.permission_of(&user.user_id),
            id: doc.id,
            title: doc.title,
            owner: doc.owner,
            last_modified: doc.updated_at,
        })
        .collect();

    Ok((StatusCode::OK, Json(summaries)))
}

/// Fetch one document. Pending seekers are only listed for the owner.
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(doc_id): Path<String>,
) -> Result<(StatusCode, Json<DocumentView>), CollabError> {
    let doc_uuid = parse_doc_id(&doc_id)?;
    let doc = load_document(&state, doc_uuid).await?;
    let permission = auth::ensure_reader(&doc, &user.user_id)?;
    let is_owner = auth::is_owner(&doc, &user.user_id);

    let doc_seekers = if is_owner {
        let mut seekers = Vec::with_capacity(doc.seekers.len());
        for id in &doc.seekers {
            let name = state.names.resolve(id).await;
            seekers.push(SeekerView { id: id.clone(), name });
        }
        Some(seekers)
    } else {
        None
    };

    Ok((
        StatusCode::OK,
        Json(DocumentView {
            is_authorized_to_edit: auth::can_write(&doc, &user.user_id),
            id: doc.id,
            title: doc.title,
            content: doc.content,
            owner: doc.owner,
            updated_at: doc.updated_at,
            user_permission: permission,
            is_owner,
            doc_seekers,
        }),
    ))
}

/// Overwrite title and/or content. Concurrent writers: last one wins.
pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(doc_id): Path<String>,
    Json(request): Json<UpdateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentView>), CollabError> {
    let doc_uuid = parse_doc_id(&doc_id)?;
    let doc = load_document(&state, doc_uuid).await?;
    let permission = auth::ensure_writer(&doc, &user.user_id)?;

    let updated = state
        .store
        .update_content(doc_uuid, request.title, request.content)
        .await?
        .ok_or_else(|| CollabError::DocumentNotFound(doc_id.clone()))?;
    info!("User {} updated document {}", user.user_id, doc_id);

    Ok((
        StatusCode::OK,
        Json(DocumentView {
            is_owner: auth::is_owner(&updated, &user.user_id),
            id: updated.id,
            title: updated.title,
            content: updated.content,
            owner: updated.owner,
            updated_at: updated.updated_at,
            user_permission: permission,
            is_authorized_to_edit: true,
            doc_seekers: None,
        }),
    ))
}

/// Delete a document. Only the owner may do this.
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(doc_id): Path<String>,
) -> Result<(StatusCode, Json<DocumentDeleteResponse>), CollabError> {
    let doc_uuid = parse_doc_id(&doc_id)?;
    let doc = load_document(&state, doc_uuid).await?;
    auth::ensure_owner(&doc, &user.user_id, "delete")?;

    if !state.store.delete(doc_uuid).await? {
        return Err(CollabError::DocumentNotFound(doc_id));
    }
    info!("Document '{}' deleted by {}", doc_id, user.user_id);

    Ok((StatusCode::OK, Json(DocumentDeleteResponse { success: true })))
}

/// Generate a fresh share link for a document. Only the owner may do this;
/// an earlier link stops being the document's current one.
pub async fn share_document(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(doc_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ShareLinkResponse>), CollabError> {
    // The body is optional; an empty one asks for a viewer link
    let request: ShareLinkRequest = if body.is_empty() {
        ShareLinkRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| CollabError::InvalidRequest(e.to_string()))?
    };

    let doc_uuid = parse_doc_id(&doc_id)?;
    let doc = load_document(&state, doc_uuid).await?;
    auth::ensure_owner(&doc, &user.user_id, "share")?;

    // 32 hex characters from a random v4 uuid
    let token = Uuid::new_v4().simple().to_string();
    if !state
        .store
        .set_share_token(doc_uuid, &token, request.access_level.as_str())
        .await?
    {
        return Err(CollabError::DocumentNotFound(doc_id));
    }
    info!(
        "User {} generated a {} share link for {}",
        user.user_id,
        request.access_level.as_str(),
        doc_id
    );

    Ok((
        StatusCode::OK,
        Json(ShareLinkResponse {
            success: true,
            message: "Shareable link generated.".to_string(),
            share_link: state.config.share_link(&token),
        }),
    ))
}
