use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::handlers::documents::parse_doc_id;
use crate::models::{AccessResponse, CollabError, GrantAccessRequest};
use crate::services::access_service::{self, AccessOutcome};
use crate::services::auth_service::AuthUser;
use crate::state::AppState;

fn respond(outcome: AccessOutcome) -> (StatusCode, Json<AccessResponse>) {
    (
        StatusCode::OK,
        Json(AccessResponse {
            success: true,
            changed: outcome.changed,
            permission: outcome.permission,
        }),
    )
}

/// Ask the owner for edit rights on a document
pub async fn seek_access(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(doc_id): Path<String>,
) -> Result<(StatusCode, Json<AccessResponse>), CollabError> {
    let doc_uuid = parse_doc_id(&doc_id)?;
    let outcome = access_service::seek_edit_access(state.store.as_ref(), doc_uuid, &user.user_id).await?;
    Ok(respond(outcome))
}

/// Promote a seeker to editor
pub async fn grant_access(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(doc_id): Path<String>,
    Json(request): Json<GrantAccessRequest>,
) -> Result<(StatusCode, Json<AccessResponse>), CollabError> {
    let doc_uuid = parse_doc_id(&doc_id)?;
    let outcome = access_service::grant_edit_access(
        state.store.as_ref(),
        doc_uuid,
        &user.user_id,
        &request.seeker_id,
    )
    .await?;
    Ok(respond(outcome))
}
