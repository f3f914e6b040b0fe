use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::models::CollabError;
use crate::services::auth_service::{get_auth_token, AuthUser};
use crate::state::AppState;

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, CollabError> {
    // 1. Get the auth token from the request
    let token = get_auth_token(&req).map_err(|e| {
        debug!("No credential on {}: {}", req.uri().path(), e);
        CollabError::Authentication("Token missing.".to_string())
    })?;

    // 2. Validate it and extract the user id
    let user_id = state.authenticator.authenticate(&token)?;

    // 3. Hand the identity to downstream handlers
    req.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(req).await)
}
