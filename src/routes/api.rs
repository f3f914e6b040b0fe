use crate::{handlers::*, routes::auth_middleware::auth_middleware, state::AppState};
use axum::{routing::{get, post}, Router, middleware};
use std::sync::Arc;

/// Create API routes
pub fn create_api_routes(state: Arc<AppState>) -> Router {
    let protected = Router::<Arc<AppState>>::new()
        .route("/documents", post(create_document).get(list_documents))
        .route(
            "/documents/:doc_id",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/documents/:doc_id/seek", post(seek_access))
        .route("/documents/:doc_id/grant", post(grant_access))
        .route("/documents/:doc_id/share", post(share_document))
        .route("/v1/diagnostics", get(diagnostics))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)); // Applies to all routes added above

    Router::<Arc<AppState>>::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .merge(protected)
        .with_state(state)
}
