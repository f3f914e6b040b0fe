use crate::{models::{CollabError, DiagnosticsResponse}, services::auth_service::AuthUser, state::AppState};
use axum::{extract::{State, Extension}, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

/// Live room, connection and name cache counters
pub async fn diagnostics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<(StatusCode, Json<DiagnosticsResponse>), CollabError> {

    let (n_rooms, n_conn) = {
        let registry = state.rooms.lock().await;
        (registry.room_count() as u32, registry.connection_count() as u32)
    };
    let n_cached_names = state.names.entry_count();

    info!(
        "Diagnostics requested by {}: Conn: {}, Rooms: {}, Cached names: {}",
        user.user_id, n_conn, n_rooms, n_cached_names
    );

    Ok((
        StatusCode::OK,
        Json(DiagnosticsResponse {
            n_conn,
            n_rooms,
            n_cached_names,
        }),
    ))
}
