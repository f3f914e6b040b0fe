use std::sync::Arc;

use axum::{extract::State, Json};
use crate::models::HealthResponse;
use crate::state::AppState;
use tracing::debug;

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}

/// Readiness check endpoint
pub async fn ready_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Readiness check requested");
    let (rooms, connections) = {
        let registry = state.rooms.lock().await;
        (registry.room_count(), registry.connection_count())
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        message: format!("Service is ready ({} rooms, {} connections)", rooms, connections),
    })
}
