use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::db::store::StoreError;

/// Response for an error
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub code: u16,
    pub status: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
        (status, Json(ErrorResponse {
            code: status.as_u16(),
            status: status.to_string(),
            error: error.into(),
        }))
    }
}

/// Failures surfaced by the collaboration core and the REST surface
#[derive(Debug, Error)]
pub enum CollabError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Document '{0}' not found")]
    DocumentNotFound(String),

    #[error("Invalid document id '{0}'")]
    InvalidDocumentId(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized: {0}")]
    Authorization(String),

    #[error("Server error: {0}")]
    Transient(String),
}

impl CollabError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CollabError::Authentication(_) => StatusCode::UNAUTHORIZED,
            CollabError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
            CollabError::InvalidDocumentId(_) | CollabError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CollabError::Authorization(_) => StatusCode::FORBIDDEN,
            CollabError::Transient(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for CollabError {
    fn from(e: StoreError) -> Self {
        CollabError::Transient(e.to_string())
    }
}

impl IntoResponse for CollabError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            CollabError::Transient(detail) => {
                // Details stay in the logs
                error!("Request failed: {}", detail);
                "An internal error occurred.".to_string()
            }
            other => other.to_string(),
        };
        ErrorResponse::new(status, message).into_response()
    }
}
