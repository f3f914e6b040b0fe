use utoipa::OpenApi;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/api/ready",
    responses(
        (status = 200, description = "Service is ready, with live room and connection counts", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Create a new document owned by the caller
#[utoipa::path(
    post,
    path = "/api/documents",
    responses(
        (status = 201, description = "Document created", body = CreateDocumentResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_document_doc() {}

/// List documents the caller owns, edits or seeks
#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "Documents visible to the caller", body = [DocumentSummary]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn list_documents_doc() {}

/// Fetch a document
#[utoipa::path(
    get,
    path = "/api/documents/{doc_id}",
    params(("doc_id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document as seen by the caller", body = DocumentView),
        (status = 400, description = "Invalid document id", body = ErrorResponse),
        (status = 403, description = "Caller has no access", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_document_doc() {}

/// Overwrite a document's title and content
#[utoipa::path(
    put,
    path = "/api/documents/{doc_id}",
    params(("doc_id" = String, Path, description = "Document id")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Document updated", body = DocumentView),
        (status = 403, description = "Caller cannot edit", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn update_document_doc() {}

/// Delete a document
#[utoipa::path(
    delete,
    path = "/api/documents/{doc_id}",
    params(("doc_id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document deleted", body = DocumentDeleteResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn delete_document_doc() {}

/// Request edit access
#[utoipa::path(
    post,
    path = "/api/documents/{doc_id}/seek",
    params(("doc_id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Caller's permission after the request", body = AccessResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn seek_access_doc() {}

/// Grant edit access to a seeker
#[utoipa::path(
    post,
    path = "/api/documents/{doc_id}/grant",
    params(("doc_id" = String, Path, description = "Document id")),
    request_body = GrantAccessRequest,
    responses(
        (status = 200, description = "Seeker's permission after the grant", body = AccessResponse),
        (status = 403, description = "Caller cannot edit", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn grant_access_doc() {}

/// Generate a share link for a document
#[utoipa::path(
    post,
    path = "/api/documents/{doc_id}/share",
    params(("doc_id" = String, Path, description = "Document id")),
    request_body(content = ShareLinkRequest, description = "Optional; defaults to a viewer link"),
    responses(
        (status = 200, description = "Share link generated", body = ShareLinkResponse),
        (status = 400, description = "Invalid document id or body", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn share_document_doc() {}

/// Realtime counters
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Room, connection and name cache counters", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        ready_check_doc,
        create_document_doc,
        list_documents_doc,
        get_document_doc,
        update_document_doc,
        delete_document_doc,
        seek_access_doc,
        grant_access_doc,
        share_document_doc,
        diagnostics_doc,
    ),
    components(
        schemas(
            HealthResponse, ErrorResponse, DiagnosticsResponse, Permission,
            CreateDocumentResponse, DocumentSummary, DocumentView, SeekerView,
            UpdateDocumentRequest, GrantAccessRequest, AccessResponse, DocumentDeleteResponse,
            ShareAccessLevel, ShareLinkRequest, ShareLinkResponse
        )
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
