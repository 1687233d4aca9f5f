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

/// Fetch a document by id
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    params(
        ("id" = String, Path, description = "Document identifier")
    ),
    responses(
        (status = 200, description = "The document", body = DocumentRecord),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Server error", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn doc_get_doc() {}

/// Create a new document
#[utoipa::path(
    post,
    path = "/api/documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 200, description = "Document created", body = DocumentRecord),
        (status = 500, description = "Server error", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn doc_create_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        doc_get_doc,
        doc_create_doc,
    ),
    components(
        schemas(HealthResponse, DocumentRecord, CreateDocumentRequest, ErrorResponse)
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
