use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use crate::models::{CreateDocumentRequest, DocumentRecord, ErrorResponse, DEFAULT_TITLE};
use crate::state::AppState;

/// Create a new document with a generated id and empty content
pub async fn doc_create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateDocumentRequest>,
) -> Result<Json<DocumentRecord>, (StatusCode, Json<ErrorResponse>)> {
    let title = payload.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
    match state.store.insert(&title).await {
        Ok(doc) => Ok(Json(doc)),
        Err(e) => {
            error!("Error creating document: {}", e);
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            Err((status, Json(ErrorResponse::new(status, "Server error"))))
        }
    }
}
