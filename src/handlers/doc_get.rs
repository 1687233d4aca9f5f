use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::error;

use crate::models::{DocumentRecord, ErrorResponse};
use crate::state::AppState;

/// Fetch a document by id
pub async fn doc_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DocumentRecord>, (StatusCode, Json<ErrorResponse>)> {
    match state.store.fetch(&id).await {
        Ok(Some(doc)) => Ok(Json(doc)),
        Ok(None) => {
            let status = StatusCode::NOT_FOUND;
            Err((status, Json(ErrorResponse::new(status, "Document not found"))))
        }
        Err(e) => {
            error!("Error fetching document '{}': {}", id, e);
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            Err((status, Json(ErrorResponse::new(status, "Server error"))))
        }
    }
}
