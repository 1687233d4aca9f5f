use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{doc_create, doc_get, health_check, ready_check};
use crate::state::AppState;
use crate::ws::handler::websocket_handler;

/// Create API routes
pub fn create_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/documents", post(doc_create))
        .route("/documents/:id", get(doc_get))
        .with_state(state)
}

/// Create the WebSocket route serving the sync protocol
pub fn create_ws_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .with_state(state)
}
