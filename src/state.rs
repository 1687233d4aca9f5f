use std::sync::Arc;

use crate::store::ContentStore;
use crate::ws::rooms::RoomRegistry;

/// Shared application state.
///
/// Owns the room/presence registry and the content store for the lifetime of
/// the server. Handed to every route via axum's `State` extractor.
pub struct AppState {
    pub registry: RoomRegistry,
    pub store: Arc<dyn ContentStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            registry: RoomRegistry::new(),
            store,
        }
    }
}
