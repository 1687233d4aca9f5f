use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed palette for participant colors. Picks are uniformly random per
/// join; collisions are permitted.
pub const PALETTE: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9",
];

/// A room member's externally visible status.
///
/// Cursor and selection are opaque JSON values owned by the client; the
/// server stores the last seen value and relays it unchanged. The selection
/// field only appears on the wire once a selection event has been received,
/// while the cursor is always present (null until the first update).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presence {
    pub id: String,
    pub name: String,
    pub color: String,
    pub cursor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Value>,
}

impl Presence {
    /// Presence for a session that just joined a room: display name derived
    /// from the session id, color picked at random from the palette.
    pub fn new(session_id: &str) -> Self {
        let prefix = session_id.get(..6).unwrap_or(session_id);
        Self {
            id: session_id.to_string(),
            name: format!("User {}", prefix),
            color: random_color().to_string(),
            cursor: None,
            selection: None,
        }
    }
}

fn random_color() -> &'static str {
    PALETTE[rand::thread_rng().gen_range(0..PALETTE.len())]
}
