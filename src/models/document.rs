use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Title given to documents created on first join.
pub const DEFAULT_TITLE: &str = "Untitled Document";

/// A persisted document record.
///
/// The content field is a single opaque text blob; the server relays and
/// overwrites it without interpreting its format.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Fresh record with empty content and both timestamps set to now.
    pub fn new(id: &str, title: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            title: title.to_string(),
            content: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request body for creating a document
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDocumentRequest {
    pub title: Option<String>,
}
