pub mod db;
pub mod memory;

pub use db::PgStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::models::DocumentRecord;

/// Content store boundary.
///
/// The sync engine only reads and overwrites the content field of document
/// records; everything behind this trait is an external collaborator with
/// eventual persistence.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch a document by id.
    async fn fetch(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError>;

    /// Create a document with empty content unless one already exists for
    /// the id. Returns the record that survives, created or pre-existing.
    /// Must be atomic under concurrent calls for the same id: at most one
    /// record per id ever exists.
    async fn create_if_absent(&self, id: &str, title: &str) -> Result<DocumentRecord, StoreError>;

    /// Overwrite a document's content and bump its updated timestamp.
    /// Returns false when no record exists for the id.
    async fn update_content(&self, id: &str, content: &str) -> Result<bool, StoreError>;

    /// Insert a brand-new document under a generated id.
    async fn insert(&self, title: &str) -> Result<DocumentRecord, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}
