use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;
use uuid::Uuid;

use crate::models::DocumentRecord;
use crate::store::{ContentStore, StoreError};

const SELECT_DOCUMENT: &str =
    "SELECT id, title, content, created_at, updated_at FROM documents WHERE id = $1";

/// PostgreSQL-backed content store.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new database connection pool and make sure the documents
    /// table exists.
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600)) // Close idle connections after 10 minutes
            .max_lifetime(Duration::from_secs(1800)) // Recycle connections after 30 minutes
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;

        info!("Database connection pool created successfully");

        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
        "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn fetch(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError> {
        let doc = sqlx::query_as::<_, DocumentRecord>(SELECT_DOCUMENT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    async fn create_if_absent(&self, id: &str, title: &str) -> Result<DocumentRecord, StoreError> {
        // Insert and re-read in one transaction. ON CONFLICT DO NOTHING makes
        // concurrent first-joins converge on a single surviving record; the
        // follow-up select returns that record whichever writer won.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO documents (id, title, content) VALUES ($1, $2, '')
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(title)
        .execute(&mut *tx)
        .await?;

        let doc = sqlx::query_as::<_, DocumentRecord>(SELECT_DOCUMENT)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Document created or already present: {}", id);
        Ok(doc)
    }

    async fn update_content(&self, id: &str, content: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET content = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(content)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert(&self, title: &str) -> Result<DocumentRecord, StoreError> {
        let id = Uuid::new_v4().to_string();
        let doc = sqlx::query_as::<_, DocumentRecord>(
            "INSERT INTO documents (id, title, content) VALUES ($1, $2, '')
             RETURNING id, title, content, created_at, updated_at",
        )
        .bind(&id)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        info!("Document created: {}", doc.id);
        Ok(doc)
    }
}
