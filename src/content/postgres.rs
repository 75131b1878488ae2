use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::info;

use super::model::ContentRecord;
use super::store::{validate_key, ContentStore, StoreError};

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS "site_content" (
    "key" TEXT PRIMARY KEY,
    "content" JSONB NOT NULL DEFAULT '{}'::jsonb,
    "published" BOOLEAN NOT NULL DEFAULT FALSE,
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;

const SELECT_SQL: &str =
    r#"SELECT "key", "content", "published", "updated_at" FROM "site_content" WHERE "key" = $1"#;

const UPSERT_SQL: &str = r#"
INSERT INTO "site_content" ("key", "content", "published", "updated_at")
VALUES ($1, $2, $3, now())
ON CONFLICT ("key") DO UPDATE
SET "content" = EXCLUDED."content",
    "published" = EXCLUDED."published",
    "updated_at" = now()
RETURNING "key", "content", "published", "updated_at""#;

/// Content store backed by a single Postgres table
#[derive(Debug, Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(
        url: &str,
        max_connections: u32,
        connection_timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connection_timeout_secs))
            .connect(url)
            .await?;
        info!("Connected content store pool (max {} connections)", max_connections);
        Ok(Self::new(pool))
    }

    /// Create the content table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn record_from_row(row: &PgRow) -> Result<ContentRecord, StoreError> {
        let content: Json<Value> = row.try_get("content")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
        Ok(ContentRecord {
            key: row.try_get("key")?,
            content: content.0,
            published: row.try_get("published")?,
            updated_at,
        })
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn get(&self, key: &str) -> Result<Option<ContentRecord>, StoreError> {
        validate_key(key)?;
        let row = sqlx::query(SELECT_SQL)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::record_from_row).transpose()
    }

    async fn upsert(
        &self,
        key: &str,
        content: Value,
        published: bool,
    ) -> Result<ContentRecord, StoreError> {
        validate_key(key)?;
        let row = sqlx::query(UPSERT_SQL)
            .bind(key)
            .bind(Json(content))
            .bind(published)
            .fetch_one(&self.pool)
            .await?;
        Self::record_from_row(&row)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
