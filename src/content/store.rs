use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use super::model::ContentRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Content store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid content key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Backing store for content documents, one row per content key.
///
/// `upsert` replaces the whole `content` value; the store maintains `updated_at`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<ContentRecord>, StoreError>;

    async fn upsert(
        &self,
        key: &str,
        content: Value,
        published: bool,
    ) -> Result<ContentRecord, StoreError>;

    /// Cheap connectivity probe for health checks
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Content keys are short slugs: letters, digits, `-`, `_` and `.`.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key.len() <= 128
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// In-process store used when no database is configured, and by tests
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    records: RwLock<HashMap<String, ContentRecord>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn get(&self, key: &str) -> Result<Option<ContentRecord>, StoreError> {
        validate_key(key)?;
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn upsert(
        &self,
        key: &str,
        content: Value,
        published: bool,
    ) -> Result<ContentRecord, StoreError> {
        validate_key(key)?;
        let record = ContentRecord {
            key: key.to_string(),
            content,
            published,
            updated_at: Utc::now(),
        };
        self.records
            .write()
            .await
            .insert(key.to_string(), record.clone());
        Ok(record)
    }
}
