use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::canonical::{Normalized, Normalizer};
use super::model::{CanonicalGrid, ContentRecord};
use super::store::{ContentStore, StoreError};

/// How seeded defaults are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOptions {
    /// Persist the default grid when a key has no usable record
    pub write_back: bool,
    /// Published flag for newly seeded records
    pub published: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            write_back: true,
            published: true,
        }
    }
}

/// Result of reading one content key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadOutcome {
    pub key: String,
    pub grid: CanonicalGrid,
    /// True when the grid is the seed default rather than stored content
    pub seeded: bool,
    pub published: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Read and write paths for grid content on top of a [`ContentStore`].
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    normalizer: Arc<Normalizer>,
    seed_options: SeedOptions,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>, normalizer: Normalizer, seed_options: SeedOptions) -> Self {
        Self {
            store,
            normalizer: Arc::new(normalizer),
            seed_options,
        }
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Fetch and normalize the content for `key`.
    ///
    /// Store failures are returned to the caller. Anything wrong with the
    /// stored document itself yields the seed default, which is written back
    /// in the background.
    pub async fn read(&self, key: &str) -> Result<ReadOutcome, StoreError> {
        let record = self.store.get(key).await?;

        let Normalized { grid, seeded } = match &record {
            Some(record) => self.normalizer.normalize(key, &record.content),
            None => {
                tracing::info!("No content record for '{}', using seed default", key);
                Normalized {
                    grid: self.normalizer.seeds().default_for(key).clone(),
                    seeded: true,
                }
            }
        };

        let published = record
            .as_ref()
            .map(|r| r.published)
            .unwrap_or(self.seed_options.published);

        if seeded && self.seed_options.write_back {
            self.spawn_seed_write(key, &grid, published);
        }

        Ok(ReadOutcome {
            key: key.to_string(),
            grid,
            seeded,
            published,
            updated_at: record.map(|r| r.updated_at),
        })
    }

    /// Persist `content` for `key` exactly as given.
    pub async fn write(
        &self,
        key: &str,
        content: Value,
        published: bool,
    ) -> Result<ContentRecord, StoreError> {
        let record = self.store.upsert(key, content, published).await?;
        tracing::info!("Stored content '{}' (published={})", key, record.published);
        Ok(record)
    }

    pub async fn write_grid(
        &self,
        key: &str,
        grid: &CanonicalGrid,
        published: bool,
    ) -> Result<ContentRecord, StoreError> {
        self.write(key, grid.to_content(), published).await
    }

    /// Write the seed grid without waiting on it; failures are only logged.
    fn spawn_seed_write(&self, key: &str, grid: &CanonicalGrid, published: bool) {
        let store = Arc::clone(&self.store);
        let key = key.to_string();
        let content = grid.to_content();

        tokio::spawn(async move {
            match store.upsert(&key, content, published).await {
                Ok(_) => tracing::info!("Seeded default content for '{}'", key),
                Err(e) => tracing::warn!("Seed write-back for '{}' failed: {}", key, e),
            }
        });
    }
}
