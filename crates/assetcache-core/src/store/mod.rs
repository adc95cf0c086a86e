//! Persistent layer of the cache chain.
//!
//! Holds at most one entry (the asset under a fixed key). Every error here is
//! non-fatal to callers of the cache: lookups degrade to a miss, writes are
//! dropped with a warning.

mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::asset::Asset;
use crate::config::StoreConfig;

pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid store name {0:?}")]
    InvalidName(String),
    #[error("{0}")]
    Other(String),
}

/// A persisted asset and when it was written (Unix seconds).
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub asset: Asset,
    pub stored_at: i64,
}

#[async_trait]
pub trait PersistentStore: Send + Sync {
    async fn get(&self) -> Result<Option<StoredEntry>, StoreError>;
    async fn put(&self, asset: &Asset) -> Result<(), StoreError>;
    async fn delete(&self) -> Result<(), StoreError>;
}

/// Store used when persistence is disabled or could not be opened. Always misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

#[async_trait]
impl PersistentStore for NullStore {
    async fn get(&self) -> Result<Option<StoredEntry>, StoreError> {
        Ok(None)
    }

    async fn put(&self, _asset: &Asset) -> Result<(), StoreError> {
        Ok(())
    }

    async fn delete(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Open the configured persistent store. Disabled or unavailable stores become a `NullStore`.
pub async fn open_store(cfg: &StoreConfig) -> Arc<dyn PersistentStore> {
    if !cfg.enabled {
        tracing::debug!("persistent cache disabled");
        return Arc::new(NullStore);
    }
    match SqliteStore::open_default(cfg).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("persistent cache unavailable, using memory only: {}", e);
            Arc::new(NullStore)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_store_always_misses() {
        let store = NullStore;
        store
            .put(&Asset::new(b"x".to_vec(), "application/pdf"))
            .await
            .unwrap();
        assert!(store.get().await.unwrap().is_none());
        store.delete().await.unwrap();
    }

    #[tokio::test]
    async fn disabled_store_opens_as_null() {
        let cfg = StoreConfig {
            enabled: false,
            ..StoreConfig::default()
        };
        let store = open_store(&cfg).await;
        assert!(store.get().await.unwrap().is_none());
    }
}
