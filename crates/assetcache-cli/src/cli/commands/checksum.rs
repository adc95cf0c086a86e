//! `assetcache checksum PATH` – SHA-256 of a file, compared against the cached asset.

use anyhow::{Context, Result};
use assetcache_core::checksum;
use assetcache_core::config::{AssetCacheConfig, StoreConfig};
use assetcache_core::store::{PersistentStore, SqliteStore, StoreError};
use std::path::Path;

/// Print the file's SHA-256 and whether it matches the persisted asset.
/// The cache comparison is informational; an unusable cache is only logged.
pub async fn run_checksum(cfg: &AssetCacheConfig, path: &Path) -> Result<()> {
    let owned = path.to_path_buf();
    let digest = tokio::task::spawn_blocking(move || checksum::sha256_path(&owned))
        .await
        .context("checksum task failed")??;
    println!("{}  {}", digest, path.display());

    let store_cfg = cfg.store_config();
    if !store_cfg.enabled {
        return Ok(());
    }
    match cached_digest(&store_cfg).await {
        Ok(Some(cached)) if cached == digest => println!("matches cached asset"),
        Ok(Some(_)) => println!("differs from cached asset"),
        Ok(None) => {}
        Err(e) => tracing::warn!("could not read persistent cache: {}", e),
    }
    Ok(())
}

async fn cached_digest(store_cfg: &StoreConfig) -> Result<Option<String>, StoreError> {
    let store = SqliteStore::open_default(store_cfg).await?;
    Ok(store.get().await?.map(|entry| entry.asset.sha256()))
}
