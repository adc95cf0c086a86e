//! `assetcache preload` – warm the cache and wait for it to land on disk.

use anyhow::{Context, Result};
use assetcache_core::config::AssetCacheConfig;

use super::open_cache;

pub async fn run_preload(cfg: &AssetCacheConfig) -> Result<()> {
    let cache = open_cache(cfg, &std::env::current_dir()?).await;
    if let Some(handle) = cache.preload_now() {
        handle.await.context("preload task failed")?;
    }
    cache.flush().await;

    if !cache.is_cached() {
        anyhow::bail!("could not preload {}", cache.url());
    }
    println!("Cached {}", cache.url());
    Ok(())
}
