//! `assetcache clear` – drop the persisted asset.

use anyhow::Result;
use assetcache_core::config::AssetCacheConfig;

use super::open_cache;

pub async fn run_clear(cfg: &AssetCacheConfig) -> Result<()> {
    let cache = open_cache(cfg, &std::env::current_dir()?).await;
    cache.clear_cache().await;
    println!("Cleared cache for {}", cache.url());
    Ok(())
}
