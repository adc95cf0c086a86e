//! `assetcache download [FILENAME]` – fetch through the cache and save to disk.

use anyhow::{Context, Result};
use assetcache_core::config::AssetCacheConfig;
use assetcache_core::DeliveryOutcome;
use std::path::Path;

use super::open_cache;

pub async fn run_download(
    cfg: &AssetCacheConfig,
    filename: Option<&str>,
    output_dir: &Path,
) -> Result<()> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("create output dir {}", output_dir.display()))?;

    let cache = open_cache(cfg, output_dir).await;
    let filename = filename.unwrap_or(&cfg.default_filename);
    let outcome = cache.fetch_and_deliver(filename).await;
    cache.flush().await;

    match outcome {
        DeliveryOutcome::Saved(path) => println!("Saved {}", path.display()),
        DeliveryOutcome::DirectLink {
            url,
            saved: Some(path),
        } => println!("Cache unavailable, downloaded {} directly to {}", url, path.display()),
        DeliveryOutcome::DirectLink { url, saved: None } => {
            anyhow::bail!("could not download {}", url)
        }
    }
    Ok(())
}
