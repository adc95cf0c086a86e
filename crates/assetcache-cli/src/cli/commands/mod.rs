//! CLI command handlers, one file per command.

mod checksum;
mod clear;
mod download;
mod preload;
mod status;

pub use checksum::run_checksum;
pub use clear::run_clear;
pub use download::run_download;
pub use preload::run_preload;
pub use status::run_status;

use std::sync::Arc;

use assetcache_core::config::AssetCacheConfig;
use assetcache_core::delivery::FileDelivery;
use assetcache_core::AssetCache;

/// Cache wired to the configured source and store, saving into `dir`.
async fn open_cache(cfg: &AssetCacheConfig, dir: &std::path::Path) -> AssetCache {
    let delivery = FileDelivery::new(dir, cfg.timeout());
    AssetCache::open(cfg, Arc::new(delivery)).await
}
