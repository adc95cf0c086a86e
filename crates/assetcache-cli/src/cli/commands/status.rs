//! `assetcache status` – show what the persistent cache holds.

use anyhow::Result;
use assetcache_core::config::AssetCacheConfig;
use assetcache_core::store::{PersistentStore, SqliteStore};

pub async fn run_status(cfg: &AssetCacheConfig) -> Result<()> {
    println!("{:<14} {}", "URL", cfg.url);

    let store_cfg = cfg.store_config();
    if !store_cfg.enabled {
        println!("{:<14} disabled", "STORE");
        return Ok(());
    }

    let store = SqliteStore::open_default(&store_cfg).await?;
    match store.get().await? {
        None => println!("{:<14} empty", "STORE"),
        Some(entry) => {
            println!("{:<14} cached", "STORE");
            println!("{:<14} {}", "SIZE", entry.asset.len());
            println!("{:<14} {}", "CONTENT-TYPE", entry.asset.content_type());
            println!("{:<14} {}", "STORED-AT", entry.stored_at);
            println!("{:<14} {}", "SHA256", entry.asset.sha256());
        }
    }
    Ok(())
}
