//! Handing the resolved asset to the user under a chosen filename.

mod file;
mod sanitize;

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use crate::asset::Asset;

pub use file::{temp_path, FileDelivery};
pub use sanitize::{sanitize_filename, FALLBACK_FILENAME};

/// What `fetch_and_deliver` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The cached or fetched asset was saved.
    Saved(PathBuf),
    /// The cache chain failed; the static URL was handed to the direct-link path.
    /// `saved` is where that path put the file, if it managed to.
    DirectLink { url: String, saved: Option<PathBuf> },
}

#[async_trait]
pub trait Delivery: Send + Sync {
    /// Save `asset` as `filename`; returns the final path.
    async fn save(&self, asset: &Asset, filename: &str) -> Result<PathBuf>;

    /// Obtain the asset straight from `url` without the cache. Must not fail:
    /// problems are logged and reported as `None`.
    async fn direct_link(&self, url: &str, filename: &str) -> Option<PathBuf>;
}
