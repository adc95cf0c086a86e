//! Network side of the cache chain.
//!
//! An `AssetSource` performs exactly one fetch attempt per call; retries and
//! request coalescing live above it in the cache.

mod headers;
mod http;

use async_trait::async_trait;

use crate::asset::Asset;
use crate::retry::FetchError;

pub use http::{HttpSource, CACHE_CONTROL};

#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Static location of the asset, also used for the direct-link fallback.
    fn url(&self) -> &str;

    /// One fetch attempt.
    async fn fetch(&self) -> Result<Asset, FetchError>;
}
