pub mod config;
pub mod logging;

pub mod asset;
pub mod cache;
pub mod checksum;
pub mod delivery;
pub mod retry;
pub mod source;
pub mod store;

pub use asset::Asset;
pub use cache::{AssetCache, AssetCacheBuilder};
pub use delivery::DeliveryOutcome;
