//! Background warm-up of the cache ahead of a user-initiated download.

use std::time::Duration;

use tokio::task::JoinHandle;

use super::AssetCache;
use crate::config::PreloadMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timing {
    /// Honour the configured preload mode before touching the network.
    Scheduled,
    /// Fetch as soon as the persistent store misses.
    Immediate,
}

impl AssetCache {
    /// Best-effort warm-up on a background task. Returns immediately and never fails;
    /// does nothing when the asset is in memory or a fetch is already in flight.
    pub fn preload(&self) {
        let _ = self.spawn_warm(Timing::Scheduled);
    }

    /// Like `preload` but without deferring the network fetch. The returned handle
    /// completes when the warm-up finishes; dropping it does not cancel anything.
    /// `None` when there was nothing to do.
    pub fn preload_now(&self) -> Option<JoinHandle<()>> {
        self.spawn_warm(Timing::Immediate)
    }

    fn spawn_warm(&self, timing: Timing) -> Option<JoinHandle<()>> {
        if self.is_busy() {
            tracing::trace!("preload skipped, asset cached or in flight");
            return None;
        }
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!("preload skipped, no async runtime: {}", e);
                return None;
            }
        };
        let cache = self.clone();
        Some(runtime.spawn(async move { cache.warm(timing).await }))
    }

    async fn warm(&self, timing: Timing) {
        let generation = self.state().generation;
        if let Some(asset) = self.load_persisted().await {
            self.state().remember(generation, asset);
            return;
        }

        if timing == Timing::Scheduled {
            match self.inner.preload.mode {
                PreloadMode::Idle => tokio::task::yield_now().await,
                PreloadMode::Deferred => {
                    tokio::time::sleep(Duration::from_millis(self.inner.preload.delay_ms)).await
                }
            }
        }

        let Some(ticket) = self.try_start() else {
            tracing::trace!("preload found the asset cached or in flight");
            return;
        };
        match ticket.await {
            Ok(asset) => tracing::debug!(bytes = asset.len(), "preloaded asset"),
            Err(e) => tracing::warn!("failed to preload asset: {}", e),
        }
    }
}
