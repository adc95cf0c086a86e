//! Layered asset cache with request coalescing.
//!
//! Resolution order: in-memory copy, in-flight network fetch, persistent
//! store, network. At most one network fetch runs at a time per cache; every
//! caller arriving while it is pending awaits the same ticket and sees the
//! same outcome. Persistent-store failures never reach callers, and
//! `fetch_and_deliver` always ends in either a saved file or the direct-link
//! fallback.

mod preload;
mod state;


use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::asset::Asset;
use crate::config::{AssetCacheConfig, PreloadConfig};
use crate::delivery::{Delivery, DeliveryOutcome};
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use crate::source::{AssetSource, HttpSource};
use crate::store::{open_store, NullStore, PersistentStore};

use state::{InFlight, Lookup, State, Ticket};

struct Inner {
    state: Mutex<State>,
    /// Serializes background writes with `clear_cache` deletes.
    store_lock: tokio::sync::Mutex<()>,
    /// Background persistent writes not yet awaited by `flush`.
    writes: Mutex<Vec<JoinHandle<()>>>,
    source: Arc<dyn AssetSource>,
    store: Arc<dyn PersistentStore>,
    delivery: Arc<dyn Delivery>,
    retry: RetryPolicy,
    preload: PreloadConfig,
}

impl Inner {
    fn lock_writes(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum Joined {
    Ready(Asset),
    Pending(Ticket),
}

/// Handle to the cache. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct AssetCache {
    inner: Arc<Inner>,
}

/// Builder for `AssetCache`. Source and delivery are required; the rest default.
pub struct AssetCacheBuilder {
    source: Arc<dyn AssetSource>,
    delivery: Arc<dyn Delivery>,
    store: Arc<dyn PersistentStore>,
    retry: RetryPolicy,
    preload: PreloadConfig,
}

impl AssetCacheBuilder {
    pub fn store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = store;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn preload(mut self, preload: PreloadConfig) -> Self {
        self.preload = preload;
        self
    }

    pub fn build(self) -> AssetCache {
        AssetCache {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                store_lock: tokio::sync::Mutex::new(()),
                writes: Mutex::new(Vec::new()),
                source: self.source,
                store: self.store,
                delivery: self.delivery,
                retry: self.retry,
                preload: self.preload,
            }),
        }
    }
}

impl AssetCache {
    pub fn builder(source: Arc<dyn AssetSource>, delivery: Arc<dyn Delivery>) -> AssetCacheBuilder {
        AssetCacheBuilder {
            source,
            delivery,
            store: Arc::new(NullStore),
            retry: RetryPolicy::default(),
            preload: PreloadConfig::default(),
        }
    }

    /// Standard stack from config: HTTP source and the configured persistent store.
    pub async fn open(cfg: &AssetCacheConfig, delivery: Arc<dyn Delivery>) -> Self {
        let source = HttpSource::new(cfg.url.clone(), cfg.content_type.clone(), cfg.timeout());
        let store = open_store(&cfg.store_config()).await;
        Self::builder(Arc::new(source), delivery)
            .store(store)
            .retry(cfg.retry_policy())
            .preload(cfg.preload_config())
            .build()
    }

    /// Static URL of the asset (direct-link fallback target).
    pub fn url(&self) -> &str {
        self.inner.source.url()
    }

    /// True if the in-memory layer currently holds the asset.
    pub fn is_cached(&self) -> bool {
        self.state().memory.is_some()
    }

    /// Resolve the asset through memory, the in-flight fetch, the persistent store, then the network.
    pub async fn resolve(&self) -> Result<Asset, FetchError> {
        let (lookup, generation) = {
            let st = self.state();
            (st.lookup(), st.generation)
        };
        match lookup {
            Lookup::Ready(asset) => return Ok(asset),
            Lookup::Pending(ticket) => return ticket.await,
            Lookup::Empty => {}
        }

        if let Some(asset) = self.load_persisted().await {
            return Ok(self.state().remember(generation, asset));
        }

        // Someone may have filled memory or started a fetch while we were reading the store.
        match self.join_or_start() {
            Joined::Ready(asset) => Ok(asset),
            Joined::Pending(ticket) => ticket.await,
        }
    }

    /// Resolve the asset and save it as `filename`. Never fails: any error, including a
    /// panic inside the resolution chain, falls back to the direct link of the static URL.
    pub async fn fetch_and_deliver(&self, filename: &str) -> DeliveryOutcome {
        let attempt = async {
            let asset = self.resolve().await?;
            self.inner.delivery.save(&asset, filename).await
        };

        let err = match AssertUnwindSafe(attempt).catch_unwind().await {
            Ok(Ok(path)) => return DeliveryOutcome::Saved(path),
            Ok(Err(e)) => format!("{:#}", e),
            Err(_) => "unexpected panic while resolving asset".to_string(),
        };

        let url = self.url().to_string();
        tracing::error!("download failed ({}), falling back to direct link {}", err, url);
        let saved = self.inner.delivery.direct_link(&url, filename).await;
        DeliveryOutcome::DirectLink { url, saved }
    }

    /// Evict the in-memory copy, detach any in-flight fetch, and delete the persistent entry.
    pub async fn clear_cache(&self) {
        self.state().clear();
        let _guard = self.inner.store_lock.lock().await;
        match self.inner.store.delete().await {
            Ok(()) => tracing::debug!("asset cache cleared"),
            Err(e) => tracing::warn!("failed to clear persistent cache: {}", e),
        }
    }

    /// Wait for background persistent writes spawned so far. Short-lived
    /// processes call this before exiting so the write is not cut off.
    pub async fn flush(&self) {
        let pending = std::mem::take(&mut *self.inner.lock_writes());
        for handle in pending {
            if let Err(e) = handle.await {
                tracing::warn!("background persist task failed: {}", e);
            }
        }
    }

    /// True while the asset is in memory or a fetch is in flight.
    fn is_busy(&self) -> bool {
        let st = self.state();
        st.memory.is_some() || st.in_flight.is_some()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persistent lookup; errors degrade to a miss.
    async fn load_persisted(&self) -> Option<Asset> {
        match self.inner.store.get().await {
            Ok(Some(entry)) => {
                tracing::debug!(bytes = entry.asset.len(), stored_at = entry.stored_at, "persistent cache hit");
                Some(entry.asset)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("persistent cache lookup failed, continuing without it: {}", e);
                None
            }
        }
    }

    /// Return the cached asset or pending ticket, starting a fetch if there is neither.
    fn join_or_start(&self) -> Joined {
        let mut st = self.state();
        match st.lookup() {
            Lookup::Ready(asset) => Joined::Ready(asset),
            Lookup::Pending(ticket) => Joined::Pending(ticket),
            Lookup::Empty => Joined::Pending(self.start_fetch(&mut st)),
        }
    }

    /// Start a fetch only if memory is empty and nothing is in flight.
    fn try_start(&self) -> Option<Ticket> {
        let mut st = self.state();
        match st.lookup() {
            Lookup::Empty => Some(self.start_fetch(&mut st)),
            _ => None,
        }
    }

    /// Spawn the network fetch and register its ticket. The fetch runs to
    /// completion on its own task whether or not anyone is still waiting.
    fn start_fetch(&self, st: &mut State) -> Ticket {
        let id = st.next_ticket_id();
        let generation = st.generation;
        let task = tokio::spawn(network_fetch(
            Arc::downgrade(&self.inner),
            Arc::clone(&self.inner.source),
            self.inner.retry,
            id,
            generation,
        ));
        let ticket = async move {
            task.await
                .unwrap_or_else(|e| Err(FetchError::Other(format!("fetch task failed: {}", e))))
        }
        .boxed()
        .shared();
        st.in_flight = Some(InFlight {
            id,
            ticket: ticket.clone(),
        });
        tracing::debug!(ticket = id, "starting network fetch of {}", self.inner.source.url());
        ticket
    }
}

/// Body of the fetch task: fetch with retries, then publish the outcome and
/// persist in the background. A panicking source is reported as an error so
/// the ticket is always released.
async fn network_fetch(
    cache: Weak<Inner>,
    source: Arc<dyn AssetSource>,
    retry: RetryPolicy,
    id: u64,
    generation: u64,
) -> Result<Asset, FetchError> {
    let attempt = run_with_retry(&retry, || source.fetch());
    let result = match AssertUnwindSafe(attempt).catch_unwind().await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Other("asset source panicked".to_string())),
    };

    match &result {
        Ok(asset) => tracing::info!(bytes = asset.len(), "fetched asset from {}", source.url()),
        Err(e) => tracing::warn!("fetch of {} failed: {}", source.url(), e),
    }

    if let Some(inner) = cache.upgrade() {
        let fresh = inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .complete(id, generation, &result);
        if let (true, Ok(asset)) = (fresh, &result) {
            let handle = tokio::spawn(persist(Arc::clone(&inner), asset.clone(), generation));
            let mut writes = inner.lock_writes();
            writes.retain(|h| !h.is_finished());
            writes.push(handle);
        }
    }

    result
}

/// Background write to the persistent store. Failures are logged and dropped.
async fn persist(inner: Arc<Inner>, asset: Asset, generation: u64) {
    let _guard = inner.store_lock.lock().await;
    let current = inner.state.lock().unwrap_or_else(PoisonError::into_inner).generation;
    if current != generation {
        return;
    }
    match inner.store.put(&asset).await {
        Ok(()) => tracing::debug!(bytes = asset.len(), "asset persisted"),
        Err(e) => tracing::warn!("failed to persist asset, keeping memory copy only: {}", e),
    }
}
