//! Request coordinator - main entry point for catalog queries.
//!
//! Per request:
//!
//! ```text
//! START -> KEY_BUILT -> CACHE_HIT  ----------------------------> FILTERED -> RESPONDED
//!                    \-> CACHE_MISS -> load -> CacheStore::put -/
//!          (any collaborator failure) -> FAILED
//! ```
//!
//! Misses for the same key that overlap in time share a single store query:
//! the first registers its pending load, later ones await that same load.

use crate::backend::{CacheBackend, InMemoryBackend};
use crate::error::Result;
use crate::executor::QueryExecutor;
use crate::filter::FilterEngine;
use crate::key::canonical_key;
use crate::observability::{CacheMetrics, NoOpMetrics};
use crate::query::{CoarseFilter, InventoryQuery};
use crate::record::InventoryRecord;
use crate::repository::InventoryStore;
use crate::store::CacheStore;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<Vec<InventoryRecord>>>>>;

/// Which path served the coarse result set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStatus::Hit => write!(f, "HIT"),
            CacheStatus::Miss => write!(f, "MISS"),
        }
    }
}

/// Lifecycle states of a single request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestState {
    Start,
    KeyBuilt,
    CacheHit,
    CacheMiss,
    Filtered,
    Responded,
    Failed,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestState::Start => "START",
            RequestState::KeyBuilt => "KEY_BUILT",
            RequestState::CacheHit => "CACHE_HIT",
            RequestState::CacheMiss => "CACHE_MISS",
            RequestState::Filtered => "FILTERED",
            RequestState::Responded => "RESPONDED",
            RequestState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Successful response body.
///
/// `total` counts the filtered set before paging.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryResponse {
    pub data: Vec<InventoryRecord>,
    pub total: usize,
    pub cache: CacheStatus,
    pub base_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,
}

struct InFlight {
    id: u64,
    load: SharedLoad,
}

struct Inner<S: InventoryStore, B: CacheBackend> {
    cache: CacheStore<B>,
    executor: QueryExecutor<S>,
    in_flight: DashMap<String, InFlight>,
    next_load: AtomicU64,
    metrics: Box<dyn CacheMetrics>,
}

/// Orchestrates cache lookup, store loading and fine filtering per request.
///
/// Cheap to clone; clones share the cache, the executor and the in-flight
/// registry.
///
/// # Example
///
/// ```ignore
/// use catalog_cache::{CacheStore, InMemoryInventoryStore, QueryExecutor, RequestCoordinator};
///
/// let coordinator = RequestCoordinator::new(
///     CacheStore::in_memory(Duration::from_secs(60)),
///     QueryExecutor::new(InMemoryInventoryStore::new()),
/// );
/// let response = coordinator.handle(&query).await?;
/// println!("{} -> {} records", response.cache, response.total);
/// ```
pub struct RequestCoordinator<S: InventoryStore, B: CacheBackend = InMemoryBackend> {
    inner: Arc<Inner<S, B>>,
}

impl<S: InventoryStore, B: CacheBackend> Clone for RequestCoordinator<S, B> {
    fn clone(&self) -> Self {
        RequestCoordinator {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: InventoryStore, B: CacheBackend> RequestCoordinator<S, B> {
    /// Create a coordinator over a cache and an executor.
    pub fn new(cache: CacheStore<B>, executor: QueryExecutor<S>) -> Self {
        Self::with_metrics(cache, executor, Box::new(NoOpMetrics))
    }

    /// Create a coordinator with a custom metrics handler.
    pub fn with_metrics(
        cache: CacheStore<B>,
        executor: QueryExecutor<S>,
        metrics: Box<dyn CacheMetrics>,
    ) -> Self {
        RequestCoordinator {
            inner: Arc::new(Inner {
                cache,
                executor,
                in_flight: DashMap::new(),
                next_load: AtomicU64::new(0),
                metrics,
            }),
        }
    }

    /// The result cache.
    pub fn cache(&self) -> &CacheStore<B> {
        &self.inner.cache
    }

    /// The query executor.
    pub fn executor(&self) -> &QueryExecutor<S> {
        &self.inner.executor
    }

    /// Number of keys with a store load currently pending.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.len()
    }

    /// Serve one catalog request.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreUnavailable` when a miss could not be loaded. No
    /// stale entry is served in that case and nothing is cached.
    pub async fn handle(&self, query: &InventoryQuery) -> Result<InventoryResponse> {
        let timer = Instant::now();
        let coarse = query.coarse_filter();
        let fine = query.fine_filter();
        let base_key = canonical_key(&coarse);
        transition(&base_key, RequestState::Start, RequestState::KeyBuilt);

        let (records, status) = match self.lookup(&base_key).await {
            Some(records) => {
                transition(&base_key, RequestState::KeyBuilt, RequestState::CacheHit);
                self.inner.metrics.record_hit(&base_key, timer.elapsed());
                (records, CacheStatus::Hit)
            }
            None => {
                transition(&base_key, RequestState::KeyBuilt, RequestState::CacheMiss);
                match self.load(&base_key, &coarse).await {
                    Ok(records) => {
                        self.inner.metrics.record_miss(&base_key, timer.elapsed());
                        (records, CacheStatus::Miss)
                    }
                    Err(e) => {
                        transition(&base_key, RequestState::CacheMiss, RequestState::Failed);
                        self.inner.metrics.record_error(&base_key, &e.to_string());
                        return Err(e);
                    }
                }
            }
        };

        let reached = match status {
            CacheStatus::Hit => RequestState::CacheHit,
            CacheStatus::Miss => RequestState::CacheMiss,
        };
        let filtered = FilterEngine::apply(&records, &fine, &coarse);
        let total = filtered.len();
        transition(&base_key, reached, RequestState::Filtered);

        let (data, page, page_size) = match query.pagination() {
            Some(window) => (window.slice(filtered), window.page, window.page_size),
            None => (filtered, None, None),
        };

        info!(
            "✓ {} {} -> {}/{} records in {:?}",
            status,
            base_key,
            data.len(),
            total,
            timer.elapsed()
        );
        transition(&base_key, RequestState::Filtered, RequestState::Responded);

        Ok(InventoryResponse {
            data,
            total,
            cache: status,
            base_key,
            page,
            page_size,
        })
    }

    /// Cache lookup. An unreadable cache counts as a miss.
    async fn lookup(&self, key: &str) -> Option<Arc<Vec<InventoryRecord>>> {
        match self.inner.cache.get(key).await {
            Ok(hit) => hit.map(Arc::new),
            Err(e) => {
                warn!("Cache lookup for {} failed, treating as miss: {}", key, e);
                None
            }
        }
    }

    /// Load a coarse result set, joining a pending load for the same key if any.
    ///
    /// A new load is driven by its own task, so it completes and leaves the
    /// registry even if every waiting request is dropped.
    async fn load(&self, key: &str, coarse: &CoarseFilter) -> Result<Arc<Vec<InventoryRecord>>> {
        let (load, started) = match self.inner.in_flight.entry(key.to_string()) {
            Entry::Occupied(flight) => {
                debug!("Joining in-flight load for {}", key);
                self.inner.metrics.record_coalesced(key);
                (flight.get().load.clone(), false)
            }
            Entry::Vacant(slot) => {
                let id = self.inner.next_load.fetch_add(1, Ordering::Relaxed);
                let load = Self::start_load(
                    Arc::clone(&self.inner),
                    key.to_string(),
                    coarse.clone(),
                    id,
                );
                slot.insert(InFlight {
                    id,
                    load: load.clone(),
                });
                (load, true)
            }
        };

        if started {
            // Registry shard lock is released here; the driver may unregister right away.
            tokio::spawn(load.clone());
        }

        load.await
    }

    /// Build the shared load for `key`: execute, cache, then unregister.
    fn start_load(
        inner: Arc<Inner<S, B>>,
        key: String,
        coarse: CoarseFilter,
        id: u64,
    ) -> SharedLoad {
        async move {
            let result = inner.executor.execute(&coarse).await.map(Arc::new);

            if let Ok(records) = &result {
                match inner.cache.put(&key, records).await {
                    Ok(()) => inner.metrics.record_set(&key, records.len()),
                    Err(e) => warn!("Failed to cache result set {}: {}", key, e),
                }
            }

            inner.in_flight.remove_if(&key, |_, flight| flight.id == id);
            result
        }
        .boxed()
        .shared()
    }
}

fn transition(key: &str, from: RequestState, to: RequestState) {
    trace!("[{}] {} -> {}", key, from, to);
}
