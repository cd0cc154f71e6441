//! Time-bounded result cache keyed by canonical coarse-filter keys.

use crate::backend::{CacheBackend, InMemoryBackend};
use crate::error::Result;
use crate::record::InventoryRecord;
use crate::serialization::{deserialize_from_cache, serialize_for_cache};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default time-to-live of a cached result set (60 s).
pub const DEFAULT_TTL: Duration = Duration::from_millis(60_000);

/// Result cache: canonical key -> normalized record set.
///
/// An entry is served only while `now - created_at <= ttl`. Entries are
/// replaced wholesale by [`put`](CacheStore::put) and never mutated in
/// place. There is no size bound and no LRU; memory is reclaimed lazily on
/// read or by [`purge_expired`](CacheStore::purge_expired).
///
/// The store is an explicit value: build one per process (or per test) and
/// hand clones to whoever needs it. Clones share the same entries.
#[derive(Clone)]
pub struct CacheStore<B: CacheBackend = InMemoryBackend> {
    backend: B,
    ttl: Duration,
}

impl CacheStore<InMemoryBackend> {
    /// In-memory store with the given TTL.
    pub fn in_memory(ttl: Duration) -> Self {
        CacheStore::new(InMemoryBackend::new(), ttl)
    }
}

impl Default for CacheStore<InMemoryBackend> {
    fn default() -> Self {
        CacheStore::in_memory(DEFAULT_TTL)
    }
}

impl<B: CacheBackend> CacheStore<B> {
    /// Create a store over an existing backend.
    pub fn new(backend: B, ttl: Duration) -> Self {
        CacheStore { backend, ttl }
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Backend reference (for advanced use).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Look up a live record set.
    ///
    /// Entries that fail to decode (bad magic, old schema, corrupt payload)
    /// are evicted and reported as absent.
    ///
    /// # Errors
    /// Returns `Err` only if the backend itself fails.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<InventoryRecord>>> {
        let Some(bytes) = self.backend.get(key).await? else {
            return Ok(None);
        };

        match deserialize_from_cache::<Vec<InventoryRecord>>(&bytes) {
            Ok(records) => Ok(Some(records)),
            Err(e) if !e.is_cache_read_failure() => Err(e),
            Err(e) => {
                warn!("Evicting unreadable cache entry {}: {}", key, e);
                self.backend.delete(key).await?;
                Ok(None)
            }
        }
    }

    /// Store a record set under `key`, overwriting any previous entry.
    ///
    /// # Errors
    /// Returns `Err` if encoding or the backend write fails.
    pub async fn put(&self, key: &str, records: &[InventoryRecord]) -> Result<()> {
        let bytes = serialize_for_cache(records)?;
        self.backend.set(key, bytes, Some(self.ttl)).await
    }

    /// Drop the entry for `key`.
    ///
    /// # Errors
    /// Returns `Err` if the backend fails.
    pub async fn invalidate(&self, key: &str) -> Result<()> {
        self.backend.delete(key).await
    }

    /// Drop every entry.
    ///
    /// # Errors
    /// Returns `Err` if the backend fails.
    pub async fn clear(&self) -> Result<()> {
        self.backend.clear_all().await
    }

    /// Reclaim expired entries. Not needed for correctness.
    ///
    /// # Errors
    /// Returns `Err` if the backend fails.
    pub async fn purge_expired(&self) -> Result<usize> {
        self.backend.purge_expired().await
    }

    /// Run [`purge_expired`](CacheStore::purge_expired) every `interval` on
    /// the current runtime. Abort the handle to stop it.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match store.purge_expired().await {
                    Ok(0) => {}
                    Ok(n) => debug!("Cache sweep removed {} expired entries", n),
                    Err(e) => warn!("Cache sweep failed: {}", e),
                }
            }
        })
    }
}
