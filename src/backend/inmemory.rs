//! DashMap-backed byte store for encoded result sets.
//!
//! Staleness is checked against `tokio::time::Instant` on every read, so a
//! paused test runtime controls expiry through `tokio::time::advance`.

use super::CacheBackend;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// One encoded result set and the moment it was written.
struct StoredSet {
    bytes: Vec<u8>,
    written_at: Instant,
    ttl: Option<Duration>,
}

impl StoredSet {
    fn stale_at(&self, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(self.written_at) > ttl,
            None => false,
        }
    }
}

/// Process-local cache backend.
///
/// Clones share one map; a request handler and the sweeper task can hold
/// their own handle.
///
/// # Example
///
/// ```no_run
/// use catalog_cache::backend::{CacheBackend, InMemoryBackend};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = InMemoryBackend::new();
///     backend
///         .set("inventory:g=CARTERAS|gl=|ds=|de=", vec![0x49, 0x4e], Some(Duration::from_secs(60)))
///         .await?;
///     assert!(backend.exists("inventory:g=CARTERAS|gl=|ds=|de=").await?);
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    entries: Arc<DashMap<String, StoredSet>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries held, stale ones not yet reclaimed included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        let hit = self
            .entries
            .get(key)
            .filter(|entry| !entry.stale_at(now))
            .map(|entry| entry.bytes.clone());

        if hit.is_none() {
            // A concurrent put may have refreshed the key; only drop it if still stale.
            self.entries.remove_if(key, |_, entry| entry.stale_at(now));
        }

        debug!(
            "✓ InMemory GET {} -> {}",
            key,
            if hit.is_some() { "HIT" } else { "MISS" }
        );
        Ok(hit)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let size = value.len();
        self.entries.insert(
            key.to_string(),
            StoredSet {
                bytes: value,
                written_at: Instant::now(),
                ttl,
            },
        );
        debug!("✓ InMemory SET {} ({} bytes, ttl {:?})", key, size, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            debug!("✓ InMemory DELETE {}", key);
        }
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.stale_at(now));
        Ok(before.saturating_sub(self.entries.len()))
    }

    async fn clear_all(&self) -> Result<()> {
        let dropped = self.entries.len();
        self.entries.clear();
        info!("InMemory cache cleared ({} entries dropped)", dropped);
        Ok(())
    }
}
