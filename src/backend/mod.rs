//! Byte-level storage behind the result cache.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;

pub mod inmemory;

pub use inmemory::InMemoryBackend;

/// Storage for encoded result sets with per-entry expiry.
///
/// Methods take `&self`; implementations use interior mutability so one
/// handle can serve concurrent requests. Returned futures are `Send` so a
/// pending load that writes through the backend can be shared across tasks.
pub trait CacheBackend: Send + Sync + Clone + 'static {
    /// Bytes stored under `key`, or `None` when missing or past its TTL.
    ///
    /// Implementations drop entries found stale.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Store `value`, replacing any previous entry and restarting its clock.
    ///
    /// `ttl = None` keeps the entry until deleted.
    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove the entry for `key`, if any.
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// Whether a live entry exists for `key`.
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send {
        async move { Ok(self.get(key).await?.is_some()) }
    }

    /// Reclaim stale entries and report how many went.
    ///
    /// Reads already ignore stale entries; this only frees memory.
    fn purge_expired(&self) -> impl Future<Output = Result<usize>> + Send {
        async { Ok(0) }
    }

    /// Drop every entry.
    fn clear_all(&self) -> impl Future<Output = Result<()>> + Send;
}
