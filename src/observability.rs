//! Metrics hooks for the request pipeline.
//!
//! Implement [`CacheMetrics`] to feed cache outcomes into a monitoring
//! system:
//!
//! ```ignore
//! use catalog_cache::observability::CacheMetrics;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl CacheMetrics for PrometheusMetrics {
//!     fn record_hit(&self, _key: &str, _duration: Duration) {
//!         // counter!("catalog_cache_hits").inc();
//!     }
//! }
//!
//! // let coordinator =
//! //     RequestCoordinator::with_metrics(cache, executor, Box::new(PrometheusMetrics));
//! ```
//!
//! The default methods log through the `log` crate; [`NoOpMetrics`] silences
//! them entirely and is what a coordinator starts with.

use std::time::Duration;

/// Trait for cache metrics collection.
pub trait CacheMetrics: Send + Sync {
    /// Record a request served from the cache.
    fn record_hit(&self, key: &str, duration: Duration) {
        debug!("Cache HIT: {} took {:?}", key, duration);
    }

    /// Record a request that had to load from the store.
    fn record_miss(&self, key: &str, duration: Duration) {
        debug!("Cache MISS: {} took {:?}", key, duration);
    }

    /// Record a miss that joined a load already in flight for the same key.
    fn record_coalesced(&self, key: &str) {
        debug!("Cache COALESCED: {}", key);
    }

    /// Record a cache write.
    fn record_set(&self, key: &str, records: usize) {
        debug!("Cache SET: {} ({} records)", key, records);
    }

    /// Record a failed request.
    fn record_error(&self, key: &str, error: &str) {
        warn!("Cache ERROR for {}: {}", key, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl CacheMetrics for NoOpMetrics {
    fn record_hit(&self, _key: &str, _duration: Duration) {}
    fn record_miss(&self, _key: &str, _duration: Duration) {}
    fn record_coalesced(&self, _key: &str) {}
    fn record_set(&self, _key: &str, _records: usize) {}
    fn record_error(&self, _key: &str, _error: &str) {}
}

/// Metrics that only write to the log.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl CacheMetrics for LogMetrics {}
