//! # catalog-cache
//!
//! Query layer for a product-inventory catalog: a coarse-filter result cache
//! in front of a relational store, plus a unit-normalizing, fine-filtering
//! pipeline over the cached rows.
//!
//! ## Features
//!
//! - **Coarse-filter caching:** results are cached per group / group list /
//!   date range; free-text search and sub-line filters run in memory
//! - **TTL bounded:** entries older than the configured TTL are never served
//! - **Stampede free:** concurrent misses for the same key share one store query
//! - **Unit normalization:** case-and-fraction quantities become piece counts
//! - **Store agnostic:** the relational source sits behind [`InventoryStore`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use catalog_cache::{
//!     CacheStore, InMemoryInventoryStore, InventoryQuery, QueryExecutor, RequestCoordinator,
//! };
//! use std::time::Duration;
//!
//! // 1. Wire the store behind an executor
//! let executor = QueryExecutor::new(InMemoryInventoryStore::from_json_file("rows.json")?);
//!
//! // 2. One cache per process
//! let cache = CacheStore::in_memory(Duration::from_secs(60));
//!
//! // 3. Coordinator is Clone for sharing across handlers
//! let coordinator = RequestCoordinator::new(cache, executor);
//!
//! let query = InventoryQuery {
//!     group: Some("CALZADOS MASCULINOS".to_string()),
//!     subcat: Some("BRUNO".to_string()),
//!     ..InventoryQuery::default()
//! };
//! let response = coordinator.handle(&query).await?;
//! println!("{} {} -> {}", response.cache, response.base_key, response.total);
//! ```
//!
//! ### Over HTTP
//!
//! With the default `http` feature, [`http::router`] exposes the coordinator
//! as an axum `Router`; the `catalog-server` binary serves it.

#[macro_use]
extern crate log;

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod filter;
#[cfg(feature = "http")]
pub mod http;
pub mod key;
pub mod normalize;
pub mod observability;
pub mod query;
pub mod record;
pub mod repository;
pub mod serialization;
pub mod store;

// Re-exports for convenience
pub use backend::CacheBackend;
pub use config::Config;
pub use coordinator::{CacheStatus, InventoryResponse, RequestCoordinator};
pub use error::{Error, Result};
pub use executor::QueryExecutor;
pub use filter::FilterEngine;
pub use key::canonical_key;
pub use normalize::normalize;
pub use query::{CoarseFilter, FineFilter, InventoryQuery, SubLine};
pub use record::{InventoryRecord, StoreRow};
pub use repository::{InMemoryInventoryStore, InventoryStore};
pub use store::CacheStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
