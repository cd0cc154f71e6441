//! Error types for the catalog query layer.

use std::fmt;

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the catalog query layer.
///
/// Every failure is terminal for the request that hit it. Cache-internal
/// variants never reach a client: a corrupt or unreadable entry degrades to a
/// cache miss and a failed write is logged and dropped.
#[derive(Debug, Clone)]
pub enum Error {
    /// The inventory store collaborator failed to answer a query.
    ///
    /// Common causes:
    /// - Connection refused or dropped
    /// - Query timeout
    /// - Malformed SQL on the collaborator side
    ///
    /// Not retried. Surfaced as HTTP 500.
    StoreUnavailable(String),

    /// No route matches the request method and path.
    ///
    /// Surfaced as HTTP 404.
    BadRoute {
        /// Request method
        method: String,
        /// Request path
        path: String,
    },

    /// Encoding a record set for cache storage failed.
    SerializationError(String),

    /// Decoding a cached record set failed.
    ///
    /// **Recovery:** the entry is evicted and the request proceeds as a miss.
    DeserializationError(String),

    /// Cached bytes do not start with the expected envelope header.
    InvalidCacheEntry(String),

    /// Cached entry was written by a different record schema.
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from cached entry)
        found: u32,
    },

    /// Cache backend failure.
    BackendError(String),

    /// Invalid configuration value at startup.
    ConfigError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
            Error::BadRoute { method, path } => write!(f, "No route for {} {}", method, path),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::InvalidCacheEntry(msg) => write!(f, "Invalid cache entry: {}", msg),
            Error::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Cache version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Whether the failure came from reading the cache rather than the store.
    ///
    /// Such failures are recoverable by recomputing the entry.
    pub fn is_cache_read_failure(&self) -> bool {
        matches!(
            self,
            Error::DeserializationError(_)
                | Error::InvalidCacheEntry(_)
                | Error::VersionMismatch { .. }
                | Error::BackendError(_)
        )
    }
}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<postcard::Error> for Error {
    fn from(e: postcard::Error) -> Self {
        Error::DeserializationError(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::StoreUnavailable(e.to_string())
        } else {
            Error::DeserializationError(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::StoreUnavailable(e.to_string())
    }
}
