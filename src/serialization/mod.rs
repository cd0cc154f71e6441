//! Postcard-based encoding of cached record sets with a versioned envelope.
//!
//! Every cache entry follows this format:
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│VERSION (4 bytes)│POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────────────────┘
//!   "INVC"              u32 (LE)           postcard::to_allocvec(T)
//! ```
//!
//! A stored entry is an immutable byte snapshot: readers decode their own
//! copy, so nothing handed out by the cache can alter what is stored.
//!
//! # Example
//!
//! ```rust
//! use catalog_cache::serialization::{deserialize_from_cache, serialize_for_cache};
//!
//! # fn main() -> catalog_cache::Result<()> {
//! let values = vec![1u32, 2, 3];
//! let bytes = serialize_for_cache(&values)?;
//! assert_eq!(&bytes[0..4], b"INVC");
//!
//! let decoded: Vec<u32> = deserialize_from_cache(&bytes)?;
//! assert_eq!(decoded, values);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Magic header for cached record sets: b"INVC"
pub const CACHE_MAGIC: [u8; 4] = *b"INVC";

/// Current record schema version.
///
/// Increment when `InventoryRecord` changes shape. Entries written under an
/// older version are evicted on read and recomputed.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const HEADER_LEN: usize = 8;

/// Encode a value with the cache envelope.
///
/// # Errors
///
/// Returns `Error::SerializationError` if Postcard serialization fails.
pub fn serialize_for_cache<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let payload = postcard::to_allocvec(value).map_err(|e| {
        error!("Cache serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&CACHE_MAGIC);
    bytes.extend_from_slice(&CURRENT_SCHEMA_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode a value from cache storage, validating the envelope first.
///
/// # Errors
///
/// - `Error::InvalidCacheEntry`: truncated header or bad magic
/// - `Error::VersionMismatch`: written by another schema version
/// - `Error::DeserializationError`: corrupted payload
pub fn deserialize_from_cache<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::InvalidCacheEntry(format!(
            "entry too short: {} bytes",
            bytes.len()
        )));
    }

    let (header, payload) = bytes.split_at(HEADER_LEN);
    if header[0..4] != CACHE_MAGIC {
        warn!(
            "Invalid cache entry: expected magic {:?}, got {:?}",
            CACHE_MAGIC,
            &header[0..4]
        );
        return Err(Error::InvalidCacheEntry(format!(
            "Invalid magic: expected {:?}, got {:?}",
            CACHE_MAGIC,
            &header[0..4]
        )));
    }

    let mut version = [0u8; 4];
    version.copy_from_slice(&header[4..8]);
    let version = u32::from_le_bytes(version);
    if version != CURRENT_SCHEMA_VERSION {
        warn!(
            "Cache version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION, version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: version,
        });
    }

    Ok(postcard::from_bytes(payload)?)
}
