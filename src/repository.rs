//! Inventory store trait for abstracting the relational source.
//!
//! The `InventoryStore` trait decouples the query layer from the database
//! that actually holds the product tables. The implementation owns the SQL,
//! the connection pool and authentication; the query layer only hands it a
//! [`CoarsePredicate`] and receives raw rows back.
//!
//! # Implementing InventoryStore
//!
//! Return `Err` for connectivity issues, timeouts or query failures. The
//! executor reports any such error as `Error::StoreUnavailable` and never
//! retries.
//!
//! # Mocking for Tests
//!
//! [`InMemoryInventoryStore`] evaluates predicates over a fixed row set,
//! counts the queries it answers and can be told to fail.

use crate::error::{Error, Result};
use crate::query::{CoarsePredicate, DateRange};
use crate::record::StoreRow;
use chrono::{NaiveDate, NaiveDateTime};
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Trait for inventory store implementations.
///
/// Every returned future is `Send` so a pending query can be shared between
/// concurrent requests.
pub trait InventoryStore: Send + Sync + 'static {
    /// Run the catalog query for a coarse predicate.
    ///
    /// Rows should come back ordered by product code.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable or the query fails
    fn run_query(
        &self,
        predicate: &CoarsePredicate,
    ) -> impl Future<Output = Result<Vec<StoreRow>>> + Send;
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// In-memory inventory store.
///
/// Evaluates the coarse predicate the way the catalog SQL does:
/// - group names compare after trimming padding;
/// - the date range is inclusive and needs both bounds;
/// - a bound that is not a date matches nothing.
///
/// Clones share rows, counters and injected failures.
#[derive(Clone, Default)]
pub struct InMemoryInventoryStore {
    rows: Arc<Mutex<Vec<StoreRow>>>,
    queries: Arc<AtomicUsize>,
    failure: Arc<Mutex<Option<String>>>,
    latency: Option<Duration>,
}

impl InMemoryInventoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `rows`.
    pub fn with_rows(rows: Vec<StoreRow>) -> Self {
        let store = Self::new();
        store.set_rows(rows);
        store
    }

    /// Load rows from a JSON array file.
    ///
    /// # Errors
    /// Returns `Err` if the file can't be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let rows: Vec<StoreRow> = serde_json::from_str(&raw)?;
        info!(
            "Loaded {} inventory rows from {}",
            rows.len(),
            path.as_ref().display()
        );
        Ok(Self::with_rows(rows))
    }

    /// Delay every query by `latency`, simulating I/O.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Replace all rows.
    pub fn set_rows(&self, rows: Vec<StoreRow>) {
        *lock(&self.rows) = rows;
    }

    /// Make every following query fail with `message` until [`recover`](Self::recover).
    pub fn fail_with(&self, message: impl Into<String>) {
        *lock(&self.failure) = Some(message.into());
    }

    /// Stop failing queries.
    pub fn recover(&self) {
        *lock(&self.failure) = None;
    }

    /// Number of queries received so far, failed ones included.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    /// Return true if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        lock(&self.rows).is_empty()
    }

    fn evaluate(&self, predicate: &CoarsePredicate) -> Result<Vec<StoreRow>> {
        if let Some(message) = lock(&self.failure).clone() {
            return Err(Error::StoreUnavailable(message));
        }

        let bounds = predicate.date_range.as_ref().map(parse_range);
        let mut rows: Vec<StoreRow> = lock(&self.rows)
            .iter()
            .filter(|row| matches_groups(row, &predicate.groups))
            .filter(|row| match &bounds {
                None => true,
                Some(None) => false,
                Some(Some((start, end))) => row
                    .creation_date
                    .is_some_and(|d| d >= *start && d <= *end),
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(rows)
    }
}

impl InventoryStore for InMemoryInventoryStore {
    async fn run_query(&self, predicate: &CoarsePredicate) -> Result<Vec<StoreRow>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let rows = self.evaluate(predicate)?;
        debug!(
            "InMemory store answered {:?} with {} rows",
            predicate,
            rows.len()
        );
        Ok(rows)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // A panicking writer leaves plain data behind; keep serving it.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn matches_groups(row: &StoreRow, groups: &[String]) -> bool {
    if groups.is_empty() {
        return true;
    }
    let name = row.group_name.as_deref().map(str::trim).unwrap_or_default();
    groups.iter().any(|g| g.trim() == name)
}

fn parse_range(range: &DateRange) -> Option<(NaiveDate, NaiveDate)> {
    Some((parse_date(&range.start)?, parse_date(&range.end)?))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}
