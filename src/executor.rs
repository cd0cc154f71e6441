//! Coarse query execution: predicate building, store call, row normalization.

use crate::error::{Error, Result};
use crate::normalize::{effective_unit, normalize};
use crate::query::CoarseFilter;
use crate::record::{InventoryRecord, StoreRow};
use crate::repository::InventoryStore;
use std::time::Instant;

/// Runs the cacheable part of a catalog request against the inventory store.
///
/// The executor never caches and never retries; both belong to the caller.
pub struct QueryExecutor<S: InventoryStore> {
    store: S,
}

impl<S: InventoryStore> QueryExecutor<S> {
    pub fn new(store: S) -> Self {
        QueryExecutor { store }
    }

    /// Store reference (for advanced use).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch and normalize every record matching `filter`.
    ///
    /// # Errors
    ///
    /// Any store failure is reported as `Error::StoreUnavailable`.
    pub async fn execute(&self, filter: &CoarseFilter) -> Result<Vec<InventoryRecord>> {
        let timer = Instant::now();
        let predicate = filter.predicate();

        let rows = self
            .store
            .run_query(&predicate)
            .await
            .map_err(|e| match e {
                Error::StoreUnavailable(_) => e,
                other => Error::StoreUnavailable(other.to_string()),
            })?;

        let records: Vec<InventoryRecord> = rows.into_iter().map(normalize_row).collect();
        debug!(
            "Store query for {:?} returned {} rows in {:?}",
            predicate,
            records.len(),
            timer.elapsed()
        );
        Ok(records)
    }
}

/// Rebuild a store row into a typed record.
///
/// String columns are trimmed; the four quantity columns are rescaled to
/// pieces with the row's own conversion factor.
pub fn normalize_row(row: StoreRow) -> InventoryRecord {
    let unit = effective_unit(row.unit);
    let rescale = |quantity: Option<f64>| normalize(quantity, Some(unit));

    InventoryRecord {
        on_hand: rescale(row.on_hand),
        reserved: rescale(row.reserved),
        available: rescale(row.available),
        future: rescale(row.future),
        code: trimmed(row.code),
        name: trimmed(row.name),
        color_description: trimmed(row.color_description),
        group_code: trimmed(row.group_code),
        group_name: trimmed(row.group_name),
        creation_date: row.creation_date,
        raw_unit: unit,
        composition: trimmed(row.composition),
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
