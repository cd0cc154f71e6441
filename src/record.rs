//! Inventory record shapes: the raw row handed over by the store and the
//! typed record served to clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A row as returned by the inventory store.
///
/// Every column is optional and string columns may carry padding. Rows are
/// never served as-is; the executor rebuilds each one into an
/// [`InventoryRecord`] field by field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreRow {
    pub code: Option<String>,
    pub name: Option<String>,
    pub color_description: Option<String>,
    pub group_code: Option<String>,
    pub group_name: Option<String>,
    pub creation_date: Option<NaiveDate>,
    /// Conversion factor: pieces per recorded case.
    pub unit: Option<f64>,
    pub on_hand: Option<f64>,
    pub reserved: Option<f64>,
    pub available: Option<f64>,
    pub future: Option<f64>,
    pub composition: Option<String>,
}

/// A normalized catalog record.
///
/// Quantities are expressed in pieces. `available` is taken from the store
/// and rescaled, never recomputed from `on_hand - reserved`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub code: String,
    pub name: String,
    pub color_description: String,
    pub group_code: String,
    pub group_name: String,
    pub creation_date: Option<NaiveDate>,
    pub raw_unit: f64,
    pub on_hand: f64,
    pub reserved: f64,
    pub available: f64,
    pub future: f64,
    pub composition: String,
}

impl InventoryRecord {
    /// Case-insensitive substring match against code, name or color.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        [&self.code, &self.name, &self.color_description]
            .iter()
            .any(|field| field.to_lowercase().contains(needle_lower))
    }
}
