//! In-memory fine filters applied to a cached or freshly loaded result set.

use crate::query::{CoarseFilter, FineFilter};
use crate::record::InventoryRecord;

/// Group whose products are split into code-prefix sub-lines.
pub const SUB_LINE_GROUP: &str = "CALZADOS MASCULINOS";

/// Applies the filters that never partition the cache.
pub struct FilterEngine;

impl FilterEngine {
    /// Filter `records` by sub-line (when applicable) and then by search text.
    ///
    /// The input is left untouched; matching records are cloned into a new vector.
    pub fn apply(
        records: &[InventoryRecord],
        fine: &FineFilter,
        coarse: &CoarseFilter,
    ) -> Vec<InventoryRecord> {
        let prefix = fine
            .sub_line
            .prefix()
            .filter(|_| Self::sub_line_applies(coarse));
        let needle = fine.search.as_deref().map(str::to_lowercase);

        records
            .iter()
            .filter(|r| prefix.map_or(true, |p| r.code.trim().to_uppercase().starts_with(p)))
            .filter(|r| needle.as_deref().map_or(true, |n| r.matches_text(n)))
            .cloned()
            .collect()
    }

    /// Whether the coarse filter selects the masculine footwear group.
    ///
    /// A group list is checked by containment in its comma-joined form; a
    /// single group must match exactly. Both comparisons ignore case.
    pub fn sub_line_applies(coarse: &CoarseFilter) -> bool {
        if !coarse.group_list.is_empty() {
            return coarse
                .group_list
                .join(",")
                .to_uppercase()
                .contains(SUB_LINE_GROUP);
        }

        coarse
            .group
            .as_deref()
            .is_some_and(|g| g.trim().eq_ignore_ascii_case(SUB_LINE_GROUP))
    }
}
