//! Canonical cache keys for coarse filters.

use crate::query::CoarseFilter;

/// Namespace prefix of every result-set key.
pub const KEY_PREFIX: &str = "inventory";

/// Builder for coarse-filter cache keys.
///
/// Key format: `inventory:g=<group>|gl=<a,b>|ds=<start>|de=<end>`.
///
/// - Fine filters (search, sub-line) never enter the key.
/// - `group` is left out when a group list is present, since the list alone
///   drives the query.
/// - The group list keeps the caller's order; `A,B` and `B,A` are distinct
///   partitions.
/// - Separator characters inside values are percent-escaped so distinct
///   filters cannot collide.
pub struct CacheKeyBuilder;

impl CacheKeyBuilder {
    /// Build the canonical key for a coarse filter.
    pub fn build(filter: &CoarseFilter) -> String {
        let group = if filter.group_list.is_empty() {
            filter.group.as_deref().map(escape).unwrap_or_default()
        } else {
            String::new()
        };
        let group_list = filter
            .group_list
            .iter()
            .map(|g| escape(g))
            .collect::<Vec<_>>()
            .join(",");

        let parts = [
            format!("g={}", group),
            format!("gl={}", group_list),
            format!("ds={}", filter.date_start.as_deref().map(escape).unwrap_or_default()),
            format!("de={}", filter.date_end.as_deref().map(escape).unwrap_or_default()),
        ];

        format!("{}:{}", KEY_PREFIX, parts.join("|"))
    }
}

/// Convenience wrapper over [`CacheKeyBuilder::build`].
pub fn canonical_key(filter: &CoarseFilter) -> String {
    CacheKeyBuilder::build(filter)
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '|' => out.push_str("%7C"),
            ',' => out.push_str("%2C"),
            '=' => out.push_str("%3D"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> CoarseFilter {
        CoarseFilter::default()
    }

    #[test]
    fn test_empty_filter_key() {
        assert_eq!(canonical_key(&filter()), "inventory:g=|gl=|ds=|de=");
    }

    #[test]
    fn test_single_group_key() {
        let f = CoarseFilter {
            group: Some("CALZADOS MASCULINOS".to_string()),
            ..filter()
        };
        assert_eq!(canonical_key(&f), "inventory:g=CALZADOS MASCULINOS|gl=|ds=|de=");
    }

    #[test]
    fn test_group_list_drops_single_group() {
        let with_group = CoarseFilter {
            group: Some("C".to_string()),
            group_list: vec!["A".to_string(), "B".to_string()],
            ..filter()
        };
        let without_group = CoarseFilter {
            group_list: vec!["A".to_string(), "B".to_string()],
            ..filter()
        };
        assert_eq!(canonical_key(&with_group), canonical_key(&without_group));
        assert_eq!(canonical_key(&with_group), "inventory:g=|gl=A,B|ds=|de=");
    }

    #[test]
    fn test_group_list_order_is_significant() {
        let ab = CoarseFilter {
            group_list: vec!["A".to_string(), "B".to_string()],
            ..filter()
        };
        let ba = CoarseFilter {
            group_list: vec!["B".to_string(), "A".to_string()],
            ..filter()
        };
        assert_ne!(canonical_key(&ab), canonical_key(&ba));
    }

    #[test]
    fn test_separators_are_escaped() {
        let one = CoarseFilter {
            group_list: vec!["A,B".to_string()],
            ..filter()
        };
        let two = CoarseFilter {
            group_list: vec!["A".to_string(), "B".to_string()],
            ..filter()
        };
        assert_ne!(canonical_key(&one), canonical_key(&two));
        assert_eq!(canonical_key(&one), "inventory:g=|gl=A%2CB|ds=|de=");
    }

    #[test]
    fn test_dates_in_key() {
        let f = CoarseFilter {
            date_start: Some("2024-01-01".to_string()),
            date_end: Some("2024-06-30".to_string()),
            ..filter()
        };
        assert_eq!(canonical_key(&f), "inventory:g=|gl=|ds=2024-01-01|de=2024-06-30");
    }
}
