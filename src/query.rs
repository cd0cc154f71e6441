//! Request parameters and the filters derived from them.
//!
//! Parameters split into two groups:
//!
//! | Group | Fields | Cache key |
//! |-------|--------|-----------|
//! | Coarse | `group`, `groups`, `dateStart`, `dateEnd` | yes |
//! | Fine | `search`, `subcat` | no |
//!
//! `page` and `pageSize` only shape the response.

use serde::Deserialize;

/// Default page size when paging is requested without an explicit size.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Raw query-string parameters of the inventory route.
///
/// All values stay as strings: nothing here is validated, malformed dates or
/// page numbers are passed through and may simply produce no rows.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuery {
    pub group: Option<String>,
    pub groups: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub search: Option<String>,
    pub subcat: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl InventoryQuery {
    /// Build from decoded query-string pairs.
    ///
    /// The first occurrence of a repeated parameter wins; unknown names are
    /// ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = InventoryQuery::default();
        for (name, value) in pairs {
            let slot = match name.as_ref() {
                "group" => &mut query.group,
                "groups" => &mut query.groups,
                "dateStart" => &mut query.date_start,
                "dateEnd" => &mut query.date_end,
                "search" => &mut query.search,
                "subcat" => &mut query.subcat,
                "page" => &mut query.page,
                "pageSize" => &mut query.page_size,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        query
    }

    /// Cache-partitioning part of the request.
    pub fn coarse_filter(&self) -> CoarseFilter {
        let group_list = self
            .groups
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        CoarseFilter {
            group: non_empty(&self.group),
            group_list,
            date_start: non_empty(&self.date_start),
            date_end: non_empty(&self.date_end),
        }
    }

    /// In-memory part of the request.
    pub fn fine_filter(&self) -> FineFilter {
        FineFilter {
            search: non_empty(&self.search),
            sub_line: self
                .subcat
                .as_deref()
                .map(SubLine::parse)
                .unwrap_or_default(),
        }
    }

    /// Paging window, if the caller asked for one.
    pub fn pagination(&self) -> Option<Pagination> {
        let page = non_empty(&self.page);
        let page_size = non_empty(&self.page_size);
        if page.is_none() && page_size.is_none() {
            return None;
        }

        Some(Pagination {
            page: page.map_or(Some(1), |p| p.trim().parse().ok()),
            page_size: page_size.map_or(Some(DEFAULT_PAGE_SIZE), |s| s.trim().parse().ok()),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// Filter fields that partition the cache.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoarseFilter {
    pub group: Option<String>,
    /// Ordered as supplied by the caller. Takes precedence over `group` when non-empty.
    pub group_list: Vec<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

impl CoarseFilter {
    /// Groups actually constraining the query.
    pub fn effective_groups(&self) -> Vec<&str> {
        if !self.group_list.is_empty() {
            self.group_list.iter().map(String::as_str).collect()
        } else {
            self.group.as_deref().into_iter().collect()
        }
    }

    /// Store-side predicate for this filter.
    pub fn predicate(&self) -> CoarsePredicate {
        let date_range = match (&self.date_start, &self.date_end) {
            (Some(start), Some(end)) => Some(DateRange {
                start: start.clone(),
                end: end.clone(),
            }),
            _ => None,
        };

        CoarsePredicate {
            groups: self
                .effective_groups()
                .into_iter()
                .map(str::to_string)
                .collect(),
            date_range,
        }
    }
}

/// Predicate handed to the inventory store.
///
/// An empty `groups` list means no group constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoarsePredicate {
    pub groups: Vec<String>,
    pub date_range: Option<DateRange>,
}

/// Inclusive creation-date bounds, kept exactly as the caller sent them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Filter fields applied after the cache.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FineFilter {
    pub search: Option<String>,
    pub sub_line: SubLine,
}

/// Code-prefix sub-line within the masculine footwear group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubLine {
    #[default]
    None,
    Bruno,
    Enzo,
}

impl SubLine {
    /// Parse a `subcat` value. Unknown values mean no sub-line.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "BRUNO" => SubLine::Bruno,
            "ENZO" => SubLine::Enzo,
            _ => SubLine::None,
        }
    }

    /// Code prefix selected by this sub-line.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            SubLine::None => None,
            SubLine::Bruno => Some("BRUNO"),
            SubLine::Enzo => Some("ENZO"),
        }
    }
}

/// Requested paging window. `None` fields mark values that failed to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl Pagination {
    /// Cut the page out of `records`.
    ///
    /// Unparseable or non-positive values select nothing.
    pub fn slice<T>(&self, records: Vec<T>) -> Vec<T> {
        let (page, size) = match (self.page, self.page_size) {
            (Some(p), Some(s)) if p >= 1 && s >= 1 => (p, s),
            _ => return Vec::new(),
        };

        let offset = (page - 1).saturating_mul(size);
        let (Ok(offset), Ok(size)) = (usize::try_from(offset), usize::try_from(size)) else {
            return Vec::new();
        };
        records.into_iter().skip(offset).take(size).collect()
    }
}
