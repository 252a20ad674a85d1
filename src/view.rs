//! Derivation stages of the table pipeline.
//!
//! raw rows -> search -> column filters -> sort -> page slice
//!
//! Each stage is a pure function over the source rows and the view state. The
//! filtered and sorted result is represented as a list of indices into the
//! source collection, so no stage ever copies or mutates a row.

use crate::column::{ColumnDef, ColumnValue};
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Range;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The active sort column and its direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn ascending(column: impl Into<String>) -> Self {
        SortState {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        SortState {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Value a filter is matched against: the column's extracted value when the
/// key names a column, the raw field otherwise.
fn filter_value<R: Record>(row: &R, columns: &[ColumnDef<R>], key: &str) -> ColumnValue {
    match columns.iter().find(|c| c.key() == key) {
        Some(column) => column.value(row),
        None => row.field(key),
    }
}

fn contains_lowercase(value: &ColumnValue, needle_lower: &str) -> bool {
    value.to_string().to_lowercase().contains(needle_lower)
}

/// True if any column's string-cast value contains `term`, ignoring case.
/// An empty term matches every row.
pub fn matches_search<R: Record>(row: &R, columns: &[ColumnDef<R>], term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    columns
        .iter()
        .any(|column| contains_lowercase(&column.value(row), &needle))
}

/// True if the row satisfies every non-empty filter (case-insensitive substring).
pub fn matches_filters<R: Record>(
    row: &R,
    columns: &[ColumnDef<R>],
    filters: &BTreeMap<String, String>,
) -> bool {
    filters
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .all(|(key, value)| {
            contains_lowercase(&filter_value(row, columns, key), &value.to_lowercase())
        })
}

/// Source indices of the rows retained by search and column filters, in
/// source order.
pub fn filter_indices<R: Record>(
    rows: &[R],
    columns: &[ColumnDef<R>],
    search: &str,
    filters: &BTreeMap<String, String>,
) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| matches_search(*row, columns, search))
        .filter(|(_, row)| matches_filters(*row, columns, filters))
        .map(|(i, _)| i)
        .collect()
}

fn is_missing(value: &ColumnValue) -> bool {
    value.is_null() || value.is_nan()
}

/// Compare two raw values for a sort in `direction`. Nulls and NaN stay last
/// in both directions.
pub fn compare_values(a: &ColumnValue, b: &ColumnValue, direction: SortDirection) -> Ordering {
    match (is_missing(a), is_missing(b)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match direction {
            SortDirection::Ascending => a.native_cmp(b),
            SortDirection::Descending => a.native_cmp(b).reverse(),
        },
    }
}

/// Stable-sort `indices` by the active sort column.
///
/// Returns false and leaves `indices` untouched when there is no sort or the
/// sort key no longer names a column.
pub fn sort_indices<R: Record>(
    rows: &[R],
    columns: &[ColumnDef<R>],
    indices: &mut Vec<usize>,
    sort: Option<&SortState>,
) -> bool {
    let Some(sort) = sort else {
        return false;
    };
    let Some(column) = columns.iter().find(|c| c.key() == sort.column) else {
        return false;
    };

    match column.comparator() {
        Some(compare) => {
            indices.sort_by(|&a, &b| {
                let cmp = compare(&rows[a], &rows[b]);
                match sort.direction {
                    SortDirection::Ascending => cmp,
                    SortDirection::Descending => cmp.reverse(),
                }
            });
        }
        None => {
            // Extract each sort key once up front.
            let mut keyed: Vec<(usize, ColumnValue)> = indices
                .iter()
                .map(|&i| (i, column.value(&rows[i])))
                .collect();
            keyed.sort_by(|(_, a), (_, b)| compare_values(a, b, sort.direction));
            *indices = keyed.into_iter().map(|(i, _)| i).collect();
        }
    }
    true
}

/// Number of pages for `len` rows; never less than 1.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Clamp a 1-based page number into `[1, total_pages]`.
pub fn clamp_page(page: usize, len: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(len, page_size))
}

/// Slice of the sorted sequence shown on 1-based `page`:
/// `[(page - 1) * page_size, page * page_size)`, cut at `len`.
pub fn page_range(len: usize, page: usize, page_size: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// Up to `width` consecutive page numbers containing `current`, kept as
/// centred as the page bounds allow.
pub fn page_window(current: usize, total: usize, width: usize) -> Vec<usize> {
    if total == 0 || width == 0 {
        return Vec::new();
    }
    let width = width.min(total);
    let current = current.clamp(1, total);
    let half = width / 2;
    let start = current.saturating_sub(half).max(1).min(total - width + 1);
    (start..start + width).collect()
}
