//! Serializable snapshot of what the table shows.
//!
//! `DataTable::render` produces a `TablePage`: everything a front end needs to
//! draw the toolbar, header, body and pagination bar for the current state,
//! with cells already formatted by the columns' render functions.

use crate::column::{Align, FilterOption};
use crate::record::RowId;
use crate::view::SortDirection;
use serde::Serialize;

/// Number of filter dropdowns shown in the toolbar.
pub const MAX_FILTER_CONTROLS: usize = 3;
/// Number of page buttons shown in the pagination bar.
pub const PAGE_BUTTONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    /// Whether clicking the header sorts (table and column both sortable)
    pub sortable: bool,
    /// Direction indicator when this column is the active sort
    pub sort: Option<SortDirection>,
    pub align: Align,
    pub width: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionButton {
    pub key: String,
    pub label: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRow {
    pub id: RowId,
    pub cells: Vec<String>,
    pub selected: bool,
    pub actions: Vec<ActionButton>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterControl {
    pub key: String,
    pub placeholder: String,
    pub options: Vec<FilterOption>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    /// 1-based position of the first row on the page, 0 when there are none
    pub first: usize,
    pub last: usize,
    pub total: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_numbers: Vec<usize>,
    pub has_previous: bool,
    pub has_next: bool,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
}

impl PageSummary {
    pub fn new(
        total: usize,
        current_page: usize,
        page_size: usize,
        page_size_options: Vec<usize>,
    ) -> Self {
        let total_pages = crate::view::total_pages(total, page_size);
        let range = crate::view::page_range(total, current_page, page_size);
        let (first, last) = if range.is_empty() {
            (0, 0)
        } else {
            (range.start + 1, range.end)
        };

        PageSummary {
            first,
            last,
            total,
            current_page,
            total_pages,
            page_numbers: crate::view::page_window(current_page, total_pages, PAGE_BUTTONS),
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
            page_size,
            page_size_options,
        }
    }

    /// Pagination bar is only worth drawing with more than one page.
    pub fn is_needed(&self) -> bool {
        self.total_pages > 1
    }

    pub fn showing_text(&self) -> String {
        format!(
            "Showing {} to {} of {} results",
            self.first, self.last, self.total
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePage {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<RenderedRow>,
    pub filter_controls: Vec<FilterControl>,
    pub search_term: Option<String>,
    pub selectable: bool,
    /// State of the header checkbox
    pub all_page_selected: bool,
    pub exportable: bool,
    /// Present only when pagination is enabled
    pub summary: Option<PageSummary>,
    /// Present only when the page has no rows
    pub empty_message: Option<String>,
    pub loading: bool,
}
