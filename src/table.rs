//! The table engine.
//!
//! A `DataTable<R>` owns the view state of one table instance (search term,
//! column filters, sort, page, page size, selection) over a row collection
//! shared with the caller. Every state change re-derives the filtered and
//! sorted index list from the full source; the current page is a slice of it.
//!
//! # Examples
//!
//! ```
//! use tableview::{ColumnDef, ColumnValue, DataTable, TableConfig};
//! use std::collections::HashMap;
//! use std::rc::Rc;
//!
//! type Row = HashMap<String, ColumnValue>;
//!
//! let rows: Vec<Row> = (1..=25)
//!     .map(|i| {
//!         let mut row = Row::new();
//!         row.insert("id".to_string(), ColumnValue::Int32(i));
//!         row.insert("name".to_string(), ColumnValue::String(format!("Employee {}", i)));
//!         row
//!     })
//!     .collect();
//!
//! let columns = vec![
//!     ColumnDef::new("id", "ID").sortable(),
//!     ColumnDef::new("name", "Name"),
//! ];
//!
//! let mut table = DataTable::new(Rc::new(rows), columns, TableConfig::default()).unwrap();
//! assert_eq!(table.total_pages(), 3);
//!
//! table.set_page(3);
//! assert_eq!(table.visible_rows().len(), 5);
//!
//! table.set_search("employee 1");
//! assert_eq!(table.current_page(), 1);
//! assert_eq!(table.filtered_len(), 11); // 1, 10..=19
//! ```

use crate::column::ColumnDef;
use crate::config::{effective_page_size, TableConfig};
use crate::error::{Result, TableError};
use crate::events::{ExportFormat, RowAction, TableCallbacks};
use crate::record::{identity_of, Record, RowId};
use crate::render::{
    ActionButton, FilterControl, HeaderCell, PageSummary, RenderedRow, TablePage,
    MAX_FILTER_CONTROLS,
};
use crate::selection::Selection;
use crate::view::{self, SortDirection, SortState};
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

pub struct DataTable<R> {
    rows: Rc<Vec<R>>,
    columns: Vec<ColumnDef<R>>,
    config: TableConfig,
    callbacks: TableCallbacks<R>,
    search_term: String,
    active_filters: BTreeMap<String, String>,
    sort: Option<SortState>,
    current_page: usize,
    page_size: usize,
    selection: Selection,
    loading: bool,
    /// Identity of each source row, by source position
    ids: Vec<RowId>,
    /// Source indices after search, filters and sort
    derived: Vec<usize>,
}

/// Reject column sets with empty or repeated keys.
fn validate_columns<R>(columns: &[ColumnDef<R>]) -> Result<()> {
    let mut seen = HashSet::new();
    for column in columns {
        if column.key().is_empty() {
            return Err(TableError::EmptyColumnKey {
                label: column.label().to_string(),
            });
        }
        if !seen.insert(column.key()) {
            return Err(TableError::DuplicateColumn {
                key: column.key().to_string(),
            });
        }
    }
    Ok(())
}

impl<R: Record> DataTable<R> {
    /// Create a table over `rows`. Fails only on a malformed column set.
    pub fn new(rows: Rc<Vec<R>>, columns: Vec<ColumnDef<R>>, config: TableConfig) -> Result<Self> {
        validate_columns(&columns)?;
        let config = config.sanitized();
        let ids = rows
            .iter()
            .enumerate()
            .map(|(i, row)| identity_of(row, i))
            .collect();

        let mut table = DataTable {
            page_size: config.pagination.page_size,
            rows,
            columns,
            config,
            callbacks: TableCallbacks::default(),
            search_term: String::new(),
            active_filters: BTreeMap::new(),
            sort: None,
            current_page: 1,
            selection: Selection::new(),
            loading: false,
            ids,
            derived: Vec::new(),
        };
        table.rebuild();
        Ok(table)
    }

    /// Convenience constructor taking ownership of the rows.
    pub fn from_rows(rows: Vec<R>, columns: Vec<ColumnDef<R>>, config: TableConfig) -> Result<Self> {
        Self::new(Rc::new(rows), columns, config)
    }

    pub fn with_callbacks(mut self, callbacks: TableCallbacks<R>) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn on_row_click<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) + 'static,
    {
        self.callbacks.on_row_click = Some(Box::new(f));
        self
    }

    pub fn on_selection_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&[&R]) + 'static,
    {
        self.callbacks.on_selection_change = Some(Box::new(f));
        self
    }

    pub fn on_export<F>(mut self, f: F) -> Self
    where
        F: Fn(&[&R], ExportFormat) + 'static,
    {
        self.callbacks.on_export = Some(Box::new(f));
        self
    }

    pub fn with_action(mut self, action: RowAction<R>) -> Self {
        self.callbacks.actions.push(action);
        self
    }

    // ==================== Derivation ====================

    /// Re-derive the filtered and sorted index list and re-clamp the page.
    fn rebuild(&mut self) {
        let mut derived = view::filter_indices(
            self.rows.as_slice(),
            &self.columns,
            &self.search_term,
            &self.active_filters,
        );
        if let Some(sort) = self.sort.as_ref() {
            if !view::sort_indices(self.rows.as_slice(), &self.columns, &mut derived, Some(sort)) {
                log::debug!("sort column '{}' is not a column, leaving rows unsorted", sort.column);
            }
        }
        self.derived = derived;
        self.clamp_current_page();
    }

    fn clamp_current_page(&mut self) {
        if !self.config.pagination.enabled {
            self.current_page = 1;
            return;
        }
        self.current_page = view::clamp_page(self.current_page, self.derived.len(), self.page_size);
    }

    fn page_indices(&self) -> &[usize] {
        if !self.config.pagination.enabled {
            return &self.derived;
        }
        let range = view::page_range(self.derived.len(), self.current_page, self.page_size);
        &self.derived[range]
    }

    fn position_of(&self, id: &RowId) -> Option<usize> {
        self.ids.iter().position(|candidate| candidate == id)
    }

    fn row_by_id(&self, id: &RowId) -> Result<&R> {
        self.position_of(id)
            .map(|i| &self.rows[i])
            .ok_or_else(|| TableError::RowNotFound { id: id.clone() })
    }

    // ==================== Search and filters ====================

    /// Set the free-text search term and go back to page 1.
    pub fn set_search(&mut self, term: impl Into<String>) {
        if !self.config.searchable {
            return;
        }
        self.search_term = term.into();
        self.current_page = 1;
        log::debug!("search term set to '{}'", self.search_term);
        self.rebuild();
    }

    /// Set the filter for `key`; an empty value removes it. Goes back to page 1.
    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        if !self.config.filterable {
            return;
        }
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            self.active_filters.remove(&key);
        } else {
            self.active_filters.insert(key, value);
        }
        self.current_page = 1;
        self.rebuild();
    }

    pub fn clear_filters(&mut self) {
        if self.active_filters.is_empty() {
            return;
        }
        self.active_filters.clear();
        self.current_page = 1;
        self.rebuild();
    }

    // ==================== Sort ====================

    /// Sort by `key`: toggles direction on the active column, otherwise makes
    /// `key` active ascending. Returns false when sorting by `key` is not
    /// allowed.
    pub fn toggle_sort(&mut self, key: &str) -> bool {
        if !self.config.sortable {
            return false;
        }
        let sortable = self
            .columns
            .iter()
            .any(|c| c.key() == key && c.is_sortable());
        if !sortable {
            log::debug!("ignoring sort on '{}': not a sortable column", key);
            return false;
        }

        self.sort = match self.sort.take() {
            Some(current) if current.column == key => Some(SortState {
                column: current.column,
                direction: current.direction.toggled(),
            }),
            _ => Some(SortState::ascending(key)),
        };
        self.rebuild();
        true
    }

    pub fn clear_sort(&mut self) {
        if self.sort.take().is_some() {
            self.rebuild();
        }
    }

    // ==================== Pagination ====================

    /// Go to 1-based `page`, clamped into the valid range.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page;
        self.clamp_current_page();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.current_page.saturating_sub(1));
    }

    /// Change the page size and go back to page 1. Zero falls back to the
    /// default page size.
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            log::warn!("page size 0 is invalid, using {}", effective_page_size(0));
        }
        self.page_size = effective_page_size(page_size);
        self.current_page = 1;
        self.clamp_current_page();
    }

    // ==================== Selection ====================

    fn notify_selection(&self) {
        if let Some(ref callback) = self.callbacks.on_selection_change {
            let selected = self.selected_rows();
            callback(&selected);
        }
    }

    /// Select or deselect one row. Returns whether the selection changed.
    pub fn select_row(&mut self, id: &RowId, checked: bool) -> Result<bool> {
        if !self.config.selectable {
            return Ok(false);
        }
        if self.position_of(id).is_none() {
            return Err(TableError::RowNotFound { id: id.clone() });
        }
        let changed = self.selection.set(id.clone(), checked);
        if changed {
            self.notify_selection();
        }
        Ok(changed)
    }

    /// Select or deselect every row on the current page. Rows on other pages
    /// keep their state. Returns whether the selection changed.
    pub fn select_all(&mut self, checked: bool) -> bool {
        if !self.config.selectable {
            return false;
        }
        let page_ids: Vec<RowId> = self
            .page_indices()
            .iter()
            .map(|&i| self.ids[i].clone())
            .collect();
        let changed = self.selection.set_many(&page_ids, checked);
        if changed {
            self.notify_selection();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.notify_selection();
        }
        changed
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selection.contains(id)
    }

    /// Whether every row of the current page is selected (false on an empty page).
    pub fn all_page_selected(&self) -> bool {
        let page = self.page_indices();
        self.selection.contains_all(page.iter().map(|&i| &self.ids[i]))
    }

    /// Selected rows resolved against the full source, in source order.
    pub fn selected_rows(&self) -> Vec<&R> {
        self.rows
            .iter()
            .zip(self.ids.iter())
            .filter(|(_, id)| self.selection.contains(id))
            .map(|(row, _)| row)
            .collect()
    }

    pub fn selected_ids(&self) -> Vec<RowId> {
        self.selection.ids()
    }

    // ==================== Pass-through actions ====================

    /// Forward the row with identity `id` to the row-click callback.
    pub fn click_row(&self, id: &RowId) -> Result<()> {
        let row = self.row_by_id(id)?;
        if let Some(ref callback) = self.callbacks.on_row_click {
            callback(row);
        }
        Ok(())
    }

    /// Run the row action `action` on the row with identity `id`.
    /// Returns false if the action is disabled for that row.
    pub fn invoke_action(&self, id: &RowId, action: &str) -> Result<bool> {
        let row = self.row_by_id(id)?;
        let action = self
            .callbacks
            .action(action)
            .ok_or_else(|| TableError::UnknownAction {
                key: action.to_string(),
            })?;
        Ok(action.invoke(row))
    }

    /// Hand the filtered and sorted rows (all pages) to the export handler.
    /// Returns false when exporting is disabled or no handler is set.
    pub fn export(&self, format: ExportFormat) -> bool {
        if !self.config.exportable {
            return false;
        }
        let Some(ref handler) = self.callbacks.on_export else {
            return false;
        };
        let rows = self.filtered_rows();
        log::info!("exporting {} rows as {}", rows.len(), format);
        handler(&rows, format);
        true
    }

    // ==================== Source and schema changes ====================

    /// Replace the source rows. Search, filters and sort are kept; the page is
    /// re-clamped and selected identities missing from the new rows are dropped.
    pub fn set_rows(&mut self, rows: Rc<Vec<R>>) {
        self.ids = rows
            .iter()
            .enumerate()
            .map(|(i, row)| identity_of(row, i))
            .collect();
        self.rows = rows;

        let present: HashSet<&RowId> = self.ids.iter().collect();
        let purged = self.selection.retain(|id| present.contains(id));
        self.rebuild();
        if purged {
            log::debug!("dropped selected rows that are no longer present");
            self.notify_selection();
        }
    }

    /// Replace the column set. View state is kept; a sort on a column that no
    /// longer exists is ignored until a new sort is chosen.
    pub fn set_columns(&mut self, columns: Vec<ColumnDef<R>>) -> Result<()> {
        validate_columns(&columns)?;
        self.columns = columns;
        if let Some(ref sort) = self.sort {
            if !self.columns.iter().any(|c| c.key() == sort.column) {
                log::warn!("active sort column '{}' was removed", sort.column);
            }
        }
        self.rebuild();
        Ok(())
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    // ==================== Accessors ====================

    pub fn rows(&self) -> &Rc<Vec<R>> {
        &self.rows
    }

    pub fn columns(&self) -> &[ColumnDef<R>] {
        &self.columns
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn active_filters(&self) -> &BTreeMap<String, String> {
        &self.active_filters
    }

    /// The active sort, or None when none is set or its column is gone.
    pub fn sort(&self) -> Option<&SortState> {
        self.sort
            .as_ref()
            .filter(|s| self.columns.iter().any(|c| c.key() == s.column))
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        if !self.config.pagination.enabled {
            return 1;
        }
        view::total_pages(self.derived.len(), self.page_size)
    }

    /// Number of rows after search and filters, across all pages.
    pub fn filtered_len(&self) -> usize {
        self.derived.len()
    }

    /// Rows after search, filters and sort, across all pages.
    pub fn filtered_rows(&self) -> Vec<&R> {
        self.derived.iter().map(|&i| &self.rows[i]).collect()
    }

    /// Rows on the current page.
    pub fn visible_rows(&self) -> Vec<&R> {
        self.page_indices().iter().map(|&i| &self.rows[i]).collect()
    }

    pub fn visible_ids(&self) -> Vec<RowId> {
        self.page_indices().iter().map(|&i| self.ids[i].clone()).collect()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    // ==================== Rendering ====================

    fn header_cells(&self) -> Vec<HeaderCell> {
        let active = self.sort();
        self.columns
            .iter()
            .map(|column| HeaderCell {
                key: column.key().to_string(),
                label: column.label().to_string(),
                sortable: self.config.sortable && column.is_sortable(),
                sort: active
                    .filter(|s| s.column == column.key())
                    .map(|s| s.direction),
                align: column.alignment(),
                width: column.width_hint().map(str::to_string),
            })
            .collect()
    }

    fn filter_controls(&self) -> Vec<FilterControl> {
        if !self.config.filterable {
            return Vec::new();
        }
        self.columns
            .iter()
            .filter(|c| c.is_filterable())
            .take(MAX_FILTER_CONTROLS)
            .map(|column| FilterControl {
                key: column.key().to_string(),
                placeholder: format!("Filter {}", column.label()),
                options: column.options().to_vec(),
                value: self
                    .active_filters
                    .get(column.key())
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect()
    }

    fn render_row(&self, source_index: usize, page_index: usize) -> RenderedRow {
        let row = &self.rows[source_index];
        let id = self.ids[source_index].clone();
        RenderedRow {
            selected: self.selection.contains(&id),
            id,
            cells: self
                .columns
                .iter()
                .map(|column| column.render_cell(row, page_index))
                .collect(),
            actions: self
                .callbacks
                .actions
                .iter()
                .map(|action| ActionButton {
                    key: action.key().to_string(),
                    label: action.label().to_string(),
                    disabled: !action.is_enabled_for(row),
                })
                .collect(),
        }
    }

    /// Snapshot of the current page for display.
    pub fn render(&self) -> TablePage {
        let rows: Vec<RenderedRow> = self
            .page_indices()
            .iter()
            .enumerate()
            .map(|(page_index, &source_index)| self.render_row(source_index, page_index))
            .collect();

        let summary = self.config.pagination.enabled.then(|| {
            PageSummary::new(
                self.derived.len(),
                self.current_page,
                self.page_size,
                self.config.pagination.page_size_options.clone(),
            )
        });

        TablePage {
            headers: self.header_cells(),
            empty_message: rows
                .is_empty()
                .then(|| self.config.empty_message.clone()),
            rows,
            filter_controls: self.filter_controls(),
            search_term: self
                .config
                .searchable
                .then(|| self.search_term.clone()),
            selectable: self.config.selectable,
            all_page_selected: self.config.selectable && self.all_page_selected(),
            exportable: self.config.exportable,
            summary,
            loading: self.loading,
        }
    }

    /// Direction of the active sort on `key`, if it is the active column.
    pub fn sort_direction(&self, key: &str) -> Option<SortDirection> {
        self.sort()
            .filter(|s| s.column == key)
            .map(|s| s.direction)
    }
}

impl<R> std::fmt::Debug for DataTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataTable")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns)
            .field("search_term", &self.search_term)
            .field("active_filters", &self.active_filters)
            .field("sort", &self.sort)
            .field("current_page", &self.current_page)
            .field("page_size", &self.page_size)
            .field("selected", &self.selection.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnValue;
    use crate::config::DEFAULT_PAGE_SIZE;
    use std::cell::RefCell;
    use std::collections::HashMap;

    type Row = HashMap<String, ColumnValue>;

    fn employee(id: i32, name: &str, department: &str, status: &str, age: i32) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), ColumnValue::Int32(id));
        row.insert("name".to_string(), name.into());
        row.insert("department".to_string(), department.into());
        row.insert("status".to_string(), status.into());
        row.insert("age".to_string(), ColumnValue::Int32(age));
        row
    }

    fn numbered(count: i32) -> Vec<Row> {
        (1..=count)
            .map(|i| employee(i, &format!("Employee {}", i), "Engineering", "active", 20 + i))
            .collect()
    }

    fn columns() -> Vec<ColumnDef<Row>> {
        vec![
            ColumnDef::new("name", "Name").sortable(),
            ColumnDef::new("department", "Department").filterable(),
            ColumnDef::new("status", "Status").filterable(),
            ColumnDef::new("age", "Age").sortable(),
        ]
    }

    fn id(n: i32) -> RowId {
        RowId::Key(n.to_string())
    }

    fn ids_of(rows: &[&Row]) -> Vec<i32> {
        rows.iter()
            .map(|r| r.get("id").and_then(|v| v.as_i32()).unwrap())
            .collect()
    }

    fn selectable_table(rows: Vec<Row>) -> DataTable<Row> {
        DataTable::from_rows(rows, columns(), TableConfig::default().selectable(true)).unwrap()
    }

    #[test]
    fn test_pages_of_twenty_five_rows() {
        let mut table = DataTable::from_rows(numbered(25), columns(), TableConfig::default()).unwrap();
        assert_eq!(ids_of(&table.visible_rows()), (1..=10).collect::<Vec<_>>());

        table.set_page(3);
        assert_eq!(ids_of(&table.visible_rows()), vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_page_slice_matches_sorted_filtered() {
        let mut table = DataTable::from_rows(numbered(25), columns(), TableConfig::default().page_size(4)).unwrap();
        table.toggle_sort("age");
        table.toggle_sort("age");
        table.set_page(2);

        let all = ids_of(&table.filtered_rows());
        assert_eq!(ids_of(&table.visible_rows()), all[4..8].to_vec());
    }

    #[test]
    fn test_page_is_clamped() {
        let mut table = DataTable::from_rows(numbered(25), columns(), TableConfig::default()).unwrap();
        table.set_page(99);
        assert_eq!(table.current_page(), 3);
        table.set_page(0);
        assert_eq!(table.current_page(), 1);

        table.set_page(3);
        table.next_page();
        assert_eq!(table.current_page(), 3);
        table.prev_page();
        assert_eq!(table.current_page(), 2);
    }

    #[test]
    fn test_empty_result_keeps_page_one() {
        let mut table = DataTable::from_rows(numbered(25), columns(), TableConfig::default()).unwrap();
        table.set_search("nobody");
        assert_eq!(table.filtered_len(), 0);
        assert_eq!(table.current_page(), 1);
        assert_eq!(table.total_pages(), 1);
    }

    #[test]
    fn test_search_and_filter_reset_page() {
        let mut table = DataTable::from_rows(numbered(25), columns(), TableConfig::default()).unwrap();

        table.set_page(3);
        table.set_search("employee");
        assert_eq!(table.current_page(), 1);

        table.set_page(2);
        table.set_filter("status", "act");
        assert_eq!(table.current_page(), 1);

        table.set_page(2);
        table.set_filter("status", "");
        assert_eq!(table.current_page(), 1);
        assert!(table.active_filters().is_empty());
    }

    #[test]
    fn test_filter_plus_search() {
        let rows = vec![
            employee(1, "Ann", "Engineering", "active", 30),
            employee(2, "Bob", "Engineering", "inactive", 31),
            employee(3, "Cid", "Sales", "active", 32),
            employee(4, "Dee", "Marketing", "active", 33),
        ];
        let mut table = DataTable::from_rows(rows, columns(), TableConfig::default()).unwrap();
        table.set_filter("status", "active");
        table.set_search("eng");

        // "inactive" contains "active" as a substring
        assert_eq!(ids_of(&table.filtered_rows()), vec![1, 2]);

        table.set_filter("status", "inactive");
        assert_eq!(ids_of(&table.filtered_rows()), vec![2]);
    }

    #[test]
    fn test_sort_toggle_sequence() {
        let mut table = DataTable::from_rows(numbered(3), columns(), TableConfig::default()).unwrap();
        assert!(table.sort().is_none());

        assert!(table.toggle_sort("age"));
        assert_eq!(table.sort_direction("age"), Some(SortDirection::Ascending));

        table.toggle_sort("age");
        assert_eq!(table.sort_direction("age"), Some(SortDirection::Descending));
        assert_eq!(ids_of(&table.visible_rows()), vec![3, 2, 1]);

        table.toggle_sort("name");
        assert_eq!(table.sort_direction("name"), Some(SortDirection::Ascending));
        assert_eq!(table.sort_direction("age"), None);
    }

    #[test]
    fn test_sort_rejected_for_unsortable() {
        let mut table = DataTable::from_rows(numbered(3), columns(), TableConfig::default()).unwrap();
        assert!(!table.toggle_sort("status"));
        assert!(!table.toggle_sort("salary"));
        assert!(table.sort().is_none());

        let mut config = TableConfig::default();
        config.sortable = false;
        let mut locked = DataTable::from_rows(numbered(3), columns(), config).unwrap();
        assert!(!locked.toggle_sort("age"));
        assert!(!locked.render().headers[0].sortable);
    }

    #[test]
    fn test_stable_sort_by_age() {
        let rows = vec![
            employee(1, "Bob", "Eng", "active", 30),
            employee(2, "Alice", "Eng", "active", 25),
            employee(3, "Carl", "Eng", "active", 25),
        ];
        let mut table = DataTable::from_rows(rows, columns(), TableConfig::default()).unwrap();
        table.toggle_sort("age");
        assert_eq!(ids_of(&table.visible_rows()), vec![2, 3, 1]);
    }

    #[test]
    fn test_select_all_is_page_scoped() {
        let mut table = selectable_table(numbered(25));
        assert!(table.select_all(true));
        assert_eq!(table.selected_ids().len(), 10);
        assert!(table.all_page_selected());
        assert!(table.visible_ids().iter().all(|id| table.is_selected(id)));

        table.set_page(2);
        assert!(!table.all_page_selected());
        table.select_row(&id(11), true).unwrap();
        table.select_all(false);
        assert_eq!(table.selected_ids().len(), 10);
        assert!(!table.is_selected(&id(11)));
    }

    #[test]
    fn test_selection_survives_filtering() {
        let mut table = selectable_table(numbered(25));
        for n in 1..=3 {
            table.select_row(&id(n), true).unwrap();
        }

        table.set_search("no such employee");
        assert_eq!(table.filtered_len(), 0);
        assert_eq!(table.selected_rows().len(), 3);

        table.set_search("");
        for n in 1..=3 {
            assert!(table.is_selected(&id(n)));
        }
        assert!(table.render().rows[..3].iter().all(|r| r.selected));
    }

    #[test]
    fn test_selection_survives_column_filter() {
        let mut table = selectable_table(numbered(25));
        for n in 1..=3 {
            table.select_row(&id(n), true).unwrap();
        }

        table.set_filter("status", "nomatch");
        assert_eq!(table.filtered_len(), 0);
        assert!(table.render().rows.is_empty());
        assert_eq!(table.selected_ids().len(), 3);

        table.set_filter("status", "");
        assert_eq!(table.filtered_len(), 25);
        for n in 1..=3 {
            assert!(table.is_selected(&id(n)));
        }
        let page = table.render();
        assert!(page.rows[..3].iter().all(|r| r.selected));
        assert!(page.rows[3..].iter().all(|r| !r.selected));
    }

    #[test]
    fn test_selection_callback_gets_full_source_rows() {
        let seen: Rc<RefCell<Vec<Vec<i32>>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut table = selectable_table(numbered(25)).on_selection_change(move |rows| {
            sink.borrow_mut().push(ids_of(rows));
        });

        table.select_row(&id(25), true).unwrap();
        table.select_row(&id(2), true).unwrap();
        table.set_page(3);
        table.select_row(&id(2), true).unwrap();

        assert_eq!(*seen.borrow(), vec![vec![25], vec![2, 25]]);
    }

    #[test]
    fn test_select_unknown_row() {
        let mut table = selectable_table(numbered(2));
        assert!(matches!(
            table.select_row(&id(9), true),
            Err(TableError::RowNotFound { .. })
        ));
    }

    #[test]
    fn test_selection_disabled() {
        let mut table = DataTable::from_rows(numbered(2), columns(), TableConfig::default()).unwrap();
        assert!(!table.select_row(&id(1), true).unwrap());
        assert!(!table.select_all(true));
        assert!(table.selected_rows().is_empty());
    }

    #[test]
    fn test_positional_identity() {
        let mut a = Row::new();
        a.insert("name".to_string(), "Ann".into());
        let mut b = Row::new();
        b.insert("name".to_string(), "Bob".into());
        let mut table = selectable_table(vec![a, b]);

        table.select_row(&RowId::Position(1), true).unwrap();
        let selected = table.selected_rows();
        assert_eq!(selected[0].get("name").unwrap().as_string(), Some("Bob"));
    }

    #[test]
    fn test_zero_page_size_falls_back() {
        let mut table = DataTable::from_rows(numbered(25), columns(), TableConfig::default().page_size(0)).unwrap();
        assert_eq!(table.page_size(), DEFAULT_PAGE_SIZE);

        table.set_page(2);
        table.set_page_size(0);
        assert_eq!(table.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(table.current_page(), 1);

        table.set_page(2);
        table.set_page_size(25);
        assert_eq!(table.current_page(), 1);
        assert_eq!(table.total_pages(), 1);
    }

    #[test]
    fn test_pagination_disabled() {
        let mut table =
            DataTable::from_rows(numbered(25), columns(), TableConfig::default().without_pagination()).unwrap();
        assert_eq!(table.visible_rows().len(), 25);
        table.set_page(2);
        assert_eq!(table.current_page(), 1);
        assert!(table.render().summary.is_none());
    }

    #[test]
    fn test_row_click_and_actions() {
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let approved = Rc::new(RefCell::new(Vec::new()));
        let click_sink = clicked.clone();
        let approve_sink = approved.clone();

        let rows = vec![
            employee(1, "Ann", "Eng", "pending", 30),
            employee(2, "Bob", "Eng", "approved", 31),
        ];
        let table = DataTable::from_rows(rows, columns(), TableConfig::default())
            .unwrap()
            .on_row_click(move |row: &Row| click_sink.borrow_mut().push(row.get("id").cloned()))
            .with_action(
                RowAction::new("approve", "Approve", move |row: &Row| {
                    approve_sink.borrow_mut().push(row.get("id").cloned())
                })
                .disabled_when(|row: &Row| {
                    row.get("status").and_then(|v| v.as_string()) != Some("pending")
                }),
            );

        table.click_row(&id(2)).unwrap();
        assert_eq!(*clicked.borrow(), vec![Some(ColumnValue::Int32(2))]);

        assert!(table.invoke_action(&id(1), "approve").unwrap());
        assert!(!table.invoke_action(&id(2), "approve").unwrap());
        assert_eq!(approved.borrow().len(), 1);

        assert!(matches!(
            table.invoke_action(&id(1), "delete"),
            Err(TableError::UnknownAction { .. })
        ));
        assert!(table.click_row(&id(7)).is_err());

        let page = table.render();
        assert!(!page.rows[0].actions[0].disabled);
        assert!(page.rows[1].actions[0].disabled);
    }

    #[test]
    fn test_export_gets_all_filtered_sorted_rows() {
        let exported: Rc<RefCell<Option<(Vec<i32>, ExportFormat)>>> = Rc::new(RefCell::new(None));
        let sink = exported.clone();
        let mut table = DataTable::from_rows(numbered(25), columns(), TableConfig::default())
            .unwrap()
            .on_export(move |rows, format| {
                *sink.borrow_mut() = Some((ids_of(rows), format));
            });

        table.set_search("employee 1");
        table.toggle_sort("age");
        table.toggle_sort("age");
        assert!(table.export(ExportFormat::Csv));

        let (ids, format) = exported.borrow().clone().unwrap();
        assert_eq!(format, ExportFormat::Csv);
        assert_eq!(ids, vec![19, 18, 17, 16, 15, 14, 13, 12, 11, 10, 1]);
    }

    #[test]
    fn test_export_disabled_or_unhandled() {
        let table = DataTable::from_rows(numbered(2), columns(), TableConfig::default()).unwrap();
        assert!(!table.export(ExportFormat::Json));
    }

    #[test]
    fn test_set_rows_keeps_state_and_purges_selection() {
        let mut table = selectable_table(numbered(25));
        table.set_filter("department", "eng");
        table.toggle_sort("age");
        table.set_page(3);
        table.select_row(&id(21), true).unwrap();
        table.select_row(&id(2), true).unwrap();

        table.set_rows(Rc::new(numbered(12)));

        assert_eq!(table.active_filters().get("department").map(String::as_str), Some("eng"));
        assert_eq!(table.sort_direction("age"), Some(SortDirection::Ascending));
        assert_eq!(table.current_page(), 2);
        assert_eq!(table.selected_ids(), vec![id(2)]);
    }

    #[test]
    fn test_stale_sort_after_column_change() {
        let mut table = DataTable::from_rows(numbered(3), columns(), TableConfig::default()).unwrap();
        table.toggle_sort("age");
        table.toggle_sort("age");
        assert_eq!(ids_of(&table.visible_rows()), vec![3, 2, 1]);

        table
            .set_columns(vec![ColumnDef::new("name", "Name"), ColumnDef::new("status", "Status")])
            .unwrap();
        assert!(table.sort().is_none());
        assert_eq!(ids_of(&table.visible_rows()), vec![1, 2, 3]);
    }

    #[test]
    fn test_malformed_columns_rejected() {
        let dup = vec![ColumnDef::new("name", "Name"), ColumnDef::new("name", "Again")];
        assert!(matches!(
            DataTable::<Row>::from_rows(vec![], dup, TableConfig::default()),
            Err(TableError::DuplicateColumn { .. })
        ));

        let empty = vec![ColumnDef::new("", "Nameless")];
        assert!(matches!(
            DataTable::<Row>::from_rows(vec![], empty, TableConfig::default()),
            Err(TableError::EmptyColumnKey { .. })
        ));
    }

    #[test]
    fn test_render_empty_state() {
        let mut table = DataTable::from_rows(
            numbered(3),
            columns(),
            TableConfig::default().empty_message("No employees found"),
        )
        .unwrap();
        assert!(table.render().empty_message.is_none());

        table.set_search("zzz");
        let page = table.render();
        assert!(page.rows.is_empty());
        assert_eq!(page.empty_message.as_deref(), Some("No employees found"));
        assert_eq!(page.summary.unwrap().showing_text(), "Showing 0 to 0 of 0 results");
    }

    #[test]
    fn test_render_page() {
        let mut columns = columns();
        columns.push(
            ColumnDef::new("badge", "Badge")
                .accessor(|row: &Row| row.get("status").cloned().unwrap_or(ColumnValue::Null))
                .render(|value, _row, index| format!("{}:{}", index, value)),
        );
        let mut table = DataTable::from_rows(numbered(12), columns, TableConfig::default().selectable(true)).unwrap();
        table.toggle_sort("name");
        table.set_filter("status", "act");
        table.set_loading(true);

        let page = table.render();
        assert_eq!(page.headers.len(), 5);
        assert_eq!(page.headers[0].sort, Some(SortDirection::Ascending));
        assert!(!page.headers[1].sortable);
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.rows[0].cells[0], "Employee 1");
        assert_eq!(page.rows[1].cells[0], "Employee 10");
        assert_eq!(page.rows[1].cells[4], "1:active");
        assert_eq!(page.filter_controls.len(), 2);
        assert_eq!(page.filter_controls[1].placeholder, "Filter Status");
        assert_eq!(page.filter_controls[1].value, "act");
        assert!(page.loading);

        let summary = page.summary.unwrap();
        assert_eq!(summary.total_pages, 2);
        assert_eq!(summary.page_size_options, vec![10, 25, 50, 100]);
    }

    #[test]
    fn test_render_serializes() {
        let table = DataTable::from_rows(numbered(2), columns(), TableConfig::default()).unwrap();
        let json = serde_json::to_value(table.render()).unwrap();
        assert_eq!(json["rows"][0]["id"], "1");
        assert_eq!(json["summary"]["total"], 2);
    }
}
