/// TableView - Generic Client-Side Data Table Engine
///
/// Search, per-column filters, stable sort, pagination and identity-based
/// selection over an in-memory row collection. Rows are any type implementing
/// `Record`; columns describe how each field is read, rendered and ordered.
/// User actions leave the table through caller-supplied callbacks.

pub mod column;
pub mod config;
pub mod error;
pub mod events;
pub mod record;
pub mod render;
pub mod selection;
pub mod table;
pub mod view;

pub use column::{Align, ColumnDef, ColumnSpec, ColumnValue, FilterOption};
pub use config::{PaginationConfig, TableConfig};
pub use error::{Result, TableError};
pub use events::{ExportFormat, RowAction, TableCallbacks};
pub use record::{Record, RowId};
pub use render::{PageSummary, TablePage};
pub use selection::Selection;
pub use table::DataTable;
pub use view::{SortDirection, SortState};

// WebSocket server modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod messages;
#[cfg(feature = "server")]
pub mod websocket;
#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// A typed row, as a host application would define it.
    #[derive(Debug, Clone)]
    struct Employee {
        id: u32,
        name: String,
        department: String,
        status: String,
        salary: Option<f64>,
        hired: String,
    }

    impl Record for Employee {
        fn field(&self, key: &str) -> ColumnValue {
            match key {
                "id" => ColumnValue::Int64(self.id as i64),
                "name" => self.name.as_str().into(),
                "department" => self.department.as_str().into(),
                "status" => self.status.as_str().into(),
                "salary" => self.salary.into(),
                "hired" => self.hired.as_str().into(),
                _ => ColumnValue::Null,
            }
        }

        fn record_id(&self) -> Option<RowId> {
            Some(RowId::Key(format!("emp-{}", self.id)))
        }
    }

    fn employee(id: u32, name: &str, department: &str, status: &str, salary: Option<f64>) -> Employee {
        Employee {
            id,
            name: name.to_string(),
            department: department.to_string(),
            status: status.to_string(),
            salary,
            hired: format!("2020-{:02}-01", id % 12 + 1),
        }
    }

    fn staff() -> Vec<Employee> {
        vec![
            employee(1, "Grace Hopper", "Engineering", "active", Some(120_000.0)),
            employee(2, "Alan Turing", "Research", "on_leave", Some(110_000.0)),
            employee(3, "Ada Lovelace", "Engineering", "active", None),
            employee(4, "Joan Clarke", "Research", "inactive", Some(95_000.0)),
            employee(5, "Edsger Dijkstra", "Engineering", "active", Some(105_000.0)),
        ]
    }

    fn employee_columns() -> Vec<ColumnDef<Employee>> {
        vec![
            ColumnDef::new("name", "Name").sortable(),
            ColumnDef::new("department", "Department")
                .filterable()
                .filter_options(vec![
                    FilterOption::new("Engineering", "Engineering"),
                    FilterOption::new("Research", "Research"),
                ]),
            ColumnDef::new("status", "Status")
                .filterable()
                .render(|value, _row, _index| value.to_string().replace('_', " ")),
            ColumnDef::new("salary", "Salary")
                .sortable()
                .align(Align::Right)
                .render(|value, _row, _index| match value.as_f64() {
                    Some(amount) => format!("${:.0}", amount),
                    None => "-".to_string(),
                }),
            ColumnDef::new("hired", "Hired")
                .sortable()
                // Newest first when ascending
                .compare_by(|a: &Employee, b: &Employee| b.hired.cmp(&a.hired)),
        ]
    }

    fn names(rows: &[&Employee]) -> Vec<String> {
        rows.iter().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn test_employee_directory_workflow() {
        let selected: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = selected.clone();

        let mut table = DataTable::from_rows(
            staff(),
            employee_columns(),
            TableConfig::default().selectable(true).page_size(2),
        )
        .unwrap()
        .on_selection_change(move |rows| {
            *sink.borrow_mut() = rows.iter().map(|e| e.name.clone()).collect();
        });

        assert_eq!(table.total_pages(), 3);

        table.set_filter("department", "engineering");
        assert_eq!(table.filtered_len(), 3);

        // Missing salaries sort after every present one
        table.toggle_sort("salary");
        assert_eq!(
            names(&table.filtered_rows()),
            vec!["Edsger Dijkstra", "Grace Hopper", "Ada Lovelace"]
        );
        table.toggle_sort("salary");
        assert_eq!(
            names(&table.filtered_rows()),
            vec!["Grace Hopper", "Edsger Dijkstra", "Ada Lovelace"]
        );

        table.next_page();
        assert_eq!(names(&table.visible_rows()), vec!["Ada Lovelace"]);

        table.select_all(true);
        assert_eq!(*selected.borrow(), vec!["Ada Lovelace".to_string()]);
        table
            .select_row(&RowId::from("emp-1"), true)
            .unwrap();
        // Source order, not selection order
        assert_eq!(
            *selected.borrow(),
            vec!["Grace Hopper".to_string(), "Ada Lovelace".to_string()]
        );

        let page = table.render();
        assert_eq!(page.rows[0].cells[3], "-");
        assert_eq!(page.headers[3].align, Align::Right);
        assert_eq!(page.filter_controls[0].options.len(), 2);
        assert_eq!(page.summary.unwrap().showing_text(), "Showing 3 to 3 of 3 results");
    }

    #[test]
    fn test_custom_comparator_and_render() {
        let mut table = DataTable::from_rows(staff(), employee_columns(), TableConfig::default()).unwrap();
        table.toggle_sort("hired");

        let hired: Vec<String> = table.visible_rows().iter().map(|e| e.hired.clone()).collect();
        let mut expected = hired.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(hired, expected);

        table.set_search("on leave");
        assert_eq!(table.filtered_len(), 0);
        table.set_search("on_leave");
        assert_eq!(names(&table.filtered_rows()), vec!["Alan Turing"]);
        assert_eq!(table.render().rows[0].cells[2], "on leave");
    }

    #[test]
    fn test_comparator_direction() {
        let columns = vec![ColumnDef::new("name", "Name")
            .sortable()
            .compare_by(|a: &Employee, b: &Employee| a.name.len().cmp(&b.name.len()))];
        let mut table = DataTable::from_rows(staff(), columns, TableConfig::default()).unwrap();

        table.toggle_sort("name");
        assert_eq!(table.visible_rows()[0].name, "Alan Turing");
        table.toggle_sort("name");
        assert_eq!(table.visible_rows()[0].name, "Edsger Dijkstra");
    }

    #[test]
    fn test_replace_rows_from_host() {
        let mut table = DataTable::from_rows(
            staff(),
            employee_columns(),
            TableConfig::default().selectable(true),
        )
        .unwrap();
        table.set_filter("status", "active");
        table.select_row(&RowId::from("emp-4"), true).unwrap();
        table.select_row(&RowId::from("emp-5"), true).unwrap();

        let mut next = staff();
        next.retain(|e| e.id != 4);
        next.push(employee(6, "Barbara Liskov", "Research", "active", Some(130_000.0)));
        table.set_rows(Rc::new(next));

        assert_eq!(table.active_filters().len(), 1);
        assert_eq!(table.selected_ids(), vec![RowId::from("emp-5")]);
        assert!(names(&table.filtered_rows()).contains(&"Barbara Liskov".to_string()));
    }

    #[test]
    fn test_json_rows_and_config() {
        let config: TableConfig =
            serde_json::from_str(r#"{"selectable": true, "pagination": {"page_size": 1}}"#).unwrap();
        let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(
            r#"[{"_id": "a", "name": "Ann", "age": 41}, {"_id": "b", "name": "Ben", "age": null}]"#,
        )
        .unwrap();
        let specs: Vec<ColumnSpec> = serde_json::from_str(
            r#"[{"key": "name", "label": "Name"}, {"key": "age", "label": "Age", "sortable": true}]"#,
        )
        .unwrap();
        let columns: Vec<ColumnDef<_>> = specs.iter().map(|s| s.to_column_def()).collect();

        let mut table = DataTable::from_rows(rows, columns, config).unwrap();
        assert_eq!(table.total_pages(), 2);
        table.toggle_sort("age");
        table.toggle_sort("age");

        let page = table.render();
        assert_eq!(page.rows[0].id, RowId::from("a"));
        assert_eq!(page.rows[0].cells, vec!["Ann", "41"]);

        table.next_page();
        assert_eq!(table.render().rows[0].cells, vec!["Ben", ""]);
    }

    #[test]
    fn test_empty_data_renders_message() {
        let table: DataTable<HashMap<String, ColumnValue>> =
            DataTable::from_rows(Vec::new(), vec![ColumnDef::new("name", "Name")], TableConfig::default())
                .unwrap();
        let page = table.render();
        assert_eq!(page.empty_message.as_deref(), Some("No data available"));
        assert!(!page.all_page_selected);
        assert_eq!(table.total_pages(), 1);
    }
}
