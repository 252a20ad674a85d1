/// Employee Directory Example
///
/// This example demonstrates:
/// - Describing columns with custom rendering and a custom comparator
/// - Searching, filtering and sorting an employee list
/// - Paging through results
/// - Selecting rows and reacting to row actions
/// - Exporting the filtered rows

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tableview::{
    Align, ColumnDef, ColumnValue, DataTable, ExportFormat, RowAction, RowId, TableConfig,
};

type Row = HashMap<String, ColumnValue>;

fn print_page(table: &DataTable<Row>) {
    let page = table.render();
    let labels: Vec<&str> = page.headers.iter().map(|h| h.label.as_str()).collect();
    println!("      {}", labels.join(" | "));
    for row in &page.rows {
        let marker = if row.selected { "[x]" } else { "[ ]" };
        println!("   {} {}", marker, row.cells.join(" | "));
    }
    if let Some(message) = page.empty_message {
        println!("      {}", message);
    }
    if let Some(summary) = page.summary {
        println!(
            "   {} (page {} of {})",
            summary.showing_text(),
            summary.current_page,
            summary.total_pages
        );
    }
    println!();
}

fn main() {
    println!("=== TableView Employee Directory Example ===\n");

    // 1. Build the employee list
    println!("1. Loading employees...");
    let people = vec![
        ("E-01", "Amara Okafor", "Engineering", "active", 142000, "2018-03-12"),
        ("E-02", "Bruno Costa", "Sales", "active", 88000, "2020-07-01"),
        ("E-03", "Chen Wei", "Engineering", "on_leave", 118000, "2021-01-18"),
        ("E-04", "Dana Kowalski", "People", "active", 79000, "2019-11-04"),
        ("E-05", "Elif Yilmaz", "Finance", "active", 131000, "2017-05-22"),
        ("E-06", "Farid Haddad", "Marketing", "inactive", 74000, "2016-09-30"),
        ("E-07", "Grace Mensah", "Engineering", "active", 165000, "2015-02-09"),
        ("E-08", "Hiro Tanaka", "Sales", "active", 112000, "2019-04-15"),
    ];

    let rows: Vec<Row> = people
        .into_iter()
        .map(|(id, name, department, status, salary, hired)| {
            let mut row = HashMap::new();
            row.insert("id".to_string(), ColumnValue::String(id.to_string()));
            row.insert("name".to_string(), ColumnValue::String(name.to_string()));
            row.insert("department".to_string(), ColumnValue::String(department.to_string()));
            row.insert("status".to_string(), ColumnValue::String(status.to_string()));
            row.insert("salary".to_string(), ColumnValue::Int32(salary));
            row.insert("hire_date".to_string(), ColumnValue::String(hired.to_string()));
            row
        })
        .collect();
    println!("   Loaded {} employees\n", rows.len());

    // 2. Describe the columns
    let columns = vec![
        ColumnDef::new("name", "Name").sortable(),
        ColumnDef::new("department", "Department").filterable(),
        ColumnDef::new("status", "Status")
            .filterable()
            .render(|value, _row, _index| value.to_string().replace('_', " ")),
        ColumnDef::new("salary", "Salary")
            .sortable()
            .align(Align::Right)
            .render(|value, _row, _index| format!("${}", value)),
        ColumnDef::new("hire_date", "Tenure")
            .sortable()
            // Longest tenure first when ascending
            .compare_by(|a: &Row, b: &Row| {
                let hired = |r: &Row| r.get("hire_date").map(|v| v.to_string()).unwrap_or_default();
                hired(a).cmp(&hired(b))
            }),
    ];

    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let selections = log.clone();
    let reviews = log.clone();
    let exports = log.clone();

    let mut table = DataTable::from_rows(rows, columns, TableConfig::default().selectable(true).page_size(3))
        .unwrap()
        .on_selection_change(move |rows| {
            selections
                .borrow_mut()
                .push(format!("selection now has {} employees", rows.len()));
        })
        .with_action(
            RowAction::new("review", "Review", move |row: &Row| {
                let name = row.get("name").map(|v| v.to_string()).unwrap_or_default();
                reviews.borrow_mut().push(format!("reviewing {}", name));
            })
            .disabled_when(|row: &Row| {
                row.get("status").and_then(|v| v.as_string()) == Some("inactive")
            }),
        )
        .on_export(move |rows, format| {
            exports
                .borrow_mut()
                .push(format!("exporting {} rows as {}", rows.len(), format));
        });

    println!("2. First page:");
    print_page(&table);

    // 3. Search
    println!("3. Searching for 'engineering'...");
    table.set_search("engineering");
    print_page(&table);

    // 4. Sort by salary, highest first
    println!("4. Sorting by salary (click twice for descending)...");
    table.toggle_sort("salary");
    table.toggle_sort("salary");
    print_page(&table);

    // 5. Clear the search, filter by status and page through
    println!("5. Filtering status 'active' and paging...");
    table.set_search("");
    table.set_filter("status", "active");
    print_page(&table);
    table.next_page();
    print_page(&table);

    // 6. Select rows and run an action
    println!("6. Selecting the page and reviewing E-02...");
    table.select_all(true);
    table.select_row(&RowId::from("E-07"), true).unwrap();
    table.invoke_action(&RowId::from("E-02"), "review").unwrap();
    let ran = table.invoke_action(&RowId::from("E-06"), "review").unwrap();
    println!("   Review of inactive E-06 ran: {}", ran);
    print_page(&table);

    // 7. Export everything matching the current filters
    println!("7. Exporting...");
    table.export(ExportFormat::Csv);

    println!("   Callback log:");
    for entry in log.borrow().iter() {
        println!("      - {}", entry);
    }

    println!("\n=== Example Complete ===");
}
