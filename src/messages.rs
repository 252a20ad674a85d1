/// WebSocket message types for client-server communication
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::config::TableConfig;
use crate::events::ExportFormat;
use crate::record::RowId;
use crate::render::TablePage;

/// Messages sent from client to server
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Open a view over a dataset, replacing any view this connection had
    Open {
        table_name: String,
        #[serde(default)]
        config: Option<TableConfig>,
    },

    /// Set the free-text search term
    Search { term: String },

    /// Set one column filter; an empty value clears it
    Filter { column: String, value: String },

    /// Click a column header
    Sort { column: String },

    SetPage { page: usize },

    /// Zero or negative sizes fall back to the default page size
    SetPageSize {
        #[serde(deserialize_with = "crate::config::deserialize_page_size")]
        page_size: usize,
    },

    SelectRow { row_id: RowId, checked: bool },

    /// Header checkbox: applies to the current page
    SelectAll { checked: bool },

    ClickRow { row_id: RowId },

    Export { format: ExportFormat },

    /// Append a row to a dataset; every open view of it refreshes
    InsertRow {
        table_name: String,
        row: HashMap<String, JsonValue>,
    },

    /// Remove a row from a dataset by identity
    DeleteRow { table_name: String, row_id: RowId },
}

/// Messages sent from server to client
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Current page of the connection's view
    Page { table_name: String, page: TablePage },

    /// Selected rows after a selection change, in dataset order
    SelectionChanged { rows: Vec<HashMap<String, JsonValue>> },

    RowClicked { row: HashMap<String, JsonValue> },

    /// Rows to export: every row matching the current search and filters, sorted
    ExportReady {
        format: ExportFormat,
        rows: Vec<HashMap<String, JsonValue>>,
    },

    /// Error occurred
    Error { message: String },
}
