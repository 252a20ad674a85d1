//! Caller-supplied callbacks.
//!
//! The table reports user actions outward through these hooks: row clicks,
//! selection changes, row-scoped actions and export requests. They are
//! fire-and-forget notifications. A panicking callback is not caught and
//! unwinds into the host.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TableError;

pub type RowCallback<R> = Box<dyn Fn(&R)>;
pub type SelectionCallback<R> = Box<dyn Fn(&[&R])>;
pub type ExportHandler<R> = Box<dyn Fn(&[&R], ExportFormat)>;
pub type RowPredicate<R> = Box<dyn Fn(&R) -> bool>;

/// Format tag handed to the export handler. The table never serializes files
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            "json" => Ok(ExportFormat::Json),
            _ => Err(TableError::InvalidValue(format!(
                "Unknown export format: '{}'. Use 'csv', 'excel', 'pdf' or 'json'",
                s
            ))),
        }
    }
}

/// A row-scoped action, shown as a button in each row's action slot.
pub struct RowAction<R> {
    key: String,
    label: String,
    on_invoke: RowCallback<R>,
    disabled: Option<RowPredicate<R>>,
}

impl<R> RowAction<R> {
    pub fn new<F>(key: impl Into<String>, label: impl Into<String>, on_invoke: F) -> Self
    where
        F: Fn(&R) + 'static,
    {
        RowAction {
            key: key.into(),
            label: label.into(),
            on_invoke: Box::new(on_invoke),
            disabled: None,
        }
    }

    /// Disable the action for rows matching `predicate`.
    pub fn disabled_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + 'static,
    {
        self.disabled = Some(Box::new(predicate));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled_for(&self, row: &R) -> bool {
        !self.disabled.as_ref().is_some_and(|disabled| disabled(row))
    }

    /// Run the action on `row` unless it is disabled for it.
    /// Returns true if the action ran.
    pub fn invoke(&self, row: &R) -> bool {
        if !self.is_enabled_for(row) {
            return false;
        }
        (self.on_invoke)(row);
        true
    }
}

impl<R> fmt::Debug for RowAction<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowAction {{ key: '{}', label: '{}' }}", self.key, self.label)
    }
}

/// Every outward hook a table can notify.
pub struct TableCallbacks<R> {
    pub on_row_click: Option<RowCallback<R>>,
    pub on_selection_change: Option<SelectionCallback<R>>,
    pub on_export: Option<ExportHandler<R>>,
    pub actions: Vec<RowAction<R>>,
}

impl<R> Default for TableCallbacks<R> {
    fn default() -> Self {
        TableCallbacks {
            on_row_click: None,
            on_selection_change: None,
            on_export: None,
            actions: Vec::new(),
        }
    }
}

impl<R> TableCallbacks<R> {
    pub fn action(&self, key: &str) -> Option<&RowAction<R>> {
        self.actions.iter().find(|a| a.key == key)
    }
}

impl<R> fmt::Debug for TableCallbacks<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableCallbacks")
            .field("on_row_click", &self.on_row_click.is_some())
            .field("on_selection_change", &self.on_selection_change.is_some())
            .field("on_export", &self.on_export.is_some())
            .field("actions", &self.actions)
            .finish()
    }
}
