//! Error type shared by the table engine and the demo server.

use crate::record::RowId;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Column with label '{label}' has an empty key")]
    EmptyColumnKey { label: String },

    #[error("Duplicate column key '{key}'")]
    DuplicateColumn { key: String },

    #[error("Row '{id}' not found")]
    RowNotFound { id: RowId },

    #[error("Row action '{key}' is not registered")]
    UnknownAction { key: String },

    #[error("Table '{name}' not found")]
    UnknownTable { name: String },

    #[error("No table is open on this connection")]
    NoOpenTable,

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;
