//! Row abstraction.
//!
//! The table is generic over any row type implementing `Record`: a way to pull
//! a raw value out of the row by field key, and an optional explicit identity.
//! Rows without an identity are identified by their position in the source.

use crate::column::ColumnValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Identity of a row for selection and row-targeted callbacks.
///
/// Serialized untagged: explicit ids appear as JSON strings, positional
/// identities as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    /// Explicit identity carried by the row
    Key(String),
    /// Position of the row in the source collection
    Position(usize),
}

impl RowId {
    /// Identity derived from a raw id value. Null, empty strings and
    /// booleans do not identify a row.
    pub fn from_value(value: &ColumnValue) -> Option<RowId> {
        match value {
            ColumnValue::Null | ColumnValue::Bool(_) => None,
            ColumnValue::String(s) if s.is_empty() => None,
            other => Some(RowId::Key(other.to_string())),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Key(k) => f.write_str(k),
            RowId::Position(p) => write!(f, "#{}", p),
        }
    }
}

impl From<&str> for RowId {
    fn from(v: &str) -> Self {
        RowId::Key(v.to_string())
    }
}

impl From<String> for RowId {
    fn from(v: String) -> Self {
        RowId::Key(v)
    }
}

/// Field names checked, in order, for an explicit identity on map-shaped rows.
pub const ID_FIELDS: [&str; 2] = ["id", "_id"];

/// A row the table can search, filter, sort and render.
pub trait Record {
    /// Raw value of `key`, or `ColumnValue::Null` when the row has no such field.
    fn field(&self, key: &str) -> ColumnValue;

    /// Explicit identity of the row, if it carries one.
    fn record_id(&self) -> Option<RowId> {
        ID_FIELDS
            .iter()
            .find_map(|key| RowId::from_value(&self.field(key)))
    }
}

/// Identity of `row` sitting at `position` in its source collection.
pub fn identity_of<R: Record>(row: &R, position: usize) -> RowId {
    row.record_id().unwrap_or(RowId::Position(position))
}

impl Record for HashMap<String, ColumnValue> {
    fn field(&self, key: &str) -> ColumnValue {
        self.get(key).cloned().unwrap_or(ColumnValue::Null)
    }
}

impl Record for BTreeMap<String, ColumnValue> {
    fn field(&self, key: &str) -> ColumnValue {
        self.get(key).cloned().unwrap_or(ColumnValue::Null)
    }
}

impl Record for JsonMap<String, JsonValue> {
    fn field(&self, key: &str) -> ColumnValue {
        self.get(key)
            .map(ColumnValue::from_json)
            .unwrap_or(ColumnValue::Null)
    }
}

/// Convert a map-shaped row into JSON for hosts and export handlers.
pub fn row_to_json(row: &HashMap<String, ColumnValue>) -> HashMap<String, JsonValue> {
    row.iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect()
}
