//! Column values and column descriptors.
//!
//! A `ColumnValue` is the raw value a column extracts from a row. The engine
//! never interprets it beyond two operations: the string-cast used by search
//! and filters (`Display`), and the native ordering used by sorting.
//!
//! A `ColumnDef<R>` describes how one field of a row type `R` is labelled,
//! filtered, sorted and rendered. Columns are handed to the table once and are
//! treated as immutable afterwards.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::error::TableError;

/// Raw value extracted from a row for one column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bool(bool),
    Null,
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ColumnValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Int32(v) => Some(*v as i64),
            ColumnValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            ColumnValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value, widening every numeric variant to f64.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Int32(n) => Some(*n as f64),
            ColumnValue::Int64(n) => Some(*n as f64),
            ColumnValue::Float32(f) => Some(*f as f64),
            ColumnValue::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Rank used to order values of unrelated types against each other.
    fn type_rank(&self) -> u8 {
        match self {
            ColumnValue::Bool(_) => 0,
            ColumnValue::Int32(_)
            | ColumnValue::Int64(_)
            | ColumnValue::Float32(_)
            | ColumnValue::Float64(_) => 1,
            ColumnValue::String(_) => 2,
            ColumnValue::Null => 3,
        }
    }

    /// True for floating-point NaN.
    pub fn is_nan(&self) -> bool {
        match self {
            ColumnValue::Float32(f) => f.is_nan(),
            ColumnValue::Float64(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Native ordering of two raw values.
    ///
    /// Values of the same variant compare naturally, and numbers compare
    /// numerically across widths. NaN orders after every other number and
    /// `Null` after everything else, so this is a total order.
    /// Any other mixed-type pair falls back to a fixed type rank
    /// (bool < number < string): deterministic, but not meaningful.
    pub fn native_cmp(&self, other: &ColumnValue) -> Ordering {
        match (self, other) {
            (ColumnValue::Null, ColumnValue::Null) => Ordering::Equal,
            (ColumnValue::Null, _) => Ordering::Greater,
            (_, ColumnValue::Null) => Ordering::Less,
            (ColumnValue::String(a), ColumnValue::String(b)) => a.cmp(b),
            (ColumnValue::Bool(a), ColumnValue::Bool(b)) => a.cmp(b),
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x.cmp_exact(&y),
                _ => a.type_rank().cmp(&b.type_rank()),
            },
        }
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            ColumnValue::Int32(n) => Some(Number::Int(*n as i64)),
            ColumnValue::Int64(n) => Some(Number::Int(*n)),
            ColumnValue::Float32(f) => Some(Number::Float(*f as f64)),
            ColumnValue::Float64(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Lenient conversion used for JSON-shaped rows: arrays and objects are
    /// kept as their JSON text so they still take part in search.
    pub fn from_json(value: &JsonValue) -> ColumnValue {
        match Self::try_from_json(value) {
            Ok(v) => v,
            Err(_) => ColumnValue::String(value.to_string()),
        }
    }

    /// Strict conversion: only scalar JSON values are accepted.
    pub fn try_from_json(value: &JsonValue) -> Result<ColumnValue, TableError> {
        match value {
            JsonValue::Null => Ok(ColumnValue::Null),
            JsonValue::Bool(b) => Ok(ColumnValue::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    if i >= i32::MIN as i64 && i <= i32::MAX as i64 {
                        Ok(ColumnValue::Int32(i as i32))
                    } else {
                        Ok(ColumnValue::Int64(i))
                    }
                } else if let Some(f) = n.as_f64() {
                    Ok(ColumnValue::Float64(f))
                } else {
                    Err(TableError::InvalidValue(format!("unrepresentable number {}", n)))
                }
            }
            JsonValue::String(s) => Ok(ColumnValue::String(s.clone())),
            other => Err(TableError::InvalidValue(format!(
                "expected a scalar, got {}",
                other
            ))),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            ColumnValue::Int32(v) => JsonValue::Number((*v).into()),
            ColumnValue::Int64(v) => JsonValue::Number((*v).into()),
            ColumnValue::Float32(v) => serde_json::Number::from_f64(*v as f64)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            ColumnValue::Float64(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            ColumnValue::String(v) => JsonValue::String(v.clone()),
            ColumnValue::Bool(v) => JsonValue::Bool(*v),
            ColumnValue::Null => JsonValue::Null,
        }
    }
}

/// String-cast used by search and column filters. `Null` casts to "".
/// A numeric value compared without going through a lossy `i64 -> f64` cast.
#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn cmp_exact(&self, other: &Number) -> Ordering {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(&b),
            (Number::Int(a), Number::Float(b)) => cmp_int_float(a, b),
            (Number::Float(a), Number::Int(b)) => cmp_int_float(b, a).reverse(),
            (Number::Float(a), Number::Float(b)) => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                // Neither is NaN, so the partial order is total here
                (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            },
        }
    }
}

/// Exact comparison of an integer with a float. NaN is greater than every integer.
fn cmp_int_float(int: i64, float: f64) -> Ordering {
    // 2^63, the first float above i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() || float >= LIMIT {
        return Ordering::Less;
    }
    if float < -LIMIT {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => {
            let fraction = float - whole;
            if fraction > 0.0 {
                Ordering::Less
            } else if fraction < 0.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        }
        unequal => unequal,
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Int32(v) => write!(f, "{}", v),
            ColumnValue::Int64(v) => write!(f, "{}", v),
            ColumnValue::Float32(v) => write!(f, "{}", v),
            ColumnValue::Float64(v) => write!(f, "{}", v),
            ColumnValue::String(v) => f.write_str(v),
            ColumnValue::Bool(v) => write!(f, "{}", v),
            ColumnValue::Null => Ok(()),
        }
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::String(v.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        ColumnValue::String(v)
    }
}

impl From<i32> for ColumnValue {
    fn from(v: i32) -> Self {
        ColumnValue::Int32(v)
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        ColumnValue::Int64(v)
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::Float64(v)
    }
}

impl From<bool> for ColumnValue {
    fn from(v: bool) -> Self {
        ColumnValue::Bool(v)
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ColumnValue::Null)
    }
}

/// Horizontal alignment hint for a column's header and cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// One entry of a discrete filter's option list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        FilterOption {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Formats a cell: `(raw value, row, index within the page) -> display text`
pub type RenderFn<R> = Rc<dyn Fn(&ColumnValue, &R, usize) -> String>;
/// Extracts the raw value for a synthetic column key
pub type AccessorFn<R> = Rc<dyn Fn(&R) -> ColumnValue>;
/// Explicit ordering between two rows for one column (ascending)
pub type CompareFn<R> = Rc<dyn Fn(&R, &R) -> Ordering>;

/// Describes how one column of rows of type `R` is shown and queried.
///
/// # Examples
///
/// ```
/// use tableview::{Align, ColumnDef, ColumnValue};
/// use std::collections::HashMap;
///
/// type Row = HashMap<String, ColumnValue>;
///
/// let salary: ColumnDef<Row> = ColumnDef::new("salary", "Salary")
///     .sortable()
///     .align(Align::Right)
///     .render(|value, _row, _index| format!("${}", value));
///
/// assert!(salary.is_sortable());
/// assert!(!salary.is_filterable());
/// ```
pub struct ColumnDef<R> {
    key: String,
    label: String,
    sortable: bool,
    filterable: bool,
    width: Option<String>,
    align: Align,
    render: Option<RenderFn<R>>,
    accessor: Option<AccessorFn<R>>,
    compare: Option<CompareFn<R>>,
    filter_options: Vec<FilterOption>,
}

impl<R> ColumnDef<R> {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        ColumnDef {
            key: key.into(),
            label: label.into(),
            sortable: false,
            filterable: false,
            width: None,
            align: Align::Left,
            render: None,
            accessor: None,
            compare: None,
            filter_options: Vec::new(),
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&ColumnValue, &R, usize) -> String + 'static,
    {
        self.render = Some(Rc::new(render));
        self
    }

    /// Extract the value with a closure instead of looking up `key` on the row.
    pub fn accessor<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&R) -> ColumnValue + 'static,
    {
        self.accessor = Some(Rc::new(accessor));
        self
    }

    /// Sort with an explicit row ordering instead of the native value ordering.
    pub fn compare_by<F>(mut self, compare: F) -> Self
    where
        F: Fn(&R, &R) -> Ordering + 'static,
    {
        self.compare = Some(Rc::new(compare));
        self
    }

    pub fn filter_options(mut self, options: Vec<FilterOption>) -> Self {
        self.filter_options = options;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    pub fn width_hint(&self) -> Option<&str> {
        self.width.as_deref()
    }

    pub fn alignment(&self) -> Align {
        self.align
    }

    pub fn options(&self) -> &[FilterOption] {
        &self.filter_options
    }

    pub(crate) fn comparator(&self) -> Option<&CompareFn<R>> {
        self.compare.as_ref()
    }
}

impl<R: Record> ColumnDef<R> {
    /// Raw value of this column for `row`.
    pub fn value(&self, row: &R) -> ColumnValue {
        match self.accessor {
            Some(ref accessor) => accessor(row),
            None => row.field(&self.key),
        }
    }

    /// Display text for this column's cell. `index` is the row's position
    /// within the rendered page.
    pub fn render_cell(&self, row: &R, index: usize) -> String {
        let value = self.value(row);
        match self.render {
            Some(ref render) => render(&value, row, index),
            None => value.to_string(),
        }
    }
}

impl<R> Clone for ColumnDef<R> {
    fn clone(&self) -> Self {
        ColumnDef {
            key: self.key.clone(),
            label: self.label.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
            width: self.width.clone(),
            align: self.align,
            render: self.render.clone(),
            accessor: self.accessor.clone(),
            compare: self.compare.clone(),
            filter_options: self.filter_options.clone(),
        }
    }
}

impl<R> fmt::Debug for ColumnDef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ColumnDef {{ key: '{}', label: '{}', sortable: {}, filterable: {} }}",
            self.key, self.label, self.sortable, self.filterable
        )
    }
}

/// Closure-free column description, loadable from configuration or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default)]
    pub width: Option<String>,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub filter_options: Vec<FilterOption>,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        ColumnSpec {
            key: key.into(),
            label: label.into(),
            sortable: false,
            filterable: false,
            width: None,
            align: Align::Left,
            filter_options: Vec::new(),
        }
    }

    pub fn to_column_def<R>(&self) -> ColumnDef<R> {
        let mut def = ColumnDef::new(self.key.clone(), self.label.clone())
            .align(self.align)
            .filter_options(self.filter_options.clone());
        def.sortable = self.sortable;
        def.filterable = self.filterable;
        def.width = self.width.clone();
        def
    }
}
