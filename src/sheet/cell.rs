//! Cell values.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::sheet::style::Style;

/// Types of data that can be stored in a cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum CellValue {
    /// Empty cell
    #[default]
    Empty,
    /// Boolean value
    Bool(bool),
    /// 64-bit floating point number
    Number(f64),
    /// String value
    Text(String),
    /// Date/time value; serialized as a day serial
    Date(NaiveDateTime),
}

impl CellValue {
    /// Whether this cell holds no value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Date(value)
    }
}

/// A cell: its value and an optional explicit style.
///
/// A cell without a style is distinct from a cell carrying the default
/// style; the style collection pass skips the former entirely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub value: CellValue,
    pub style: Option<Style>,
}

impl Cell {
    /// Create a cell with a value and no explicit style.
    pub fn new<V: Into<CellValue>>(value: V) -> Self {
        Self {
            value: value.into(),
            style: None,
        }
    }

    /// Create a cell with a value and an explicit style.
    pub fn styled<V: Into<CellValue>>(value: V, style: Style) -> Self {
        Self {
            value: value.into(),
            style: Some(style),
        }
    }
}
