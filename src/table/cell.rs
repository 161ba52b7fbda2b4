use std::collections::HashSet;
use std::fmt::Display;

/// A single table cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    /// Finite or infinite number, never NaN
    Number(f64),
    /// Free text
    Text(String),
    /// Absence of data
    Missing,
}

/// Hashable view of a cell used for row comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum CellKey<'a> {
    Number(u64),
    Text(&'a str),
    Missing,
}

impl CellValue {
    /// Builds a number cell, mapping NaN to `Missing`.
    pub fn number(value: f64) -> Self {
        if value.is_nan() {
            CellValue::Missing
        } else {
            CellValue::Number(value)
        }
    }

    /// Builds a cell from raw delimited text: missing tokens become `Missing`,
    /// everything else stays text until the column type is inferred.
    pub(crate) fn from_field(field: &str, missing_values: &HashSet<String>) -> Self {
        if missing_values.contains(field) {
            CellValue::Missing
        } else {
            CellValue::Text(field.to_owned())
        }
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Returns the numeric value of a number cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the text of a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Reads the cell as a number: number cells directly, text cells if they parse.
    pub(crate) fn to_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            CellValue::Text(value) => parse_number(value),
            CellValue::Missing => None,
        }
    }

    pub(crate) fn key(&self) -> CellKey<'_> {
        match self {
            // -0.0 and 0.0 are the same value
            CellValue::Number(value) if *value == 0.0 => CellKey::Number(0f64.to_bits()),
            CellValue::Number(value) => CellKey::Number(value.to_bits()),
            CellValue::Text(value) => CellKey::Text(value),
            CellValue::Missing => CellKey::Missing,
        }
    }
}

/// Parses trimmed text as a number, rejecting empty strings and NaN.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|number| !number.is_nan())
}

impl Display for CellValue {
    /// Numbers use the shortest representation that reads back to the same value,
    /// missing cells render as an empty string.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Number(value) => write!(f, "{}", value),
            CellValue::Text(value) => write!(f, "{}", value),
            CellValue::Missing => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Missing)
    }
}
