use crate::table::cell::CellValue;
use serde::Deserialize;
use serde::Serialize;

/// Inferred data type of a column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Every non-missing cell is a number
    Numeric,
    /// Anything else
    Text,
}

impl ColumnKind {
    /// Returns the string representation of the column kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
        }
    }

    /// Detects the kind of a column from its cells.
    /// A column without any value is numeric, like an all-NaN float column.
    pub(crate) fn detect(values: &[CellValue]) -> ColumnKind {
        let numeric = values
            .iter()
            .filter(|value| !value.is_missing())
            .all(|value| value.to_number().is_some());
        if numeric {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        }
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Numeric)
    }
}

/// A named column with a single inferred kind.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) kind: ColumnKind,
    pub(crate) values: Vec<CellValue>,
}

impl Column {
    /// Creates a column, inferring its kind and coercing every cell to it.
    pub fn infer(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let kind = ColumnKind::detect(&values);
        let values = values
            .into_iter()
            .map(|value| coerce(value, kind))
            .collect();
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_missing()).count()
    }

    /// Arithmetic mean of the non-missing values of a numeric column.
    /// None for text columns and for columns without any value.
    pub fn mean(&self) -> Option<f64> {
        if !self.kind.is_numeric() {
            return None;
        }
        let (sum, count) = self
            .values
            .iter()
            .filter_map(CellValue::as_number)
            .fold((0f64, 0usize), |(sum, count), value| (sum + value, count + 1));
        (count > 0).then(|| sum / count as f64)
    }
}

/// Converts a cell to the representation required by the column kind.
fn coerce(value: CellValue, kind: ColumnKind) -> CellValue {
    match (kind, value) {
        (_, CellValue::Missing) => CellValue::Missing,
        (ColumnKind::Numeric, value) => value.to_number().map(CellValue::number).unwrap_or(CellValue::Missing),
        (ColumnKind::Text, CellValue::Number(number)) => CellValue::Text(CellValue::Number(number).to_string()),
        (ColumnKind::Text, value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_owned())
    }

    #[test]
    fn numeric_text_becomes_numbers() {
        let column = Column::infer("val", vec![text("1"), CellValue::Missing, text(" 2.5")]);
        assert_eq!(column.kind(), ColumnKind::Numeric);
        assert_eq!(column.values(), &[CellValue::Number(1.0), CellValue::Missing, CellValue::Number(2.5)]);
    }

    #[test]
    fn mixed_column_is_text() {
        let column = Column::infer("mixed", vec![CellValue::Number(1.0), text("a"), CellValue::Missing]);
        assert_eq!(column.kind(), ColumnKind::Text);
        assert_eq!(column.values(), &[text("1"), text("a"), CellValue::Missing]);
    }

    #[test]
    fn all_missing_column_is_numeric() {
        let column = Column::infer("empty", vec![CellValue::Missing, CellValue::Missing]);
        assert_eq!(column.kind(), ColumnKind::Numeric);
        assert_eq!(column.mean(), None);
        assert_eq!(column.missing_count(), 2);
    }

    #[test]
    fn mean_skips_missing() {
        let column = Column::infer("val", vec![CellValue::Number(1.0), CellValue::Missing, CellValue::Number(3.0)]);
        assert_eq!(column.mean(), Some(2.0));
        assert_eq!(Column::infer("name", vec![text("a")]).mean(), None);
    }
}
