//! # Table Model
//!
//! In-memory representation of an uploaded file: an ordered list of uniquely
//! named columns of equal length. Cell types are inferred once per column when
//! the table is built from decoded records.
use std::collections::HashMap;
use std::collections::HashSet;
use thiserror::Error;

pub mod cell;
pub mod column;

pub use cell::CellValue;
pub use column::Column;
pub use column::ColumnKind;

/// Errors raised when a table invariant would be broken.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("Column '{name}' has {actual} values, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Row {row} has {actual} fields, expected at most {expected}")]
    RowTooLong {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Ordered collection of named, equal-length columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    /// Row count, kept explicitly so that a zero-column projection keeps its rows
    height: usize,
}

impl Table {
    /// Creates a table from columns, checking name uniqueness and lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let height = columns.first().map(Column::len).unwrap_or(0);
        Self::with_height(columns, height)
    }

    /// Creates a table with an explicit row count.
    fn with_height(columns: Vec<Column>, height: usize) -> Result<Self, TableError> {
        let mut names = HashSet::<&str>::new();
        for column in &columns {
            if !names.insert(column.name()) {
                return Err(TableError::DuplicateColumn(column.name().to_owned()));
            }
            if column.len() != height {
                return Err(TableError::LengthMismatch {
                    name: column.name().to_owned(),
                    expected: height,
                    actual: column.len(),
                });
            }
        }
        Ok(Table { columns, height })
    }

    /// Builds a table from a header and row-major records.
    ///
    /// Header cells are normalized (blank names become `Unnamed: <index>`,
    /// repeated names get a `.1`, `.2`, ... suffix), short rows are padded with
    /// missing cells and every column's kind is inferred.
    pub fn from_records(header: Vec<Option<String>>, rows: Vec<Vec<CellValue>>) -> Result<Self, TableError> {
        let names = normalize_header(header);
        let width = names.len();
        let height = rows.len();
        let mut columns: Vec<Vec<CellValue>> = (0..width).map(|_| Vec::with_capacity(height)).collect();
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(TableError::RowTooLong {
                    row: index + 1,
                    expected: width,
                    actual: row.len(),
                });
            }
            let mut cells = row.into_iter();
            for values in columns.iter_mut() {
                values.push(cells.next().unwrap_or(CellValue::Missing));
            }
        }
        let columns = names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::infer(name, values))
            .collect();
        Self::with_height(columns, height)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    /// Returns the cells of one row in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&CellValue>> {
        (index < self.height).then(|| {
            self.columns
                .iter()
                .map(|column| &column.values[index])
                .collect()
        })
    }

    /// Iterates rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        (0..self.height).filter_map(move |index| self.row(index))
    }

    /// Numeric columns in column order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(|column| column.kind().is_numeric())
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Keeps the rows whose flag is set; rows past the end of `keep` are kept.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.values.retain(|_| flags.next().copied().unwrap_or(true));
        }
        let removed = keep.iter().take(self.height).filter(|flag| !**flag).count();
        self.height -= removed;
    }

    /// Copies the columns at the given positions, in that order.
    /// Out-of-range positions are skipped; positions must be distinct.
    pub(crate) fn projection(&self, indexes: &[usize]) -> Table {
        let columns = indexes
            .iter()
            .filter_map(|index| self.columns.get(*index).cloned())
            .collect();
        Table { columns, height: self.height }
    }

    /// Moves the columns at the given positions out, in that order.
    /// Out-of-range and repeated positions are skipped.
    pub(crate) fn into_projection(self, indexes: &[usize]) -> Table {
        let height = self.height;
        let mut slots: Vec<Option<Column>> = self.columns.into_iter().map(Some).collect();
        let columns = indexes
            .iter()
            .filter_map(|index| slots.get_mut(*index).and_then(Option::take))
            .collect();
        Table { columns, height }
    }

    /// Position of the column with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name() == name)
    }

    /// The first `rows` rows, used for previews.
    pub fn head(&self, rows: usize) -> Table {
        let height = rows.min(self.height);
        let columns = self
            .columns
            .iter()
            .map(|column| Column {
                name: column.name.to_owned(),
                kind: column.kind,
                values: column.values[..height].to_vec(),
            })
            .collect();
        Table { columns, height }
    }
}

/// Makes header names non-empty and unique.
pub(crate) fn normalize_header(header: Vec<Option<String>>) -> Vec<String> {
    let raw: Vec<String> = header
        .into_iter()
        .enumerate()
        .map(|(index, name)| match name {
            Some(name) if !name.is_empty() => name,
            _ => format!("Unnamed: {index}"),
        })
        .collect();

    let mut taken: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(raw.len());
    for name in raw {
        let mut candidate = name.to_owned();
        while taken.contains(&candidate) {
            let counter = counters.entry(name.to_owned()).or_insert(0);
            *counter += 1;
            candidate = format!("{name}.{counter}");
        }
        taken.insert(candidate.to_owned());
        names.push(candidate);
    }
    names
}
