//! Cleaning transforms. Each takes a table by value and returns the new one.

use crate::error::TabularError;
use crate::table::cell::CellKey;
use crate::table::CellValue;
use crate::table::Table;
use std::collections::HashSet;

/// Outcome of filling missing numeric cells.
#[derive(Clone, Debug, PartialEq)]
pub enum FillReport {
    /// The table has no numeric column; nothing was touched
    NoNumericColumns,
    /// One entry per numeric column, in column order
    Filled(Vec<FilledColumn>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FilledColumn {
    pub name: String,
    /// Mean of the non-missing values; None when the column has none
    pub mean: Option<f64>,
    /// Number of cells replaced by the mean
    pub filled: usize,
}

impl FillReport {
    /// Total number of cells filled.
    pub fn filled_cells(&self) -> usize {
        match self {
            FillReport::NoNumericColumns => 0,
            FillReport::Filled(columns) => columns.iter().map(|column| column.filled).sum(),
        }
    }

    /// True when no cell changed.
    pub fn is_noop(&self) -> bool {
        self.filled_cells() == 0
    }
}

/// Removes rows identical to an earlier row, keeping first occurrences in order.
pub fn remove_duplicates(mut table: Table) -> Table {
    let keep: Vec<bool> = {
        let mut seen = HashSet::<Vec<CellKey>>::new();
        table
            .rows()
            .map(|row| seen.insert(row.into_iter().map(CellValue::key).collect()))
            .collect()
    };
    table.retain_rows(&keep);
    table
}

/// Replaces missing cells of every numeric column with the column mean.
/// Text columns are never touched; a numeric column without values stays missing.
pub fn fill_missing_numeric(mut table: Table) -> (Table, FillReport) {
    if table.numeric_columns().next().is_none() {
        return (table, FillReport::NoNumericColumns);
    }
    let mut report = Vec::<FilledColumn>::new();
    for column in table.columns_mut().iter_mut().filter(|column| column.kind.is_numeric()) {
        let mean = column.mean();
        let mut filled = 0usize;
        if let Some(mean) = mean {
            for value in column.values.iter_mut().filter(|value| value.is_missing()) {
                *value = CellValue::Number(mean);
                filled += 1;
            }
        }
        report.push(FilledColumn {
            name: column.name.to_owned(),
            mean,
            filled,
        });
    }
    (table, FillReport::Filled(report))
}

/// Projects the table to the named columns in the given order.
/// A repeated name is kept once, at its first position.
pub fn select_columns<S: AsRef<str>>(table: Table, names: &[S]) -> Result<Table, TabularError> {
    let mut indexes = Vec::<usize>::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        let index = table
            .position(name)
            .ok_or_else(|| TabularError::UnknownColumn(name.to_owned()))?;
        if !indexes.contains(&index) {
            indexes.push(index);
        }
    }
    Ok(table.into_projection(&indexes))
}
