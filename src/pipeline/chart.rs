use crate::table::Table;

/// Data for a bar chart of the leading numeric columns.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartSeries {
    Series(Table),
    NoNumericColumns,
}

impl ChartSeries {
    pub fn table(&self) -> Option<&Table> {
        match self {
            ChartSeries::Series(table) => Some(table),
            ChartSeries::NoNumericColumns => None,
        }
    }
}

/// Copies the first `max_columns` numeric columns, in column order.
pub fn chart_series(table: &Table, max_columns: usize) -> ChartSeries {
    let indexes: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| column.kind().is_numeric())
        .map(|(index, _)| index)
        .take(max_columns)
        .collect();
    if indexes.is_empty() {
        ChartSeries::NoNumericColumns
    } else {
        ChartSeries::Series(table.projection(&indexes))
    }
}
