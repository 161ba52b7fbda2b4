use crate::spreadsheet::cell::Cell;
use std::collections::BTreeMap;

/// Cells read from one worksheet together with the bounds of the used area.
pub(crate) struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// All non-empty cells in document order
    pub(crate) cells: Vec<Cell>,
    /// Used column range (determined from cell data)
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Returns true if the sheet contains no cells.
    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell to the sheet, updating the column range.
    pub(super) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.col);
        self.cells.push(cell);
    }

    fn update_bound(&mut self, col: usize) {
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Lays the cells out row by row across the used column range.
    /// Only rows holding a cell are returned, in row order; positions without
    /// a cell are None and a later cell at the same position wins.
    pub(crate) fn grid(&self) -> Vec<Vec<Option<&Cell>>> {
        let (Some(col_lower), Some(col_upper)) = (self.col_lower_bound, self.col_upper_bound) else {
            return Vec::new();
        };
        let width = col_upper - col_lower + 1;
        let mut rows = BTreeMap::<usize, Vec<Option<&Cell>>>::new();
        for cell in &self.cells {
            let row = rows.entry(cell.row).or_insert_with(|| vec![None; width]);
            row[cell.col - col_lower] = Some(cell);
        }
        rows.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::spreadsheet::cell::Cell;
    use crate::spreadsheet::cell::CellType;
    use crate::spreadsheet::sheet::Sheet;

    fn push(sheet: &mut Sheet, row: usize, col: usize) {
        sheet.push(Cell {
            row,
            col,
            kind: CellType::InlineString,
            value: format!("{row}:{col}"),
        });
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("Sheet1");

        assert!(sheet.is_empty());
        assert_eq!(sheet.col_lower_bound, None);
        assert_eq!(sheet.col_upper_bound, None);
        assert!(sheet.grid().is_empty());
    }

    #[test]
    fn sheet_update() {
        let mut sheet = Sheet::new("Sheet1");
        push(&mut sheet, 1, 1);
        push(&mut sheet, 1, 3);
        push(&mut sheet, 3, 1);
        push(&mut sheet, 3, 3);

        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.col_lower_bound, Some(1));
        assert_eq!(sheet.col_upper_bound, Some(3));
    }

    #[test]
    fn sheet_grid_fills_gaps() {
        let mut sheet = Sheet::new("Sheet1");
        push(&mut sheet, 1, 1);
        push(&mut sheet, 1, 3);
        push(&mut sheet, 3, 2);

        let grid = sheet.grid();
        assert_eq!(grid.len(), 2);
        assert!(grid.iter().all(|row| row.len() == 3));
        assert_eq!(grid[0][0].map(|cell| cell.value.as_str()), Some("1:1"));
        assert!(grid[0][1].is_none());
        assert_eq!(grid[0][2].map(|cell| cell.value.as_str()), Some("1:3"));
        assert_eq!(grid[1][1].map(|cell| cell.value.as_str()), Some("3:2"));
    }

    #[test]
    fn sheet_grid_far_apart_cells() {
        let mut sheet = Sheet::new("Sheet1");
        push(&mut sheet, 0, 0);
        push(&mut sheet, 1_048_575, 16_383);

        let grid = sheet.grid();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0].len(), 16_384);
        assert_eq!(grid[0][0].map(|cell| cell.value.as_str()), Some("0:0"));
        assert_eq!(grid[1][16_383].map(|cell| cell.value.as_str()), Some("1048575:16383"));
    }

    #[test]
    fn sheet_out_of_order_cells() {
        let mut sheet = Sheet::new("Sheet1");
        push(&mut sheet, 4, 0);
        push(&mut sheet, 2, 5);

        assert_eq!(sheet.col_lower_bound, Some(0));
        assert_eq!(sheet.col_upper_bound, Some(5));
        let grid = sheet.grid();
        assert_eq!(grid[0][5].map(|cell| cell.value.as_str()), Some("2:5"));
        assert_eq!(grid[1][0].map(|cell| cell.value.as_str()), Some("4:0"));
    }
}
