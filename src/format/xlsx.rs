//! Office Open XML workbook codec.

use crate::error::TabularError;
use crate::format::Format;
use crate::format::Records;
use crate::format::TableCodec;
use crate::spreadsheet::writer::write_workbook;
use crate::spreadsheet::xlsx::XlsxWorkbook;
use crate::table::CellValue;
use crate::table::Table;
use std::io::Cursor;
use tracing::debug;

/// Reads the first worksheet of a workbook and writes single-sheet workbooks.
///
/// The first non-empty row is the header. Blank rows are skipped, date and
/// time cells are read as ISO text and error cells as missing values.
#[derive(Copy, Clone, Debug, Default)]
pub struct XlsxCodec;

impl TableCodec for XlsxCodec {
    fn format(&self) -> Format {
        Format::Xlsx
    }

    fn decode(&self, bytes: &[u8]) -> Result<Records, TabularError> {
        let mut workbook = XlsxWorkbook::open(Cursor::new(bytes))?;
        let shared_strings = workbook.load_shared_strings()?;
        let sheet = workbook.read_first_sheet()?;
        debug!(sheet = %sheet.name, cells = sheet.cells.len(), "Read worksheet");
        if sheet.is_empty() {
            return Ok(Records::default());
        }

        let mut rows = Vec::<Vec<CellValue>>::new();
        for cells in sheet.grid() {
            let row = cells
                .into_iter()
                .map(|cell| match cell {
                    Some(cell) => cell.to_value(&shared_strings),
                    None => Ok(CellValue::Missing),
                })
                .collect::<Result<Vec<_>, _>>()?;
            if !row.iter().all(CellValue::is_missing) {
                rows.push(row);
            }
        }

        if rows.is_empty() {
            return Ok(Records::default());
        }
        let header = rows
            .remove(0)
            .into_iter()
            .map(|value| (!value.is_missing()).then(|| value.to_string()))
            .collect();
        Ok(Records { header, rows })
    }

    fn encode(&self, table: &Table) -> Result<Vec<u8>, TabularError> {
        write_workbook(table)
    }
}
