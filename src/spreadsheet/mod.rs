//! # Spreadsheet Module
//!
//! Reading and writing of Office Open XML workbooks (.xlsx). Only the first
//! worksheet is read; written workbooks hold a single worksheet.
use thiserror::Error;

pub(crate) mod cell;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod writer;
pub(crate) mod xlsx;

/// Errors raised while reading a workbook package.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing workbook part '{0}'")]
    MissingPart(String),

    #[error("Workbook contains no worksheet")]
    NoWorksheet,

    #[error("Invalid value in cell {0}: {1}")]
    CellValueError(String, String),
}
