//! # Rusty Tabular
//!
//! Parse, clean, chart and convert small tabular files.
//!
//! ## Features
//!
//! - **Formats**: comma-separated values (`.csv`) and Office Open XML workbooks (`.xlsx`),
//!   both directions
//! - **Typed cells**: every column is inferred once as numeric or text, missing cells are
//!   kept apart from zeros and empty strings
//! - **Cleaning**: duplicate row removal, mean filling of missing numeric cells and column
//!   selection, always applied in that order
//! - **Charting**: the leading numeric columns of a table as a chart series
//! - **Sessions**: per-file previews and user notices, with failures isolated per file
//!
//! ## Usage
//!
//! ```no_run
//! use rusty_tabular::pipeline::{CleaningOptions, ExportRequest, TabularPipeline};
//!
//! # fn main() -> Result<(), rusty_tabular::TabularError> {
//! let pipeline = TabularPipeline::default();
//! let table = pipeline.parse(b"name,val\na,1\na,1\nb,\n", "csv")?;
//! let options = CleaningOptions::default()
//!     .with_remove_duplicates(true)
//!     .with_fill_missing_numeric_with_mean(true);
//! let (table, _report) = pipeline.clean(table, &options)?;
//! let exported = pipeline.export(&table, &ExportRequest::new("xlsx", "data.csv")?)?;
//! assert_eq!(exported.file_name, "data.xlsx");
//! # Ok(())
//! # }
//! ```
//!
//! The crate logs through `tracing` and never installs a subscriber.
mod helpers;
mod spreadsheet;

pub mod config;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod session;
pub mod table;

pub use config::PipelineSettings;
pub use error::TabularError;
pub use format::Format;
pub use helpers::xml::XmlError;
pub use pipeline::TabularPipeline;
pub use session::Session;
pub use spreadsheet::SpreadsheetError;
pub use table::CellValue;
pub use table::Table;
