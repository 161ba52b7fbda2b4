//! # Tabular Formats
//!
//! Supported input/output formats and the codec interface every format
//! implements. A codec turns bytes into header + records and a [`Table`] back
//! into bytes; type inference happens in the table model, not in codecs.
use crate::error::TabularError;
use crate::table::CellValue;
use crate::table::Table;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

pub mod csv;
pub mod xlsx;

/// A tabular file format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Comma-separated values
    Csv,
    /// Office Open XML workbook
    Xlsx,
}

impl Format {
    /// Parses a file extension or format name, ignoring case and a leading dot.
    pub fn from_extension(extension: &str) -> Result<Self, TabularError> {
        let normalized = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "csv" => Ok(Format::Csv),
            "xlsx" => Ok(Format::Xlsx),
            _ => Err(TabularError::UnsupportedFormat(extension.to_owned())),
        }
    }

    /// Detects the format from the extension of a file name.
    pub fn from_file_name(file_name: &str) -> Result<Self, TabularError> {
        match file_name.rsplit_once('.') {
            Some((_, extension)) => Self::from_extension(extension),
            None => Err(TabularError::UnsupportedFormat(file_name.to_owned())),
        }
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Xlsx => "xlsx",
        }
    }

    pub const fn mime_type(&self) -> &'static str {
        match self {
            Format::Csv => "text/csv",
            Format::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl FromStr for Format {
    type Err = TabularError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_extension(value)
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Header and row-major cells decoded from a file, before type inference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Records {
    /// Header cells; None for a blank header cell
    pub header: Vec<Option<String>>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Records {
    pub fn into_table(self) -> Result<Table, TabularError> {
        Ok(Table::from_records(self.header, self.rows)?)
    }
}

/// Reader/writer pair for one format.
pub trait TableCodec {
    fn format(&self) -> Format;

    /// Decodes raw bytes into records.
    fn decode(&self, bytes: &[u8]) -> Result<Records, TabularError>;

    /// Encodes a table, header row first.
    fn encode(&self, table: &Table) -> Result<Vec<u8>, TabularError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_extensions() {
        assert_eq!(Format::from_extension("csv").unwrap(), Format::Csv);
        assert_eq!(Format::from_extension(".XLSX").unwrap(), Format::Xlsx);
        assert_eq!("xlsx".parse::<Format>().unwrap(), Format::Xlsx);
        assert!(matches!(
            Format::from_extension("json"),
            Err(TabularError::UnsupportedFormat(name)) if name == "json"
        ));
    }

    #[test]
    fn detects_format_from_file_name() {
        assert_eq!(Format::from_file_name("report.2024.CSV").unwrap(), Format::Csv);
        assert_eq!(Format::from_file_name("book.xlsx").unwrap(), Format::Xlsx);
        assert!(Format::from_file_name("README").is_err());
        assert!(Format::from_file_name("legacy.xls").is_err());
    }

    #[test]
    fn mime_types() {
        assert_eq!(Format::Csv.mime_type(), "text/csv");
        assert_eq!(
            Format::Xlsx.mime_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }
}
