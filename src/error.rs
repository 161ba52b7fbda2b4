use crate::format::Format;
use thiserror::Error;

/// Main error type for the tabular pipeline.
/// Aggregates errors from the standard library, dependencies and internal modules.
#[derive(Error, Debug)]
pub enum TabularError {
    #[error("Unsupported format '{0}'")]
    UnsupportedFormat(String),

    #[error("Parse {format} content failed: {message}")]
    ParseError { format: Format, message: String },

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    // Third-party library errors
    #[error("{0}")]
    CsvError(#[from] csv::Error),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Model and codec errors
    #[error("{0}")]
    TableError(#[from] crate::table::TableError),

    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),
}

impl TabularError {
    /// Returns true for the failures a caller should report as malformed input.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, TabularError::ParseError { .. })
    }
}

pub type Result<T, E = TabularError> = std::result::Result<T, E>;

pub(crate) trait ResultParseContext<T> {
    /// Folds any decoding failure into a `ParseError` for the given format.
    fn as_parse_error(self, format: Format) -> Result<T>;
}

impl<T> ResultParseContext<T> for Result<T> {
    fn as_parse_error(self, format: Format) -> Result<T> {
        self.map_err(|error| match error {
            TabularError::ParseError { .. } | TabularError::UnsupportedFormat(_) => error,
            other => TabularError::ParseError {
                format,
                message: other.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_level_errors_become_parse_errors() {
        let result: Result<()> = Err(TabularError::ParseIntError("x".parse::<u8>().unwrap_err()));
        let error = result.as_parse_error(Format::Xlsx).unwrap_err();
        assert!(error.is_parse_error());
        assert!(error.to_string().starts_with("Parse xlsx content failed"));
    }

    #[test]
    fn format_errors_are_kept() {
        let result: Result<()> = Err(TabularError::UnsupportedFormat("json".to_owned()));
        let error = result.as_parse_error(Format::Csv).unwrap_err();
        assert!(matches!(error, TabularError::UnsupportedFormat(name) if name == "json"));
    }
}
