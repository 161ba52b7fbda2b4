//! Pipeline settings, loadable from TOML.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Tokens read as missing cells, matching the usual spreadsheet/pandas defaults.
pub const DEFAULT_MISSING_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Read settings failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse settings failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Tunables of the pipeline and session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSettings {
    /// Rows shown in each preview
    pub preview_rows: usize,
    /// Maximum number of numeric columns in a chart series
    pub chart_columns: usize,
    /// CSV field values read as missing
    pub missing_values: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            preview_rows: 5,
            chart_columns: 2,
            missing_values: DEFAULT_MISSING_VALUES.iter().map(|token| token.to_string()).collect(),
        }
    }
}

impl PipelineSettings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: PipelineSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chart_columns == 0 {
            return Err(ConfigError::Invalid("chart_columns must be at least 1".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let settings = PipelineSettings::from_toml_str("").unwrap();
        assert_eq!(settings, PipelineSettings::default());
        assert_eq!(settings.preview_rows, 5);
        assert_eq!(settings.chart_columns, 2);
        assert!(settings.missing_values.iter().any(|token| token == "NA"));
    }

    #[test]
    fn overrides_fields() {
        let settings = PipelineSettings::from_toml_str(
            "preview_rows = 10\nmissing_values = [\"\", \"-\"]\n",
        )
        .unwrap();
        assert_eq!(settings.preview_rows, 10);
        assert_eq!(settings.chart_columns, 2);
        assert_eq!(settings.missing_values, vec!["".to_owned(), "-".to_owned()]);
    }

    #[test]
    fn rejects_zero_chart_columns() {
        let error = PipelineSettings::from_toml_str("chart_columns = 0").unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_types() {
        assert!(matches!(PipelineSettings::from_toml_str("rows = 3"), Err(ConfigError::Toml(_))));
        assert!(matches!(PipelineSettings::from_toml_str("preview_rows = \"five\""), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let error = PipelineSettings::load("/nonexistent/rusty_tabular.toml").unwrap_err();
        assert!(matches!(error, ConfigError::Io(_)));
    }
}
