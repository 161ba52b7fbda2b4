use crate::error::TabularError;
use crate::format::Format;
use crate::pipeline::cleaning::FillReport;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;

/// User toggles controlling which cleaning steps run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    pub remove_duplicates: bool,
    pub fill_missing_numeric_with_mean: bool,
    /// Columns to keep, in order; None keeps every column
    pub selected_columns: Option<Vec<String>>,
}

impl CleaningOptions {
    pub fn with_remove_duplicates(mut self, enabled: bool) -> Self {
        self.remove_duplicates = enabled;
        self
    }

    pub fn with_fill_missing_numeric_with_mean(mut self, enabled: bool) -> Self {
        self.fill_missing_numeric_with_mean = enabled;
        self
    }

    pub fn with_selected_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_columns = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Target format and source name of an export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: Format,
    pub base_name: String,
}

impl ExportRequest {
    /// Parses the target format; fails with `UnsupportedFormat` for anything but csv and xlsx.
    pub fn new(format: &str, base_name: impl Into<String>) -> Result<Self, TabularError> {
        Ok(ExportRequest {
            format: format.parse()?,
            base_name: base_name.into(),
        })
    }

    /// Replaces the last extension of the base name with the target one.
    pub fn file_name(&self) -> String {
        let stem = match self.base_name.rsplit_once('.') {
            Some((stem, _)) => stem,
            None => self.base_name.as_str(),
        };
        format!("{stem}.{}", self.format.extension())
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Serialized table ready to be offered for download.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Pipeline state a preview or observer callback refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Parsed,
    Deduplicated,
    FilledMissing,
    Selected,
}

impl Step {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Step::Parsed => "parsed",
            Step::Deduplicated => "deduplicated",
            Step::FilledMissing => "filled_missing",
            Step::Selected => "selected",
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the cleaning steps did. A step that did not run is None.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CleaningReport {
    pub duplicates_removed: Option<usize>,
    pub fill: Option<FillReport>,
    pub selected_columns: Option<usize>,
}
