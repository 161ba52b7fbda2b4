//! # Tabular Pipeline
//!
//! Parse → clean → chart → serialize. Cleaning steps always run in the fixed
//! order deduplicate, fill missing, select columns; chart extraction and export
//! see the table after every enabled step.
use crate::config::PipelineSettings;
use crate::error::ResultParseContext;
use crate::error::TabularError;
use crate::format::csv::CsvCodec;
use crate::format::xlsx::XlsxCodec;
use crate::format::Format;
use crate::format::Records;
use crate::format::TableCodec;
use crate::table::Table;
use tracing::debug;
use tracing::info;

pub mod chart;
pub mod cleaning;
pub mod options;

pub use chart::chart_series;
pub use chart::ChartSeries;
pub use cleaning::fill_missing_numeric;
pub use cleaning::remove_duplicates;
pub use cleaning::select_columns;
pub use cleaning::FillReport;
pub use cleaning::FilledColumn;
pub use options::CleaningOptions;
pub use options::CleaningReport;
pub use options::ExportRequest;
pub use options::ExportedFile;
pub use options::Step;

pub struct TabularPipeline {
    settings: PipelineSettings,
    csv: CsvCodec,
    xlsx: XlsxCodec,
}

impl Default for TabularPipeline {
    fn default() -> Self {
        Self::new(PipelineSettings::default())
    }
}

impl TabularPipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        let csv = CsvCodec::new(settings.missing_values.iter().cloned());
        TabularPipeline {
            settings,
            csv,
            xlsx: XlsxCodec,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn codec(&self, format: Format) -> &dyn TableCodec {
        match format {
            Format::Csv => &self.csv,
            Format::Xlsx => &self.xlsx,
        }
    }

    /// Parses file content given its extension (`csv` or `xlsx`).
    /// Any decoding failure is reported as a `ParseError`.
    pub fn parse(&self, bytes: &[u8], extension: &str) -> Result<Table, TabularError> {
        let codec = self.codec(Format::from_extension(extension)?);
        let format = codec.format();
        let table = codec
            .decode(bytes)
            .and_then(Records::into_table)
            .as_parse_error(format)?;
        info!(%format, rows = table.height(), columns = table.width(), "Parsed table");
        Ok(table)
    }

    /// Applies the enabled cleaning steps.
    pub fn clean(&self, table: Table, options: &CleaningOptions) -> Result<(Table, CleaningReport), TabularError> {
        self.clean_with(table, options, |_, _| ())
    }

    /// Applies the enabled cleaning steps, calling `observer` after each one.
    /// Column selection always reports, since keeping every column is a selection too.
    pub fn clean_with<F>(
        &self,
        mut table: Table,
        options: &CleaningOptions,
        mut observer: F,
    ) -> Result<(Table, CleaningReport), TabularError>
    where
        F: FnMut(Step, &Table),
    {
        let mut report = CleaningReport::default();

        if options.remove_duplicates {
            let before = table.height();
            table = remove_duplicates(table);
            let removed = before - table.height();
            debug!(removed, "Removed duplicate rows");
            report.duplicates_removed = Some(removed);
            observer(Step::Deduplicated, &table);
        }

        if options.fill_missing_numeric_with_mean {
            let (filled, fill) = fill_missing_numeric(table);
            table = filled;
            debug!(cells = fill.filled_cells(), "Filled missing numeric cells");
            report.fill = Some(fill);
            observer(Step::FilledMissing, &table);
        }

        if let Some(names) = &options.selected_columns {
            table = select_columns(table, names)?;
            debug!(columns = table.width(), "Selected columns");
            report.selected_columns = Some(table.width());
        }
        observer(Step::Selected, &table);

        Ok((table, report))
    }

    /// The leading numeric columns for a chart.
    pub fn chart(&self, table: &Table) -> ChartSeries {
        chart_series(table, self.settings.chart_columns)
    }

    /// Serializes the table to `csv` or `xlsx`.
    pub fn serialize(&self, table: &Table, format: &str) -> Result<Vec<u8>, TabularError> {
        let format = Format::from_extension(format)?;
        self.codec(format).encode(table)
    }

    /// Serializes the table and names the result after the request.
    pub fn export(&self, table: &Table, request: &ExportRequest) -> Result<ExportedFile, TabularError> {
        let bytes = self.codec(request.format).encode(table)?;
        let file_name = request.file_name();
        info!(file = %file_name, bytes = bytes.len(), "Exported table");
        Ok(ExportedFile {
            file_name,
            mime_type: request.mime_type(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    fn pipeline() -> TabularPipeline {
        TabularPipeline::default()
    }

    #[test]
    fn parses_and_cleans_in_order() {
        let table = pipeline().parse(b"name,val\na,1\na,1\nb,\n", "csv").unwrap();
        let options = CleaningOptions {
            remove_duplicates: true,
            fill_missing_numeric_with_mean: true,
            selected_columns: Some(vec!["val".to_owned()]),
        };
        let mut steps = Vec::new();
        let (cleaned, report) = pipeline()
            .clean_with(table, &options, |step, table| steps.push((step, table.height(), table.width())))
            .unwrap();
        assert_eq!(steps, vec![(Step::Deduplicated, 2, 2), (Step::FilledMissing, 2, 2), (Step::Selected, 2, 1)]);
        assert_eq!(cleaned.column("val").unwrap().values(), &[CellValue::Number(1.0), CellValue::Number(1.0)]);
        assert_eq!(report.duplicates_removed, Some(1));
        assert_eq!(report.fill.map(|fill| fill.filled_cells()), Some(1));
        assert_eq!(report.selected_columns, Some(1));
    }

    #[test]
    fn default_options_change_nothing() {
        let table = pipeline().parse(b"a,b\n1,x\n1,x\n", "CSV").unwrap();
        let (cleaned, report) = pipeline().clean(table.clone(), &CleaningOptions::default()).unwrap();
        assert_eq!(cleaned, table);
        assert_eq!(report, CleaningReport::default());
    }

    #[test]
    fn unknown_selected_column_fails() {
        let table = pipeline().parse(b"name,val\na,1\n", "csv").unwrap();
        let options = CleaningOptions::default().with_selected_columns(["missing"]);
        assert!(matches!(pipeline().clean(table, &options), Err(TabularError::UnknownColumn(_))));
    }

    #[test]
    fn unsupported_formats() {
        let table = pipeline().parse(b"a\n1\n", "csv").unwrap();
        assert!(matches!(pipeline().parse(b"{}", "json"), Err(TabularError::UnsupportedFormat(_))));
        assert!(matches!(pipeline().serialize(&table, "json"), Err(TabularError::UnsupportedFormat(_))));
    }

    #[test]
    fn malformed_content_is_parse_error() {
        assert!(pipeline().parse(b"a,b\n\"open,1\n", "csv").unwrap_err().is_parse_error());
        assert!(pipeline().parse(b"not a zip archive", "xlsx").unwrap_err().is_parse_error());
        assert!(matches!(
            pipeline().parse(b"not a zip archive", "XLSX").unwrap_err(),
            TabularError::ParseError { format: Format::Xlsx, .. }
        ));
    }

    #[test]
    fn csv_round_trip() {
        let source = "id,label,score\n1,alpha,0.5\n2,\"b,c\",\n3,,-2\n";
        let table = pipeline().parse(source.as_bytes(), "csv").unwrap();
        let bytes = pipeline().serialize(&table, "csv").unwrap();
        assert_eq!(String::from_utf8(bytes.clone()).unwrap(), source);
        assert_eq!(pipeline().parse(&bytes, "csv").unwrap(), table);
    }

    #[test]
    fn exports_to_xlsx() {
        let table = pipeline().parse(b"city,temp\nOslo,-3\nLima,19.5\n", "csv").unwrap();
        let request = ExportRequest::new("xlsx", "weather.csv").unwrap();
        let exported = pipeline().export(&table, &request).unwrap();
        assert_eq!(exported.file_name, "weather.xlsx");
        assert_eq!(exported.mime_type, Format::Xlsx.mime_type());
        assert_eq!(pipeline().parse(&exported.bytes, "xlsx").unwrap(), table);
    }

    #[test]
    fn chart_uses_configured_width() {
        let table = pipeline().parse(b"a,b,c\n1,2,3\n", "csv").unwrap();
        assert_eq!(pipeline().chart(&table).table().unwrap().column_names(), vec!["a", "b"]);
        let settings = PipelineSettings {
            chart_columns: 1,
            ..PipelineSettings::default()
        };
        assert_eq!(TabularPipeline::new(settings).chart(&table).table().unwrap().column_names(), vec!["a"]);
    }
}
