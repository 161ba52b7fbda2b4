//! # Session
//!
//! Per-file processing for an interactive shell: parse an upload, clean it with
//! the user's toggles, collect previews and notices, and optionally chart and
//! convert it. Every file is processed on its own; a failure ends up as an
//! error notice on that file's report and never affects the other files.
use crate::config::PipelineSettings;
use crate::format::Format;
use crate::pipeline::ChartSeries;
use crate::pipeline::CleaningOptions;
use crate::pipeline::ExportRequest;
use crate::pipeline::ExportedFile;
use crate::pipeline::Step;
use crate::pipeline::TabularPipeline;
use crate::table::Table;
use anyhow::Context;
use anyhow::Result;
use std::fmt::Display;
use tracing::debug;
use tracing::instrument;
use tracing::warn;

/// A file as uploaded: its name and raw content.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        UploadedFile {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Text after the last dot, lowercased; the whole name when there is no dot.
    pub fn extension(&self) -> String {
        self.name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }
}

/// What the user asked for one file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileRequest {
    pub options: CleaningOptions,
    pub show_chart: bool,
    /// Target format of a conversion, if any
    pub export: Option<Format>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A message shown to the user, keyed by the condition that raised it.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    DuplicatesRemoved,
    MissingValuesFilled,
    NoNumericColumnsToFill,
    NoNumericColumnsToChart,
    Converted { file: String, format: Format },
    Failed { file: String, message: String },
}

impl Notice {
    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::DuplicatesRemoved | Notice::MissingValuesFilled | Notice::Converted { .. } => NoticeLevel::Success,
            Notice::NoNumericColumnsToFill | Notice::NoNumericColumnsToChart => NoticeLevel::Warning,
            Notice::Failed { .. } => NoticeLevel::Error,
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::DuplicatesRemoved => f.write_str("Duplicates Removed"),
            Notice::MissingValuesFilled => f.write_str("Missing values filled with column mean"),
            Notice::NoNumericColumnsToFill => f.write_str("No numerical columns found for filling missing values."),
            Notice::NoNumericColumnsToChart => f.write_str("No numeric columns available for chart visualization."),
            Notice::Converted { file, format } => write!(f, "{file} has been converted to {format}"),
            Notice::Failed { file, message } => write!(f, "Error processing {file}: {message}"),
        }
    }
}

/// The first rows of the table at one pipeline step.
#[derive(Clone, Debug, PartialEq)]
pub struct Preview {
    pub step: Step,
    pub table: Table,
}

/// Everything produced for one uploaded file.
#[derive(Clone, Debug, PartialEq)]
pub struct FileReport {
    pub file_name: String,
    pub previews: Vec<Preview>,
    pub notices: Vec<Notice>,
    pub chart: Option<Table>,
    pub export: Option<ExportedFile>,
}

impl FileReport {
    fn new(file_name: &str) -> Self {
        FileReport {
            file_name: file_name.to_owned(),
            previews: Vec::new(),
            notices: Vec::new(),
            chart: None,
            export: None,
        }
    }

    /// True if processing stopped on an error.
    pub fn failed(&self) -> bool {
        self.notices.iter().any(|notice| notice.level() == NoticeLevel::Error)
    }

    pub fn preview(&self, step: Step) -> Option<&Table> {
        self.previews
            .iter()
            .find(|preview| preview.step == step)
            .map(|preview| &preview.table)
    }
}

pub struct Session {
    pipeline: TabularPipeline,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PipelineSettings::default())
    }
}

impl Session {
    pub fn new(settings: PipelineSettings) -> Self {
        Session {
            pipeline: TabularPipeline::new(settings),
        }
    }

    pub fn pipeline(&self) -> &TabularPipeline {
        &self.pipeline
    }

    /// Processes one file. Errors are reported on the returned report.
    #[instrument(name = "file", skip_all, fields(name = %file.name))]
    pub fn process_file(&self, file: &UploadedFile, request: &FileRequest) -> FileReport {
        let mut report = FileReport::new(&file.name);
        if let Err(error) = self.run(file, request, &mut report) {
            let message = format!("{error:#}");
            warn!(error = %message, "Processing failed");
            report.notices.push(Notice::Failed {
                file: file.name.to_owned(),
                message,
            });
        }
        report
    }

    /// Processes every file independently, in order.
    pub fn process_batch(&self, files: &[(UploadedFile, FileRequest)]) -> Vec<FileReport> {
        files
            .iter()
            .map(|(file, request)| self.process_file(file, request))
            .collect()
    }

    fn run(&self, file: &UploadedFile, request: &FileRequest, report: &mut FileReport) -> Result<()> {
        let preview_rows = self.pipeline.settings().preview_rows;
        let extension = file.extension();
        let table = self
            .pipeline
            .parse(&file.bytes, &extension)
            .with_context(|| format!("reading {extension} file"))?;
        report.previews.push(Preview {
            step: Step::Parsed,
            table: table.head(preview_rows),
        });

        let (table, cleaning) = self
            .pipeline
            .clean_with(table, &request.options, |step, table| {
                match step {
                    Step::Deduplicated => report.notices.push(Notice::DuplicatesRemoved),
                    Step::FilledMissing if table.numeric_columns().next().is_none() => {
                        report.notices.push(Notice::NoNumericColumnsToFill)
                    }
                    Step::FilledMissing => report.notices.push(Notice::MissingValuesFilled),
                    Step::Parsed | Step::Selected => (),
                }
                report.previews.push(Preview {
                    step,
                    table: table.head(preview_rows),
                });
            })
            .context("cleaning")?;
        debug!(?cleaning, "Cleaned table");

        if request.show_chart {
            match self.pipeline.chart(&table) {
                ChartSeries::Series(series) => report.chart = Some(series),
                ChartSeries::NoNumericColumns => report.notices.push(Notice::NoNumericColumnsToChart),
            }
        }

        if let Some(format) = request.export {
            let export = ExportRequest {
                format,
                base_name: file.name.to_owned(),
            };
            let exported = self
                .pipeline
                .export(&table, &export)
                .with_context(|| format!("converting to {format}"))?;
            report.notices.push(Notice::Converted {
                file: file.name.to_owned(),
                format,
            });
            report.export = Some(exported);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    fn csv(name: &str, content: &str) -> UploadedFile {
        UploadedFile::new(name, content.as_bytes())
    }

    fn all_steps() -> FileRequest {
        FileRequest {
            options: CleaningOptions {
                remove_duplicates: true,
                fill_missing_numeric_with_mean: true,
                selected_columns: None,
            },
            show_chart: true,
            export: Some(Format::Xlsx),
        }
    }

    #[test]
    fn extensions() {
        assert_eq!(csv("Data.CSV", "").extension(), "csv");
        assert_eq!(csv("archive.tar.xlsx", "").extension(), "xlsx");
        assert_eq!(csv("README", "").extension(), "readme");
    }

    #[test]
    fn processes_a_file_end_to_end() {
        let file = csv("sales.csv", "name,val\na,1\na,1\nb,\n");
        let report = Session::default().process_file(&file, &all_steps());

        assert!(!report.failed());
        let steps: Vec<Step> = report.previews.iter().map(|preview| preview.step).collect();
        assert_eq!(steps, vec![Step::Parsed, Step::Deduplicated, Step::FilledMissing, Step::Selected]);
        assert_eq!(report.preview(Step::Parsed).unwrap().height(), 3);
        assert_eq!(
            report.notices,
            vec![
                Notice::DuplicatesRemoved,
                Notice::MissingValuesFilled,
                Notice::Converted {
                    file: "sales.csv".to_owned(),
                    format: Format::Xlsx,
                },
            ]
        );
        assert_eq!(report.notices[2].to_string(), "sales.csv has been converted to xlsx");
        assert_eq!(report.chart.as_ref().unwrap().column_names(), vec!["val"]);
        let export = report.export.unwrap();
        assert_eq!(export.file_name, "sales.xlsx");
        let table = Session::default().pipeline().parse(&export.bytes, "xlsx").unwrap();
        assert_eq!(table.column("val").unwrap().values(), &[CellValue::Number(1.0), CellValue::Number(1.0)]);
    }

    #[test]
    fn text_only_file_warns_twice() {
        let file = csv("names.csv", "first,last\nAda,Lovelace\n");
        let report = Session::default().process_file(&file, &all_steps());
        assert!(report.notices.contains(&Notice::NoNumericColumnsToFill));
        assert!(report.notices.contains(&Notice::NoNumericColumnsToChart));
        assert!(report.chart.is_none());
        assert!(report.export.is_some());
        assert!(report
            .notices
            .iter()
            .filter(|notice| notice.level() == NoticeLevel::Warning)
            .all(|notice| notice.to_string().starts_with("No numer")));
    }

    #[test]
    fn previews_are_limited() {
        let content: String = std::iter::once("n\n".to_owned())
            .chain((0..12).map(|index| format!("{index}\n")))
            .collect();
        let report = Session::default().process_file(&csv("n.csv", &content), &FileRequest::default());
        assert_eq!(report.preview(Step::Parsed).unwrap().height(), 5);
        assert_eq!(report.preview(Step::Selected).unwrap().height(), 5);
        assert!(report.notices.is_empty());
    }

    #[test]
    fn failure_keeps_earlier_previews() {
        let file = csv("data.csv", "name,val\na,1\na,1\n");
        let request = FileRequest {
            options: CleaningOptions::default()
                .with_remove_duplicates(true)
                .with_selected_columns(["price"]),
            ..FileRequest::default()
        };
        let report = Session::default().process_file(&file, &request);
        assert!(report.failed());
        assert!(report.preview(Step::Parsed).is_some());
        assert!(report.preview(Step::Deduplicated).is_some());
        assert!(report.preview(Step::Selected).is_none());
        let message = report.notices.last().unwrap().to_string();
        assert!(message.starts_with("Error processing data.csv: cleaning:"));
        assert!(message.contains("price"));
    }

    #[test]
    fn batch_isolates_failures() {
        let files = vec![
            (csv("broken.csv", "a,b\n\"unterminated,1\n"), all_steps()),
            (csv("good.csv", "x,y\n1,2\n3,\n"), all_steps()),
        ];
        let reports = Session::default().process_batch(&files);
        assert_eq!(reports.len(), 2);

        assert!(reports[0].failed());
        assert!(reports[0].previews.is_empty());
        assert!(reports[0].notices[0].to_string().starts_with("Error processing broken.csv: reading csv file: Parse csv content failed"));

        let alone = Session::default().process_file(&files[1].0, &files[1].1);
        assert_eq!(reports[1], alone);
        assert!(!reports[1].failed());
    }

    #[test]
    fn unsupported_upload_is_reported() {
        let report = Session::default().process_file(&csv("notes.txt", "hello"), &FileRequest::default());
        assert_eq!(report.notices.len(), 1);
        assert_eq!(report.notices[0].level(), NoticeLevel::Error);
        assert!(report.notices[0].to_string().contains("Unsupported format 'txt'"));
    }
}
