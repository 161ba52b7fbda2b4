//! Comma-separated values codec.

use crate::error::TabularError;
use crate::format::Format;
use crate::format::Records;
use crate::format::TableCodec;
use crate::helpers::text::decode_utf8_discarding;
use crate::table::CellValue;
use crate::table::Table;
use ::csv::ReaderBuilder;
use ::csv::StringRecord;
use ::csv::Terminator;
use ::csv::WriterBuilder;
use std::collections::HashSet;
use tracing::warn;

/// CSV reader/writer using comma delimiters and standard double-quote quoting.
pub struct CsvCodec {
    /// Field values read as missing cells
    missing_values: HashSet<String>,
}

impl CsvCodec {
    pub fn new<I, S>(missing_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CsvCodec {
            missing_values: missing_values.into_iter().map(Into::into).collect(),
        }
    }

    fn parse_error(message: impl Into<String>) -> TabularError {
        TabularError::ParseError {
            format: Format::Csv,
            message: message.into(),
        }
    }

    /// True if the record comes from a line with no characters at all.
    /// A line holding only separators or a quoted empty field is a row of missing cells.
    fn is_empty_line(text: &str, record: &StringRecord) -> bool {
        record
            .position()
            .map(|position| {
                let start = usize::try_from(position.byte()).unwrap_or(usize::MAX);
                matches!(text.as_bytes().get(start), None | Some(b'\n') | Some(b'\r'))
            })
            .unwrap_or(false)
    }
}

impl TableCodec for CsvCodec {
    fn format(&self) -> Format {
        Format::Csv
    }

    fn decode(&self, bytes: &[u8]) -> Result<Records, TabularError> {
        let (text, discarded) = decode_utf8_discarding(bytes);
        if discarded > 0 {
            warn!(discarded, "Discarded undecodable byte sequences");
        }
        if let Some(line) = find_unterminated_quote(&text) {
            return Err(Self::parse_error(format!("EOF inside quoted field starting at line {line}")));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut records = reader.records();

        let header = loop {
            match records.next() {
                Some(record) => {
                    let record = record?;
                    if !Self::is_empty_line(&text, &record) {
                        break record;
                    }
                }
                None => return Err(Self::parse_error("No columns to parse from file")),
            }
        };
        let width = header.len();

        let mut rows = Vec::<Vec<CellValue>>::new();
        for record in records {
            let record = record?;
            if Self::is_empty_line(&text, &record) {
                continue;
            }
            if record.len() > width {
                let line = record.position().map(|position| position.line()).unwrap_or_default();
                return Err(Self::parse_error(format!(
                    "Expected {width} fields in line {line}, saw {}",
                    record.len()
                )));
            }
            rows.push(
                record
                    .iter()
                    .map(|field| CellValue::from_field(field, &self.missing_values))
                    .collect(),
            );
        }

        Ok(Records {
            header: header.iter().map(|name| Some(name.to_owned())).collect(),
            rows,
        })
    }

    fn encode(&self, table: &Table) -> Result<Vec<u8>, TabularError> {
        if table.width() == 0 {
            return Ok(Vec::new());
        }
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(table.column_names())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|value| value.to_string()))?;
        }
        writer.into_inner().map_err(|error| TabularError::IoError(error.into_error()))
    }
}

/// Finds a quoted field that is never closed, returning the 1-based line where it opens.
///
/// Follows the same rules as the reader: a quote only opens a field at its
/// start, and a doubled quote inside a quoted field is an escaped quote.
fn find_unterminated_quote(text: &str) -> Option<usize> {
    let mut line = 1usize;
    let mut opened_at = 0usize;
    let mut in_quotes = false;
    let mut field_start = true;
    let mut bytes = text.bytes().peekable();
    while let Some(byte) = bytes.next() {
        if in_quotes {
            match byte {
                b'"' if bytes.peek() == Some(&b'"') => {
                    bytes.next();
                }
                b'"' => in_quotes = false,
                b'\n' => line += 1,
                _ => (),
            }
        } else {
            match byte {
                b'"' if field_start => {
                    in_quotes = true;
                    opened_at = line;
                    field_start = false;
                }
                b',' | b'\r' => field_start = true,
                b'\n' => {
                    line += 1;
                    field_start = true;
                }
                _ => field_start = false,
            }
        }
    }
    in_quotes.then_some(opened_at)
}
