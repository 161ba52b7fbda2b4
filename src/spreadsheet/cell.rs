use crate::error::TabularError;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::SpreadsheetError;
use crate::table::CellValue;
use chrono::NaiveDate;
use chrono::TimeDelta;

const MILLISECONDS_PER_DAY: i64 = 86_400_000;

/// Types of cell data in a worksheet.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 0/1
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline and formula string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values such as #DIV/0!
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Analyzes format codes for date/time patterns outside literals and brackets.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// A single worksheet cell with position, type and raw value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as stored in the sheet XML
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    fn to_double(&self) -> Result<f64, TabularError> {
        Ok(self.value.trim().parse::<f64>()?)
    }

    /// Formats a date or time serial, failing when it is outside the calendar.
    fn to_temporal_text(&self, convert: impl Fn(f64) -> Option<String>) -> Result<CellValue, TabularError> {
        let serial = self.to_double()?;
        let text = convert(serial).ok_or_else(|| {
            SpreadsheetError::CellValueError(self.reference(), format!("date serial {serial} out of range"))
        })?;
        Ok(CellValue::Text(text))
    }

    /// Converts the raw cell into a table value.
    /// Date and time formatted numbers become ISO text, errors become missing.
    pub(crate) fn to_value(&self, shared_strings: &[String]) -> Result<CellValue, TabularError> {
        let value = match self.kind {
            CellType::Empty | CellType::Error => CellValue::Missing,
            CellType::Boolean => CellValue::Text(if self.value.trim() == "1" { "true" } else { "false" }.to_owned()),
            CellType::Number => CellValue::number(self.to_double()?),
            CellType::NumberDateTime1900 => self.to_temporal_text(|serial| to_datetime_string(serial, false))?,
            CellType::NumberDateTime1904 => self.to_temporal_text(|serial| to_datetime_string(serial, true))?,
            CellType::NumberDate1900 => self.to_temporal_text(|serial| to_date_string(serial, false))?,
            CellType::NumberDate1904 => self.to_temporal_text(|serial| to_date_string(serial, true))?,
            CellType::NumberTime1900 | CellType::NumberTime1904 => self.to_temporal_text(to_time_string)?,
            CellType::IsoDateTime => CellValue::Text(self.value.replace('T', " ")),
            CellType::InlineString => CellValue::Text(self.value.to_owned()),
            CellType::SharedString => {
                let index = self.value.trim().parse::<usize>()?;
                let string = shared_strings.get(index).ok_or_else(|| {
                    SpreadsheetError::CellValueError(
                        self.reference(),
                        format!("shared string {index} out of range"),
                    )
                })?;
                CellValue::Text(string.to_owned())
            }
        };
        Ok(value)
    }
}

/// Splits a serial number into whole days and milliseconds into the day.
/// A time that rounds up to midnight is carried into the next day.
fn split_serial(serial: f64) -> Option<(i64, i64)> {
    if !serial.is_finite() {
        return None;
    }
    let mut days = serial.trunc() as i64;
    let mut milliseconds = (serial.fract().abs() * MILLISECONDS_PER_DAY as f64).round() as i64;
    if milliseconds >= MILLISECONDS_PER_DAY {
        milliseconds -= MILLISECONDS_PER_DAY;
        days = days.checked_add(if serial < 0.0 { -1 } else { 1 })?;
    }
    Some((days, milliseconds))
}

/// Converts whole serial days to a calendar date, None outside chrono's range.
/// Serial 60 is the fictitious 1900-02-29 kept by Lotus 1-2-3 compatibility.
fn serial_date(days: i64, is_1904: bool) -> Option<NaiveDate> {
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(TimeDelta::try_days(days.checked_add(offset)?)?)
}

fn format_time(milliseconds: i64) -> String {
    let fraction = milliseconds % 1_000;
    let seconds = milliseconds / 1_000 % 60;
    let minutes = milliseconds / 60_000 % 60;
    let hours = milliseconds / 3_600_000;
    if fraction > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{fraction:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

fn to_date_string(serial: f64, is_1904: bool) -> Option<String> {
    let (days, _) = split_serial(serial)?;
    Some(serial_date(days, is_1904)?.format("%Y-%m-%d").to_string())
}

fn to_time_string(serial: f64) -> Option<String> {
    let (_, milliseconds) = split_serial(serial)?;
    Some(format_time(milliseconds))
}

fn to_datetime_string(serial: f64, is_1904: bool) -> Option<String> {
    let (days, milliseconds) = split_serial(serial)?;
    let date = serial_date(days, is_1904)?;
    Some(format!("{} {}", date.format("%Y-%m-%d"), format_time(milliseconds)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            row: 0,
            col: 0,
            kind,
            value: value.to_owned(),
        }
    }

    #[test]
    fn custom_formats() {
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("hh:mm:ss", true), CellType::NumberTime1904);
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd hh:mm", false), CellType::NumberDateTime1900);
        assert_eq!(CellType::parse_custom_number_format("0.00\"days\"", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("#,##0_);(#,##0)", false), CellType::Number);
    }

    #[test]
    fn builtin_formats() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(CellType::parse_builtin_number_format_id("2", false), None);
    }

    #[test]
    fn dates_become_iso_text() {
        let strings = Vec::new();
        assert_eq!(cell(CellType::NumberDate1900, "45292").to_value(&strings).unwrap(), CellValue::Text("2024-01-01".to_owned()));
        assert_eq!(cell(CellType::NumberDate1900, "1").to_value(&strings).unwrap(), CellValue::Text("1900-01-01".to_owned()));
        assert_eq!(cell(CellType::NumberDate1904, "0").to_value(&strings).unwrap(), CellValue::Text("1904-01-01".to_owned()));
        assert_eq!(cell(CellType::NumberTime1900, "0.5").to_value(&strings).unwrap(), CellValue::Text("12:00:00".to_owned()));
        assert_eq!(
            cell(CellType::NumberDateTime1900, "45292.75").to_value(&strings).unwrap(),
            CellValue::Text("2024-01-01 18:00:00".to_owned())
        );
    }

    #[test]
    fn out_of_range_serials_fail() {
        let strings = Vec::new();
        let error = cell(CellType::NumberDate1900, "1e20").to_value(&strings).unwrap_err();
        assert!(error.to_string().contains("A1"));
        assert!(cell(CellType::NumberDateTime1904, "-1e20").to_value(&strings).is_err());
        assert!(cell(CellType::NumberDate1900, "inf").to_value(&strings).is_err());
        assert!(cell(CellType::NumberTime1900, "NaN").to_value(&strings).is_err());
    }

    #[test]
    fn times_rounding_to_midnight_roll_over() {
        let strings = Vec::new();
        assert_eq!(
            cell(CellType::NumberDateTime1900, "45292.9999999999").to_value(&strings).unwrap(),
            CellValue::Text("2024-01-02 00:00:00".to_owned())
        );
        assert_eq!(
            cell(CellType::NumberTime1900, "0.9999999999").to_value(&strings).unwrap(),
            CellValue::Text("00:00:00".to_owned())
        );
        assert_eq!(
            cell(CellType::NumberTime1900, "0.25001").to_value(&strings).unwrap(),
            CellValue::Text("06:00:00.864".to_owned())
        );
    }

    #[test]
    fn other_kinds() {
        let strings = vec!["zero".to_owned(), "one".to_owned()];
        assert_eq!(cell(CellType::SharedString, "1").to_value(&strings).unwrap(), CellValue::Text("one".to_owned()));
        assert!(cell(CellType::SharedString, "5").to_value(&strings).is_err());
        assert_eq!(cell(CellType::Number, "2.5").to_value(&strings).unwrap(), CellValue::Number(2.5));
        assert_eq!(cell(CellType::Boolean, "1").to_value(&strings).unwrap(), CellValue::Text("true".to_owned()));
        assert_eq!(cell(CellType::Error, "#DIV/0!").to_value(&strings).unwrap(), CellValue::Missing);
        assert_eq!(
            cell(CellType::IsoDateTime, "2024-03-01T08:30:00").to_value(&strings).unwrap(),
            CellValue::Text("2024-03-01 08:30:00".to_owned())
        );
    }
}
