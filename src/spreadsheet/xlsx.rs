use crate::error::TabularError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel::load_number_formats;
use crate::spreadsheet::excel::load_workbook;
use crate::spreadsheet::excel::SHARED_STRINGS_PATH;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::io::BufRead;
use std::io::Read;
use std::io::Seek;
use zip::ZipArchive;

// XML tag names for parsing worksheet and shared string parts
const TAG_SHARED_STRING_ITEM: QName = QName(b"si"); // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");     // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                // Text content within strings
const TAG_ROW: QName = QName(b"row");               // Row in worksheet
const TAG_CELL: QName = QName(b"c");                // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");      // Inline string value
const TAG_VALUE: QName = QName(b"v");               // Cell value content

/// An opened .xlsx package
pub(crate) struct XlsxWorkbook<RS: Read + Seek> {
    /// ZIP archive containing the workbook parts
    zip: ZipArchive<RS>,
    /// Cell type per style index, for date detection
    number_formats: Vec<CellType>,
    /// Worksheets in workbook order as (name, zip_path) pairs
    sheets: Vec<(String, String)>,
}

impl<RS: Read + Seek> XlsxWorkbook<RS> {
    /// Opens the package and parses the workbook structure and styles
    pub(crate) fn open(reader: RS) -> Result<Self, TabularError> {
        let mut zip = ZipArchive::new(reader)?;
        let (sheets, is_1904) = load_workbook(&mut zip)?;
        let number_formats = load_number_formats(&mut zip, is_1904)?;
        Ok(XlsxWorkbook {
            zip,
            number_formats,
            sheets,
        })
    }

    /// Loads the shared string table, empty when the part is absent
    pub(crate) fn load_shared_strings(&mut self) -> Result<Vec<String>, TabularError> {
        let mut shared_strings = Vec::<String>::new();
        let mut reader = match self.zip.xml_reader(SHARED_STRINGS_PATH)? {
            Some(reader) => reader,
            None => return Ok(shared_strings),
        };

        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
                shared_strings.push(string);
            }
        });
        Ok(shared_strings)
    }

    /// Reads every non-empty cell of the first worksheet
    pub(crate) fn read_first_sheet(&mut self) -> Result<Sheet, TabularError> {
        let (sheet_name, zip_path) = self.sheets.first().ok_or(SpreadsheetError::NoWorksheet)?;
        let mut sheet = Sheet::new(sheet_name);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let mut reader = self.zip.xml_reader(zip_path)?
            .ok_or_else(|| SpreadsheetError::MissingPart(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(number) = event.parse_attribute_value::<usize>("r")? {
                    row_count = number.saturating_sub(1);
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
                col_count = 0;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = match event.get_attribute_value("r")? {
                    Some(reference) => reference_to_index(&reference).ok_or_else(|| {
                        SpreadsheetError::CellValueError(reference.to_string(), "reference outside the worksheet".to_owned())
                    })?,
                    None => (row_count, col_count),
                };
                col_count = col + 1;
                value.clear();
                kind = event.get_attribute_value("t")?.map(|t| {
                    match t.as_ref() {
                        "inlineStr" | "str" => CellType::InlineString,
                        "s" => CellType::SharedString,
                        "d" => CellType::IsoDateTime,
                        "b" => CellType::Boolean,
                        "e" => CellType::Error,
                        _ => CellType::Number,
                    }
                }).unwrap_or(CellType::Number);
                if let Some(format_id) = event.get_attribute_value("s")? {
                    if kind == CellType::Number && !format_id.is_empty() {
                        let index = format_id.parse::<usize>()?;
                        kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                    }
                }
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if !value.is_empty() && event.name() == TAG_CELL => {
                sheet.push(Cell {
                    row,
                    col,
                    kind,
                    value: std::mem::take(&mut value),
                });
            }
        });
        Ok(sheet)
    }
}

/// Reads string value from XML content, handling text and CDATA sections.
/// Phonetic annotations are skipped.
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, TabularError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_bytes_text(&event)?,
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
