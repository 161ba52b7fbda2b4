//! Single-worksheet .xlsx writer.

use crate::error::TabularError;
use crate::helpers::xml::xml_safe_text;
use crate::helpers::zip::ZipWriterHelper;
use crate::spreadsheet::excel::STYLES_PATH;
use crate::spreadsheet::excel::WORKBOOK_PATH;
use crate::spreadsheet::excel::WORKBOOK_RELATIONSHIPS_PATH;
use crate::spreadsheet::reference::index_to_reference;
use crate::table::CellValue;
use crate::table::Table;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Writer;
use std::io::Cursor;
use std::io::Write;
use tracing::warn;
use zip::ZipWriter;

const SHEET_PATH: &str = "xl/worksheets/sheet1.xml";
const MAIN_NAMESPACE: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELATIONSHIPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELATIONSHIPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="1"><fill><patternFill patternType="none"/></fill></fills><borders count="1"><border/></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs></styleSheet>"#;

/// Writes the table to a workbook with one worksheet named `Sheet1`.
/// The header is the first row; missing cells are left out.
pub(crate) fn write_workbook(table: &Table) -> Result<Vec<u8>, TabularError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.write_part("[Content_Types].xml", CONTENT_TYPES)?;
    zip.write_part("_rels/.rels", ROOT_RELATIONSHIPS)?;
    zip.write_part(WORKBOOK_PATH, WORKBOOK)?;
    zip.write_part(WORKBOOK_RELATIONSHIPS_PATH, WORKBOOK_RELATIONSHIPS)?;
    zip.write_part(STYLES_PATH, STYLES)?;
    zip.start_part(SHEET_PATH)?;
    write_sheet(&mut zip, table)?;
    Ok(zip.finish()?.into_inner())
}

fn write_sheet<W: Write>(output: W, table: &Table) -> Result<(), TabularError> {
    let mut writer = Writer::new(output);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", MAIN_NAMESPACE));
    writer.write_event(Event::Start(worksheet))?;

    if table.width() > 0 {
        let last = index_to_reference(table.height(), table.width() - 1);
        let range = format!("A1:{last}");
        let mut dimension = BytesStart::new("dimension");
        dimension.push_attribute(("ref", range.as_str()));
        writer.write_event(Event::Empty(dimension))?;
    }

    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;
    if table.width() > 0 {
        let header: Vec<CellValue> = table.column_names().into_iter().map(CellValue::from).collect();
        write_row(&mut writer, 0, header.iter())?;
        for (index, row) in table.rows().enumerate() {
            write_row(&mut writer, index + 1, row.into_iter())?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(())
}

fn write_row<'a, W: Write>(
    writer: &mut Writer<W>,
    row: usize,
    cells: impl Iterator<Item = &'a CellValue>,
) -> Result<(), TabularError> {
    let number = (row + 1).to_string();
    let mut element = BytesStart::new("row");
    element.push_attribute(("r", number.as_str()));
    writer.write_event(Event::Start(element))?;
    for (col, value) in cells.enumerate() {
        write_cell(writer, &index_to_reference(row, col), value)?;
    }
    writer.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

fn write_cell<W: Write>(writer: &mut Writer<W>, reference: &str, value: &CellValue) -> Result<(), TabularError> {
    match value {
        CellValue::Missing => (),
        CellValue::Number(number) if !number.is_finite() => {
            warn!(reference, "Skipped non-finite number {number}");
        }
        CellValue::Number(number) => {
            let mut cell = BytesStart::new("c");
            cell.push_attribute(("r", reference));
            writer.write_event(Event::Start(cell))?;
            writer.write_event(Event::Start(BytesStart::new("v")))?;
            writer.write_event(Event::Text(BytesText::new(&number.to_string())))?;
            writer.write_event(Event::End(BytesEnd::new("v")))?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
        CellValue::Text(text) => {
            let mut cell = BytesStart::new("c");
            cell.push_attribute(("r", reference));
            cell.push_attribute(("t", "inlineStr"));
            writer.write_event(Event::Start(cell))?;
            writer.write_event(Event::Start(BytesStart::new("is")))?;
            let mut element = BytesStart::new("t");
            element.push_attribute(("xml:space", "preserve"));
            writer.write_event(Event::Start(element))?;
            writer.write_event(Event::Text(BytesText::new(&xml_safe_text(text))))?;
            writer.write_event(Event::End(BytesEnd::new("t")))?;
            writer.write_event(Event::End(BytesEnd::new("is")))?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
    }
    Ok(())
}
