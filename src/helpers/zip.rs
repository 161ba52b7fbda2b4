//! ZIP archive helpers for the Office Open XML container.
//! Provides part lookup on read and part writing on export.

use crate::error::TabularError;
use crate::helpers::xml::XmlReader;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::DateTime;
use zip::ZipArchive;
use zip::ZipWriter;

/// Helper trait for reading parts out of a ZIP archive
pub(crate) trait ZipHelper<RS: Read + Seek> {
    /// Gets a file from the ZIP archive by name (case-insensitive, path separator agnostic)
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, TabularError>;

    /// Creates an XML reader for a file within the ZIP archive
    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, TabularError>;
}

impl<RS: Read + Seek> ZipHelper<RS> for ZipArchive<RS> {
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, TabularError> {
        let pattern = name.replace('\\', "/");
        let path = self.file_names()
            .find(|file_name| pattern.eq_ignore_ascii_case(*file_name))
            .map(|file_name| file_name.to_owned());
        match path.map(|file_name| self.by_name(&file_name)).transpose() {
            Ok(Some(file)) => Ok(Some(file)),
            Ok(None) | Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error)?,
        }
    }

    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, TabularError> {
        let reader = self
            .file(name)?
            .map(|file| XmlReader::new(BufReader::new(file)));
        Ok(reader)
    }
}

/// Helper trait for writing deflated parts into a ZIP archive
pub(crate) trait ZipWriterHelper {
    /// Starts a new deflated part with a fixed timestamp; subsequent writes go to it
    fn start_part(&mut self, name: &str) -> Result<(), TabularError>;

    /// Writes a complete part
    fn write_part(&mut self, name: &str, content: &str) -> Result<(), TabularError>;
}

impl<W: Write + Seek> ZipWriterHelper for ZipWriter<W> {
    fn start_part(&mut self, name: &str) -> Result<(), TabularError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());
        self.start_file(name, options)?;
        Ok(())
    }

    fn write_part(&mut self, name: &str, content: &str) -> Result<(), TabularError> {
        self.start_part(name)?;
        self.write_all(content.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn finds_parts_ignoring_case_and_separators() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.write_part("xl/Workbook.xml", "<workbook/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive
            .file("xl\\workbook.xml")
            .unwrap()
            .expect("part present")
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<workbook/>");
        assert!(archive.file("xl/styles.xml").unwrap().is_none());
    }
}
