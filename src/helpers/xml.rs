//! XML utilities for the Office Open XML spreadsheet parts.
//! Provides a reader wrapper, attribute and text helpers, and text escaping for writing.

use crate::error::TabularError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),

    #[error("Parse attribute value '{0}' failed")]
    ParseAttributeValueError(String),
}

/// XML reader wrapper configured for spreadsheet parts
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event, None at end of input
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, TabularError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(TabularError::XmlError(error)),
        }
    }
}

/// Helper trait for XML attributes providing value extraction and parsing
pub(crate) trait XmlAttributeHelper<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, TabularError>;

    fn parse_value<T: FromStr>(&self) -> Result<T, TabularError>;
}

impl<'a> XmlAttributeHelper<'a> for Attribute<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, TabularError> {
        Ok(self.unescape_value()?)
    }

    fn parse_value<T: FromStr>(&self) -> Result<T, TabularError> {
        let value = self.get_value()?;
        value
            .parse()
            .map_err(|_| XmlError::ParseAttributeValueError(value.to_string()).into())
    }
}

/// Helper trait for XML nodes providing attribute access by name
pub(crate) trait XmlNodeHelper<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, TabularError>;

    fn parse_attribute_value<T: FromStr>(&self, name: &str) -> Result<Option<T>, TabularError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, TabularError> {
        self.try_get_attribute(name)?
            .map(|attribute| attribute.get_value())
            .transpose()
    }

    fn parse_attribute_value<T: FromStr>(&self, name: &str) -> Result<Option<T>, TabularError> {
        self.try_get_attribute(name)?
            .map(|attribute| attribute.parse_value())
            .transpose()
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), TabularError>;

    /// Appends an entity or character reference
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), TabularError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), TabularError> {
        self.push_str(&text.xml_content()?);
        Ok(())
    }

    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), TabularError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = std::char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}

/// Drops characters XML 1.0 cannot carry (control characters other than tab, newline, carriage return).
pub(crate) fn xml_safe_text(text: &str) -> Cow<'_, str> {
    let is_invalid = |character: char| character.is_control() && !matches!(character, '\t' | '\n' | '\r');
    if text.chars().any(is_invalid) {
        Cow::Owned(text.chars().filter(|character| !is_invalid(*character)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_xml_events;
    use quick_xml::name::QName;

    fn collect_text(xml: &str) -> Result<String, TabularError> {
        let mut reader = XmlReader::new(xml.as_bytes());
        let mut text = String::new();
        match_xml_events!(reader => {
            Event::Text(event) => text.push_bytes_text(&event)?,
            Event::GeneralRef(event) => text.push_bytes_ref(&event)?,
        });
        Ok(text)
    }

    #[test]
    fn resolves_entities_and_character_references() {
        let text = collect_text("<t>a &amp; b &#65;&#x42;</t>").unwrap();
        assert_eq!(text, "a & b AB");
    }

    #[test]
    fn unknown_entity_fails() {
        assert!(collect_text("<t>&bogus;</t>").is_err());
    }

    #[test]
    fn reads_attributes() -> Result<(), TabularError> {
        let mut reader = XmlReader::new(r#"<c r="B3" s="7"/>"#.as_bytes());
        let mut found = None;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == QName(b"c") => {
                let reference = event.get_attribute_value("r")?.map(|it| it.to_string());
                let style = event.parse_attribute_value::<usize>("s")?;
                found = Some((reference, style));
            }
        });
        assert_eq!(found, Some((Some("B3".to_owned()), Some(7))));
        Ok(())
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(xml_safe_text("a\u{1}b\tc"), "ab\tc");
        assert!(matches!(xml_safe_text("plain"), Cow::Borrowed(_)));
    }
}
