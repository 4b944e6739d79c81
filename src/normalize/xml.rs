use quick_xml::Reader;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText};

use super::ParseError;

pub(crate) fn reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader
}

/// Reader that keeps whitespace-only and edge whitespace in text events, for
/// documents whose text may be mixed with inline markup.
pub(crate) fn markup_reader(xml: &str) -> Reader<&[u8]> {
    Reader::from_str(xml)
}

pub(crate) fn error(reader: &Reader<&[u8]>, err: quick_xml::Error) -> ParseError {
    ParseError::Xml {
        position: reader.error_position(),
        reason: err.to_string(),
    }
}

/// Qualified element name, prefix included (`content:encoded`).
pub(crate) fn qname(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

pub(crate) fn attr(e: &BytesStart, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.trim().to_string()))
        .filter(|v| !v.is_empty())
}

/// Unescaped text; feeds with HTML entities XML doesn't know keep them raw.
pub(crate) fn text(e: &BytesText) -> String {
    match e.unescape() {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(e).into_owned(),
    }
}

/// Text exactly as written, entities still escaped.
pub(crate) fn raw_text(e: &BytesText) -> String {
    String::from_utf8_lossy(e).into_owned()
}

pub(crate) fn cdata(e: &BytesCData) -> String {
    String::from_utf8_lossy(e).into_owned()
}

/// Re-serialize a start tag with its attributes.
pub(crate) fn open_tag(e: &BytesStart) -> String {
    format!("<{}>", String::from_utf8_lossy(e))
}

pub(crate) fn empty_tag(e: &BytesStart) -> String {
    format!("<{}/>", String::from_utf8_lossy(e))
}

pub(crate) fn close_tag(e: &BytesEnd) -> String {
    format!("</{}>", String::from_utf8_lossy(e.name().as_ref()))
}
