//! Catalog document format: `{"catalog":[asset, asset, ...]}`.
//!
//! Both directions stream. The writer emits one array element per asset,
//! and the reader yields one asset per call and never buffers the whole
//! array.

use crate::io::traits::{ExportSink, ImportSource};
use crate::models::Asset;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::{BufRead, Write};

/// Name of the single top-level key.
pub const CATALOG_KEY: &str = "catalog";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Streaming writer for catalog documents.
///
/// Output is compact JSON with no whitespace between elements.
pub struct CatalogDocumentWriter<W: Write> {
    writer: W,
    /// Number of assets written.
    count: usize,
    /// Whether the document header has been written.
    started: bool,
    /// Whether the document has been terminated.
    finished: bool,
}

impl<W: Write> CatalogDocumentWriter<W> {
    /// Creates a writer. Nothing is written until the first asset or
    /// `finalize()`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            count: 0,
            started: false,
            finished: false,
        }
    }

    /// Consumes the writer, returning the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ensure_started(&mut self) -> Result<()> {
        if !self.started {
            write!(self.writer, "{{\"{CATALOG_KEY}\":[").map_err(write_error)?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> ExportSink for CatalogDocumentWriter<W> {
    fn write(&mut self, asset: &Asset) -> Result<()> {
        if self.finished {
            return Err(Error::OperationFailed {
                operation: "write_catalog_document".to_string(),
                cause: "document already finalized".to_string(),
            });
        }
        self.ensure_started()?;

        if self.count > 0 {
            self.writer.write_all(b",").map_err(write_error)?;
        }
        serde_json::to_writer(&mut self.writer, asset).map_err(|e| Error::OperationFailed {
            operation: "write_catalog_document".to_string(),
            cause: e.to_string(),
        })?;
        self.count += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.ensure_started()?;
        self.writer.write_all(b"]}").map_err(write_error)?;
        self.writer.flush().map_err(|e| Error::OperationFailed {
            operation: "flush_catalog_document".to_string(),
            cause: e.to_string(),
        })?;
        self.finished = true;
        Ok(())
    }

    fn count(&self) -> usize {
        self.count
    }
}

#[allow(clippy::needless_pass_by_value)]
fn write_error(e: std::io::Error) -> Error {
    Error::OperationFailed {
        operation: "write_catalog_document".to_string(),
        cause: e.to_string(),
    }
}

/// Reader position within the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    /// Header not read yet.
    Start,
    /// Inside the array, before the first element.
    FirstElement,
    /// Inside the array, after an element.
    AfterElement,
    /// Array and outer object closed.
    Done,
}

/// Strict streaming reader for catalog documents.
///
/// The header (`{`, `"catalog"`, `:`, `[`) is validated on the first call to
/// [`ImportSource::next`], before any asset is returned. Every element must
/// be a JSON object, and nothing but whitespace may follow the closing `}`.
pub struct CatalogDocumentReader<R: BufRead> {
    reader: R,
    state: ReadState,
    /// Number of elements returned so far.
    elements: usize,
}

impl<R: BufRead> CatalogDocumentReader<R> {
    /// Creates a reader.
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            state: ReadState::Start,
            elements: 0,
        }
    }

    /// Number of assets returned so far.
    #[must_use]
    pub const fn elements_read(&self) -> usize {
        self.elements
    }

    fn read_header(&mut self) -> Result<()> {
        if self.fill()?.starts_with(UTF8_BOM) {
            self.reader.consume(UTF8_BOM.len());
        }

        self.expect(b'{', "at document start")?;

        match self.skip_whitespace()? {
            Some(b'"') => {},
            found => return Err(unexpected(&format!("\"{CATALOG_KEY}\" key"), found)),
        }
        let key = {
            let mut de = serde_json::Deserializer::from_reader(&mut self.reader);
            String::deserialize(&mut de)
                .map_err(|e| Error::MalformedDocument(format!("invalid object key: {e}")))?
        };
        if key != CATALOG_KEY {
            return Err(Error::MalformedDocument(format!(
                "expected \"{CATALOG_KEY}\" key, found \"{key}\""
            )));
        }

        self.expect(b':', "after \"catalog\"")?;
        self.expect(b'[', "to open the catalog array")?;
        Ok(())
    }

    fn read_trailer(&mut self) -> Result<()> {
        self.expect(b'}', "after the catalog array")?;
        match self.skip_whitespace()? {
            None => Ok(()),
            Some(_) => Err(Error::MalformedDocument(
                "unexpected content after the document".to_string(),
            )),
        }
    }

    fn read_element(&mut self) -> Result<Asset> {
        let index = self.elements;
        match self.skip_whitespace()? {
            Some(b'{') => {},
            found => {
                return Err(Error::MalformedDocument(format!(
                    "element {index}: {}",
                    describe_unexpected("an asset object", found)
                )));
            },
        }

        // Objects end at their closing brace, so the deserializer never
        // reads past the element.
        let map = {
            let mut de = serde_json::Deserializer::from_reader(&mut self.reader);
            Map::<String, Value>::deserialize(&mut de)
                .map_err(|e| Error::MalformedDocument(format!("element {index}: {e}")))?
        };

        self.elements += 1;
        Ok(Asset::from(map))
    }

    fn fill(&mut self) -> Result<&[u8]> {
        self.reader.fill_buf().map_err(|e| Error::OperationFailed {
            operation: "read_catalog_document".to_string(),
            cause: e.to_string(),
        })
    }

    /// Skips whitespace and returns the next byte without consuming it.
    fn skip_whitespace(&mut self) -> Result<Option<u8>> {
        loop {
            let buf = self.fill()?;
            let Some(&byte) = buf.first() else {
                return Ok(None);
            };
            let skip = buf
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            if skip == 0 {
                return Ok(Some(byte));
            }
            self.reader.consume(skip);
        }
    }

    /// Consumes `expected` after optional whitespace.
    fn expect(&mut self, expected: u8, context: &str) -> Result<()> {
        match self.skip_whitespace()? {
            Some(byte) if byte == expected => {
                self.reader.consume(1);
                Ok(())
            },
            found => Err(unexpected(
                &format!("'{}' {context}", char::from(expected)),
                found,
            )),
        }
    }
}

impl<R: BufRead> ImportSource for CatalogDocumentReader<R> {
    fn next(&mut self) -> Result<Option<Asset>> {
        loop {
            match self.state {
                ReadState::Start => {
                    self.read_header()?;
                    self.state = ReadState::FirstElement;
                },
                ReadState::FirstElement => {
                    if self.skip_whitespace()? == Some(b']') {
                        self.reader.consume(1);
                        self.read_trailer()?;
                        self.state = ReadState::Done;
                        continue;
                    }
                    let asset = self.read_element()?;
                    self.state = ReadState::AfterElement;
                    return Ok(Some(asset));
                },
                ReadState::AfterElement => match self.skip_whitespace()? {
                    Some(b',') => {
                        self.reader.consume(1);
                        return self.read_element().map(Some);
                    },
                    Some(b']') => {
                        self.reader.consume(1);
                        self.read_trailer()?;
                        self.state = ReadState::Done;
                    },
                    found => return Err(unexpected("',' or ']' between assets", found)),
                },
                ReadState::Done => return Ok(None),
            }
        }
    }
}

fn unexpected(expected: &str, found: Option<u8>) -> Error {
    Error::MalformedDocument(describe_unexpected(expected, found))
}

fn describe_unexpected(expected: &str, found: Option<u8>) -> String {
    match found {
        Some(byte) if byte.is_ascii_graphic() => {
            format!("expected {expected}, found '{}'", char::from(byte))
        },
        Some(byte) => format!("expected {expected}, found byte 0x{byte:02x}"),
        None => format!("expected {expected}, found end of input"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn read_all(input: &str) -> Result<Vec<Asset>> {
        let mut reader = CatalogDocumentReader::new(Cursor::new(input.as_bytes().to_vec()));
        let mut assets = Vec::new();
        while let Some(asset) = reader.next()? {
            assets.push(asset);
        }
        Ok(assets)
    }

    fn asset(value: Value) -> Asset {
        Asset::try_from(value).unwrap()
    }

    #[test]
    fn test_writer_output() {
        let mut writer = CatalogDocumentWriter::new(Vec::new());
        writer.write(&asset(json!({"id": "a/b/1"}))).unwrap();
        writer.write(&asset(json!({"id": "a/b/2"}))).unwrap();
        writer.finalize().unwrap();
        assert_eq!(writer.count(), 2);

        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output, r#"{"catalog":[{"id":"a/b/1"},{"id":"a/b/2"}]}"#);
    }

    #[test]
    fn test_writer_empty_document() {
        let mut writer = CatalogDocumentWriter::new(Vec::new());
        writer.finalize().unwrap();
        writer.finalize().unwrap();
        assert_eq!(writer.into_inner(), br#"{"catalog":[]}"#);
    }

    #[test]
    fn test_writer_rejects_write_after_finalize() {
        let mut writer = CatalogDocumentWriter::new(Vec::new());
        writer.finalize().unwrap();
        assert!(writer.write(&Asset::new()).is_err());
    }

    #[test]
    fn test_reader_pretty_printed_document() {
        let input = r#"
            {
              "catalog" : [
                {"id": "x/tables/1", "properties": {"name": "a"}},
                {"id": "x/measures/2", "annotations": {"tags": [{"properties": {"tag": "}"}}]}}
              ]
            }
        "#;

        let assets = read_all(input).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].view_type(), Some("tables"));
        assert_eq!(assets[1].id(), Some("x/measures/2"));
    }

    #[test]
    fn test_reader_empty_catalog() {
        assert!(read_all(r#"{"catalog":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn test_reader_skips_bom() {
        let input = "\u{feff}{\"catalog\":[{\"id\":\"a/b/c\"}]}";
        assert_eq!(read_all(input).unwrap().len(), 1);
    }

    #[test]
    fn test_reader_rejects_structural_errors() {
        let cases = [
            ("", "end of input"),
            ("[]", "found '['"),
            (r#"{"assets":[]}"#, "\"assets\""),
            (r#"{"catalog":{}}"#, "'['"),
            (r#"{"catalog":[1]}"#, "element 0"),
            (r#"{"catalog":[{"id":"a"} {"id":"b"}]}"#, "',' or ']'"),
            (r#"{"catalog":[{"id":"a"},]}"#, "element 1"),
            (r#"{"catalog":[{"id":"a"}"#, "end of input"),
            (r#"{"catalog":[],"extra":1}"#, "'}'"),
            (r#"{"catalog":[]} trailing"#, "after the document"),
        ];

        for (input, fragment) in cases {
            match read_all(input) {
                Err(Error::MalformedDocument(message)) => assert!(
                    message.contains(fragment),
                    "input {input:?}: message {message:?} lacks {fragment:?}"
                ),
                other => panic!("input {input:?}: expected malformed document, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_header_checked_before_first_asset() {
        let mut reader = CatalogDocumentReader::new(Cursor::new(r#"{"other":[{"id":"a/b/c"}]}"#));
        assert!(reader.next().is_err());
        assert_eq!(reader.elements_read(), 0);
    }

    #[test]
    fn test_writer_reader_agree() {
        let originals = vec![
            asset(json!({"id": "h/views/tables/1", "properties": {"name": "ünïcode \"quoted\""}})),
            asset(json!({"id": "h/views/tables/2", "annotations": {"tags": []}})),
        ];

        let mut writer = CatalogDocumentWriter::new(Vec::new());
        for a in &originals {
            writer.write(a).unwrap();
        }
        writer.finalize().unwrap();
        let bytes = writer.into_inner();

        let mut reader = CatalogDocumentReader::new(Cursor::new(bytes));
        let mut read = Vec::new();
        while let Some(a) = reader.next().unwrap() {
            read.push(a);
        }
        assert_eq!(read, originals);
    }
}
