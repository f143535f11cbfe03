//! DOCX reader.
//!
//! A `.docx` file is a zip archive; the body lives in `word/document.xml`.
//! We stream that part with quick-xml and keep only the text runs. Paragraphs
//! end a line; inside tables, cells are tab-separated and each row is one
//! line, so a role and its dates in the same row stay on the same line.

use super::traits::{extension_of, Preprocessor};
use crate::error::ReaderError;
use crate::types::SourceKind;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";

pub struct DocxPreprocessor;

impl DocxPreprocessor {
    /// Text of a WordprocessingML body.
    pub fn text_from_document_xml(xml: &str) -> Result<String, ReaderError> {
        let mut reader = Reader::from_str(xml);
        let mut text = String::with_capacity(xml.len() / 4);
        let mut in_text_run = false;
        let mut cell_depth = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"w:t" => in_text_run = true,
                    b"w:tc" => cell_depth += 1,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"w:tab" => text.push('\t'),
                    b"w:br" | b"w:cr" => text.push('\n'),
                    _ => {}
                },
                Ok(Event::Text(t)) if in_text_run => {
                    let unescaped = t
                        .unescape()
                        .map_err(|e| ReaderError::extraction("DOCX", e))?;
                    text.push_str(&unescaped);
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"w:t" => in_text_run = false,
                    b"w:p" if cell_depth > 0 => text.push(' '),
                    b"w:p" | b"w:tr" => text.push('\n'),
                    b"w:tc" => {
                        cell_depth = cell_depth.saturating_sub(1);
                        text.push('\t');
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(ReaderError::extraction("DOCX", e)),
                _ => {}
            }
        }

        Ok(text)
    }
}

impl Preprocessor for DocxPreprocessor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ReaderError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ReaderError::extraction("DOCX", e))?;
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| ReaderError::extraction("DOCX", e))?;

        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| ReaderError::extraction("DOCX", e))?;
        tracing::debug!(xml_bytes = xml.len(), "read {}", DOCUMENT_PART);

        Self::text_from_document_xml(&xml)
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::Docx
    }

    fn name(&self) -> &str {
        "DocxPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| ext == "docx")
    }
}
