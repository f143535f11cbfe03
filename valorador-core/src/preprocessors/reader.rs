//! Extension-based dispatch over the format readers.

use super::docx::DocxPreprocessor;
use super::pdf::PdfPreprocessor;
use super::traits::{extension_of, Preprocessor};
use super::txt::TxtPreprocessor;
use crate::error::ReaderError;
use crate::types::{DocumentText, SourceKind};
use sha2::{Digest, Sha256};
use std::path::Path;

const DOC_HINT: &str = "legacy Word .doc files are not supported; save the CV as .docx or .txt and upload it again";

pub struct DocumentReader {
    preprocessors: Vec<Box<dyn Preprocessor + Send + Sync>>,
}

impl Default for DocumentReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentReader {
    pub fn new() -> Self {
        Self {
            preprocessors: vec![
                Box::new(TxtPreprocessor),
                Box::new(DocxPreprocessor),
                Box::new(PdfPreprocessor),
            ],
        }
    }

    pub fn read(&self, path: &Path) -> Result<DocumentText, ReaderError> {
        // reject before touching the file
        self.check_supported(path)?;
        let bytes = std::fs::read(path).map_err(|source| ReaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract(path, &bytes)
    }

    /// Read already-loaded bytes; `path` is only used for its extension.
    pub fn read_bytes(&self, path: &Path, bytes: &[u8]) -> Result<DocumentText, ReaderError> {
        self.check_supported(path)?;
        self.extract(path, bytes)
    }

    fn extract(&self, path: &Path, bytes: &[u8]) -> Result<DocumentText, ReaderError> {
        let (text, source_kind) = match self.preprocessor_for(path) {
            Some(preprocessor) => {
                tracing::debug!(reader = preprocessor.name(), "extracting text");
                (preprocessor.extract_text(bytes)?, preprocessor.source_kind())
            }
            None => {
                tracing::debug!(path = %path.display(), "unknown extension, decoding as raw text");
                (TxtPreprocessor::decode(bytes), SourceKind::Raw)
            }
        };

        tracing::info!(
            kind = %source_kind,
            bytes = bytes.len(),
            characters = text.chars().count(),
            "document read"
        );
        Ok(DocumentText {
            text,
            source_kind,
            byte_len: bytes.len(),
            fingerprint: fingerprint(bytes),
        })
    }

    fn check_supported(&self, path: &Path) -> Result<(), ReaderError> {
        match extension_of(path).as_deref() {
            Some("doc") => Err(ReaderError::UnsupportedFormat {
                extension: "doc".to_string(),
                hint: DOC_HINT,
            }),
            _ => Ok(()),
        }
    }

    fn preprocessor_for(&self, path: &Path) -> Option<&(dyn Preprocessor + Send + Sync)> {
        self.preprocessors
            .iter()
            .find(|p| p.supports_file_type(path))
            .map(|p| p.as_ref())
    }
}

/// SHA-256 of the source bytes, hex encoded.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn legacy_doc_is_rejected_with_a_hint() {
        let err = DocumentReader::new()
            .read(Path::new("/does/not/matter/cv.DOC"))
            .unwrap_err();
        match err {
            ReaderError::UnsupportedFormat { extension, hint } => {
                assert_eq!(extension, "doc");
                assert!(hint.contains(".docx"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn legacy_doc_bytes_are_rejected_too() {
        let err = DocumentReader::new()
            .read_bytes(Path::new("cv.doc"), b"\xd0\xcf\x11\xe0")
            .unwrap_err();
        assert!(matches!(err, ReaderError::UnsupportedFormat { .. }));
    }

    #[test]
    fn unknown_extension_is_read_as_raw_text() {
        let doc = DocumentReader::new()
            .read_bytes(Path::new("cv.md"), "# Doctorado".as_bytes())
            .unwrap();
        assert_eq!(doc.source_kind, SourceKind::Raw);
        assert_eq!(doc.text, "# Doctorado");
    }

    #[test]
    fn txt_file_is_read_and_fingerprinted() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Profesor adjunto 2010-2014").unwrap();

        let doc = DocumentReader::new().read(file.path()).unwrap();
        assert_eq!(doc.source_kind, SourceKind::Txt);
        assert_eq!(doc.byte_len, 26);
        assert_eq!(doc.fingerprint, fingerprint(b"Profesor adjunto 2010-2014"));
        assert_eq!(doc.fingerprint.len(), 64);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = DocumentReader::new()
            .read(Path::new("/no/such/cv.txt"))
            .unwrap_err();
        assert!(matches!(err, ReaderError::Io { .. }));
    }
}
