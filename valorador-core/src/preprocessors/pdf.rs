use super::traits::{extension_of, Preprocessor};
use crate::error::ReaderError;
use crate::types::SourceKind;
use std::path::Path;

/// PDF text extraction via `pdf-extract`, available with the `pdf` feature.
///
/// Without the feature the reader still claims `.pdf` files so the caller
/// gets [`ReaderError::MissingCapability`] instead of a raw-text fallback.
pub struct PdfPreprocessor;

impl PdfPreprocessor {
    pub fn is_available() -> bool {
        cfg!(feature = "pdf")
    }
}

impl Preprocessor for PdfPreprocessor {
    #[cfg(feature = "pdf")]
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ReaderError> {
        // pdf-extract panics on some malformed inputs
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(result) => result.map_err(|e| ReaderError::extraction("PDF", e)),
            Err(_) => Err(ReaderError::extraction("PDF", "parser aborted on malformed input")),
        }
    }

    #[cfg(not(feature = "pdf"))]
    fn extract_text(&self, _bytes: &[u8]) -> Result<String, ReaderError> {
        Err(ReaderError::MissingCapability { capability: "PDF" })
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::Pdf
    }

    fn name(&self) -> &str {
        "PdfPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| ext == "pdf")
    }
}
