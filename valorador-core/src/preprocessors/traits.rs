// Preprocessor abstraction for document reading
//
// This module defines the boundary between document reading (bytes -> raw text)
// and the scoring core (raw text -> ScoreReport). Everything after this point
// works on plain text and is format-agnostic.

use crate::error::ReaderError;
use crate::types::SourceKind;
use std::path::Path;

/// Preprocessor trait - converts document bytes to raw text
///
/// Implementations handle one document format each. They never normalize;
/// the pipeline applies the normalizer to whatever comes out.
pub trait Preprocessor {
    /// Extract the document's text content
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ReaderError>;

    /// Source kind label recorded in the report
    fn source_kind(&self) -> SourceKind;

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}

/// Lower-cased extension of `path`, if any.
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
