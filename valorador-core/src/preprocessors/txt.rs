use super::traits::{extension_of, Preprocessor};
use crate::error::ReaderError;
use crate::types::SourceKind;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Plain text files. UTF-8 with or without BOM; anything that is not valid
/// UTF-8 is read as Latin-1, which never fails.
pub struct TxtPreprocessor;

impl TxtPreprocessor {
    pub fn decode(bytes: &[u8]) -> String {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => {
                tracing::debug!("input is not valid UTF-8, decoding as Latin-1");
                bytes.iter().map(|&b| char::from(b)).collect()
            }
        }
    }
}

impl Preprocessor for TxtPreprocessor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ReaderError> {
        Ok(Self::decode(bytes))
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::Txt
    }

    fn name(&self) -> &str {
        "TxtPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| ext == "txt")
    }
}
