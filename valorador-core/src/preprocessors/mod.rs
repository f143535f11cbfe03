//! Document Preprocessors
//!
//! This module provides the reading layer that turns an uploaded CV into raw
//! text for the scoring core.
//!
//! ## Architecture
//!
//! ```text
//! Document (TXT, DOCX, PDF, other)
//!     ↓
//! [DocumentReader: dispatch by extension]
//!     ↓
//! [Format-specific Preprocessor]
//!     ↓
//! DocumentText (raw text + source kind + fingerprint)
//!     ↓
//! [Normalizer → DetectorBank → ScoringEngine]
//! ```
//!
//! ## Available Preprocessors
//!
//! - `TxtPreprocessor` - plain text, UTF-8 or Latin-1
//! - `DocxPreprocessor` - Word documents (zip + WordprocessingML)
//! - `PdfPreprocessor` - PDF via pdf-extract (`pdf` feature)
//!
//! Legacy `.doc` files are rejected up front; any other extension is decoded
//! as raw text.

pub mod docx;
pub mod pdf;
pub mod reader;
pub mod traits;
pub mod txt;

// Re-export main types
pub use docx::DocxPreprocessor;
pub use pdf::PdfPreprocessor;
pub use reader::{fingerprint, DocumentReader};
pub use traits::Preprocessor;
pub use txt::TxtPreprocessor;
