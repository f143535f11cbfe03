//! Typed errors for the two fallible boundaries of the library: loading a
//! valorador configuration and reading a source document.
//!
//! Everything between those boundaries (normalize, detect, score) is total.
//! A detector that finds nothing contributes zero units and never errors.

use std::path::PathBuf;
use thiserror::Error;

/// Years accepted as `reference_year`.
pub const REFERENCE_YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Raised while loading or validating a [`crate::ValoradorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("rubric key '{0}' must have the form <section>:<item>")]
    MalformedKey(String),

    #[error("rubric key '{0}' is declared more than once")]
    DuplicateItem(String),

    #[error("rubric item '{key}' has a negative {field}")]
    NegativePoints { key: String, field: &'static str },

    #[error("rubric item '{0}' has no detector")]
    MissingDetector(String),

    #[error("{scope} limit for '{name}' must be a finite, non-negative number (got {value})")]
    InvalidLimit {
        scope: &'static str,
        name: String,
        value: f64,
    },

    #[error("reference year {0} is outside 1900..=2100")]
    ReferenceYearOutOfRange(i32),

    #[error("detector '{0}' does not score any rubric item")]
    OrphanDetector(String),

    #[error("detector '{0}' is registered more than once")]
    DuplicateDetector(String),

    #[error("detector '{0}' declares no signals")]
    EmptyDetector(String),

    #[error("section '{section}' belongs to both block '{first}' and block '{second}'")]
    SectionInMultipleBlocks {
        section: String,
        first: String,
        second: String,
    },

    #[error("section '{0}' is not assigned to any block")]
    SectionWithoutBlock(String),

    #[error("block '{block}' lists unknown section '{section}'")]
    UnknownBlockSection { block: String, section: String },

    #[error("detector '{key}' has an invalid pattern: {source}")]
    InvalidPattern {
        key: String,
        #[source]
        source: regex::Error,
    },
}

/// Raised by the document readers before any text reaches the scoring core.
///
/// The variants are kept distinct so a front-end can tell "convert your file"
/// apart from "this build cannot read PDFs" apart from a genuine failure.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("unsupported document format '.{extension}': {hint}")]
    UnsupportedFormat {
        extension: String,
        hint: &'static str,
    },

    #[error("{capability} support is not available in this build; upload the CV as .docx or .txt instead")]
    MissingCapability { capability: &'static str },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract text from {kind} document: {message}")]
    Extraction { kind: &'static str, message: String },
}

impl ReaderError {
    pub(crate) fn extraction(kind: &'static str, err: impl std::fmt::Display) -> Self {
        ReaderError::Extraction {
            kind,
            message: err.to_string(),
        }
    }
}
