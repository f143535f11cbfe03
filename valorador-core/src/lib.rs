// Valorador Core Library
//
// Scores an academic CV against the researcher-category valuation rubric.
// Pipeline: document reader → normalizer → detector bank → scoring engine,
// with exporters for the resulting ScoreReport.

pub mod config;
pub mod error;
pub mod export;
pub mod normalizer;
pub mod preprocessors;
pub mod processor;
pub mod rubric;
pub mod rules;
pub mod scoring;
pub mod types;

// Re-export main types and functions for easy use
pub use config::{BlockConfig, ValoradorConfig};
pub use error::{ConfigError, ReaderError};
pub use export::ReportMeta;
pub use normalizer::normalize;
pub use preprocessors::{DocumentReader, Preprocessor};
pub use processor::{DocumentProcessor, PipelineStages, StepProfiler};
pub use rules::{DetectorBank, DetectorRule, Evidence};
pub use scoring::ScoringEngine;
pub use types::*;
