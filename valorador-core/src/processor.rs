use crate::config::ValoradorConfig;
use crate::normalizer::normalize;
use crate::preprocessors::DocumentReader;
use crate::rules::{DetectorBank, Evidence};
use crate::scoring::ScoringEngine;
use crate::types::*;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::{Duration, Instant};

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and diagnostics to inspect each boundary
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineStages {
    pub source: SourceInfo,
    pub raw_text: String,
    pub normalized: NormalizedText,
    pub detections: DetectionResult,
    pub evidence: Vec<Evidence>,
    pub report: ScoreReport,
}

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        tracing::info!(step = step_name, elapsed_ms = elapsed.as_millis() as u64, "pipeline step");
        self.timings.push((step_name.to_string(), elapsed));

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    /// Per-step table with share of total time; empty when disabled.
    pub fn summary(&self) -> String {
        if !self.enabled || self.timings.is_empty() {
            return String::new();
        }

        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();
        let mut out = String::new();
        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            out.push_str(&format!(
                "   {:.<35} {:.2}ms ({:.1}%)\n",
                step,
                duration.as_secs_f64() * 1000.0,
                percentage
            ));
        }
        out.push_str(&format!(
            "   {:.<35} {:.2}ms\n",
            "Total",
            total.as_secs_f64() * 1000.0
        ));
        out
    }
}

/// Normalize → detect → score, plus file reading in front.
///
/// Holds only immutable state after construction, so a single processor can
/// score many documents (also concurrently behind an `Arc`).
pub struct DocumentProcessor {
    config: ValoradorConfig,
    bank: DetectorBank,
    engine: ScoringEngine,
    reader: DocumentReader,
}

impl DocumentProcessor {
    pub fn new(config: ValoradorConfig) -> Result<Self> {
        let engine = ScoringEngine::new(&config).context("invalid valorador configuration")?;
        let bank = DetectorBank::from_config(&config).context("failed to compile detectors")?;
        tracing::debug!(
            items = config.rubric.len(),
            detectors = bank.len(),
            reference_year = config.reference_year,
            "document processor ready"
        );
        Ok(Self {
            config,
            bank,
            engine,
            reader: DocumentReader::new(),
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(ValoradorConfig::default())
    }

    pub fn config(&self) -> &ValoradorConfig {
        &self.config
    }

    pub fn bank(&self) -> &DetectorBank {
        &self.bank
    }

    /// Score already-extracted text.
    pub fn score_text(&self, raw: &str) -> ScoreReport {
        self.score_text_with_profiler(raw, &mut StepProfiler::new(false))
    }

    pub fn score_text_with_profiler(&self, raw: &str, profiler: &mut StepProfiler) -> ScoreReport {
        let normalized = profiler.time_step("Normalize", || normalize(raw));
        let detections = profiler.time_step("Detect", || self.bank.detect(&normalized));
        profiler.time_step("Score", || self.engine.score(&detections))
    }

    /// Matched snippets per detected item, for reviewing a score.
    pub fn explain(&self, raw: &str) -> Vec<Evidence> {
        self.bank.explain(&normalize(raw))
    }

    /// Read and score a CV file. Reader failures keep their [`crate::ReaderError`]
    /// type inside the `anyhow` chain, so callers can `downcast_ref` them.
    pub fn process_file(&self, path: &Path) -> Result<ScoreReport> {
        self.process_file_with_profiler(path, &mut StepProfiler::new(false))
    }

    pub fn process_file_with_profiler(
        &self,
        path: &Path,
        profiler: &mut StepProfiler,
    ) -> Result<ScoreReport> {
        let document = profiler.time_step("Read document", || self.read(path))?;
        let mut report = self.score_text_with_profiler(&document.text, profiler);
        report.source = Some(source_info(path, &document));
        Ok(report)
    }

    /// Run the pipeline keeping every intermediate for `--dump-stages`.
    pub fn process_file_capture_stages(&self, path: &Path) -> Result<PipelineStages> {
        self.process_file_capture_stages_with_profiler(path, &mut StepProfiler::new(false))
    }

    pub fn process_file_capture_stages_with_profiler(
        &self,
        path: &Path,
        profiler: &mut StepProfiler,
    ) -> Result<PipelineStages> {
        let document = profiler.time_step("Read document", || self.read(path))?;
        let source = source_info(path, &document);

        let normalized = profiler.time_step("Normalize", || normalize(&document.text));
        let detections = profiler.time_step("Detect", || self.bank.detect(&normalized));
        let evidence = profiler.time_step("Explain", || self.bank.explain(&normalized));
        let mut report = profiler.time_step("Score", || self.engine.score(&detections));
        report.source = Some(source.clone());

        tracing::info!(
            detected = detections.iter().filter(|(_, units)| *units > 0).count(),
            grand_total = report.grand_total,
            "captured pipeline stages"
        );
        Ok(PipelineStages {
            source,
            raw_text: document.text,
            normalized,
            detections,
            evidence,
            report,
        })
    }

    fn read(&self, path: &Path) -> Result<DocumentText> {
        self.reader
            .read(path)
            .with_context(|| format!("failed to read CV {}", path.display()))
    }
}

fn source_info(path: &Path, document: &DocumentText) -> SourceInfo {
    SourceInfo {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        kind: document.source_kind,
        characters: document.text.chars().count(),
        fingerprint: document.fingerprint.clone(),
    }
}
