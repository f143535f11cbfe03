use super::window::{compile_pattern, step_back, step_forward, ContextWindow};
use super::years::{range_on_line, span};
use super::{Combine, DetectorRule, SignalMode, SignalRule};
use crate::config::ValoradorConfig;
use crate::error::ConfigError;
use crate::types::{DetectionResult, NormalizedText};
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeSet;

const EVIDENCE_CONTEXT_CHARS: usize = 40;
const MAX_SNIPPETS_PER_KEY: usize = 5;

/// Matched text backing a non-zero detection, for human review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evidence {
    pub key: String,
    pub units: u32,
    pub snippets: Vec<String>,
}

/// Compiled detector registry. Immutable after construction, so one bank can
/// score any number of documents, from any number of threads.
#[derive(Debug, Clone)]
pub struct DetectorBank {
    detectors: Vec<CompiledDetector>,
    reference_year: i32,
}

#[derive(Debug, Clone)]
struct CompiledDetector {
    key: String,
    combine: Combine,
    signals: Vec<CompiledSignal>,
}

#[derive(Debug, Clone)]
struct CompiledSignal {
    mode: SignalMode,
    pattern: Regex,
    window: Option<ContextWindow>,
    subtract: Option<Regex>,
}

impl DetectorBank {
    pub fn compile(rules: &[DetectorRule], reference_year: i32) -> Result<Self, ConfigError> {
        let mut seen = BTreeSet::new();
        let mut detectors = Vec::with_capacity(rules.len());

        for rule in rules {
            if !seen.insert(rule.key.as_str()) {
                return Err(ConfigError::DuplicateDetector(rule.key.clone()));
            }
            if rule.signals.is_empty() {
                return Err(ConfigError::EmptyDetector(rule.key.clone()));
            }
            let signals = rule
                .signals
                .iter()
                .map(|signal| CompiledSignal::compile(&rule.key, signal))
                .collect::<Result<Vec<_>, _>>()?;
            detectors.push(CompiledDetector {
                key: rule.key.clone(),
                combine: rule.combine,
                signals,
            });
        }

        tracing::debug!(detectors = detectors.len(), "compiled detector bank");
        Ok(Self {
            detectors,
            reference_year,
        })
    }

    pub fn from_config(config: &ValoradorConfig) -> Result<Self, ConfigError> {
        Self::compile(&config.detectors, config.reference_year)
    }

    /// Run every detector independently. Every registered key gets an entry.
    pub fn detect(&self, text: &NormalizedText) -> DetectionResult {
        self.detectors
            .iter()
            .map(|detector| {
                let units = detector.detect(text.as_str(), self.reference_year);
                if units > 0 {
                    tracing::debug!(key = %detector.key, units, "detector matched");
                }
                (detector.key.clone(), units)
            })
            .collect()
    }

    /// Units plus matched snippets for every detector that found something.
    pub fn explain(&self, text: &NormalizedText) -> Vec<Evidence> {
        let text = text.as_str();
        self.detectors
            .iter()
            .filter_map(|detector| {
                let units = detector.detect(text, self.reference_year);
                if units == 0 {
                    return None;
                }
                let snippets = detector
                    .signals
                    .iter()
                    .flat_map(|signal| signal.qualifying(text).map(|caps| caps.get(0)))
                    .flatten()
                    .map(|m| snippet(text, m.start(), m.end()))
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .take(MAX_SNIPPETS_PER_KEY)
                    .collect();
                Some(Evidence {
                    key: detector.key.clone(),
                    units,
                    snippets,
                })
            })
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.detectors.iter().map(|d| d.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl CompiledDetector {
    fn detect(&self, text: &str, reference_year: i32) -> u32 {
        let mut values = self
            .signals
            .iter()
            .map(|signal| signal.evaluate(text, reference_year));
        match self.combine {
            Combine::Fallback => values.find(|&units| units > 0).unwrap_or(0),
            Combine::Max => values.max().unwrap_or(0),
        }
    }
}

impl CompiledSignal {
    fn compile(key: &str, rule: &SignalRule) -> Result<Self, ConfigError> {
        Ok(Self {
            mode: rule.mode,
            pattern: compile_pattern(key, &rule.pattern)?,
            window: rule
                .window
                .as_ref()
                .map(|w| ContextWindow::compile(key, w))
                .transpose()?,
            subtract: rule
                .subtract
                .as_deref()
                .map(|p| compile_pattern(key, p))
                .transpose()?,
        })
    }

    /// Matches that pass the context window, if any.
    fn qualifying<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Captures<'t>> + 't {
        self.pattern.captures_iter(text).filter(move |caps| {
            match (&self.window, caps.get(0)) {
                (Some(window), Some(whole)) => window.allows(text, whole.start(), whole.end()),
                _ => true,
            }
        })
    }

    fn evaluate(&self, text: &str, reference_year: i32) -> u32 {
        if text.is_empty() {
            return 0;
        }

        let units = match self.mode {
            SignalMode::Has => u32::from(self.qualifying(text).next().is_some()),
            SignalMode::Count => saturate(self.qualifying(text).count()),
            SignalMode::Num => self
                .qualifying(text)
                .next()
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().trim().parse::<u32>().ok())
                .unwrap_or(0),
            SignalMode::Distinct => {
                let identities: BTreeSet<String> = self
                    .qualifying(text)
                    .map(|caps| identity(&caps))
                    .filter(|id| !id.is_empty())
                    .collect();
                saturate(identities.len())
            }
            SignalMode::Years => {
                let ranges: BTreeSet<(i32, i32)> = self
                    .qualifying(text)
                    .filter_map(|caps| {
                        let whole = caps.get(0)?;
                        range_on_line(text, whole.start(), reference_year)
                    })
                    .collect();
                ranges
                    .into_iter()
                    .map(span)
                    .fold(0u32, |acc, years| acc.saturating_add(years))
            }
        };

        match &self.subtract {
            Some(subtract) => units.saturating_sub(saturate(subtract.find_iter(text).count())),
            None => units,
        }
    }
}

fn identity(caps: &Captures<'_>) -> String {
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str().chars().filter(|c| c.is_alphanumeric()).collect())
        .unwrap_or_default()
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn snippet(text: &str, start: usize, end: usize) -> String {
    let lo = step_back(text, start, EVIDENCE_CONTEXT_CHARS);
    let hi = step_forward(text, end, EVIDENCE_CONTEXT_CHARS);
    text[lo..hi].replace('\n', " / ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::{count, distinct, has, num, years};
    use super::*;
    use crate::normalizer::normalize;

    fn units(rule: DetectorRule, raw: &str) -> u32 {
        let bank = DetectorBank::compile(&[rule.clone()], 2024).unwrap();
        bank.detect(&normalize(raw)).units(&rule.key)
    }

    #[test]
    fn has_is_zero_or_one() {
        let rule = DetectorRule::single("gestion:rector", has(r"\brector(?:a)?\b"));
        assert_eq!(units(rule.clone(), "Rector 2010. Rectora 2014."), 1);
        assert_eq!(units(rule, "Vicerrector de extensión"), 0);
    }

    #[test]
    fn count_is_non_overlapping() {
        let rule = DetectorRule::single("formacion:diplomatura", count(r"\bdiplomatura\b"));
        assert_eq!(units(rule, "Diplomatura A. Diplomatura B. Diplomatura C."), 3);
    }

    #[test]
    fn num_falls_back_to_count_when_unquantified() {
        let rule = DetectorRule::fallback(
            "ciencia:dir_grado",
            vec![
                num(r"direccion de (\d+) tesis de grado"),
                count(r"\bdirector(?:a)? de tesis de grado\b"),
            ],
        );
        assert_eq!(units(rule.clone(), "Dirección de 7 tesis de grado"), 7);
        assert_eq!(
            units(rule, "Director de tesis de grado (2019). Director de tesis de grado (2021)."),
            2
        );
    }

    #[test]
    fn max_never_sums_two_phrasings() {
        let rule = DetectorRule::max(
            "eval:eval_revistas",
            vec![count(r"\brevisor(?:a)?\b"), num(r"evaluador(?:a)? de (\d+) revistas")],
        );
        assert_eq!(units(rule.clone(), "Revisor. Revisora. Evaluador de 5 revistas."), 5);
        assert_eq!(units(rule, "Revisor. Revisora. Revisor. Evaluador de 2 revistas."), 3);
    }

    #[test]
    fn distinct_deduplicates_identifiers() {
        let rule = DetectorRule::single(
            "pubs:libros",
            distinct(r"\bisbn[\s:]*([0-9][0-9\s-]{8,16}[0-9x])"),
        );
        let text = "ISBN 978-950-34-0001-2. ISBN: 9789503400012. ISBN 978-987-1-2345-6";
        assert_eq!(units(rule, text), 2);
    }

    #[test]
    fn years_sums_distinct_ranges() {
        let rule = DetectorRule::single("docencia:adjunto", years(r"\badjunt[oa]\b"));
        let text = "Profesor adjunto 2010-2014\nProfesor adjunto 2010-2014\nAdjunto 2020 a la actualidad";
        assert_eq!(units(rule, text), 8);
    }

    #[test]
    fn years_saturate_instead_of_overflowing() {
        let bank = DetectorBank::compile(
            &[DetectorRule::single("docencia:adjunto", years(r"\badjunt[oa]\b"))],
            i32::MAX,
        )
        .unwrap();
        let text = normalize(
            "Adjunto 2001 a la actualidad\nAdjunto 2002 a la actualidad\nAdjunto 2003 a la actualidad",
        );
        assert_eq!(bank.detect(&text).units("docencia:adjunto"), u32::MAX);
    }

    #[test]
    fn subtraction_is_floored_at_zero() {
        let rule = DetectorRule::single(
            "pubs:sin_referato",
            count(r"\barticulo\b").minus(r"\bcon referato\b"),
        );
        assert_eq!(units(rule.clone(), "articulo. articulo. articulo con referato"), 2);
        assert_eq!(units(rule, "articulo con referato, con referato, con referato"), 0);
    }

    #[test]
    fn windowed_signal_filters_matches() {
        let rule = DetectorRule::single(
            "formacion:doctorado",
            has(r"\bdoctorado\b")
                .within(60)
                .requiring(&[r"\buniversidad\b"])
                .excluding_before(&[r"\bdirector(?:a)? de\b"]),
        );
        assert_eq!(units(rule.clone(), "Director de tesis de doctorado, Universidad X"), 0);
        assert_eq!(units(rule, "Doctorado en Letras, Universidad Nacional de Córdoba"), 1);
    }

    #[test]
    fn every_key_has_an_entry_even_without_matches() {
        let bank = DetectorBank::compile(
            &[
                DetectorRule::single("a:x", has("x")),
                DetectorRule::single("a:y", count("y")),
            ],
            2024,
        )
        .unwrap();
        let detections = bank.detect(&normalize(""));
        assert_eq!(detections.len(), 2);
        assert!(detections.iter().all(|(_, units)| units == 0));
    }

    #[test]
    fn duplicate_and_invalid_rules_are_rejected() {
        let dup = DetectorBank::compile(
            &[
                DetectorRule::single("a:x", has("x")),
                DetectorRule::single("a:x", has("y")),
            ],
            2024,
        );
        assert!(matches!(dup, Err(ConfigError::DuplicateDetector(key)) if key == "a:x"));

        let invalid = DetectorBank::compile(&[DetectorRule::single("a:x", has("(unclosed"))], 2024);
        assert!(matches!(invalid, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn explain_reports_snippets_for_matches() {
        let bank =
            DetectorBank::compile(&[DetectorRule::single("gestion:rector", has(r"\brector\b"))], 2024)
                .unwrap();
        let evidence = bank.explain(&normalize("Fue Rector de la UNC entre 2010 y 2014"));
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].units, 1);
        assert!(evidence[0].snippets[0].contains("rector de la unc"));
    }
}
