//! Scoring engine: detected units to capped item, section, block and grand
//! totals.
//!
//! The engine is a pure reduction over a [`DetectionResult`]. Sums are taken
//! in key order, so the report does not depend on the order rubric rows were
//! declared in.

use crate::config::{BlockConfig, ValoradorConfig};
use crate::error::ConfigError;
use crate::types::{
    section_of, BlockTotal, DetectionResult, RubricItem, ScoreReport, ScoredItem, SectionTotal,
    SCHEMA_VERSION,
};
use std::collections::BTreeMap;

/// `(raw, capped)` points for `units` of one rubric item.
pub fn score_item(units: u32, item: &RubricItem) -> (f64, f64) {
    let raw = f64::from(units) * item.points_per_unit;
    (raw, raw.min(item.max_points))
}

fn clamp(value: f64, limit: Option<f64>) -> f64 {
    match limit {
        Some(limit) => value.min(limit),
        None => value,
    }
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    rubric: Vec<RubricItem>,
    section_limits: BTreeMap<String, f64>,
    blocks: Vec<BlockConfig>,
}

impl ScoringEngine {
    pub fn new(config: &ValoradorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rubric: config.rubric.clone(),
            section_limits: config.section_limits.clone(),
            blocks: config.blocks.clone(),
        })
    }

    pub fn score(&self, detections: &DetectionResult) -> ScoreReport {
        let items: Vec<ScoredItem> = self
            .rubric
            .iter()
            .map(|item| {
                let units = detections.units(&item.key);
                let (raw_points, capped_points) = score_item(units, item);
                ScoredItem {
                    key: item.key.clone(),
                    label: item.label.clone(),
                    section: item.section().to_string(),
                    units,
                    points_per_unit: item.points_per_unit,
                    raw_points,
                    max_points: item.max_points,
                    capped_points,
                }
            })
            .collect();

        for (key, units) in detections.iter() {
            if units > 0 && !items.iter().any(|item| item.key == key) {
                tracing::debug!(key, units, "ignoring detection without rubric item");
            }
        }

        let sections = self.section_totals(&items);
        let blocks = self.block_totals(&sections);

        let mut by_name: Vec<&BlockTotal> = blocks.iter().collect();
        by_name.sort_by(|a, b| a.name.cmp(&b.name));
        let grand_total: f64 = by_name.iter().map(|block| block.total).sum();

        tracing::info!(grand_total, "scored document");
        ScoreReport {
            schema_version: SCHEMA_VERSION.to_string(),
            source: None,
            items,
            sections,
            blocks,
            grand_total,
        }
    }

    fn section_totals(&self, items: &[ScoredItem]) -> Vec<SectionTotal> {
        let mut by_key: Vec<&ScoredItem> = items.iter().collect();
        by_key.sort_by(|a, b| a.key.cmp(&b.key));

        let mut raw: BTreeMap<&str, f64> = BTreeMap::new();
        for item in by_key {
            *raw.entry(section_of(&item.key)).or_default() += item.capped_points;
        }

        // presentation order follows the rubric
        let mut order: Vec<&str> = Vec::new();
        for item in &self.rubric {
            let section = item.section();
            if !order.contains(&section) {
                order.push(section);
            }
        }

        order
            .into_iter()
            .map(|section| {
                let raw = raw.get(section).copied().unwrap_or(0.0);
                let limit = self.section_limits.get(section).copied();
                SectionTotal {
                    section: section.to_string(),
                    raw,
                    limit,
                    total: clamp(raw, limit),
                }
            })
            .collect()
    }

    fn block_totals(&self, sections: &[SectionTotal]) -> Vec<BlockTotal> {
        self.blocks
            .iter()
            .map(|block| {
                let mut members: Vec<&String> = block.sections.iter().collect();
                members.sort();
                let raw: f64 = members
                    .into_iter()
                    .filter_map(|name| sections.iter().find(|s| &s.section == name))
                    .map(|s| s.total)
                    .sum();
                BlockTotal {
                    name: block.name.clone(),
                    label: block.label.clone(),
                    sections: block.sections.clone(),
                    raw,
                    limit: block.limit,
                    total: clamp(raw, block.limit),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TOTAL_GENERAL;
    use proptest::prelude::*;
    use std::sync::LazyLock;

    // compiling the built-in bank dominates a property case, so build it once
    static BUILTIN: LazyLock<ScoringEngine> =
        LazyLock::new(|| ScoringEngine::new(&ValoradorConfig::default()).unwrap());

    fn engine() -> &'static ScoringEngine {
        &BUILTIN
    }

    fn detections(pairs: &[(&str, u32)]) -> DetectionResult {
        pairs.iter().map(|&(k, u)| (k, u)).collect()
    }

    // ============================================================================
    // ITEM CAPS
    // ============================================================================

    #[test]
    fn doctorate_is_capped_per_item() {
        let doctorado = RubricItem::new("formacion:doctorado", "Doctorado acreditado", 250.0, 375.0);
        assert_eq!(score_item(1, &doctorado), (250.0, 250.0));
        assert_eq!(score_item(2, &doctorado), (500.0, 375.0));
        assert_eq!(score_item(0, &doctorado), (0.0, 0.0));
    }

    #[test]
    fn missing_detection_scores_zero() {
        let report = engine().score(&DetectionResult::new());
        assert_eq!(report.items.len(), 54);
        assert!(report.items.iter().all(|item| item.capped_points == 0.0));
        assert_eq!(report.grand_total, 0.0);
    }

    // ============================================================================
    // SECTION AND BLOCK CAPS
    // ============================================================================

    #[test]
    fn section_total_is_clamped_to_its_limit() {
        // 250 + 150 + 50 = 450 before the 400 limit
        let report = engine().score(&detections(&[
            ("formacion:doctorado", 1),
            ("formacion:maestria", 1),
            ("formacion:diplomatura", 1),
        ]));
        let formacion = report.section("formacion").unwrap();
        assert_eq!(formacion.raw, 450.0);
        assert_eq!(formacion.limit, Some(400.0));
        assert_eq!(formacion.total, 400.0);
        assert_eq!(report.block("2:Formacion_total").unwrap().total, 400.0);
    }

    #[test]
    fn block_total_is_clamped_before_grand_total() {
        // pubs 300 (clamped from 390), desarrollos 100 (from 120), servicios 40
        let report = engine().score(&detections(&[
            ("pubs:con_referato", 7),
            ("pubs:sin_referato", 8),
            ("pubs:libros", 2),
            ("pubs:capitulos", 3),
            ("pubs:documentos", 3),
            ("desarrollos:software_patente", 2),
            ("desarrollos:procesos", 3),
            ("servicios:tecnicos", 2),
            ("servicios:informes", 2),
        ]));
        let block = report.block("5:Producciones_total").unwrap();
        assert_eq!(report.section("pubs").unwrap().total, 300.0);
        assert_eq!(report.section("desarrollos").unwrap().total, 100.0);
        assert_eq!(report.section("servicios").unwrap().total, 40.0);
        assert_eq!(block.raw, 440.0);
        assert_eq!(block.total, 350.0);
        assert_eq!(report.grand_total, 350.0);
        assert_eq!(report.totals()[TOTAL_GENERAL], 350.0);
    }

    #[test]
    fn unknown_detection_keys_are_ignored() {
        let report = engine().score(&detections(&[
            ("pubs:libross", 5),
            ("inventado:algo", 99),
            ("pubs:libros", 1),
        ]));
        assert_eq!(report.items.len(), 54);
        assert!(report.item("pubs:libross").is_none());
        assert_eq!(report.grand_total, 40.0);
    }

    #[test]
    fn section_without_limit_is_unlimited() {
        let mut config = ValoradorConfig::default();
        config.section_limits.remove("premios");
        let engine = ScoringEngine::new(&config).unwrap();
        let report = engine.score(&detections(&[
            ("premios:internacional", 2),
            ("premios:nacional", 5),
        ]));
        let premios = report.section("premios").unwrap();
        assert_eq!(premios.limit, None);
        assert_eq!(premios.total, 200.0);
        // the block still caps it
        assert_eq!(report.block("6:Otros_total").unwrap().total, 200.0);
    }

    #[test]
    fn totals_map_has_every_block_and_grand_total() {
        let report = engine().score(&detections(&[("gestion:rector", 1)]));
        let totals = report.totals();
        assert_eq!(totals.len(), 6);
        assert_eq!(totals["3:Cargos_total"], 100.0);
        assert_eq!(totals[TOTAL_GENERAL], 100.0);
    }

    #[test]
    fn negative_limit_never_reaches_the_engine() {
        let mut config = ValoradorConfig::default();
        config.section_limits.insert("pubs".to_string(), -50.0);
        assert!(matches!(
            ScoringEngine::new(&config),
            Err(ConfigError::InvalidLimit { .. })
        ));
    }

    #[test]
    fn rubric_order_does_not_change_totals() {
        let detected = detections(&[
            ("formacion:doctorado", 1),
            ("docencia:adjunto", 7),
            ("pubs:con_referato", 4),
            ("premios:nacional", 1),
        ]);
        let mut reversed = ValoradorConfig::default();
        reversed.rubric.reverse();
        reversed.blocks.reverse();

        let forward = engine().score(&detected);
        let backward = ScoringEngine::new(&reversed).unwrap().score(&detected);
        assert_eq!(forward.totals(), backward.totals());
    }

    // ============================================================================
    // PROPERTIES
    // ============================================================================

    fn any_detections() -> impl Strategy<Value = DetectionResult> {
        let keys: Vec<String> = ValoradorConfig::default()
            .rubric
            .into_iter()
            .map(|item| item.key)
            .collect();
        proptest::collection::vec(0u32..20, keys.len())
            .prop_map(move |units| keys.iter().cloned().zip(units).collect())
    }

    proptest! {
        #[test]
        fn item_score_never_exceeds_its_cap(units in 0u32..10_000, per in 0.0f64..500.0, max in 0.0f64..1000.0) {
            let item = RubricItem::new("s:i", "I", per, max);
            let (raw, capped) = score_item(units, &item);
            prop_assert_eq!(capped, raw.min(max));
            prop_assert!(capped <= max);
            prop_assert!(capped >= 0.0);
        }

        #[test]
        fn reported_totals_respect_every_limit(detected in any_detections()) {
            let report = engine().score(&detected);
            for section in &report.sections {
                if let Some(limit) = section.limit {
                    prop_assert!(section.total <= limit);
                }
            }
            for block in &report.blocks {
                if let Some(limit) = block.limit {
                    prop_assert!(block.total <= limit);
                }
            }
            let block_sum: f64 = report.blocks.iter().map(|b| b.total).sum();
            prop_assert_eq!(block_sum, report.grand_total);
        }

        #[test]
        fn more_units_never_lower_the_grand_total(detected in any_detections(), pick in 0usize..54, extra in 1u32..10) {
            let engine = engine();
            let before = engine.score(&detected);

            let key = before.items[pick].key.clone();
            let mut bumped = detected.clone();
            bumped.insert(key.clone(), detected.units(&key) + extra);
            let after = engine.score(&bumped);

            let ceiling: f64 = before.blocks.iter().filter_map(|b| b.limit).sum();
            prop_assert!(after.grand_total >= before.grand_total);
            prop_assert!(after.grand_total <= ceiling);
        }
    }
}
