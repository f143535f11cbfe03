use crate::error::{ConfigError, REFERENCE_YEARS};
use crate::rubric::{builtin_blocks, builtin_rubric, builtin_section_limits};
use crate::rules::builtin::builtin_detectors;
use crate::rules::{DetectorBank, DetectorRule};
use crate::types::{section_of, RubricItem};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

// Default value functions for serde
fn current_year() -> i32 {
    chrono::Local::now().year()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValoradorConfig {
    /// Rubric rows in presentation order; keys are `<section>:<item>`
    pub rubric: Vec<RubricItem>,
    /// Ceiling per section; a section without an entry is unlimited
    pub section_limits: BTreeMap<String, f64>,
    /// Block grouping of sections, in presentation order
    pub blocks: Vec<BlockConfig>,
    /// One detector per rubric key
    pub detectors: Vec<DetectorRule>,
    /// Year that open ranges ("2018 - actualidad") run up to
    pub reference_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Stable report key, e.g. `3:Cargos_total`
    pub name: String,
    /// Display label, e.g. `Cargos (Docencia/Gestión)`
    pub label: String,
    pub sections: Vec<String>,
    /// Block ceiling; unlimited when absent
    #[serde(default)]
    pub limit: Option<f64>,
}

impl BlockConfig {
    pub fn new(name: &str, label: &str, sections: &[&str], limit: f64) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            sections: sections.iter().map(|s| s.to_string()).collect(),
            limit: Some(limit),
        }
    }
}

impl Default for ValoradorConfig {
    fn default() -> Self {
        Self {
            rubric: builtin_rubric(),
            section_limits: builtin_section_limits(),
            blocks: builtin_blocks(),
            detectors: builtin_detectors(),
            reference_year: current_year(),
        }
    }
}

impl ValoradorConfig {
    /// Load config from a YAML file. Omitted fields keep their built-in values.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ValoradorConfig = serde_yaml::from_str(&content)?;
        tracing::info!(path = %path.display(), items = config.rubric.len(), "loaded valorador config");
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|err| {
                tracing::warn!(path = %p.display(), error = %err, "failed to load config, using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Check the structural invariants the scoring engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !REFERENCE_YEARS.contains(&self.reference_year) {
            return Err(ConfigError::ReferenceYearOutOfRange(self.reference_year));
        }

        let mut keys = BTreeSet::new();
        for item in &self.rubric {
            match item.key.split_once(':') {
                Some((section, name)) if !section.is_empty() && !name.is_empty() => {}
                _ => return Err(ConfigError::MalformedKey(item.key.clone())),
            }
            if !keys.insert(item.key.as_str()) {
                return Err(ConfigError::DuplicateItem(item.key.clone()));
            }
            // `!(x >= 0)` also rejects NaN
            if !(item.points_per_unit >= 0.0) {
                return Err(ConfigError::NegativePoints {
                    key: item.key.clone(),
                    field: "points_per_unit",
                });
            }
            if !(item.max_points >= 0.0) {
                return Err(ConfigError::NegativePoints {
                    key: item.key.clone(),
                    field: "max_points",
                });
            }
        }

        for (section, &limit) in &self.section_limits {
            check_limit("section", section, limit)?;
        }
        for block in &self.blocks {
            if let Some(limit) = block.limit {
                check_limit("block", &block.name, limit)?;
            }
        }

        let mut detector_keys = BTreeSet::new();
        for detector in &self.detectors {
            if !detector_keys.insert(detector.key.as_str()) {
                return Err(ConfigError::DuplicateDetector(detector.key.clone()));
            }
            if !keys.contains(detector.key.as_str()) {
                return Err(ConfigError::OrphanDetector(detector.key.clone()));
            }
        }
        if let Some(missing) = keys.iter().find(|key| !detector_keys.contains(*key)) {
            return Err(ConfigError::MissingDetector(missing.to_string()));
        }

        let sections: BTreeSet<&str> = keys.iter().map(|key| section_of(key)).collect();
        let mut owner: BTreeMap<&str, &str> = BTreeMap::new();
        for block in &self.blocks {
            for section in &block.sections {
                if !sections.contains(section.as_str()) {
                    return Err(ConfigError::UnknownBlockSection {
                        block: block.name.clone(),
                        section: section.clone(),
                    });
                }
                if let Some(first) = owner.insert(section.as_str(), block.name.as_str()) {
                    return Err(ConfigError::SectionInMultipleBlocks {
                        section: section.clone(),
                        first: first.to_string(),
                        second: block.name.clone(),
                    });
                }
            }
        }
        if let Some(orphan) = sections.iter().find(|section| !owner.contains_key(*section)) {
            return Err(ConfigError::SectionWithoutBlock(orphan.to_string()));
        }

        DetectorBank::compile(&self.detectors, self.reference_year)?;
        Ok(())
    }

    pub fn section_limit(&self, section: &str) -> Option<f64> {
        self.section_limits.get(section).copied()
    }

    /// Distinct sections in rubric order.
    pub fn sections(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.rubric
            .iter()
            .map(RubricItem::section)
            .filter(|section| seen.insert(*section))
            .collect()
    }

    pub fn item(&self, key: &str) -> Option<&RubricItem> {
        self.rubric.iter().find(|item| item.key == key)
    }
}

// NaN would slip through `f64::min` and leave the total uncapped
fn check_limit(scope: &'static str, name: &str, limit: f64) -> Result<(), ConfigError> {
    if limit.is_finite() && limit >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidLimit {
            scope,
            name: name.to_string(),
            value: limit,
        })
    }
}
