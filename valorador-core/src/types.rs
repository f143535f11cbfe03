use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The schema version stamped on every score report.
/// Bump this when the output shape changes.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Reserved key for the grand total in [`ScoreReport::totals`].
pub const TOTAL_GENERAL: &str = "TOTAL_GENERAL";

// ===== TEXT =====

/// Canonical CV text: lower-cased, accent-stripped, whitespace collapsed.
///
/// Only [`crate::normalizer::normalize`] constructs one, so every detector can
/// assume the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub(crate) fn new_unchecked(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which reader produced a [`DocumentText`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceKind {
    Txt,
    Docx,
    Pdf,
    /// Unknown extension decoded as plain text.
    Raw,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Txt => "TXT",
            SourceKind::Docx => "DOCX",
            SourceKind::Pdf => "PDF",
            SourceKind::Raw => "RAW",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw text handed over by a document reader, not yet normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentText {
    pub text: String,
    pub source_kind: SourceKind,
    /// Size of the source file in bytes
    pub byte_len: usize,
    /// SHA-256 of the source bytes (hex)
    pub fingerprint: String,
}

// ===== RUBRIC =====

/// One row of the valorador.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricItem {
    /// `<section>:<item>`
    pub key: String,
    pub label: String,
    pub points_per_unit: f64,
    /// Ceiling for this item regardless of detected units
    pub max_points: f64,
}

impl RubricItem {
    pub fn new(key: &str, label: &str, points_per_unit: f64, max_points: f64) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            points_per_unit,
            max_points,
        }
    }

    /// Owning section: the part of the key before the first `:`.
    pub fn section(&self) -> &str {
        section_of(&self.key)
    }
}

/// Section name of an item key. A key without `:` is its own section.
pub fn section_of(key: &str) -> &str {
    key.split_once(':').map(|(section, _)| section).unwrap_or(key)
}

// ===== DETECTION =====

/// Unit counts per rubric key, produced fresh for every document.
///
/// Lookups of absent keys yield 0 units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionResult(BTreeMap<String, u32>);

impl DetectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn units(&self, key: &str) -> u32 {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn insert(&mut self, key: impl Into<String>, units: u32) {
        self.0.insert(key.into(), units);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(key, units)| (key.as_str(), *units))
    }
}

impl<K: Into<String>> FromIterator<(K, u32)> for DetectionResult {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ===== SCORING OUTPUT =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub key: String,
    pub label: String,
    pub section: String,
    pub units: u32,
    pub points_per_unit: f64,
    pub raw_points: f64,
    pub max_points: f64,
    pub capped_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTotal {
    pub section: String,
    /// Sum of capped item points before the section limit
    pub raw: f64,
    /// `None` means unlimited
    pub limit: Option<f64>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTotal {
    pub name: String,
    pub label: String,
    pub sections: Vec<String>,
    /// Sum of clamped section totals before the block limit
    pub raw: f64,
    pub limit: Option<f64>,
    pub total: f64,
}

/// Where the scored text came from. Absent when scoring bare text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub file_name: String,
    pub kind: SourceKind,
    pub characters: usize,
    pub fingerprint: String,
}

/// Full result of scoring one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub schema_version: String,
    pub source: Option<SourceInfo>,
    pub items: Vec<ScoredItem>,
    pub sections: Vec<SectionTotal>,
    pub blocks: Vec<BlockTotal>,
    pub grand_total: f64,
}

impl ScoreReport {
    /// Block name -> total, plus [`TOTAL_GENERAL`].
    pub fn totals(&self) -> BTreeMap<String, f64> {
        let mut totals: BTreeMap<String, f64> = self
            .blocks
            .iter()
            .map(|block| (block.name.clone(), block.total))
            .collect();
        totals.insert(TOTAL_GENERAL.to_string(), self.grand_total);
        totals
    }

    pub fn item(&self, key: &str) -> Option<&ScoredItem> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn section(&self, section: &str) -> Option<&SectionTotal> {
        self.sections.iter().find(|s| s.section == section)
    }

    pub fn block(&self, name: &str) -> Option<&BlockTotal> {
        self.blocks.iter().find(|b| b.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_is_prefix_before_first_colon() {
        assert_eq!(section_of("formacion:doctorado"), "formacion");
        assert_eq!(section_of("a:b:c"), "a");
        assert_eq!(section_of("suelto"), "suelto");
    }

    #[test]
    fn missing_detection_defaults_to_zero() {
        let detections: DetectionResult = [("pubs:libros", 3)].into_iter().collect();
        assert_eq!(detections.units("pubs:libros"), 3);
        assert_eq!(detections.units("pubs:capitulos"), 0);
    }
}
