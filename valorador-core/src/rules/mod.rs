// Detector rules - declarative descriptors evaluated by one generic engine.
// - mod.rs: the serialisable descriptor types (what a detector looks for)
// - engine.rs: DetectorBank, compiling descriptors and evaluating them
// - window.rs: contextual window filtering around a match
// - years.rs: year-range extraction for per-year items
// - builtin.rs: the built-in detector bank for the valorador rubric

pub mod builtin;
pub mod engine;
mod window;
mod years;

pub use engine::{DetectorBank, Evidence};

use serde::{Deserialize, Serialize};

/// How a single signal turns matches into units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalMode {
    /// 1 if any qualifying match, else 0
    Has,
    /// Number of non-overlapping qualifying matches
    Count,
    /// Integer captured by group 1 of the first qualifying match
    Num,
    /// Distinct identities (group 1, or the whole match) after stripping
    /// everything but letters and digits
    Distinct,
    /// Sum of year spans found on the lines of the qualifying matches
    Years,
}

/// How the signals of one detector are folded into its unit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    /// First non-zero signal in declaration order
    #[default]
    Fallback,
    /// Largest signal; two phrasings of one achievement are never summed
    Max,
}

/// Context constraints around a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRule {
    /// Window size in characters on each side of the match
    pub chars: usize,
    /// At least one of these must occur in the window (ignored when empty)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require: Vec<String>,
    /// None of these may occur between the start of the window (or line,
    /// whichever is closer) and the match
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_before: Vec<String>,
    /// None of these may occur anywhere in the window
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_near: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRule {
    pub mode: SignalMode,
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowRule>,
    /// Occurrences of this pattern are subtracted from the signal (floored at 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtract: Option<String>,
}

/// One detector, registered under exactly the rubric key it scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorRule {
    pub key: String,
    #[serde(default)]
    pub combine: Combine,
    pub signals: Vec<SignalRule>,
}

impl SignalRule {
    pub fn new(mode: SignalMode, pattern: &str) -> Self {
        Self {
            mode,
            pattern: pattern.to_string(),
            window: None,
            subtract: None,
        }
    }

    /// Open (or resize) the context window.
    pub fn within(mut self, chars: usize) -> Self {
        self.window_mut().chars = chars;
        self
    }

    pub fn requiring(mut self, patterns: &[&str]) -> Self {
        self.window_mut()
            .require
            .extend(patterns.iter().map(|p| p.to_string()));
        self
    }

    pub fn excluding_before(mut self, patterns: &[&str]) -> Self {
        self.window_mut()
            .exclude_before
            .extend(patterns.iter().map(|p| p.to_string()));
        self
    }

    pub fn excluding_near(mut self, patterns: &[&str]) -> Self {
        self.window_mut()
            .exclude_near
            .extend(patterns.iter().map(|p| p.to_string()));
        self
    }

    pub fn minus(mut self, pattern: &str) -> Self {
        self.subtract = Some(pattern.to_string());
        self
    }

    fn window_mut(&mut self) -> &mut WindowRule {
        self.window.get_or_insert_with(|| WindowRule {
            chars: window::DEFAULT_WINDOW_CHARS,
            require: Vec::new(),
            exclude_before: Vec::new(),
            exclude_near: Vec::new(),
        })
    }
}

impl DetectorRule {
    pub fn single(key: &str, signal: SignalRule) -> Self {
        Self::fallback(key, vec![signal])
    }

    pub fn fallback(key: &str, signals: Vec<SignalRule>) -> Self {
        Self {
            key: key.to_string(),
            combine: Combine::Fallback,
            signals,
        }
    }

    pub fn max(key: &str, signals: Vec<SignalRule>) -> Self {
        Self {
            key: key.to_string(),
            combine: Combine::Max,
            signals,
        }
    }
}

pub fn has(pattern: &str) -> SignalRule {
    SignalRule::new(SignalMode::Has, pattern)
}

pub fn count(pattern: &str) -> SignalRule {
    SignalRule::new(SignalMode::Count, pattern)
}

pub fn num(pattern: &str) -> SignalRule {
    SignalRule::new(SignalMode::Num, pattern)
}

pub fn distinct(pattern: &str) -> SignalRule {
    SignalRule::new(SignalMode::Distinct, pattern)
}

pub fn years(pattern: &str) -> SignalRule {
    SignalRule::new(SignalMode::Years, pattern)
}
