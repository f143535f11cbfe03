use super::WindowRule;
use crate::error::ConfigError;
use regex::{Regex, RegexBuilder};

pub(super) const DEFAULT_WINDOW_CHARS: usize = 60;

/// Compiled form of a [`WindowRule`].
#[derive(Debug, Clone)]
pub(super) struct ContextWindow {
    chars: usize,
    require: Vec<Regex>,
    exclude_before: Vec<Regex>,
    exclude_near: Vec<Regex>,
}

impl ContextWindow {
    pub(super) fn compile(key: &str, rule: &WindowRule) -> Result<Self, ConfigError> {
        Ok(Self {
            chars: rule.chars,
            require: compile_all(key, &rule.require)?,
            exclude_before: compile_all(key, &rule.exclude_before)?,
            exclude_near: compile_all(key, &rule.exclude_near)?,
        })
    }

    /// Whether the match at `start..end` of `text` satisfies the context rules.
    pub(super) fn allows(&self, text: &str, start: usize, end: usize) -> bool {
        let lo = step_back(text, start, self.chars);
        let hi = step_forward(text, end, self.chars);
        let around = &text[lo..hi];

        if !self.require.is_empty() && !self.require.iter().any(|re| re.is_match(around)) {
            return false;
        }

        if self.exclude_near.iter().any(|re| re.is_match(around)) {
            return false;
        }

        // "closely preceded" stops at the start of the line
        let before = &text[lo..start];
        let before = match before.rfind('\n') {
            Some(newline) => &before[newline + 1..],
            None => before,
        };
        !self.exclude_before.iter().any(|re| re.is_match(before))
    }
}

pub(super) fn compile_pattern(key: &str, pattern: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            key: key.to_string(),
            source,
        })
}

fn compile_all(key: &str, patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns.iter().map(|p| compile_pattern(key, p)).collect()
}

/// Byte offset `n` characters before `from`, clamped to the start of `text`.
pub(super) fn step_back(text: &str, from: usize, n: usize) -> usize {
    if n == 0 {
        return from;
    }
    text[..from]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(from)
}

/// Byte offset `n` characters after `from`, clamped to the end of `text`.
pub(super) fn step_forward(text: &str, from: usize, n: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| from + i)
        .unwrap_or(text.len())
}
