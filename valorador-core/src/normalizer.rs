//! Text normalization shared by every detector.
//!
//! Order matters:
//! 1. non-breaking spaces / page breaks become plain space / newline
//! 2. diacritics are stripped (NFD, combining marks dropped)
//! 3. lower-case
//! 4. runs of horizontal whitespace collapse to one space
//! 5. runs of blank lines collapse to a single newline
//!
//! The result is a fixed point: normalizing it again changes nothing.

use crate::types::NormalizedText;
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("static regex"));

// A newline followed by any whitespace that contains at least one more newline
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("static regex"));

/// Normalize raw extracted text into the canonical detector input.
pub fn normalize(raw: &str) -> NormalizedText {
    let replaced = replace_layout_chars(raw);
    let folded = fold_case_and_accents(&replaced);
    let spaced = HORIZONTAL_WS.replace_all(&folded, " ");
    let mut text = spaced.into_owned();
    // A single pass can leave " \n" tails that join with the next run, so
    // repeat until stable.
    loop {
        let collapsed = BLANK_LINES.replace_all(&text, "\n");
        let collapsed = HORIZONTAL_WS.replace_all(&collapsed, " ").into_owned();
        if collapsed == text {
            break;
        }
        text = collapsed;
    }
    NormalizedText::new_unchecked(text)
}

fn replace_layout_chars(raw: &str) -> String {
    raw.chars()
        .map(|ch| match ch {
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => ' ',
            // form feed (page break), vertical tab, line/paragraph separators
            '\u{000C}' | '\u{000B}' | '\u{2028}' | '\u{2029}' => '\n',
            '\r' => '\n',
            _ => ch,
        })
        .collect()
}

fn fold_case_and_accents(text: &str) -> String {
    // NFKD also maps compatibility forms (ligatures, full-width letters).
    // Lower-casing can reintroduce marks (U+0130), hence the second strip.
    text.nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect()
}
