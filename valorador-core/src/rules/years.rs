use regex::Regex;
use std::sync::LazyLock;

// "2010-2015", "2010 – 2015", "2018 a la actualidad", "desde 2019"
static YEAR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b((?:19|20)\d{2})\s*(?:-|–|—|/|\ba\b|\bal\b|\bhasta\b)\s*(?:la\s+|el\s+)?((?:19|20)\d{2}|actualidad|actual|presente|fecha|hoy)\b",
    )
    .expect("static regex")
});

static OPEN_SINCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bdesde\s+(?:el\s+(?:ano\s+)?)?((?:19|20)\d{2})\b").expect("static regex")
});

/// First year range on the line that contains `at`, as `(start, end)`.
///
/// Open ranges ("actualidad", "desde 2019") end at `reference_year`.
/// Inverted ranges are ignored.
pub(super) fn range_on_line(text: &str, at: usize, reference_year: i32) -> Option<(i32, i32)> {
    let line_start = text[..at].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[at..].find('\n').map(|i| at + i).unwrap_or(text.len());
    let line = &text[line_start..line_end];

    let range = YEAR_RANGE
        .captures(line)
        .and_then(|caps| {
            let start = caps[1].parse::<i32>().ok()?;
            let end = caps[2].parse::<i32>().unwrap_or(reference_year);
            Some((start, end))
        })
        .or_else(|| {
            OPEN_SINCE
                .captures(line)
                .and_then(|caps| caps[1].parse::<i32>().ok())
                .map(|start| (start, reference_year))
        })?;

    (range.0 <= range.1).then_some(range)
}

/// Years covered by a range; a role held within one calendar year counts as 1.
pub(super) fn span(range: (i32, i32)) -> u32 {
    u32::try_from(range.1 - range.0).unwrap_or(0).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_range_on_same_line() {
        let text = "profesor titular, unc (2010-2015)\notra cosa 1990-1995";
        assert_eq!(range_on_line(text, 0, 2024), Some((2010, 2015)));
    }

    #[test]
    fn range_before_the_role_counts() {
        let text = "2012 – 2014: profesora adjunta, unlp";
        let at = text.find("profesora").unwrap();
        assert_eq!(range_on_line(text, at, 2024), Some((2012, 2014)));
    }

    #[test]
    fn open_ranges_end_at_reference_year() {
        assert_eq!(
            range_on_line("adjunto 2018 a la actualidad", 0, 2024),
            Some((2018, 2024))
        );
        assert_eq!(range_on_line("adjunto desde 2020", 0, 2024), Some((2020, 2024)));
    }

    #[test]
    fn no_range_or_inverted_range_is_none() {
        assert_eq!(range_on_line("profesor adjunto", 0, 2024), None);
        assert_eq!(range_on_line("adjunto 2015-2010", 0, 2024), None);
    }

    #[test]
    fn same_year_spans_one() {
        assert_eq!(span((2019, 2019)), 1);
        assert_eq!(span((2010, 2015)), 5);
    }
}
