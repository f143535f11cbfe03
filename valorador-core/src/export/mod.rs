// Exporters - render a ScoreReport for people and spreadsheets.
// - csv_report.rs: one row per rubric item (csv crate)
// - docx_report.rs: Word report written as raw WordprocessingML (zip)
// - mod.rs: JSON, console summary and shared formatting

pub mod csv_report;
pub mod docx_report;

pub use csv_report::{to_csv, to_csv_string};
pub use docx_report::to_docx;

use crate::types::{ScoreReport, TOTAL_GENERAL};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Optional identification printed on the Word report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub docente: Option<String>,
    pub institucion: Option<String>,
}

pub fn to_json(report: &ScoreReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Points without a trailing `.0` for whole numbers: `250`, `12.5`.
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{points:.0}")
    } else {
        format!("{points}")
    }
}

/// Plain-text breakdown for the console: detected items, then blocks.
pub fn render_summary(report: &ScoreReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<32} {:>6} {:>8} {:>8} {:>6}",
        "Ítem", "Unid.", "Pts/u", "Puntos", "Tope"
    );
    let detected: Vec<_> = report.items.iter().filter(|item| item.units > 0).collect();
    if detected.is_empty() {
        let _ = writeln!(out, "(no se detectaron ítems)");
    }
    for item in detected {
        let _ = writeln!(
            out,
            "{:<32} {:>6} {:>8} {:>8} {:>6}",
            item.key,
            item.units,
            format_points(item.points_per_unit),
            format_points(item.capped_points),
            format_points(item.max_points),
        );
    }

    let _ = writeln!(out);
    for section in report.sections.iter().filter(|s| s.raw > 0.0) {
        let limit = section
            .limit
            .map(format_points)
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {:.<30} {:>6} / {:<6}{}",
            section.section,
            format_points(section.total),
            limit,
            if section.raw > section.total { " (tope)" } else { "" }
        );
    }

    let _ = writeln!(out);
    for block in &report.blocks {
        let limit = block
            .limit
            .map(format_points)
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:.<34} {:>6} / {}",
            block.label,
            format_points(block.total),
            limit
        );
    }
    let _ = writeln!(
        out,
        "{:.<34} {:>6}",
        TOTAL_GENERAL.replace('_', " "),
        format_points(report.grand_total)
    );

    out
}
