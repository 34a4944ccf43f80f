//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the numeric code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{GroupAnalysis, RunOutput};
use crate::domain::{NormalizedPoint, RatedSpeedSource, SmoothKind, SpeedSummary};
use crate::io::ingest::RowError;

/// Format the full run summary (selection, groups, characteristic points, contour).
pub fn format_run_summary(run: &RunOutput<'_>) -> String {
    let mut out = String::new();

    out.push_str("=== pc - Pump Performance Curves ===\n");
    out.push_str(&format!("Selection: {}\n", run.selection.describe()));
    let source = match run.rated_speed_source {
        RatedSpeedSource::Explicit => "explicit",
        RatedSpeedSource::Mean => "mean of measured speeds",
    };
    out.push_str(&format!("Rated speed: {:.0} rpm ({source})\n", run.rated_speed));
    out.push_str(&format!(
        "Points: {} normalized of {} selected rows\n",
        run.points.len(),
        run.rows_selected
    ));

    out.push_str("\nCurves:\n");
    out.push_str(&format!(
        "{:<24} {:>4} {:<22} {:>22} {:>22} {:>22}\n",
        "curve", "n", "head curve", "BEP (Q, H, eff)", "shutoff (Q, H)", "runout (Q, H)"
    ));
    for analysis in &run.groups {
        out.push_str(&format_group_row(analysis));
        out.push('\n');
    }

    let contour = &run.contour;
    out.push_str("\nEfficiency contour:\n");
    if contour.field.is_empty() {
        out.push_str("- field: empty (fewer than 3 usable points, or points collinear)\n");
    } else {
        let rows = contour.field.head_axis.len();
        let cols = contour.field.flow_axis.len();
        out.push_str(&format!(
            "- field: {cols}x{rows} grid, {} of {} nodes inside the data hull\n",
            contour.field.defined_count(),
            rows * cols
        ));
    }
    if contour.levels.is_empty() {
        out.push_str("- levels: none (no efficiency values)\n");
    } else {
        let labels: Vec<&str> = contour.levels.iter().map(|l| l.label.as_str()).collect();
        out.push_str(&format!("- levels: {}\n", labels.join(", ")));
    }

    out
}

fn format_group_row(analysis: &GroupAnalysis<'_>) -> String {
    let curve = match analysis.head_curve.kind {
        SmoothKind::Spline => format!("spline ({} pts)", analysis.head_curve.points.len()),
        SmoothKind::Passthrough { .. } => format!("raw ({} pts)", analysis.head_curve.points.len()),
    };

    let (bep, shutoff, runout) = match analysis.characteristic_points() {
        Some(cp) => (
            cp.best_efficiency
                .map(|p| format!("{:.1}, {:.1}, {:.1}%", p.flow, p.head, p.efficiency().unwrap_or(f64::NAN)))
                .unwrap_or_else(|| "-".to_string()),
            fmt_qh(cp.shutoff),
            fmt_qh(cp.runout),
        ),
        None => ("-".to_string(), "-".to_string(), "-".to_string()),
    };

    format!(
        "{:<24} {:>4} {:<22} {:>22} {:>22} {:>22}",
        truncate(&analysis.group.key().label(), 24),
        analysis.group.len(),
        curve,
        bep,
        shutoff,
        runout
    )
}

fn fmt_qh(p: &NormalizedPoint<'_>) -> String {
    format!("{:.1}, {:.1}", p.flow, p.head)
}

/// Format a list of catalog values under a heading.
pub fn format_list<T: std::fmt::Display>(heading: &str, items: &[T]) -> String {
    let mut out = format!("{heading}:\n");
    if items.is_empty() {
        out.push_str("  (none)\n");
    }
    for item in items {
        out.push_str(&format!("  {item}\n"));
    }
    out
}

pub fn format_speed_summary(summary: &SpeedSummary) -> String {
    let common: Vec<String> = summary.common.iter().map(|s| format!("{s:.0}")).collect();
    format!(
        "Speeds: min={:.0} max={:.0} mean={:.1} rpm\nCommon rated speeds: {}\n",
        summary.min,
        summary.max,
        summary.mean,
        common.join(", ")
    )
}

/// Summarize skipped rows (first few in detail).
pub fn format_row_errors(errors: &[RowError], rows_read: usize) -> String {
    const SHOWN: usize = 5;
    let mut out = format!("Skipped {} of {rows_read} rows:\n", errors.len());
    for e in errors.iter().take(SHOWN) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if errors.len() > SHOWN {
        out.push_str(&format!("  ... and {} more\n", errors.len() - SHOWN));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
