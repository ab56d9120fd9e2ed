//! Terminal summary of a grid report.

use crate::parser::schema::GridReport;
use colored::*;

/// Render a per-block-size table for terminal output
pub fn generate_text_summary(report: &GridReport) -> String {
    let unit = if report.log_scale {
        format!("log10 {}", report.time_unit)
    } else {
        report.time_unit.clone()
    };

    let mut lines = Vec::new();
    lines.push(format!("{}", "LATENCY DENSITY GRID".bold()));
    lines.push(format!(
        "  mode: {} | rows: {} | row pitch: {:.4} {}",
        report.mode,
        report.cells.len(),
        report.bin_height,
        unit
    ));
    lines.push(String::new());
    lines.push(format!(
        "  {:>10}  {:>8}  {:>14}  {:>16}",
        "BLOCK SIZE", "SAMPLES", "I/Os", format!("PEAK ({})", unit)
    ));

    for block in &report.block_sizes {
        let peak = block
            .peak_latency
            .map_or_else(|| "-".to_string(), |p| format!("{:.3}", p));
        lines.push(format!(
            "  {:>10}  {:>8}  {:>14}  {:>16}",
            block.block_size,
            block.samples,
            block.total_ios,
            peak.cyan()
        ));
    }

    let total = report
        .block_sizes
        .iter()
        .fold(0u64, |acc, b| acc.saturating_add(b.total_ios));
    lines.push(String::new());
    lines.push(format!("  Aggregated data for {} I/Os", total.to_string().green()));

    lines.join("\n")
}
