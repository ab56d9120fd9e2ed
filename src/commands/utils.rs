use crate::output::read_grid_report;
use crate::utils::config::{CONSERVATION_TOLERANCE, SCHEMA_VERSION};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Validate a grid report JSON file
///
/// Every populated column must still integrate to one.
pub fn validate_grid_file(file_path: PathBuf) -> Result<()> {
    println!("Validating grid report: {}", file_path.display());

    let report = read_grid_report(&file_path)?;
    let grid = report
        .to_grid()
        .context("Grid cells do not match the recorded bounds")?;

    for col in (0..grid.cols()).filter(|&col| grid.is_column_populated(col)) {
        let mass = grid.column_mass(col);
        if (mass - 1.0).abs() > CONSERVATION_TOLERANCE {
            anyhow::bail!(
                "CHECK FAILED: blocksize {} cumulative grid {}",
                grid.column_block_size(col),
                mass
            );
        }
    }

    println!("✓ Valid grid report");
    println!("  Version: {}", report.version);
    println!("  Mode: {}", report.mode);
    println!("  Grid: {} rows x {} block sizes", grid.rows(), grid.cols());
    println!("  Row pitch: {} {}", grid.bin_height(), report.time_unit);
    println!("  Block sizes: {}", report.block_sizes.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("fio clat grid report schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  generated_at: string     - ISO 8601 timestamp");
        println!("  mode: string             - 'read' or 'write'");
        println!("  time_unit: string        - 'us' or 'ms'");
        println!("  log_scale: bool          - Latencies are log10-transformed");
        println!("  bounds: object           - min/max latency, min/max block exponent");
        println!("  bin_height: number       - Latency span of one row");
        println!("  cells: array             - cells[row][column] density");
        println!("  block_sizes: array       - Per block size summary");
        println!("    block_size: number     - Bytes");
        println!("    samples: number        - Client runs aggregated");
        println!("    total_ios: number      - Completions aggregated");
        println!("    peak_latency: number?  - Lower edge of densest row");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("fio-clat-grid v{}", env!("CARGO_PKG_VERSION"));
    println!("Grid Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Aggregates fio completion-latency histograms into a density heatmap.");
}
