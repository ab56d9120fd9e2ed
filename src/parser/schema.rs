//! Output JSON schema definitions for grid reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::aggregator::{block_size_of, AccumulatedSeries, Grid, GridBounds};
use crate::utils::config::{GridConfig, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};

/// Top-level grid report written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the report was generated
    pub generated_at: String,

    /// I/O direction that was aggregated ("read" or "write")
    pub mode: String,

    /// Latency axis unit ("us" or "ms")
    pub time_unit: String,

    /// Whether latencies are log10-transformed
    pub log_scale: bool,

    /// Frozen ingestion bounds
    pub bounds: GridBounds,

    /// Latency span of one row
    pub bin_height: f64,

    /// Cell values, `cells[row][column]`
    pub cells: Vec<Vec<f64>>,

    /// Per-block-size summary, ascending by block size
    pub block_sizes: Vec<BlockSummary>,
}

/// Summary of one block size's contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    /// Block size in bytes
    pub block_size: u64,

    /// Number of histogram samples (client runs)
    pub samples: usize,

    /// Total completions across samples
    pub total_ios: u64,

    /// Lower latency edge of the densest row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_latency: Option<f64>,
}

impl GridReport {
    /// Rebuild the grid stored in this report
    ///
    /// Returns `None` if the rows are ragged or do not match the bounds.
    pub fn to_grid(&self) -> Option<Grid> {
        let rows = self.cells.len();
        let cells: Vec<f64> = self.cells.iter().flatten().copied().collect();
        if self.cells.iter().any(|row| row.len() != self.bounds.columns()) {
            return None;
        }
        Grid::from_cells(rows, self.bin_height, self.bounds, cells)
    }
}

/// Build the report for a finished grid
pub fn to_report(grid: &Grid, series: &AccumulatedSeries, config: &GridConfig) -> GridReport {
    let block_sizes = series
        .iter()
        .map(|(block_exp, block)| {
            let col = (block_exp - grid.bounds().min_block_exp) as usize;
            BlockSummary {
                block_size: block_size_of(block_exp),
                samples: block.samples.len(),
                total_ios: block.total_ios,
                peak_latency: grid.peak_row(col).map(|row| grid.row_lower(row)),
            }
        })
        .collect();

    GridReport {
        version: SCHEMA_VERSION.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        mode: config.mode.to_string(),
        time_unit: config.time_unit.to_string(),
        log_scale: config.log_scale,
        bounds: *grid.bounds(),
        bin_height: grid.bin_height(),
        cells: grid.to_rows(),
        block_sizes,
    }
}
