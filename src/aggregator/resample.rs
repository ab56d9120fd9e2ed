//! Reinterpolate density intervals onto a regular latency grid.
//!
//! Once all histograms have been submitted and normalised, each interval's
//! mass is spread over the grid rows it overlaps, proportionally to the
//! overlap. Each block size is then checked for conservation: its intervals
//! and its grid column must both integrate to one.

use super::density::{DensityField, DensityInterval};
use super::grid::Grid;
use super::ingest::{block_size_of, GridBounds};
use crate::utils::config::CONSERVATION_TOLERANCE;
use crate::utils::error::GridError;
use log::debug;

/// Rows of a uniform grid overlapping one interval, with the overlap extent.
///
/// Rows are visited in ascending order starting from the row containing the
/// interval's lower edge; the scan ends at the first row that starts past
/// the interval.
#[derive(Debug, Clone)]
pub struct RowOverlaps {
    lower: f64,
    upper: f64,
    bin_height: f64,
    row: usize,
    rows: usize,
}

impl RowOverlaps {
    pub fn new(interval: &DensityInterval, bin_height: f64, rows: usize) -> Self {
        let start = (interval.lower / bin_height).floor().max(0.0) as usize;
        Self {
            lower: interval.lower,
            upper: interval.upper,
            bin_height,
            row: start.min(rows),
            rows,
        }
    }
}

impl Iterator for RowOverlaps {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while self.row < self.rows {
            let row = self.row;
            self.row += 1;

            let row_lower = row as f64 * self.bin_height;
            let row_upper = row_lower + self.bin_height;

            if row_upper < self.lower {
                continue;
            }
            if row_lower > self.upper {
                self.row = self.rows;
                return None;
            }

            let extent = row_upper.min(self.upper) - row_lower.max(self.lower);
            if extent > 0.0 {
                return Some((row, extent));
            }
        }
        None
    }
}

/// Cumulative masses computed while gridding one block size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConservationCheck {
    pub block_size: u64,
    pub density_total: f64,
    pub grid_total: f64,
}

impl ConservationCheck {
    pub fn passes(&self) -> bool {
        within_tolerance(self.density_total) && within_tolerance(self.grid_total)
    }
}

fn within_tolerance(total: f64) -> bool {
    (1.0 - CONSERVATION_TOLERANCE..=1.0 + CONSERVATION_TOLERANCE).contains(&total)
}

/// Resample every block size's density onto a shared grid
///
/// **Public** - main entry point for gridding
///
/// # Arguments
/// * `field` - Density intervals per block-size exponent
/// * `rows` - Number of latency rows spanning `[0, max_latency)`
/// * `bounds` - Frozen ingestion bounds
///
/// # Errors
/// * `GridError::InvalidRowCount` / `GridError::DegenerateBounds` - Grid cannot be laid out
/// * `GridError::UnorderedIntervals` - Interval list breaks the ascending-run invariant
/// * `GridError::ConservationFailed` - Mass was lost or duplicated for a block size
pub fn resample(field: &DensityField, rows: usize, bounds: &GridBounds) -> Result<Grid, GridError> {
    if rows == 0 {
        return Err(GridError::InvalidRowCount);
    }
    if !(bounds.max_latency > 0.0) {
        return Err(GridError::DegenerateBounds {
            max_latency: bounds.max_latency,
        });
    }

    let bin_height = bounds.max_latency / rows as f64;
    let mut grid = Grid::zeros(rows, bin_height, *bounds);

    debug!(
        "Gridding {} block sizes onto {}x{} cells (row pitch {})",
        field.len(),
        rows,
        grid.cols(),
        bin_height
    );

    for (block_exp, intervals) in field.iter() {
        let col = (block_exp - bounds.min_block_exp) as usize;
        let check = fill_column(&mut grid, col, block_size_of(block_exp), intervals)?;

        debug!(
            "I/O size {}: cumulative density {:.6}, cumulative grid {:.6}",
            check.block_size, check.density_total, check.grid_total
        );

        if !check.passes() {
            return Err(GridError::ConservationFailed {
                block_size: check.block_size,
                density_total: check.density_total,
                grid_total: check.grid_total,
            });
        }
    }

    Ok(grid)
}

/// Accumulate one block size's intervals into its column
fn fill_column(
    grid: &mut Grid,
    col: usize,
    block_size: u64,
    intervals: &[DensityInterval],
) -> Result<ConservationCheck, GridError> {
    check_ordering(block_size, intervals)?;

    let bin_height = grid.bin_height();
    let mut density_total = 0.0;
    let mut grid_total = 0.0;

    for interval in intervals {
        for (row, extent) in RowOverlaps::new(interval, bin_height, grid.rows()) {
            grid.add(row, col, interval.density * extent / bin_height);
            grid_total += interval.density * extent;
        }
        density_total += interval.mass();
    }

    Ok(ConservationCheck {
        block_size,
        density_total,
        grid_total,
    })
}

/// Each sample contributes a run starting at zero whose intervals abut.
/// Anything else would let the early exit in the row scan miscount mass.
fn check_ordering(block_size: u64, intervals: &[DensityInterval]) -> Result<(), GridError> {
    let mut prev_upper: Option<f64> = None;

    for interval in intervals {
        let starts_run = interval.lower == 0.0;
        let continues_run = prev_upper == Some(interval.lower);

        if !(interval.upper > interval.lower) || !(starts_run || continues_run) {
            return Err(GridError::UnorderedIntervals {
                block_size,
                lower: interval.lower,
                upper: interval.upper,
            });
        }
        prev_upper = Some(interval.upper);
    }

    Ok(())
}
