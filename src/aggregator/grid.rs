//! Dense latency x block-size matrix produced by the resampler.

use super::ingest::{block_size_of, GridBounds};
use serde::{Deserialize, Serialize};

/// Row-major density grid.
///
/// Row `r` covers latencies `[r * bin_height, (r + 1) * bin_height)`; column
/// `c` holds block size `2^(min_block_exp + c)`. A zero cell means no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    bin_height: f64,
    bounds: GridBounds,
    cells: Vec<f64>,
}

impl Grid {
    pub(crate) fn zeros(rows: usize, bin_height: f64, bounds: GridBounds) -> Self {
        let cols = bounds.columns();
        Self {
            rows,
            cols,
            bin_height,
            bounds,
            cells: vec![0.0; rows * cols],
        }
    }

    /// Rebuild a grid from stored row-major cells
    ///
    /// Returns `None` when the cell count does not match the shape.
    pub fn from_cells(
        rows: usize,
        bin_height: f64,
        bounds: GridBounds,
        cells: Vec<f64>,
    ) -> Option<Self> {
        let cols = bounds.columns();
        if cells.len() != rows * cols {
            return None;
        }
        Some(Self {
            rows,
            cols,
            bin_height,
            bounds,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn bin_height(&self) -> f64 {
        self.bin_height
    }

    pub fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.cols + col]
    }

    pub(crate) fn add(&mut self, row: usize, col: usize, value: f64) {
        self.cells[row * self.cols + col] += value;
    }

    /// Lower latency edge of a row
    pub fn row_lower(&self, row: usize) -> f64 {
        row as f64 * self.bin_height
    }

    /// Block-size exponent shown in a column
    pub fn column_exponent(&self, col: usize) -> u32 {
        self.bounds.min_block_exp + col as u32
    }

    pub fn column_block_size(&self, col: usize) -> u64 {
        block_size_of(self.column_exponent(col))
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|row| self.value(row, col)).collect()
    }

    /// Integrated density of a column (1.0 for every populated column)
    pub fn column_mass(&self, col: usize) -> f64 {
        self.column(col).iter().sum::<f64>() * self.bin_height
    }

    /// Whether any row of this column received mass
    pub fn is_column_populated(&self, col: usize) -> bool {
        (0..self.rows).any(|row| self.value(row, col) != 0.0)
    }

    /// Row holding the largest density of a column
    pub fn peak_row(&self, col: usize) -> Option<usize> {
        (0..self.rows)
            .filter(|&row| self.value(row, col) > 0.0)
            .max_by(|&a, &b| self.value(a, col).total_cmp(&self.value(b, col)))
    }

    /// Largest cell value in the grid
    pub fn max_value(&self) -> f64 {
        self.cells.iter().copied().fold(0.0, f64::max)
    }

    /// Rows as nested vectors, top-level index = latency row
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.cells.chunks(self.cols).map(<[f64]>::to_vec).collect()
    }
}
