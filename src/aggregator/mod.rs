//! Aggregation of latency histograms into a regular density grid.
//!
//! This module transforms parsed fio results into:
//! - Per-block-size sample accumulations (ingest)
//! - Weighted piecewise-constant densities (density)
//! - A uniform latency x block-size matrix with conservation checks (resample)

pub mod density;
pub mod grid;
pub mod ingest;
pub mod resample;

// Re-export main types and functions
pub use density::{normalize, DensityField, DensityInterval};
pub use grid::Grid;
pub use ingest::{
    block_exponent, block_size_of, AccumulatedSeries, Admission, BlockSeries, ClatIngest,
    GridBounds, IngestSettings, LatencyPoint, LatencySample,
};
pub use resample::{resample, ConservationCheck, RowOverlaps};
