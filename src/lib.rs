//! fio clat grid
//!
//! Aggregates fio completion-latency histograms, collected at several
//! block sizes, into a single latency x block-size density grid and
//! renders it as a heatmap.
//!
//! This crate provides the core implementation for the `clat-grid` CLI tool.
//!
//! ## Pipeline
//!
//! ```ignore
//! let mut ingest = ClatIngest::new(IngestSettings::default());
//! ingest.add_series(4096, 100, &bins)?;
//! let series = ingest.finish()?;
//! let field = normalize(&series)?;
//! let grid = resample(&field, 100, series.bounds())?;
//! ```

pub mod aggregator;
pub mod commands;
pub mod heatmap;
pub mod output;
pub mod parser;
pub mod utils;
