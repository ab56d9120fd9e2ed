//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while discovering and parsing fio result files.
///
/// A failure on a single file is recoverable: the caller logs it and moves on.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Could not access input directory {path}: {source}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid result format: {0}")]
    InvalidFormat(String),

    #[error("Invalid block size: {0}")]
    InvalidBlockSize(String),
}

/// Errors in user-supplied configuration. Raised before any ingestion.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown time unit '{0}' (expected 'us' or 'ms')")]
    InvalidTimeUnit(String),

    #[error("Unknown I/O mode '{0}' (expected 'read' or 'write')")]
    InvalidMode(String),

    #[error("Unknown colormap '{0}' (expected 'copper', 'gray' or 'hot')")]
    InvalidColormap(String),

    #[error("Grid row count must be greater than 0")]
    InvalidRowCount,

    #[error("Maximum block size must be greater than 0")]
    InvalidMaxBlockSize,

    #[error("Config TOML parse error: {0}")]
    TomlParseFailed(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Data-integrity faults in the aggregation pipeline.
///
/// Every variant is fatal: the run aborts rather than renormalising bad data.
#[derive(Error, Debug, PartialEq)]
pub enum GridError {
    #[error("I/O size {block_size}: block size must be greater than 0")]
    InvalidBlockSize { block_size: u64 },

    #[error("I/O size {block_size}: sum of histogram bins is {sum}, expected {expected}")]
    HistogramSumMismatch {
        block_size: u64,
        sum: u64,
        expected: u64,
    },

    #[error("I/O size {block_size}: completion counts overflow")]
    CountOverflow { block_size: u64 },

    #[error("I/O size {block_size}: histogram bin label '{label}' is not numeric")]
    InvalidBinLabel { block_size: u64, label: String },

    #[error("I/O size {block_size}: bin '{label}' maps to non-finite latency {latency}")]
    InvalidLatency {
        block_size: u64,
        label: String,
        latency: f64,
    },

    #[error("I/O size {block_size}: non-positive interval width between {lower} and {upper}")]
    NonPositiveWidth {
        block_size: u64,
        lower: f64,
        upper: f64,
    },

    #[error("I/O size {block_size}: density interval ({lower}, {upper}) is out of order")]
    UnorderedIntervals {
        block_size: u64,
        lower: f64,
        upper: f64,
    },

    #[error(
        "CHECK FAILED: blocksize {block_size} cumulative density {density_total} cumulative grid {grid_total}"
    )]
    ConservationFailed {
        block_size: u64,
        density_total: f64,
        grid_total: f64,
    },

    #[error("Grid row count must be greater than 0")]
    InvalidRowCount,

    #[error("Latency bounds are degenerate (max latency {max_latency})")]
    DegenerateBounds { max_latency: f64 },

    #[error("No histogram series were ingested")]
    NoSeries,
}

/// Errors that can occur during heatmap rendering
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Grid has no populated cells")]
    EmptyGrid,
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
