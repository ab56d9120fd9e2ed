//! Configuration and constants for the CLI.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Current grid report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default number of latency rows in the grid
pub const DEFAULT_GRID_ROWS: usize = 100;

/// Default largest block size (bytes) admitted into the grid
pub const DEFAULT_MAX_BLOCK_SIZE: u64 = 65_536;

/// Allowed deviation from unit mass per block size
pub const CONSERVATION_TOLERANCE: f64 = 0.001;

/// Default heatmap file name inside the output directory
pub const DEFAULT_HEATMAP_FILENAME: &str = "blob.svg";

/// Grid report file name inside the output directory
pub const GRID_REPORT_FILENAME: &str = "grid.json";

// fio percentile keys emitted into the iops-latency table, in column order
pub const PERCENTILE_KEYS: &[&str] = &[
    "1.000000",
    "5.000000",
    "10.000000",
    "20.000000",
    "30.000000",
    "40.000000",
    "50.000000",
    "60.000000",
    "70.000000",
    "80.000000",
    "90.000000",
    "95.000000",
    "99.000000",
    "99.500000",
    "99.900000",
    "99.950000",
    "99.990000",
];

/// Time unit used for the latency axis.
///
/// fio reports completion latencies in nanoseconds; the divider scales them
/// into the display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeUnit {
    #[default]
    #[serde(rename = "us")]
    Micro,
    #[serde(rename = "ms")]
    Milli,
}

impl TimeUnit {
    pub fn divider(self) -> f64 {
        match self {
            TimeUnit::Micro => 1e3,
            TimeUnit::Milli => 1e6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Micro => "µs",
            TimeUnit::Milli => "ms",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Micro => "us",
            TimeUnit::Milli => "ms",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "us" => Ok(TimeUnit::Micro),
            "ms" => Ok(TimeUnit::Milli),
            other => Err(ConfigError::InvalidTimeUnit(other.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of each fio job is aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoMode {
    #[default]
    Read,
    Write,
}

impl IoMode {
    pub fn as_str(self) -> &'static str {
        match self {
            IoMode::Read => "read",
            IoMode::Write => "write",
        }
    }
}

impl FromStr for IoMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(IoMode::Read),
            "write" => Ok(IoMode::Write),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for IoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings consumed by the aggregation pipeline.
///
/// Every field has a default, so a TOML file only needs the keys it overrides:
///
/// ```toml
/// time_unit = "ms"
/// log_scale = true
/// rows = 200
/// skip_block_sizes = [512]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub time_unit: TimeUnit,
    pub log_scale: bool,
    pub rows: usize,
    pub max_block_size: u64,
    pub skip_block_sizes: BTreeSet<u64>,
    pub mode: IoMode,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            time_unit: TimeUnit::Micro,
            log_scale: false,
            rows: DEFAULT_GRID_ROWS,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            skip_block_sizes: BTreeSet::new(),
            mode: IoMode::Read,
        }
    }
}

impl GridConfig {
    /// Reject settings that would make the grid meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::InvalidRowCount);
        }
        if self.max_block_size == 0 {
            return Err(ConfigError::InvalidMaxBlockSize);
        }
        Ok(())
    }
}

/// Load grid settings from a TOML file
///
/// # Errors
/// * `ConfigError::IoError` - If file cannot be read
/// * `ConfigError::TomlParseFailed` - If TOML is invalid
/// * Any validation error from [`GridConfig::validate`]
pub fn load_config(path: impl AsRef<Path>) -> Result<GridConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: GridConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
