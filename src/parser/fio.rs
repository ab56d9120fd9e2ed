//! Discovery and parsing of fio `json+` result files.
//!
//! One result file describes one fio invocation at a single block size. A
//! file that cannot be read or parsed is skipped with a warning: one bad
//! file should not abort a batch of otherwise valid results.

use crate::utils::config::IoMode;
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Parsed results grouped by block size (bytes)
pub type ResultSet = BTreeMap<u64, Vec<FioRun>>;

/// Block size as fio prints it: a plain number or a string such as "4k"
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BlockSizeField {
    Number(u64),
    Text(String),
}

impl BlockSizeField {
    pub fn bytes(&self) -> Result<u64, ParseError> {
        match self {
            BlockSizeField::Number(n) => Ok(*n),
            BlockSizeField::Text(s) => parse_block_size(s),
        }
    }
}

/// Options block carrying the block size
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FioOptions {
    #[serde(default)]
    pub bs: Option<BlockSizeField>,
}

/// Completion latency statistics in nanoseconds
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClatStats {
    #[serde(default)]
    pub percentile: BTreeMap<String, f64>,

    /// Histogram: bin latency (ns) -> completions
    #[serde(default)]
    pub bins: BTreeMap<String, u64>,
}

/// Per-direction statistics of one job
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobStats {
    #[serde(default)]
    pub bw: f64,

    #[serde(default)]
    pub iops: f64,

    #[serde(default)]
    pub total_ios: u64,

    #[serde(default)]
    pub clat_ns: ClatStats,
}

/// One fio job (one client run)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FioJob {
    #[serde(default)]
    pub jobname: String,

    #[serde(default, rename = "job options")]
    pub job_options: FioOptions,

    #[serde(default)]
    pub read: JobStats,

    #[serde(default)]
    pub write: JobStats,
}

impl FioJob {
    pub fn stats(&self, mode: IoMode) -> &JobStats {
        match mode {
            IoMode::Read => &self.read,
            IoMode::Write => &self.write,
        }
    }
}

/// A whole fio result file
#[derive(Debug, Clone, Deserialize)]
pub struct FioRun {
    #[serde(default, rename = "global options")]
    pub global_options: FioOptions,

    #[serde(default)]
    pub jobs: Vec<FioJob>,
}

impl FioRun {
    /// Block size of this run, from the global options or the first job
    pub fn block_size(&self) -> Result<u64, ParseError> {
        let field = self
            .global_options
            .bs
            .as_ref()
            .or_else(|| self.jobs.iter().find_map(|job| job.job_options.bs.as_ref()))
            .ok_or_else(|| ParseError::InvalidFormat("no 'bs' option found".to_string()))?;

        let bytes = field.bytes()?;
        if bytes == 0 {
            return Err(ParseError::InvalidBlockSize("0".to_string()));
        }
        Ok(bytes)
    }
}

/// Parse a fio size string such as "4096", "4k", "1M" or "4KiB"
///
/// For read,write pairs ("4k,64k") the first entry is used.
pub fn parse_block_size(raw: &str) -> Result<u64, ParseError> {
    let first = raw.split(',').next().unwrap_or(raw).trim().to_ascii_lowercase();
    let trimmed = first
        .strip_suffix("ib")
        .or_else(|| first.strip_suffix('b'))
        .unwrap_or(&first);

    let (digits, multiplier) = match trimmed.chars().last() {
        Some('k') => (&trimmed[..trimmed.len() - 1], 1u64 << 10),
        Some('m') => (&trimmed[..trimmed.len() - 1], 1u64 << 20),
        Some('g') => (&trimmed[..trimmed.len() - 1], 1u64 << 30),
        _ => (trimmed, 1),
    };

    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| ParseError::InvalidBlockSize(raw.to_string()))
}

/// Parse fio JSON from a string
pub fn parse_run_str(contents: &str) -> Result<FioRun, ParseError> {
    Ok(serde_json::from_str(contents)?)
}

/// Read and parse one result file
pub fn parse_result_file(path: impl AsRef<Path>) -> Result<FioRun, ParseError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ParseError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_run_str(&contents)
}

/// List the regular files of an input directory, sorted by path
///
/// # Errors
/// * `ParseError::DirectoryAccess` - Directory cannot be listed; this is fatal
///   for the run, unlike a bad individual file
pub fn list_result_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ParseError> {
    let dir = dir.as_ref();
    let access = |source: std::io::Error| ParseError::DirectoryAccess {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(access)? {
        let path = entry.map_err(access)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    debug!("Found {} candidate files in {}", files.len(), dir.display());
    Ok(files)
}

/// Parse every file, skipping the ones that fail, and group runs by block size
pub fn collect_results(files: &[PathBuf]) -> ResultSet {
    let mut results = ResultSet::new();

    for file in files {
        let parsed = parse_result_file(file).and_then(|run| Ok((run.block_size()?, run)));
        match parsed {
            Ok((block_size, run)) => {
                debug!("{}: block size {}, {} jobs", file.display(), block_size, run.jobs.len());
                results.entry(block_size).or_default().push(run);
            }
            Err(e) => warn!("Skipping {}: {}", file.display(), e),
        }
    }

    results
}
