//! Tabular dumps of raw fio results.
//!
//! For every job of every parsed result, rows are appended to three
//! whitespace-separated files in the output directory:
//! - `<mode>-bandwidth.dat`: block size, read and write bandwidth
//! - `<mode>-iops-latency.dat`: block size, IOPS and clat percentiles
//! - `<mode>-clat.dat`: log2(block size), bin latency (ns), count; one blank
//!   line after each job so gnuplot treats jobs as separate blocks

use crate::parser::fio::FioJob;
use crate::utils::config::{IoMode, PERCENTILE_KEYS};
use crate::utils::error::OutputError;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends job rows to the `.dat` files of one output directory
#[derive(Debug, Clone)]
pub struct TableWriter {
    dir: PathBuf,
    mode: IoMode,
}

impl TableWriter {
    pub fn new(dir: impl Into<PathBuf>, mode: IoMode) -> Self {
        Self {
            dir: dir.into(),
            mode,
        }
    }

    pub fn bandwidth_path(&self) -> PathBuf {
        self.dir.join(format!("{}-bandwidth.dat", self.mode))
    }

    pub fn iops_latency_path(&self) -> PathBuf {
        self.dir.join(format!("{}-iops-latency.dat", self.mode))
    }

    pub fn clat_path(&self) -> PathBuf {
        self.dir.join(format!("{}-clat.dat", self.mode))
    }

    /// Append all three tables' rows for one job
    pub fn append_job(&self, block_size: u64, job: &FioJob) -> Result<(), OutputError> {
        let stats = job.stats(self.mode);

        let mut out = open_append(&self.bandwidth_path())?;
        writeln!(out, "{:8}\t{:8}\t{:8}", block_size, job.read.bw, job.write.bw)?;
        out.flush()?;

        let percentiles: Vec<String> = PERCENTILE_KEYS
            .iter()
            .map(|key| {
                stats
                    .clat_ns
                    .percentile
                    .get(*key)
                    .map_or_else(|| "-".to_string(), |v| v.to_string())
            })
            .collect();
        let mut out = open_append(&self.iops_latency_path())?;
        writeln!(
            out,
            "{:8}\t{:8}\t{}",
            block_size,
            stats.iops,
            percentiles.join("\t")
        )?;
        out.flush()?;

        // Keys are strings in the JSON; sort them numerically
        let mut bins: Vec<(u64, u64)> = stats
            .clat_ns
            .bins
            .iter()
            .filter_map(|(label, count)| label.trim().parse::<u64>().ok().map(|ns| (ns, *count)))
            .collect();
        bins.sort_unstable();

        let log_bs = (block_size as f64).log2();
        let mut out = open_append(&self.clat_path())?;
        for (bin_ns, count) in bins {
            writeln!(out, "{:8}\t{:10}\t{:8}", log_bs, bin_ns, count)?;
        }
        writeln!(out)?;
        out.flush()?;

        Ok(())
    }
}

fn open_append(path: &Path) -> Result<BufWriter<File>, OutputError> {
    super::ensure_parent(path)?;
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}
