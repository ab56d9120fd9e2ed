//! Accumulate raw completion-latency histograms keyed by block size.
//!
//! Each fio job contributes one sample per block size. Samples from several
//! client runs are stored independently here and only combined later by the
//! density normaliser, once every input has been seen.

use crate::utils::config::{GridConfig, TimeUnit};
use crate::utils::error::GridError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The subset of [`GridConfig`] that governs ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct IngestSettings {
    pub time_unit: TimeUnit,
    pub log_scale: bool,
    pub max_block_size: u64,
    pub skip_block_sizes: BTreeSet<u64>,
}

impl From<&GridConfig> for IngestSettings {
    fn from(config: &GridConfig) -> Self {
        Self {
            time_unit: config.time_unit,
            log_scale: config.log_scale,
            max_block_size: config.max_block_size,
            skip_block_sizes: config.skip_block_sizes.clone(),
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self::from(&GridConfig::default())
    }
}

/// One histogram bin after unit scaling (and optional log10)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyPoint {
    pub latency: f64,
    pub count: f64,
}

/// A single benchmark run's histogram for one block size
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySample {
    /// Declared number of completions in this run
    pub total: u64,

    /// Bins in arrival order; the normaliser sorts them
    pub points: Vec<LatencyPoint>,
}

/// All samples received for one block-size exponent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockSeries {
    pub samples: Vec<LatencySample>,
    pub total_ios: u64,
}

impl BlockSeries {
    /// Combined occurrence weight used to normalise every sample of this block size
    pub fn weight(&self) -> f64 {
        self.total_ios as f64
    }
}

/// Grid extents, frozen once ingestion finishes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min_latency: f64,
    pub max_latency: f64,
    pub min_block_exp: u32,
    pub max_block_exp: u32,
}

impl GridBounds {
    /// Number of block-size columns spanned by these bounds
    pub fn columns(&self) -> usize {
        (self.max_block_exp - self.min_block_exp) as usize + 1
    }
}

/// Outcome of offering a series to the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// Block size is in the configured exclusion set
    Excluded,
    /// Block size is larger than the configured maximum
    AboveMaximum,
}

/// Immutable result of ingestion, keyed by block-size exponent
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedSeries {
    series: BTreeMap<u32, BlockSeries>,
    bounds: GridBounds,
}

impl AccumulatedSeries {
    pub fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    pub fn get(&self, block_exp: u32) -> Option<&BlockSeries> {
        self.series.get(&block_exp)
    }

    /// Series in ascending block-size order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &BlockSeries)> {
        self.series.iter().map(|(exp, series)| (*exp, series))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total completions across every block size, saturating at `u64::MAX`
    pub fn total_ios(&self) -> u64 {
        self.series
            .values()
            .fold(0u64, |acc, s| acc.saturating_add(s.total_ios))
    }
}

/// Block size in bytes for a column exponent
pub fn block_size_of(block_exp: u32) -> u64 {
    1u64 << block_exp
}

/// Integer base-2 exponent used as the grid column coordinate
///
/// Sizes that are not a power of two share the column of the next smaller one.
pub fn block_exponent(block_size: u64) -> Result<u32, GridError> {
    if block_size == 0 {
        return Err(GridError::InvalidBlockSize { block_size });
    }
    if !block_size.is_power_of_two() {
        warn!(
            "I/O size {} is not a power of two; placing it in column 2^{}",
            block_size,
            block_size.ilog2()
        );
    }
    Ok(block_size.ilog2())
}

/// Accumulator for raw histograms.
///
/// State is owned by the instance; [`ClatIngest::finish`] consumes it so that
/// no further samples can be added once normalisation begins.
#[derive(Debug, Clone)]
pub struct ClatIngest {
    settings: IngestSettings,
    series: BTreeMap<u32, BlockSeries>,
    min_latency: f64,
    max_latency: f64,
    min_block_exp: Option<u32>,
    max_block_exp: Option<u32>,
}

impl ClatIngest {
    pub fn new(settings: IngestSettings) -> Self {
        Self {
            settings,
            series: BTreeMap::new(),
            min_latency: f64::INFINITY,
            max_latency: 0.0,
            min_block_exp: None,
            max_block_exp: None,
        }
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Drop everything ingested so far, keeping the settings
    pub fn reset(&mut self) {
        self.series.clear();
        self.min_latency = f64::INFINITY;
        self.max_latency = 0.0;
        self.min_block_exp = None;
        self.max_block_exp = None;
    }

    /// Check whether a block size passes the configured filters
    pub fn admission(&self, block_size: u64) -> Admission {
        if self.settings.skip_block_sizes.contains(&block_size) {
            Admission::Excluded
        } else if block_size > self.settings.max_block_size {
            Admission::AboveMaximum
        } else {
            Admission::Accepted
        }
    }

    /// Add one sample for a block size
    ///
    /// # Arguments
    /// * `block_size` - I/O size in bytes
    /// * `total_ios` - Declared number of completions in the sample
    /// * `bins` - Histogram: latency label in nanoseconds -> completion count
    ///
    /// # Errors
    /// * `GridError::HistogramSumMismatch` - Bin counts do not add up to `total_ios`
    /// * `GridError::InvalidBinLabel` / `GridError::InvalidLatency` - Unusable bin key
    /// * `GridError::InvalidBlockSize` - Zero block size
    /// * `GridError::CountOverflow` - Completion counts do not fit in a `u64`
    pub fn add_series(
        &mut self,
        block_size: u64,
        total_ios: u64,
        bins: &BTreeMap<String, u64>,
    ) -> Result<Admission, GridError> {
        let admission = self.admission(block_size);
        if admission != Admission::Accepted {
            debug!("I/O size {}: not ingested ({:?})", block_size, admission);
            return Ok(admission);
        }

        let block_exp = block_exponent(block_size)?;

        // Paranoia: the declared total must match the histogram exactly
        let sum = bins
            .values()
            .try_fold(0u64, |acc, &count| acc.checked_add(count))
            .ok_or(GridError::CountOverflow { block_size })?;
        if sum != total_ios {
            return Err(GridError::HistogramSumMismatch {
                block_size,
                sum,
                expected: total_ios,
            });
        }

        let block_total = self
            .series
            .get(&block_exp)
            .map_or(0, |series| series.total_ios)
            .checked_add(total_ios)
            .ok_or(GridError::CountOverflow { block_size })?;

        let points = bins
            .iter()
            .map(|(label, count)| {
                Ok(LatencyPoint {
                    latency: self.transform_latency(block_size, label)?,
                    count: *count as f64,
                })
            })
            .collect::<Result<Vec<_>, GridError>>()?;

        for point in &points {
            self.min_latency = self.min_latency.min(point.latency);
            self.max_latency = self.max_latency.max(point.latency);
        }
        self.min_block_exp = Some(self.min_block_exp.map_or(block_exp, |m| m.min(block_exp)));
        self.max_block_exp = Some(self.max_block_exp.map_or(block_exp, |m| m.max(block_exp)));

        let series = self.series.entry(block_exp).or_default();
        series.samples.push(LatencySample {
            total: total_ios,
            points,
        });
        series.total_ios = block_total;

        debug!(
            "I/O size {}: sample {} with {} bins, {} I/Os",
            block_size,
            series.samples.len(),
            bins.len(),
            total_ios
        );

        Ok(Admission::Accepted)
    }

    /// Freeze bounds and hand the samples to the normaliser
    ///
    /// # Errors
    /// * `GridError::NoSeries` - Nothing was ingested
    pub fn finish(self) -> Result<AccumulatedSeries, GridError> {
        let (Some(min_block_exp), Some(max_block_exp)) = (self.min_block_exp, self.max_block_exp)
        else {
            return Err(GridError::NoSeries);
        };

        let bounds = GridBounds {
            min_latency: self.min_latency,
            max_latency: self.max_latency,
            min_block_exp,
            max_block_exp,
        };

        debug!("Frozen grid bounds: {:?}", bounds);

        Ok(AccumulatedSeries {
            series: self.series,
            bounds,
        })
    }

    /// Map a nanosecond bin label onto the latency axis
    fn transform_latency(&self, block_size: u64, label: &str) -> Result<f64, GridError> {
        let raw: f64 = label
            .trim()
            .parse()
            .map_err(|_| GridError::InvalidBinLabel {
                block_size,
                label: label.to_string(),
            })?;

        let mut latency = raw / self.settings.time_unit.divider();
        if self.settings.log_scale {
            latency = latency.log10();
        }

        if !latency.is_finite() {
            return Err(GridError::InvalidLatency {
                block_size,
                label: label.to_string(),
                latency,
            });
        }

        Ok(latency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bins(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_transform_micro() {
        let ingest = ClatIngest::new(IngestSettings::default());
        assert_eq!(ingest.transform_latency(4096, "25000").unwrap(), 25.0);
    }

    #[test]
    fn test_transform_log_of_zero_is_rejected() {
        let settings = IngestSettings {
            log_scale: true,
            ..Default::default()
        };
        let ingest = ClatIngest::new(settings);
        assert!(matches!(
            ingest.transform_latency(4096, "0"),
            Err(GridError::InvalidLatency { .. })
        ));
    }

    #[test]
    fn test_bin_count_overflow() {
        let mut ingest = ClatIngest::new(IngestSettings::default());
        let result = ingest.add_series(4096, 1, &bins(&[("1000", u64::MAX), ("2000", 2)]));
        assert_eq!(result, Err(GridError::CountOverflow { block_size: 4096 }));
    }

    #[test]
    fn test_block_total_overflow_leaves_state_untouched() {
        let mut ingest = ClatIngest::new(IngestSettings::default());
        ingest
            .add_series(4096, u64::MAX, &bins(&[("1000", u64::MAX)]))
            .unwrap();
        let result = ingest.add_series(4096, 1, &bins(&[("9000", 1)]));
        assert_eq!(result, Err(GridError::CountOverflow { block_size: 4096 }));

        let series = ingest.finish().unwrap();
        assert_eq!(series.get(12).unwrap().samples.len(), 1);
        assert_eq!(series.bounds().max_latency, 1.0);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut ingest = ClatIngest::new(IngestSettings::default());
        ingest
            .add_series(4096, 10, &bins(&[("1000", 10)]))
            .unwrap();
        ingest.reset();
        assert!(matches!(ingest.finish(), Err(GridError::NoSeries)));
    }

    #[test]
    fn test_block_exponent_floors() {
        assert_eq!(block_exponent(4096).unwrap(), 12);
        assert_eq!(block_exponent(6144).unwrap(), 12);
        assert!(block_exponent(0).is_err());
    }
}
