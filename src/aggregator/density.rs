//! Turn accumulated histograms into piecewise-constant probability densities.
//!
//! We may have sampled multiple results per block size. Each sample is walked
//! independently and weighted by the combined occurrence count of its block
//! size, so concatenating the runs yields a density that integrates to 1.

use super::ingest::{block_size_of, AccumulatedSeries, LatencySample};
use crate::utils::error::GridError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Constant probability density over `[lower, upper)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityInterval {
    pub lower: f64,
    pub upper: f64,
    pub density: f64,
}

impl DensityInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Probability mass carried by this interval
    pub fn mass(&self) -> f64 {
        self.density * self.width()
    }
}

/// Density functions for every block size, keyed by block-size exponent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DensityField {
    blocks: BTreeMap<u32, Vec<DensityInterval>>,
}

impl DensityField {
    pub fn get(&self, block_exp: u32) -> Option<&[DensityInterval]> {
        self.blocks.get(&block_exp).map(Vec::as_slice)
    }

    /// Interval lists in ascending block-size order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[DensityInterval])> {
        self.blocks.iter().map(|(exp, ivs)| (*exp, ivs.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub(crate) fn insert(&mut self, block_exp: u32, intervals: Vec<DensityInterval>) {
        self.blocks.insert(block_exp, intervals);
    }
}

/// Build weighted density intervals for every ingested block size
///
/// # Errors
/// * `GridError::NonPositiveWidth` - Two bins of a sample share a latency,
///   or a latency lies at or below zero
pub fn normalize(series: &AccumulatedSeries) -> Result<DensityField, GridError> {
    let mut field = DensityField::default();

    for (block_exp, block) in series.iter() {
        let block_size = block_size_of(block_exp);
        let weight = block.weight();

        let mut intervals = Vec::new();
        for sample in &block.samples {
            sample_intervals(block_size, sample, weight, &mut intervals)?;
        }

        debug!(
            "I/O size {}: {} samples -> {} density intervals",
            block_size,
            block.samples.len(),
            intervals.len()
        );

        field.insert(block_exp, intervals);
    }

    Ok(field)
}

/// Walk one sample's bins in latency order, emitting one interval per bin
fn sample_intervals(
    block_size: u64,
    sample: &LatencySample,
    weight: f64,
    out: &mut Vec<DensityInterval>,
) -> Result<(), GridError> {
    let mut points = sample.points.clone();
    points.sort_by(|a, b| a.latency.total_cmp(&b.latency));

    let mut prev = 0.0;
    for point in points {
        let width = point.latency - prev;
        if width <= 0.0 {
            return Err(GridError::NonPositiveWidth {
                block_size,
                lower: prev,
                upper: point.latency,
            });
        }

        out.push(DensityInterval {
            lower: prev,
            upper: point.latency,
            density: (point.count / weight) / width,
        });
        prev = point.latency;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ingest::LatencyPoint;

    fn sample(points: &[(f64, f64)]) -> LatencySample {
        LatencySample {
            total: points.iter().map(|(_, c)| *c as u64).sum(),
            points: points
                .iter()
                .map(|&(latency, count)| LatencyPoint { latency, count })
                .collect(),
        }
    }

    #[test]
    fn test_sample_intervals_sorted() {
        let mut out = Vec::new();
        sample_intervals(4096, &sample(&[(20.0, 40.0), (10.0, 60.0)]), 100.0, &mut out).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].lower, 0.0);
        assert_eq!(out[0].upper, 10.0);
        assert!((out[0].density - 0.06).abs() < 1e-12);
        assert_eq!(out[1].lower, 10.0);
        assert!((out[1].density - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_latency_is_fatal() {
        let mut out = Vec::new();
        let result = sample_intervals(512, &sample(&[(5.0, 1.0), (5.0, 2.0)]), 3.0, &mut out);
        assert_eq!(
            result,
            Err(GridError::NonPositiveWidth {
                block_size: 512,
                lower: 5.0,
                upper: 5.0
            })
        );
    }

    #[test]
    fn test_zero_latency_is_fatal() {
        let mut out = Vec::new();
        let result = sample_intervals(512, &sample(&[(0.0, 1.0)]), 1.0, &mut out);
        assert!(matches!(result, Err(GridError::NonPositiveWidth { .. })));
    }

    #[test]
    fn test_interval_mass() {
        let iv = DensityInterval {
            lower: 2.0,
            upper: 6.0,
            density: 0.125,
        };
        assert_eq!(iv.width(), 4.0);
        assert_eq!(iv.mass(), 0.5);
    }
}
