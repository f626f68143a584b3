//! Descriptive statistics shared by the interval estimators.
//!
//! Every empirical interval in the engine (per-tree forest spread, bagging
//! spread, neighbor price spread) is reduced with the same two operations:
//! the sample mean and the linear-interpolation percentile (R-7 method,
//! Hyndman & Fan 1996). Implementing them once keeps the three interval
//! methods comparable.

use crate::error::{NarxError, Result};
use serde::{Deserialize, Serialize};

/// Arithmetic mean of a sample.
///
/// Returns 0.0 for an empty sample; callers that must reject empty samples
/// do so before aggregating (see [`EmpiricalInterval::from_sample`]).
#[must_use]
pub fn mean(sample: &[f32]) -> f32 {
    if sample.is_empty() {
        return 0.0;
    }
    sample.iter().sum::<f32>() / sample.len() as f32
}

/// Percentile of a sample using linear interpolation between the two
/// nearest ranks of the sorted sample (R-7 method, numpy default).
///
/// For a sample of size 1 every percentile is that single value.
///
/// # Errors
///
/// Returns an error if the sample is empty or `p` is outside `[0, 100]`.
///
/// # Examples
///
/// ```
/// use narx::stats::percentile;
///
/// let sample = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(percentile(&sample, 50.0).unwrap(), 3.0);
/// assert_eq!(percentile(&sample, 0.0).unwrap(), 1.0);
/// assert_eq!(percentile(&sample, 100.0).unwrap(), 5.0);
/// ```
pub fn percentile(sample: &[f32], p: f64) -> Result<f32> {
    if sample.is_empty() {
        return Err(NarxError::empty_input("percentile sample"));
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(NarxError::InvalidParameter {
            param: "p".to_string(),
            value: format!("{p}"),
            constraint: "0..=100".to_string(),
        });
    }

    let n = sample.len();
    if n == 1 {
        return Ok(sample[0]);
    }

    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| {
        a.partial_cmp(b)
            .expect("f32 values should be comparable (not NaN)")
    });

    // h = (n - 1) * q, interpolate between floor and ceil ranks
    let h = (n - 1) as f64 * (p / 100.0);
    let h_floor = h.floor() as usize;
    let h_ceil = h.ceil() as usize;

    if h_floor == h_ceil {
        return Ok(sorted[h_floor]);
    }

    let fraction = (h - h_floor as f64) as f32;
    Ok(sorted[h_floor] + fraction * (sorted[h_ceil] - sorted[h_floor]))
}

/// A 95% empirical interval around the sample mean.
///
/// Bounds are the 2.5th and 97.5th percentiles of the observed sample and
/// the point value is the mean of the same sample, so
/// `lower <= mean <= upper` holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalInterval {
    /// Sample mean
    pub mean: f32,
    /// 2.5th percentile of the sample
    pub lower: f32,
    /// 97.5th percentile of the sample
    pub upper: f32,
}

impl EmpiricalInterval {
    /// Summarizes a prediction sample into mean and 95% percentile bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample is empty.
    pub fn from_sample(sample: &[f32]) -> Result<Self> {
        if sample.is_empty() {
            return Err(NarxError::empty_input("interval sample"));
        }
        Ok(Self {
            mean: mean(sample),
            lower: percentile(sample, 2.5)?,
            upper: percentile(sample, 97.5)?,
        })
    }
}

/// Histogram with uniform bin edges and per-bin counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin edges (length = `n_bins` + 1)
    pub edges: Vec<f32>,
    /// Bin counts (length = `n_bins`)
    pub counts: Vec<usize>,
}

/// Builds a histogram with `n_bins` equal-width bins spanning the sample
/// range. The last bin is closed on the right so the maximum is counted.
///
/// # Errors
///
/// Returns an error if the sample is empty or `n_bins` is zero.
pub fn histogram(sample: &[f32], n_bins: usize) -> Result<Histogram> {
    if sample.is_empty() {
        return Err(NarxError::empty_input("histogram sample"));
    }
    if n_bins == 0 {
        return Err(NarxError::InvalidParameter {
            param: "n_bins".to_string(),
            value: "0".to_string(),
            constraint: ">= 1".to_string(),
        });
    }

    let min = sample.iter().copied().fold(f32::INFINITY, f32::min);
    let max = sample.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    // Degenerate sample: widen the range by half a unit on each side so the
    // bins stay well-formed (numpy convention).
    let (lo, hi) = if (max - min).abs() < f32::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };

    let width = (hi - lo) / n_bins as f32;
    let edges: Vec<f32> = (0..=n_bins).map(|i| lo + width * i as f32).collect();
    let mut counts = vec![0; n_bins];
    for &v in sample {
        let mut idx = ((v - lo) / width) as usize;
        if idx >= n_bins {
            idx = n_bins - 1;
        }
        counts[idx] += 1;
    }

    Ok(Histogram { edges, counts })
}
