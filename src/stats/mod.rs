//! Statistical reductions over score groups.
//!
//! Missing scores are carried as `NaN` and every function here skips them,
//! the same way `nanmedian`/`nanmean` do. A group with no present values
//! reduces to `NaN`.
//!
//! - [`Aggregation`]: the closed set of reductions used for frame and track
//!   aggregation
//! - [`median`], [`mean`]: NaN-skipping reductions
//! - [`Summary`]: descriptive statistics for reporting

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Reduction applied when collapsing frames into tracks or tracks into a
/// single score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Arithmetic mean of present values.
    Mean,
    /// Median of present values.
    #[default]
    Median,
}

impl Aggregation {
    /// Reduce a group of scores, skipping missing (`NaN`) values.
    #[must_use]
    pub fn reduce(self, values: &[f64]) -> f64 {
        match self {
            Self::Mean => mean(values),
            Self::Median => median(values),
        }
    }

    /// Name as accepted by [`FromStr`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Aggregation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            _ => Err(Error::UnsupportedAggregation(s.to_string())),
        }
    }
}

/// Descriptive statistics for a set of scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Number of present values.
    pub count: usize,
    /// Number of missing values that were skipped.
    pub missing: usize,
    /// Mean value.
    pub mean: f64,
    /// Median value.
    pub median: f64,
    /// Standard deviation.
    pub std_dev: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// 5th percentile.
    pub p5: f64,
    /// 25th percentile.
    pub p25: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 95th percentile.
    pub p95: f64,
}

impl Summary {
    /// Compute summary statistics for a slice of values.
    ///
    /// Returns `None` if no value is present.
    #[must_use]
    pub fn compute(values: &[f64]) -> Option<Self> {
        let sorted = present_sorted(values);
        if sorted.is_empty() {
            return None;
        }

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;

        let variance: f64 = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            missing: values.len() - count,
            mean,
            median: percentile_sorted(&sorted, 0.5),
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
            p5: percentile_sorted(&sorted, 0.05),
            p25: percentile_sorted(&sorted, 0.25),
            p75: percentile_sorted(&sorted, 0.75),
            p95: percentile_sorted(&sorted, 0.95),
        })
    }
}

//=============================================================================
// Core Statistical Functions
//=============================================================================

/// Compute median of the present values of a slice.
///
/// For an even number of present values, returns the average of the two
/// middle values.
///
/// # Example
///
/// ```
/// use sep_eval::stats::median;
///
/// assert_eq!(median(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
/// assert_eq!(median(&[1.0, f64::NAN, 3.0]), 2.0);
/// assert!(median(&[f64::NAN]).is_nan());
/// ```
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    let sorted = present_sorted(values);
    if sorted.is_empty() {
        return f64::NAN;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Compute arithmetic mean of the present values of a slice.
///
/// # Example
///
/// ```
/// use sep_eval::stats::mean;
///
/// assert!((mean(&[1.0, 2.0, f64::NAN, 5.0]) - 8.0 / 3.0).abs() < 0.001);
/// assert!(mean(&[]).is_nan());
/// ```
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return f64::NAN;
    }
    sum / count as f64
}

fn present_sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Linear interpolation percentile (R-7) over pre-sorted values, `p` in 0-1.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let p = p.clamp(0.0, 1.0);

    let idx = p * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[5.0]), 5.0);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_median_skips_missing() {
        assert_eq!(median(&[1.0, f64::NAN, 3.0]), 2.0);
        assert_eq!(median(&[f64::NAN, 2.0]), 2.0);
        assert!(median(&[f64::NAN, f64::NAN]).is_nan());
    }

    #[test]
    fn test_mean_skips_missing() {
        assert_eq!(mean(&[1.0, 3.0]), 2.0);
        assert_eq!(mean(&[1.0, f64::NAN, 3.0]), 2.0);
        assert!(mean(&[f64::NAN]).is_nan());
    }

    #[test]
    fn test_aggregation_from_str() {
        assert_eq!("median".parse::<Aggregation>().unwrap(), Aggregation::Median);
        assert_eq!("Mean".parse::<Aggregation>().unwrap(), Aggregation::Mean);

        let err = "mode".parse::<Aggregation>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedAggregation(ref name) if name == "mode"));
    }

    #[test]
    fn test_aggregation_reduce() {
        let values = [1.0, 2.0, 9.0];
        assert_eq!(Aggregation::Median.reduce(&values), 2.0);
        assert_eq!(Aggregation::Mean.reduce(&values), 4.0);
        assert_eq!(Aggregation::default(), Aggregation::Median);
    }

    #[test]
    fn test_summary_compute() {
        let values = vec![1.0, 2.0, f64::NAN, 3.0, 4.0, 5.0];
        let summary = Summary::compute(&values).unwrap();

        assert_eq!(summary.count, 5);
        assert_eq!(summary.missing, 1);
        assert!((summary.mean - 3.0).abs() < 0.001);
        assert!((summary.median - 3.0).abs() < 0.001);
        assert!((summary.min - 1.0).abs() < 0.001);
        assert!((summary.max - 5.0).abs() < 0.001);
        assert!((summary.p25 - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_summary_empty() {
        assert!(Summary::compute(&[]).is_none());
        assert!(Summary::compute(&[f64::NAN]).is_none());
    }
}
