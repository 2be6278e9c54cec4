//! Coverage
//!
//! Empirical coverage diagnostics. Marginal coverage is the aggregate
//! fraction of labels inside their intervals; local coverage restricts the
//! estimate to a sliding window over the feature domain, which exposes the
//! non-uniformity a marginal guarantee does not prevent.
use crate::data::Interval;
use crate::errors::ConformalError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// The outcome of a windowed coverage estimate. A window with too few
/// points reports `Undefined` rather than a noisy fraction, so missing
/// estimates can never silently fold into aggregate statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LocalCoverage {
    /// The window held enough points for a meaningful estimate.
    Estimated {
        /// Fraction of labels inside their interval, endpoints included.
        coverage: f64,
        /// Number of points in the window.
        n_points: usize,
    },
    /// Fewer than the minimum number of points fell in the window.
    Undefined {
        /// Number of points in the window.
        n_points: usize,
    },
}

impl LocalCoverage {
    /// The estimate, if one was defined for this window.
    pub fn coverage(&self) -> Option<f64> {
        match self {
            LocalCoverage::Estimated { coverage, .. } => Some(*coverage),
            LocalCoverage::Undefined { .. } => None,
        }
    }

    /// Number of points that fell in the window.
    pub fn n_points(&self) -> usize {
        match self {
            LocalCoverage::Estimated { n_points, .. } | LocalCoverage::Undefined { n_points } => *n_points,
        }
    }
}

fn validate_aligned(intervals: &[Interval], y: &[f64]) -> Result<(), ConformalError> {
    if intervals.len() != y.len() {
        return Err(ConformalError::LengthMismatch(
            "intervals".to_string(),
            intervals.len(),
            "y".to_string(),
            y.len(),
        ));
    }
    Ok(())
}

/// Fraction of labels inside their predicted interval over the whole set,
/// endpoints included.
pub fn marginal_coverage(intervals: &[Interval], y: &[f64]) -> Result<f64, ConformalError> {
    validate_aligned(intervals, y)?;
    if y.is_empty() {
        return Err(ConformalError::EmptySet("evaluation".to_string()));
    }
    let hits = intervals
        .iter()
        .zip(y)
        .filter(|(interval, y_)| interval.contains(**y_))
        .count();
    Ok((hits as f64) / (y.len() as f64))
}

/// Empirical coverage restricted to points whose location falls within
/// `[center - radius, center + radius]`.
///
/// Returns [`LocalCoverage::Undefined`] when fewer than `min_points`
/// locations land in the window.
pub fn local_coverage(
    intervals: &[Interval],
    y: &[f64],
    x: &[f64],
    center: f64,
    radius: f64,
    min_points: usize,
) -> Result<LocalCoverage, ConformalError> {
    validate_aligned(intervals, y)?;
    if x.len() != y.len() {
        return Err(ConformalError::LengthMismatch(
            "x".to_string(),
            x.len(),
            "y".to_string(),
            y.len(),
        ));
    }

    let low = center - radius;
    let high = center + radius;
    let mut n_points = 0usize;
    let mut hits = 0usize;
    for ((interval, y_), x_) in intervals.iter().zip(y).zip(x) {
        if *x_ < low || *x_ > high {
            continue;
        }
        n_points += 1;
        if interval.contains(*y_) {
            hits += 1;
        }
    }

    if n_points < min_points {
        return Ok(LocalCoverage::Undefined { n_points });
    }
    Ok(LocalCoverage::Estimated {
        coverage: (hits as f64) / (n_points as f64),
        n_points,
    })
}

/// Evenly spaced window centers spanning the feature range, inset by the
/// window radius so every window sits fully inside the domain.
pub fn window_centers(x: &[f64], radius: f64, n_windows: usize) -> Vec<f64> {
    if x.is_empty() || n_windows == 0 {
        return Vec::new();
    }
    let x_min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let start = x_min + radius;
    let stop = x_max - radius;
    if n_windows == 1 {
        return vec![start];
    }
    let step = (stop - start) / ((n_windows - 1) as f64);
    (0..n_windows).map(|i| start + (i as f64) * step).collect()
}

/// Sweep a window across the domain, computing local coverage at each
/// center. The windows are independent, so the sweep runs in parallel.
pub fn coverage_sweep(
    intervals: &[Interval],
    y: &[f64],
    x: &[f64],
    centers: &[f64],
    radius: f64,
    min_points: usize,
) -> Result<Vec<LocalCoverage>, ConformalError> {
    centers
        .par_iter()
        .map(|center| local_coverage(intervals, y, x, *center, radius, min_points))
        .collect()
}

/// Mean interval width, the companion diagnostic to coverage: a band can
/// only hit the target everywhere by spending width where the noise is.
pub fn mean_interval_width(intervals: &[Interval]) -> Result<f64, ConformalError> {
    if intervals.is_empty() {
        return Err(ConformalError::EmptySet("intervals".to_string()));
    }
    Ok(intervals.iter().map(Interval::width).sum::<f64>() / (intervals.len() as f64))
}
