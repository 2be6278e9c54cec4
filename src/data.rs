//! Data
//!
//! Sample containers, interval values, the disjoint train/calibration/test
//! split, and the synthetic heteroscedastic generator used by tests and
//! benchmarks.
use crate::errors::ConformalError;
use crate::utils::validate_unit_interval;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// An ordered set of univariate (feature, label) pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleSet {
    /// Feature values, index-aligned with `y`.
    pub x: Vec<f64>,
    /// Label values, index-aligned with `x`.
    pub y: Vec<f64>,
}

impl SampleSet {
    /// Create a new sample set from index-aligned feature and label vectors.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, ConformalError> {
        if x.len() != y.len() {
            return Err(ConformalError::LengthMismatch(
                "x".to_string(),
                x.len(),
                "y".to_string(),
                y.len(),
            ));
        }
        Ok(SampleSet { x, y })
    }

    /// Number of points in the set.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the set contains no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn take(&self, index: &[usize]) -> SampleSet {
        SampleSet {
            x: index.iter().map(|&i| self.x[i]).collect(),
            y: index.iter().map(|&i| self.y[i]).collect(),
        }
    }
}

/// A disjoint partition of a [`SampleSet`] into training, calibration,
/// and test subsets. The three parts never share a point and their union
/// is the full set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreeWaySplit {
    pub train: SampleSet,
    pub calibration: SampleSet,
    pub test: SampleSet,
}

impl ThreeWaySplit {
    /// Split a sample set by shuffled index.
    ///
    /// * `test_fraction` - Fraction of the whole set held out for testing.
    /// * `calibration_fraction` - Fraction of the remainder held out for
    ///   calibration; the rest is used for training.
    /// * `rng` - Seeded generator, so splits are reproducible.
    pub fn split(
        samples: &SampleSet,
        test_fraction: f64,
        calibration_fraction: f64,
        rng: &mut StdRng,
    ) -> Result<ThreeWaySplit, ConformalError> {
        validate_unit_interval(test_fraction, "test_fraction")?;
        validate_unit_interval(calibration_fraction, "calibration_fraction")?;
        if samples.is_empty() {
            return Err(ConformalError::EmptySet("sample".to_string()));
        }

        let mut index: Vec<usize> = (0..samples.len()).collect();
        index.shuffle(rng);

        let n_test = ((samples.len() as f64) * test_fraction).round() as usize;
        let n_rest = samples.len() - n_test;
        let n_cal = ((n_rest as f64) * calibration_fraction).round() as usize;

        let (test_idx, rest_idx) = index.split_at(n_test);
        let (cal_idx, train_idx) = rest_idx.split_at(n_cal);

        if train_idx.is_empty() {
            return Err(ConformalError::EmptySet("training".to_string()));
        }
        if cal_idx.is_empty() {
            return Err(ConformalError::EmptySet("calibration".to_string()));
        }
        if test_idx.is_empty() {
            return Err(ConformalError::EmptySet("test".to_string()));
        }

        Ok(ThreeWaySplit {
            train: samples.take(train_idx),
            calibration: samples.take(cal_idx),
            test: samples.take(test_idx),
        })
    }
}

/// A prediction interval with inclusive bounds and `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    /// Create an interval, swapping the bounds if they arrive crossed.
    pub fn new(lower: f64, upper: f64) -> Self {
        Interval {
            lower: f64::min(lower, upper),
            upper: f64::max(lower, upper),
        }
    }

    /// Whether the label falls inside the interval, endpoints included.
    #[inline]
    pub fn contains(&self, y: f64) -> bool {
        self.lower <= y && y <= self.upper
    }

    /// Width of the interval.
    #[inline]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Synthetic data generators.
pub mod synthetic {
    use super::*;

    /// Domain the generator draws features from.
    pub const X_MIN: f64 = 0.0;
    pub const X_MAX: f64 = 10.0;

    /// The noise-free trend, `2 x sin(x) + 10`.
    pub fn trend(x: f64) -> f64 {
        2.0 * x * x.sin() + 10.0
    }

    /// Noise standard deviation at `x`; grows linearly so the right side
    /// of the domain is much noisier than the left.
    pub fn noise_sd(x: f64) -> f64 {
        0.5 + 0.5 * x
    }

    /// Draw `n` points with uniform features on `[X_MIN, X_MAX]` and
    /// Gaussian noise whose scale grows with `x`.
    pub fn heteroscedastic(n: usize, rng: &mut StdRng) -> SampleSet {
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        for _ in 0..n {
            let xi = rng.gen_range(X_MIN..X_MAX);
            let z: f64 = rng.sample(StandardNormal);
            x.push(xi);
            y.push(trend(xi) + noise_sd(xi) * z);
        }
        SampleSet { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_sample_set_rejects_mismatch() {
        assert!(SampleSet::new(vec![1., 2.], vec![1.]).is_err());
    }

    #[test]
    fn test_split_is_disjoint_partition() {
        let mut rng = StdRng::seed_from_u64(0);
        let samples = synthetic::heteroscedastic(200, &mut rng);
        let split = ThreeWaySplit::split(&samples, 0.30, 0.35, &mut rng).unwrap();

        let total = split.train.len() + split.calibration.len() + split.test.len();
        assert_eq!(total, samples.len());
        assert_eq!(split.test.len(), 60);
        assert_eq!(split.calibration.len(), 49);

        // Every original point is accounted for exactly once.
        let mut seen: Vec<f64> = split
            .train
            .x
            .iter()
            .chain(split.calibration.x.iter())
            .chain(split.test.x.iter())
            .copied()
            .collect();
        let mut original = samples.x.clone();
        seen.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap());
        original.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, original);
    }

    #[test]
    fn test_split_rejects_bad_fractions() {
        let mut rng = StdRng::seed_from_u64(0);
        let samples = synthetic::heteroscedastic(50, &mut rng);
        assert!(ThreeWaySplit::split(&samples, 1.0, 0.35, &mut rng).is_err());
        assert!(ThreeWaySplit::split(&samples, 0.3, 0.0, &mut rng).is_err());
    }

    #[test]
    fn test_split_rejects_empty_partitions() {
        let mut rng = StdRng::seed_from_u64(1);
        let samples = synthetic::heteroscedastic(2, &mut rng);
        // Too few points to populate all three subsets.
        assert!(ThreeWaySplit::split(&samples, 0.3, 0.35, &mut rng).is_err());
    }

    #[test]
    fn test_interval_swaps_crossed_bounds() {
        let i = Interval::new(3.0, 1.0);
        assert_eq!(i.lower, 1.0);
        assert_eq!(i.upper, 3.0);
        assert_eq!(i.width(), 2.0);
    }

    #[test]
    fn test_interval_contains_is_inclusive() {
        let i = Interval::new(-1.0, 1.0);
        assert!(i.contains(-1.0));
        assert!(i.contains(1.0));
        assert!(i.contains(0.0));
        assert!(!i.contains(1.0001));
    }

    #[test]
    fn test_heteroscedastic_noise_grows() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = synthetic::heteroscedastic(4000, &mut rng);
        // Residual spread on the right half should exceed the left half.
        let spread = |lo: f64, hi: f64| {
            let res: Vec<f64> = samples
                .x
                .iter()
                .zip(samples.y.iter())
                .filter(|(x, _)| **x >= lo && **x < hi)
                .map(|(x, y)| (y - synthetic::trend(*x)).abs())
                .collect();
            res.iter().sum::<f64>() / res.len() as f64
        };
        assert!(spread(5.0, 10.0) > spread(0.0, 5.0));
    }
}
