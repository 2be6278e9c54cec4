//! Model
//!
//! The regression-model seam the conformal layer sits on, plus a simple
//! binned regressor so the crate can be exercised end to end without an
//! external learner.
use crate::errors::ConformalError;
use crate::utils::{quantile_linear, validate_same_length, validate_unit_interval};
use serde::{Deserialize, Serialize};

/// A univariate regression model. The conformal layer only ever needs
/// `fit` and `predict`; anything implementing this trait can supply the
/// raw lower/upper quantile (or mean) predictions that get calibrated.
pub trait Regressor {
    /// Fit the model on index-aligned features and labels.
    fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<(), ConformalError>;
    /// Predict a value for every feature in `x`.
    fn predict(&self, x: &[f64]) -> Result<Vec<f64>, ConformalError>;
}

/// The per-bin statistic a [`BinnedRegressor`] estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BinStatistic {
    /// The bin mean, for a conditional-mean model.
    Mean,
    /// A bin quantile, for a conditional-quantile model.
    Quantile(f64),
}

/// A piecewise-constant regressor over equal-width feature bins.
///
/// Each bin estimates the configured statistic of the labels falling into
/// it. Bins that receive no training points inherit the value of the
/// nearest populated bin to the left (or right, for leading empties), so
/// prediction is total over the training range. Crude, but enough to give
/// the conformal layer genuinely location-dependent quantile predictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinnedRegressor {
    n_bins: usize,
    statistic: BinStatistic,
    x_min: f64,
    bin_width: f64,
    values: Vec<f64>,
}

impl BinnedRegressor {
    /// Create an unfitted regressor.
    ///
    /// * `n_bins` - Number of equal-width bins over the training range.
    /// * `statistic` - The statistic each bin estimates.
    pub fn new(n_bins: usize, statistic: BinStatistic) -> Self {
        BinnedRegressor {
            n_bins,
            statistic,
            x_min: f64::NAN,
            bin_width: f64::NAN,
            values: Vec::new(),
        }
    }

    fn bin_of(&self, x: f64) -> usize {
        if self.bin_width <= 0.0 {
            return 0;
        }
        let raw = ((x - self.x_min) / self.bin_width).floor();
        if raw < 0.0 {
            0
        } else {
            (raw as usize).min(self.n_bins - 1)
        }
    }
}

impl Regressor for BinnedRegressor {
    fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<(), ConformalError> {
        validate_same_length(x, "x", y, "y")?;
        if x.is_empty() {
            return Err(ConformalError::EmptySet("training".to_string()));
        }
        if self.n_bins == 0 {
            return Err(ConformalError::InvalidParameter(
                "n_bins".to_string(),
                "a positive bin count".to_string(),
                "0".to_string(),
            ));
        }
        if let BinStatistic::Quantile(q) = self.statistic {
            validate_unit_interval(q, "quantile")?;
        }

        let x_min = x.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        self.x_min = x_min;
        self.bin_width = (x_max - x_min) / (self.n_bins as f64);

        let mut members: Vec<Vec<f64>> = vec![Vec::new(); self.n_bins];
        for (xi, yi) in x.iter().zip(y.iter()) {
            members[self.bin_of(*xi)].push(*yi);
        }

        let mut values = vec![f64::NAN; self.n_bins];
        for (bin, ys) in members.iter().enumerate() {
            if ys.is_empty() {
                continue;
            }
            values[bin] = match self.statistic {
                BinStatistic::Mean => ys.iter().sum::<f64>() / (ys.len() as f64),
                BinStatistic::Quantile(q) => quantile_linear(ys, q)?,
            };
        }

        // Empty bins inherit from the left; leading empties from the
        // first populated bin.
        let first = values
            .iter()
            .position(|v| !v.is_nan())
            .ok_or_else(|| ConformalError::EmptySet("training".to_string()))?;
        for bin in 0..first {
            values[bin] = values[first];
        }
        for bin in (first + 1)..self.n_bins {
            if values[bin].is_nan() {
                values[bin] = values[bin - 1];
            }
        }

        self.values = values;
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> Result<Vec<f64>, ConformalError> {
        if self.values.is_empty() {
            return Err(ConformalError::NotFitted("binned".to_string()));
        }
        Ok(x.iter().map(|xi| self.values[self.bin_of(*xi)]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_regressor_recovers_bin_means() {
        let x = vec![0.0, 0.5, 1.5, 1.9];
        let y = vec![1.0, 3.0, 10.0, 20.0];
        let mut model = BinnedRegressor::new(2, BinStatistic::Mean);
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&vec![0.25, 1.75]).unwrap();
        assert_eq!(preds, vec![2.0, 15.0]);
    }

    #[test]
    fn test_quantile_regressor_orders_bands() {
        let x: Vec<f64> = (0..200).map(|i| (i as f64) / 20.0).collect();
        let y: Vec<f64> = x.iter().map(|xi| xi * 2.0 + ((xi * 17.0).sin())).collect();
        let mut lower = BinnedRegressor::new(5, BinStatistic::Quantile(0.05));
        let mut upper = BinnedRegressor::new(5, BinStatistic::Quantile(0.95));
        lower.fit(&x, &y).unwrap();
        upper.fit(&x, &y).unwrap();
        let lo = lower.predict(&x).unwrap();
        let hi = upper.predict(&x).unwrap();
        for (l, u) in lo.iter().zip(hi.iter()) {
            assert!(l <= u);
        }
    }

    #[test]
    fn test_predict_clamps_outside_training_range() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![0.0, 1.0, 2.0, 3.0];
        let mut model = BinnedRegressor::new(2, BinStatistic::Mean);
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&vec![-5.0, 50.0]).unwrap();
        assert_eq!(preds[0], 0.5);
        assert_eq!(preds[1], 2.5);
    }

    #[test]
    fn test_constant_feature_collapses_to_one_bin() {
        let x = vec![2.0; 10];
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mut model = BinnedRegressor::new(4, BinStatistic::Mean);
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&vec![2.0]).unwrap();
        assert_eq!(preds[0], 4.5);
    }

    #[test]
    fn test_unfitted_predict_errors() {
        let model = BinnedRegressor::new(4, BinStatistic::Mean);
        assert!(model.predict(&vec![1.0]).is_err());
    }

    #[test]
    fn test_fit_rejects_invalid_quantile() {
        let mut model = BinnedRegressor::new(4, BinStatistic::Quantile(1.5));
        assert!(model.fit(&vec![1.0, 2.0], &vec![1.0, 2.0]).is_err());
    }
}
