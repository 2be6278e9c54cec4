//! Fixed-Width Baseline
//!
//! The competing interval the conformalized band is compared against: a
//! constant half-width around a point prediction, taken as the `1 - alpha`
//! quantile of absolute calibration residuals. Its width cannot adapt to
//! local noise, which is exactly what the local-coverage sweep exposes.
use crate::data::Interval;
use crate::errors::ConformalError;
use crate::model::Regressor;
use crate::utils::{quantile_linear, validate_same_length, validate_unit_interval};
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;

/// Compute the constant half-width from calibration residuals: the
/// `1 - alpha` linear-interpolation quantile of `|y - point_prediction|`.
pub fn fixed_half_width(
    point_predictions: &[f64],
    y: &[f64],
    alpha: f64,
) -> Result<f64, ConformalError> {
    validate_unit_interval(alpha, "alpha")?;
    validate_same_length(point_predictions, "point_predictions", y, "y")?;
    if y.is_empty() {
        return Err(ConformalError::EmptySet("calibration".to_string()));
    }
    let abs_residuals: Vec<f64> = point_predictions
        .iter()
        .zip(y)
        .map(|(mu, y_)| (y_ - mu).abs())
        .collect();
    quantile_linear(&abs_residuals, 1.0 - alpha)
}

/// Build an interval of constant width around every point prediction.
pub fn fixed_width_interval(point_predictions: &[f64], half_width: f64) -> Vec<Interval> {
    point_predictions
        .iter()
        .map(|mu| Interval::new(mu - half_width, mu + half_width))
        .collect()
}

/// A fixed-width interval estimator around a conditional-mean model,
/// symmetric to [`CqrEstimator`](crate::conformal::cqr::CqrEstimator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedWidthEstimator<M> {
    model: M,
    alpha: f64,
    half_width: Option<f64>,
}

impl<M: Regressor> FixedWidthEstimator<M> {
    /// Create an estimator from a point-prediction model.
    pub fn new(model: M, alpha: f64) -> Result<Self, ConformalError> {
        validate_unit_interval(alpha, "alpha")?;
        Ok(FixedWidthEstimator {
            model,
            alpha,
            half_width: None,
        })
    }

    /// Target miscoverage rate.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The calibrated half-width, if `calibrate` has run.
    pub fn half_width(&self) -> Option<f64> {
        self.half_width
    }

    /// Fit the point-prediction model on the training set.
    pub fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<(), ConformalError> {
        self.model.fit(x, y)?;
        info!("Fit point-prediction model on {} training points.", x.len());
        Ok(())
    }

    /// Compute and store the half-width from a held-out calibration set.
    pub fn calibrate(&mut self, x_cal: &[f64], y_cal: &[f64]) -> Result<f64, ConformalError> {
        let mu = self.model.predict(x_cal)?;
        let half_width = fixed_half_width(&mu, y_cal, self.alpha)?;
        info!(
            "Calibrated on {} points, half-width = {:.4} for alpha = {}.",
            y_cal.len(),
            half_width,
            self.alpha
        );
        self.half_width = Some(half_width);
        Ok(half_width)
    }

    /// Produce fixed-width intervals for test points.
    pub fn predict_intervals(&self, x: &[f64]) -> Result<Vec<Interval>, ConformalError> {
        let half_width = self.half_width.ok_or(ConformalError::NotCalibrated)?;
        let mu = self.model.predict(x)?;
        Ok(fixed_width_interval(&mu, half_width))
    }
}

impl<M: Serialize + DeserializeOwned> FixedWidthEstimator<M> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BinStatistic, BinnedRegressor};

    #[test]
    fn test_half_width_matches_interpolated_quantile() {
        // Residuals [0, 1, 2, 3, 4] at alpha = 0.2: the 0.8 quantile with
        // linear interpolation is 3.2.
        let mu = vec![0.0; 5];
        let y = vec![0.0, -1.0, 2.0, -3.0, 4.0];
        let half_width = fixed_half_width(&mu, &y, 0.2).unwrap();
        assert!((half_width - 3.2).abs() < 1e-12);
    }

    #[test]
    fn test_half_width_validates_inputs() {
        let v = vec![0.0; 3];
        assert!(fixed_half_width(&v, &v, 0.0).is_err());
        assert!(fixed_half_width(&v, &vec![0.0; 2], 0.1).is_err());
        let empty: Vec<f64> = Vec::new();
        assert!(fixed_half_width(&empty, &empty, 0.1).is_err());
    }

    #[test]
    fn test_fixed_width_interval_constant_width() {
        let intervals = fixed_width_interval(&[0.0, 5.0, -3.0], 2.0);
        for i in &intervals {
            assert_eq!(i.width(), 4.0);
        }
        assert_eq!(intervals[1], Interval::new(3.0, 7.0));
    }

    #[test]
    fn test_estimator_requires_calibration() {
        let model = BinnedRegressor::new(4, BinStatistic::Mean);
        let mut est = FixedWidthEstimator::new(model, 0.1).unwrap();
        let x: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let y = x.clone();
        est.fit(&x, &y).unwrap();
        assert!(matches!(
            est.predict_intervals(&x),
            Err(ConformalError::NotCalibrated)
        ));
        est.calibrate(&x, &y).unwrap();
        assert!(est.predict_intervals(&x).is_ok());
    }
}
