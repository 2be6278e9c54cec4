//! Conformal Prediction
//!
//! Split-conformal calibration of quantile-regression intervals (CQR) with
//! finite-sample coverage guarantees, and a fixed-width baseline interval
//! built from calibration residuals.

pub mod cqr;
pub mod fixed;
