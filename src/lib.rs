//! Conformalized quantile regression intervals and coverage diagnostics.
//!
//! Given per-point lower/upper quantile predictions from any regression
//! model, this crate computes the split-conformal half-width adjustment
//! (`qhat`), applies it to produce intervals with a finite-sample marginal
//! coverage guarantee, builds a fixed-width baseline interval from
//! calibration residuals, and evaluates marginal and sliding-window local
//! coverage over the feature domain.

// Modules
pub mod conformal;
pub mod coverage;
pub mod data;
pub mod errors;
pub mod model;
pub mod utils;

// Individual classes, and functions
pub use conformal::cqr::CqrEstimator;
pub use conformal::fixed::FixedWidthEstimator;
pub use coverage::LocalCoverage;
pub use data::{Interval, SampleSet, ThreeWaySplit};
pub use errors::ConformalError;
pub use model::{BinStatistic, BinnedRegressor, Regressor};
