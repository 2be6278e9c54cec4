//! Errors
//!
//! Custom error types used throughout the `cqr` crate.
use thiserror::Error;

/// Errors that can occur while calibrating or applying prediction intervals.
#[derive(Debug, Error)]
pub enum ConformalError {
    /// Two slices that must be index-aligned have different lengths.
    #[error("Length mismatch between {0} ({1} values) and {2} ({3} values).")]
    LengthMismatch(String, usize, String, usize),
    /// An operation requires at least one data point.
    #[error("The {0} set is empty, at least one point is required.")]
    EmptySet(String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Prediction was requested from a model that has not been fit.
    #[error("The {0} model must be fit before predictions can be made.")]
    NotFitted(String),
    /// Intervals were requested before the estimator was calibrated.
    #[error("The estimator must be calibrated before intervals can be produced.")]
    NotCalibrated,
    /// Unable to write a model to file.
    #[error("Unable to write model to file: {0}")]
    UnableToWrite(String),
    /// Unable to read a model from file.
    #[error("Unable to read model from a file {0}")]
    UnableToRead(String),
}
