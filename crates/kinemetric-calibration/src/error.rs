//! Calibration errors

use thiserror::Error;

/// Errors raised when editing an anthropometry profile
///
/// Estimation itself never fails; it falls back to documented defaults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("Invalid stated height: {0} cm")]
    InvalidHeight(f64),

    #[error("Invalid {segment} length: {value} cm")]
    InvalidLimbLength { segment: &'static str, value: f64 },
}
