//! Error types for sensitivity calculations.

use curvewatch_curves::CurveError;
use thiserror::Error;

/// Result type for risk operations.
pub type RiskResult<T> = Result<T, RiskError>;

/// Errors that stop a whole sensitivity run.
///
/// Failures of individual bump scenarios are not errors; they surface as
/// [`SensitivityFlag`](crate::SensitivityFlag)s on each record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    /// Bump size is zero, negative or not finite.
    #[error("bump size must be finite and positive, got {size}")]
    InvalidBumpSize {
        /// Rejected size.
        size: f64,
    },

    /// The unbumped curves could not be built.
    #[error("base curve construction failed: {0}")]
    BaseCurve(#[from] CurveError),
}

impl RiskError {
    /// True if the base curve failed because discount factors inverted.
    #[must_use]
    pub fn is_inversion(&self) -> bool {
        matches!(self, Self::BaseCurve(e) if e.is_inversion())
    }
}
