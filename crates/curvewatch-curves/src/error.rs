//! Error types for quote handling and curve construction.

use curvewatch_core::{CoreError, Tenor};
use curvewatch_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// A solved discount factor is non-positive or above its predecessor.
    #[error("Curve inversion at {tenor}: DF {df:.10} vs previous DF {previous_df:.10}")]
    Inversion {
        /// Pillar where monotonicity broke.
        tenor: Tenor,
        /// Discount factor of the preceding pillar (1.0 for the first).
        previous_df: f64,
        /// Offending discount factor.
        df: f64,
    },

    /// Not enough quotes to build a curve.
    #[error("Insufficient quotes: need at least {required}, got {got}")]
    InsufficientQuotes {
        /// Minimum required quotes.
        required: usize,
        /// Quotes available.
        got: usize,
    },

    /// The root-finder could not solve a pillar.
    #[error("Bootstrap failed at {tenor}: {reason}")]
    BootstrapFailed {
        /// Pillar being solved.
        tenor: Tenor,
        /// Description of the failure.
        reason: String,
    },

    /// A quote value that cannot be used.
    #[error("Invalid quote for {tenor}: {value}")]
    InvalidQuote {
        /// Quote tenor.
        tenor: String,
        /// Rejected value.
        value: f64,
    },

    /// A tenor outside the configured set.
    #[error("Unknown tenor: {label}")]
    UnknownTenor {
        /// The label as received.
        label: String,
    },

    /// Invalid quote store configuration.
    #[error("Invalid tenor set: {reason}")]
    InvalidTenorSet {
        /// Description of the problem.
        reason: String,
    },

    /// Error from numerical routines.
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from date arithmetic.
    #[error("Date error: {0}")]
    Core(#[from] CoreError),
}

impl CurveError {
    /// Creates a bootstrap failure error.
    #[must_use]
    pub fn bootstrap_failed(tenor: Tenor, reason: impl Into<String>) -> Self {
        Self::BootstrapFailed {
            tenor,
            reason: reason.into(),
        }
    }

    /// Creates an unknown tenor error.
    #[must_use]
    pub fn unknown_tenor(label: impl Into<String>) -> Self {
        Self::UnknownTenor {
            label: label.into(),
        }
    }

    /// True for [`CurveError::Inversion`].
    #[must_use]
    pub fn is_inversion(&self) -> bool {
        matches!(self, Self::Inversion { .. })
    }
}
