//! Engine error types.

use curvewatch_curves::CurveError;
use curvewatch_risk::RiskError;
use curvewatch_traits::TraitError;
use thiserror::Error;

use crate::state::WorkerState;

/// A specialized Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A state change the lifecycle does not allow
    #[error("illegal state transition {from} -> {to}")]
    InvalidTransition {
        /// Current state
        from: WorkerState,
        /// Requested state
        to: WorkerState,
    },

    /// The reference data fetch failed on every attempt
    #[error("portfolio load failed after {attempts} attempts: {last_error}")]
    StartupFailed {
        /// Attempts made
        attempts: u32,
        /// Error of the final attempt
        last_error: String,
    },

    /// The source returned no usable instruments
    #[error("reference data returned an empty portfolio")]
    EmptyPortfolio,

    /// Base curves could not be built
    #[error("base curve build failed: {0}")]
    BaseCurve(#[from] CurveError),

    /// Sensitivity setup failed
    #[error("risk error: {0}")]
    Risk(#[from] RiskError),

    /// Error from a source or sink
    #[error("source error: {0}")]
    Source(#[from] TraitError),

    /// A blocking pricing task did not complete
    #[error("pricing task failed: {0}")]
    TaskFailed(String),

    /// Shutdown requested
    #[error("worker is shutting down")]
    Shutdown,
}

impl EngineError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// True if the error means the base curve is unusable this cycle.
    #[must_use]
    pub fn is_curve_failure(&self) -> bool {
        match self {
            EngineError::BaseCurve(_) => true,
            EngineError::Risk(e) => e.is_inversion() || matches!(e, RiskError::BaseCurve(_)),
            _ => false,
        }
    }
}
