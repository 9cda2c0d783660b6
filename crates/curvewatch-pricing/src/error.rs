//! Error types for instrument pricing.

use curvewatch_core::{CoreError, Date, InstrumentId};
use thiserror::Error;

use crate::swap::FloatIndex;

/// Result type for pricing operations.
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors that can occur while pricing an instrument.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// A floating period in progress has no supplied fixing.
    #[error("unpriceable: missing {index} fixing for {date} on {instrument}")]
    MissingFixing {
        /// Instrument that needs the fixing.
        instrument: InstrumentId,
        /// Floating-rate index.
        index: FloatIndex,
        /// Accrual start of the in-progress period.
        date: Date,
    },

    /// Instrument terms cannot be priced.
    #[error("invalid instrument {instrument}: {reason}")]
    InvalidInstrument {
        /// Offending instrument.
        instrument: InstrumentId,
        /// What is wrong with it.
        reason: String,
    },

    /// Schedule or calendar failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PricingError {
    /// Creates an invalid instrument error.
    #[must_use]
    pub fn invalid_instrument(instrument: &InstrumentId, reason: impl Into<String>) -> Self {
        Self::InvalidInstrument {
            instrument: instrument.clone(),
            reason: reason.into(),
        }
    }

    /// True for the missing-fixing case.
    #[must_use]
    pub fn is_missing_fixing(&self) -> bool {
        matches!(self, Self::MissingFixing { .. })
    }
}
