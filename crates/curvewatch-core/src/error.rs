//! Error types for the core primitives.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building dates, tenors, conventions and schedules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A tenor label that cannot be parsed.
    #[error("Invalid tenor '{label}': {reason}")]
    InvalidTenor {
        /// The offending label.
        label: String,
        /// Reason for rejection.
        reason: String,
    },

    /// Schedule generation failed.
    #[error("Invalid schedule: {reason}")]
    InvalidSchedule {
        /// Description of the failure.
        reason: String,
    },

    /// Unrecognized day count or frequency name.
    #[error("Unknown {kind}: '{value}'")]
    UnknownConvention {
        /// Which convention family was being parsed.
        kind: &'static str,
        /// The unrecognized input.
        value: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid tenor error.
    #[must_use]
    pub fn invalid_tenor(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTenor {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid schedule error.
    #[must_use]
    pub fn invalid_schedule(reason: impl Into<String>) -> Self {
        Self::InvalidSchedule {
            reason: reason.into(),
        }
    }

    /// Creates an unknown convention error.
    #[must_use]
    pub fn unknown_convention(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownConvention {
            kind,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_tenor("99Q", "unknown unit 'Q'");
        assert_eq!(err.to_string(), "Invalid tenor '99Q': unknown unit 'Q'");

        let err = CoreError::unknown_convention("day count", "ACT/999");
        assert!(err.to_string().contains("day count"));
    }
}
