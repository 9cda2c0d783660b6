//! Interpolation method selection for discount curves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CurveError;

/// How discount factors are interpolated between pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Linear on log discount factors (piecewise flat forwards).
    #[default]
    LogLinear,

    /// Natural cubic spline on log discount factors.
    LogCubic,
}

impl InterpolationMethod {
    /// Minimum number of knots, including the origin.
    #[must_use]
    pub fn min_points(&self) -> usize {
        match self {
            Self::LogLinear => 2,
            Self::LogCubic => 3,
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LogLinear => "log_linear",
            Self::LogCubic => "log_cubic",
        };
        write!(f, "{name}")
    }
}

impl FromStr for InterpolationMethod {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "log_linear" | "loglinear" => Ok(Self::LogLinear),
            "log_cubic" | "logcubic" | "cubic" => Ok(Self::LogCubic),
            _ => Err(CurveError::Core(curvewatch_core::CoreError::unknown_convention(
                "interpolation method",
                s,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("log-linear".parse::<InterpolationMethod>().unwrap(), InterpolationMethod::LogLinear);
        assert_eq!("LOG_CUBIC".parse::<InterpolationMethod>().unwrap(), InterpolationMethod::LogCubic);
        assert!("spline".parse::<InterpolationMethod>().is_err());
    }

    #[test]
    fn test_serde() {
        let m: InterpolationMethod = serde_json::from_str("\"log_cubic\"").unwrap();
        assert_eq!(m, InterpolationMethod::LogCubic);
    }
}
