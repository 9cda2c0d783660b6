//! Day count conventions.
//!
//! Day count conventions turn a pair of dates into an accrual fraction.
//!
//! # Supported Conventions
//!
//! - [`DayCountConvention::ActAct`]: Actual/Actual. ICMA when a reference coupon period is
//!   known, ISDA otherwise
//! - [`DayCountConvention::Act360`]: Actual/360, money market and swap legs
//! - [`DayCountConvention::Act365Fixed`]: Actual/365 Fixed, also used for curve time
//! - [`DayCountConvention::Thirty360`]: 30/360 bond basis
//!
//! # Usage
//!
//! ```rust
//! use curvewatch_core::daycounts::DayCountConvention;
//! use curvewatch_core::types::Date;
//!
//! let start = Date::from_ymd(2026, 1, 15).unwrap();
//! let end = Date::from_ymd(2026, 7, 15).unwrap();
//! let yf = DayCountConvention::Thirty360.year_fraction(start, end);
//! assert!((yf - 0.5).abs() < 1e-12);
//! ```

mod actact;
mod thirty360;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::{Date, Frequency};

/// Day count convention selector.
///
/// Serialized with the reference-data names (`ACT_ACT`, `ACT_360`, `ACT_365`, `30_360`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DayCountConvention {
    /// Actual/Actual
    #[default]
    #[serde(rename = "ACT_ACT", alias = "ACT/ACT")]
    ActAct,
    /// Actual/360
    #[serde(rename = "ACT_360", alias = "ACT/360")]
    Act360,
    /// Actual/365 Fixed
    #[serde(rename = "ACT_365", alias = "ACT/365", alias = "ACT_365F")]
    Act365Fixed,
    /// 30/360 bond basis
    #[serde(rename = "30_360", alias = "30/360")]
    Thirty360,
}

impl DayCountConvention {
    /// Returns the conventional display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::ActAct => "ACT/ACT",
            DayCountConvention::Act360 => "ACT/360",
            DayCountConvention::Act365Fixed => "ACT/365F",
            DayCountConvention::Thirty360 => "30/360",
        }
    }

    /// Year fraction between two dates without coupon-period context.
    ///
    /// ACT/ACT uses the ISDA year split here. Returns 0 when `end <= start`.
    #[must_use]
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        if end <= start {
            return 0.0;
        }
        match self {
            DayCountConvention::ActAct => actact::isda(start, end),
            DayCountConvention::Act360 => start.days_between(&end) as f64 / 360.0,
            DayCountConvention::Act365Fixed => start.days_between(&end) as f64 / 365.0,
            DayCountConvention::Thirty360 => thirty360::day_count(start, end) as f64 / 360.0,
        }
    }

    /// Year fraction for an accrual inside a known coupon period.
    ///
    /// ACT/ACT uses the ICMA rule with `[reference_start, reference_end]` as the regular
    /// period. Other conventions ignore the reference period.
    #[must_use]
    pub fn year_fraction_in_period(
        &self,
        start: Date,
        end: Date,
        reference_start: Date,
        reference_end: Date,
        frequency: Frequency,
    ) -> f64 {
        match self {
            DayCountConvention::ActAct => {
                actact::icma(start, end, reference_start, reference_end, frequency)
            }
            _ => self.year_fraction(start, end),
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DayCountConvention {
    type Err = CoreError;

    /// Accepts reference-data names (`ACT_360`) and market spellings (`ACT/360`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('/', "_");
        match normalized.as_str() {
            "ACT_ACT" | "ACTUAL_ACTUAL" | "ACT_ACT ICMA" | "ACT_ACT ISDA" => {
                Ok(DayCountConvention::ActAct)
            }
            "ACT_360" | "ACTUAL_360" => Ok(DayCountConvention::Act360),
            "ACT_365" | "ACT_365F" | "ACTUAL_365" | "ACT_365 FIXED" => {
                Ok(DayCountConvention::Act365Fixed)
            }
            "30_360" | "30_360 US" | "BOND" => Ok(DayCountConvention::Thirty360),
            _ => Err(CoreError::unknown_convention("day count", s)),
        }
    }
}
