//! Payment frequency.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Payment frequency for coupon and fixed legs.
///
/// Serialized with the reference-data names (`ANNUAL`, `SEMI_ANNUAL`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    /// Annual payments (1 per year)
    Annual,
    /// Semi-annual payments (2 per year)
    #[default]
    #[serde(alias = "SEMIANNUAL")]
    SemiAnnual,
    /// Quarterly payments (4 per year)
    Quarterly,
    /// Monthly payments (12 per year)
    Monthly,
}

impl Frequency {
    /// Returns the number of periods per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
        }
    }

    /// Returns the number of months per period.
    #[must_use]
    pub fn months_per_period(&self) -> u32 {
        12 / self.periods_per_year()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Annual => "ANNUAL",
            Frequency::SemiAnnual => "SEMI_ANNUAL",
            Frequency::Quarterly => "QUARTERLY",
            Frequency::Monthly => "MONTHLY",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "ANNUAL" | "1Y" => Ok(Frequency::Annual),
            "SEMI_ANNUAL" | "SEMIANNUAL" | "6M" => Ok(Frequency::SemiAnnual),
            "QUARTERLY" | "3M" => Ok(Frequency::Quarterly),
            "MONTHLY" | "1M" => Ok(Frequency::Monthly),
            _ => Err(CoreError::unknown_convention("frequency", s)),
        }
    }
}
