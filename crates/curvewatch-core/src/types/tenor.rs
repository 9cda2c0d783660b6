//! Tenor labels such as `1M`, `2Y` and `30Y`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::Date;
use crate::error::{CoreError, CoreResult};

/// Unit of a tenor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TenorUnit {
    /// Calendar days
    Days,
    /// Weeks
    Weeks,
    /// Months
    Months,
    /// Years
    Years,
}

impl TenorUnit {
    fn suffix(self) -> char {
        match self {
            TenorUnit::Days => 'D',
            TenorUnit::Weeks => 'W',
            TenorUnit::Months => 'M',
            TenorUnit::Years => 'Y',
        }
    }
}

/// A period length measured from a reference date.
///
/// Tenors order by their approximate length so `6M < 1Y < 18M < 2Y`. Tenors of equal
/// length but different spelling (`12M` and `1Y`) are distinct labels and order by unit.
///
/// # Example
///
/// ```rust
/// use curvewatch_core::types::Tenor;
///
/// let six_months: Tenor = "6M".parse().unwrap();
/// let two_years: Tenor = "2Y".parse().unwrap();
/// assert!(six_months < two_years);
/// assert_eq!(two_years.to_string(), "2Y");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tenor {
    length: u32,
    unit: TenorUnit,
}

impl Tenor {
    /// Creates a tenor from a length and unit.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTenor` for a zero length.
    pub fn new(length: u32, unit: TenorUnit) -> CoreResult<Self> {
        if length == 0 {
            return Err(CoreError::invalid_tenor(
                format!("0{}", unit.suffix()),
                "length must be positive",
            ));
        }
        Ok(Self { length, unit })
    }

    /// Shorthand for a tenor in months.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTenor` for zero.
    pub fn months(length: u32) -> CoreResult<Self> {
        Self::new(length, TenorUnit::Months)
    }

    /// Shorthand for a tenor in years.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTenor` for zero.
    pub fn years(length: u32) -> CoreResult<Self> {
        Self::new(length, TenorUnit::Years)
    }

    /// Returns the numeric length.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Returns the unit.
    #[must_use]
    pub fn unit(&self) -> TenorUnit {
        self.unit
    }

    /// Approximate length in years (months are twelfths, days are 1/365).
    #[must_use]
    pub fn approx_years(&self) -> f64 {
        self.sort_key() as f64 / 4380.0
    }

    /// True for tenors no longer than one year.
    #[must_use]
    pub fn is_money_market(&self) -> bool {
        self.sort_key() <= 4380
    }

    /// Adds the tenor to `date`, clamping month ends.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the result is out of range.
    pub fn advance(&self, date: Date) -> CoreResult<Date> {
        let n = self.length as i32;
        match self.unit {
            TenorUnit::Days => Ok(date.add_days(i64::from(self.length))),
            TenorUnit::Weeks => Ok(date.add_days(7 * i64::from(self.length))),
            TenorUnit::Months => date.add_months(n),
            TenorUnit::Years => date.add_years(n),
        }
    }

    // Twelfths of a day: 1D = 12, 1W = 84, 1M = 365, 1Y = 4380.
    fn sort_key(&self) -> u64 {
        let per_unit = match self.unit {
            TenorUnit::Days => 12,
            TenorUnit::Weeks => 84,
            TenorUnit::Months => 365,
            TenorUnit::Years => 4380,
        };
        u64::from(self.length) * per_unit
    }
}

impl Ord for Tenor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then(self.unit.cmp(&other.unit))
            .then(self.length.cmp(&other.length))
    }
}

impl PartialOrd for Tenor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length, self.unit.suffix())
    }
}

impl FromStr for Tenor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_uppercase();
        let Some(suffix) = label.chars().last() else {
            return Err(CoreError::invalid_tenor(s, "empty label"));
        };
        let unit = match suffix {
            'D' => TenorUnit::Days,
            'W' => TenorUnit::Weeks,
            'M' => TenorUnit::Months,
            'Y' => TenorUnit::Years,
            other => {
                return Err(CoreError::invalid_tenor(
                    s,
                    format!("unknown unit '{other}'"),
                ))
            }
        };
        let digits = &label[..label.len() - suffix.len_utf8()];
        let length = digits
            .parse::<u32>()
            .map_err(|_| CoreError::invalid_tenor(s, "length is not a number"))?;
        Self::new(length, unit).map_err(|_| CoreError::invalid_tenor(s, "length must be positive"))
    }
}

impl TryFrom<String> for Tenor {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tenor> for String {
    fn from(tenor: Tenor) -> Self {
        tenor.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn t(s: &str) -> Tenor {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(t("1M"), Tenor::months(1).unwrap());
        assert_eq!(t("10y"), Tenor::years(10).unwrap());
        assert_eq!(t(" 2W "), Tenor::new(2, TenorUnit::Weeks).unwrap());
        assert_eq!(t("99Y").length(), 99);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Tenor>().is_err());
        assert!("Y".parse::<Tenor>().is_err());
        assert!("0Y".parse::<Tenor>().is_err());
        assert!("5Q".parse::<Tenor>().is_err());
        assert!("-1Y".parse::<Tenor>().is_err());
    }

    #[test]
    fn test_ordering() {
        let mut tenors = vec![t("30Y"), t("1Y"), t("3M"), t("18M"), t("2Y"), t("1M"), t("2W")];
        tenors.sort();
        let labels: Vec<String> = tenors.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["2W", "1M", "3M", "1Y", "18M", "2Y", "30Y"]);
    }

    #[test]
    fn test_equal_length_spellings_are_distinct() {
        assert_ne!(t("12M"), t("1Y"));
        assert!(t("12M") < t("1Y"));
        assert!(t("12M").is_money_market());
        assert!(t("1Y").is_money_market());
        assert!(!t("18M").is_money_market());
    }

    #[test]
    fn test_advance() {
        let d = Date::from_ymd(2026, 1, 31).unwrap();
        assert_eq!(t("1M").advance(d).unwrap(), Date::from_ymd(2026, 2, 28).unwrap());
        assert_eq!(t("2Y").advance(d).unwrap(), Date::from_ymd(2028, 1, 31).unwrap());
        assert_eq!(t("1W").advance(d).unwrap(), Date::from_ymd(2026, 2, 7).unwrap());
    }

    #[test]
    fn test_approx_years() {
        assert_relative_eq!(t("6M").approx_years(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(t("30Y").approx_years(), 30.0, epsilon = 1e-12);
    }

    #[test]
    fn test_serde_as_label() {
        let json = serde_json::to_string(&t("5Y")).unwrap();
        assert_eq!(json, "\"5Y\"");
        let back: Tenor = serde_json::from_str("\"3M\"").unwrap();
        assert_eq!(back, t("3M"));
        assert!(serde_json::from_str::<Tenor>("\"3X\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_display_parse_roundtrip(len in 1u32..400, unit in 0usize..4) {
            let unit = [TenorUnit::Days, TenorUnit::Weeks, TenorUnit::Months, TenorUnit::Years][unit];
            let tenor = Tenor::new(len, unit).unwrap();
            prop_assert_eq!(tenor.to_string().parse::<Tenor>().unwrap(), tenor);
        }
    }
}
