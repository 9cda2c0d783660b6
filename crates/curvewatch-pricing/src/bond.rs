//! Fixed-rate bullet bonds.

use curvewatch_core::{Date, DayCountConvention, Frequency, InstrumentId, Schedule, SchedulePeriod};
use curvewatch_curves::DiscountCurve;
use serde::{Deserialize, Serialize};

use crate::error::{PricingError, PricingResult};

/// Years before maturity assumed when the issue date is unknown.
pub const DEFAULT_BOND_LIFE_YEARS: i32 = 5;

/// A fixed-rate bullet bond.
///
/// The coupon schedule rolls backward, unadjusted, from maturity to the issue date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedRateBond {
    /// Instrument identifier.
    pub id: InstrumentId,
    /// ISIN, when known.
    #[serde(default)]
    pub isin: Option<String>,
    /// Face amount.
    pub notional: f64,
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Annual coupon rate as a decimal.
    pub coupon_rate: f64,
    /// Final payment date.
    pub maturity: Date,
    /// First accrual date. Defaults to five years before maturity.
    #[serde(default)]
    pub issue_date: Option<Date>,
    /// Coupon frequency.
    #[serde(default)]
    pub frequency: Frequency,
    /// Coupon accrual basis.
    #[serde(default)]
    pub day_count: DayCountConvention,
}

pub(crate) fn default_currency() -> String {
    "USD".to_string()
}

impl FixedRateBond {
    /// Semi-annual ACT/ACT USD bond with no issue date.
    #[must_use]
    pub fn new(id: impl Into<InstrumentId>, notional: f64, coupon_rate: f64, maturity: Date) -> Self {
        Self {
            id: id.into(),
            isin: None,
            notional,
            currency: default_currency(),
            coupon_rate,
            maturity,
            issue_date: None,
            frequency: Frequency::default(),
            day_count: DayCountConvention::default(),
        }
    }

    /// Sets the issue date.
    #[must_use]
    pub fn with_issue_date(mut self, issue_date: Date) -> Self {
        self.issue_date = Some(issue_date);
        self
    }

    /// Sets the coupon frequency.
    #[must_use]
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Sets the day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Issue date, or maturity less five years.
    ///
    /// # Errors
    ///
    /// Only if the maturity cannot be rolled back.
    pub fn effective_issue_date(&self) -> PricingResult<Date> {
        match self.issue_date {
            Some(date) => Ok(date),
            None => Ok(self.maturity.add_years(-DEFAULT_BOND_LIFE_YEARS)?),
        }
    }

    /// Checks that the terms can be priced.
    ///
    /// # Errors
    ///
    /// `InvalidInstrument` for a non-positive notional, a non-finite coupon, or an issue
    /// date on or after maturity.
    pub fn validate(&self) -> PricingResult<()> {
        if !self.notional.is_finite() || self.notional <= 0.0 {
            return Err(PricingError::invalid_instrument(
                &self.id,
                format!("notional must be positive, got {}", self.notional),
            ));
        }
        if !self.coupon_rate.is_finite() {
            return Err(PricingError::invalid_instrument(&self.id, "coupon rate is not finite"));
        }
        let issue = self.effective_issue_date()?;
        if issue >= self.maturity {
            return Err(PricingError::invalid_instrument(
                &self.id,
                format!("issue date {issue} is not before maturity {}", self.maturity),
            ));
        }
        Ok(())
    }

    /// Coupon schedule.
    ///
    /// # Errors
    ///
    /// `Core` if the issue date is not before maturity.
    pub fn schedule(&self) -> PricingResult<Schedule> {
        Ok(Schedule::backward(self.effective_issue_date()?, self.maturity, self.frequency)?)
    }

    fn accrual(&self, period: &SchedulePeriod, end: Date) -> f64 {
        self.day_count.year_fraction_in_period(
            period.start,
            end,
            period.reference_start,
            period.reference_end,
            self.frequency,
        )
    }

    /// Coupon paid at the end of `period`.
    #[must_use]
    pub fn coupon_amount(&self, period: &SchedulePeriod) -> f64 {
        self.notional * self.coupon_rate * self.accrual(period, period.end)
    }

    /// Present value of the coupons and principal paid after the curve's reference date.
    ///
    /// A bond that has matured is worth zero.
    ///
    /// # Errors
    ///
    /// `Core` if the schedule cannot be generated.
    pub fn npv(&self, curve: &DiscountCurve) -> PricingResult<f64> {
        let valuation = curve.reference_date();
        if self.maturity <= valuation {
            return Ok(0.0);
        }

        let schedule = self.schedule()?;
        let coupons: f64 = schedule
            .remaining(valuation)
            .map(|period| self.coupon_amount(period) * curve.df_at(period.end))
            .sum();

        Ok(coupons + self.notional * curve.df_at(self.maturity))
    }

    /// Interest accrued from the last coupon date to `date`.
    ///
    /// Zero on a coupon date and outside the bond's life.
    ///
    /// # Errors
    ///
    /// `Core` if the schedule cannot be generated.
    pub fn accrued_interest(&self, date: Date) -> PricingResult<f64> {
        let schedule = self.schedule()?;
        Ok(schedule
            .period_containing(date)
            .map_or(0.0, |period| self.notional * self.coupon_rate * self.accrual(period, date)))
    }
}
