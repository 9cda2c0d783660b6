//! Dual-curve vanilla interest rate swaps.
//!
//! The fixed leg is discounted on the discount curve. The floating leg projects simple
//! forwards off the forecast curve and discounts them on the discount curve. A floating
//! period already in progress on the valuation date needs a supplied fixing.

use std::fmt;
use std::str::FromStr;

use curvewatch_core::{CoreError, Date, DayCountConvention, Frequency, InstrumentId, Schedule};
use curvewatch_curves::{CurveSet, DiscountCurve};
use serde::{Deserialize, Serialize};

use crate::bond::default_currency;
use crate::error::{PricingError, PricingResult};
use crate::fixings::Fixings;

/// Calendar days from trade date to effective date when none is given.
pub const SPOT_LAG_DAYS: i64 = 2;

/// Fixed leg accrual basis.
pub const FIXED_DAY_COUNT: DayCountConvention = DayCountConvention::Act360;

/// Floating leg accrual basis.
pub const FLOAT_DAY_COUNT: DayCountConvention = DayCountConvention::Act360;

/// Floating leg reset frequency.
pub const FLOAT_FREQUENCY: Frequency = Frequency::Quarterly;

/// Direction of the fixed leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayReceive {
    /// Pay fixed, receive floating.
    #[default]
    Pay,
    /// Receive fixed, pay floating.
    Receive,
}

impl PayReceive {
    /// +1 for payer swaps, -1 for receivers. Multiplies (floating - fixed).
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            PayReceive::Pay => 1.0,
            PayReceive::Receive => -1.0,
        }
    }
}

impl fmt::Display for PayReceive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayReceive::Pay => write!(f, "PAY"),
            PayReceive::Receive => write!(f, "RECEIVE"),
        }
    }
}

impl FromStr for PayReceive {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PAY" | "PAYER" => Ok(PayReceive::Pay),
            "RECEIVE" | "RECEIVER" => Ok(PayReceive::Receive),
            _ => Err(CoreError::unknown_convention("pay/receive", s)),
        }
    }
}

/// Floating-rate index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FloatIndex {
    /// Secured Overnight Financing Rate.
    #[default]
    Sofr,
    /// London Interbank Offered Rate.
    Libor,
    /// Euro Interbank Offered Rate.
    Euribor,
}

impl fmt::Display for FloatIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FloatIndex::Sofr => "SOFR",
            FloatIndex::Libor => "LIBOR",
            FloatIndex::Euribor => "EURIBOR",
        };
        write!(f, "{name}")
    }
}

impl FromStr for FloatIndex {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SOFR" => Ok(FloatIndex::Sofr),
            "LIBOR" => Ok(FloatIndex::Libor),
            "EURIBOR" => Ok(FloatIndex::Euribor),
            _ => Err(CoreError::unknown_convention("float index", s)),
        }
    }
}

/// Fixed-for-floating swap with one floating index and no spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VanillaSwap {
    /// Instrument identifier.
    pub id: InstrumentId,
    /// Notional on both legs.
    pub notional: f64,
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Fixed coupon as a decimal.
    pub fixed_rate: f64,
    /// Original tenor label, informational.
    #[serde(default)]
    pub tenor: Option<String>,
    /// Trade date.
    pub trade_date: Date,
    /// Final payment date.
    pub maturity: Date,
    /// First accrual date. Defaults to trade date plus two calendar days.
    #[serde(default)]
    pub effective_date: Option<Date>,
    /// Direction of the fixed leg.
    #[serde(default)]
    pub side: PayReceive,
    /// Floating-rate index.
    #[serde(default)]
    pub index: FloatIndex,
    /// Fixed leg payment frequency.
    #[serde(default = "default_fixed_frequency")]
    pub fixed_frequency: Frequency,
}

fn default_fixed_frequency() -> Frequency {
    Frequency::Quarterly
}

impl VanillaSwap {
    /// Pay-fixed SOFR swap with quarterly fixed payments.
    #[must_use]
    pub fn new(
        id: impl Into<InstrumentId>,
        notional: f64,
        fixed_rate: f64,
        trade_date: Date,
        maturity: Date,
    ) -> Self {
        Self {
            id: id.into(),
            notional,
            currency: default_currency(),
            fixed_rate,
            tenor: None,
            trade_date,
            maturity,
            effective_date: None,
            side: PayReceive::Pay,
            index: FloatIndex::Sofr,
            fixed_frequency: default_fixed_frequency(),
        }
    }

    /// Sets the effective date.
    #[must_use]
    pub fn with_effective_date(mut self, effective_date: Date) -> Self {
        self.effective_date = Some(effective_date);
        self
    }

    /// Sets the fixed leg direction.
    #[must_use]
    pub fn with_side(mut self, side: PayReceive) -> Self {
        self.side = side;
        self
    }

    /// Sets the floating index.
    #[must_use]
    pub fn with_index(mut self, index: FloatIndex) -> Self {
        self.index = index;
        self
    }

    /// Sets the fixed leg frequency.
    #[must_use]
    pub fn with_fixed_frequency(mut self, frequency: Frequency) -> Self {
        self.fixed_frequency = frequency;
        self
    }

    /// First accrual date.
    #[must_use]
    pub fn effective(&self) -> Date {
        self.effective_date
            .unwrap_or_else(|| self.trade_date.add_days(SPOT_LAG_DAYS))
    }

    /// Checks that the terms can be priced.
    ///
    /// # Errors
    ///
    /// `InvalidInstrument` for a non-positive notional, a non-finite fixed rate, or an
    /// effective date on or after maturity.
    pub fn validate(&self) -> PricingResult<()> {
        if !self.notional.is_finite() || self.notional <= 0.0 {
            return Err(PricingError::invalid_instrument(
                &self.id,
                format!("notional must be positive, got {}", self.notional),
            ));
        }
        if !self.fixed_rate.is_finite() {
            return Err(PricingError::invalid_instrument(&self.id, "fixed rate is not finite"));
        }
        if self.effective() >= self.maturity {
            return Err(PricingError::invalid_instrument(
                &self.id,
                format!("effective date {} is not before maturity {}", self.effective(), self.maturity),
            ));
        }
        Ok(())
    }

    /// Fixed leg schedule, rolled forward from the effective date.
    ///
    /// # Errors
    ///
    /// `Core` if the effective date is not before maturity.
    pub fn fixed_schedule(&self) -> PricingResult<Schedule> {
        Ok(Schedule::forward(self.effective(), self.maturity, self.fixed_frequency)?)
    }

    /// Floating leg schedule, rolled forward from the effective date.
    ///
    /// # Errors
    ///
    /// `Core` if the effective date is not before maturity.
    pub fn float_schedule(&self) -> PricingResult<Schedule> {
        Ok(Schedule::forward(self.effective(), self.maturity, FLOAT_FREQUENCY)?)
    }

    /// Present value of the fixed coupons still to be paid.
    ///
    /// # Errors
    ///
    /// `Core` if the schedule cannot be generated.
    pub fn fixed_leg_pv(&self, discount: &DiscountCurve) -> PricingResult<f64> {
        let valuation = discount.reference_date();
        Ok(self
            .fixed_schedule()?
            .remaining(valuation)
            .map(|p| {
                let tau = FIXED_DAY_COUNT.year_fraction(p.start, p.end);
                self.notional * self.fixed_rate * tau * discount.df_at(p.end)
            })
            .sum())
    }

    /// Present value of the floating coupons still to be paid.
    ///
    /// # Errors
    ///
    /// `MissingFixing` if a period straddling the valuation date has no fixing.
    pub fn float_leg_pv(&self, curves: &CurveSet, fixings: &Fixings) -> PricingResult<f64> {
        let valuation = curves.valuation_date;
        let mut pv = 0.0;
        for period in self.float_schedule()?.remaining(valuation) {
            let tau = FLOAT_DAY_COUNT.year_fraction(period.start, period.end);
            let rate = if period.start < valuation {
                fixings
                    .get(self.index, period.start)
                    .ok_or_else(|| PricingError::MissingFixing {
                        instrument: self.id.clone(),
                        index: self.index,
                        date: period.start,
                    })?
            } else {
                curves.forecast.simple_forward(period.start, period.end, tau)
            };
            pv += self.notional * rate * tau * curves.discount.df_at(period.end);
        }
        Ok(pv)
    }

    /// Swap value to the holder: floating minus fixed for a payer, the reverse for a
    /// receiver. A swap past maturity is worth zero.
    ///
    /// # Errors
    ///
    /// `MissingFixing` or a schedule failure.
    pub fn npv(&self, curves: &CurveSet, fixings: &Fixings) -> PricingResult<f64> {
        if self.maturity <= curves.valuation_date {
            return Ok(0.0);
        }
        let fixed = self.fixed_leg_pv(&curves.discount)?;
        let floating = self.float_leg_pv(curves, fixings)?;
        Ok(self.side.sign() * (floating - fixed))
    }
}
