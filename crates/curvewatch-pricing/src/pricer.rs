//! Instrument dispatch.

use curvewatch_curves::CurveSet;

use crate::error::PricingResult;
use crate::fixings::Fixings;
use crate::instrument::Instrument;

/// Prices instruments against one curve set.
///
/// Pure: the same instrument, curves and fixings always give the same NPV, so one pricer
/// can be shared across threads.
///
/// # Example
///
/// ```rust
/// use curvewatch_core::Date;
/// use curvewatch_curves::{CurveBuilder, MarketQuotes, Quote, QuoteSnapshot};
/// use curvewatch_pricing::{FixedRateBond, Fixings, InstrumentPricer};
///
/// let valuation = Date::from_ymd(2026, 1, 28).unwrap();
/// let quotes = QuoteSnapshot::from_quotes(["1Y", "2Y", "5Y"].iter().map(|t| Quote {
///     tenor: t.parse().unwrap(),
///     rate: 0.04,
/// }));
/// let curves = CurveBuilder::new().rebuild(&MarketQuotes::shared(quotes), valuation).unwrap();
///
/// let fixings = Fixings::new();
/// let pricer = InstrumentPricer::new(&curves, &fixings);
/// let bond = FixedRateBond::new("B1", 1_000_000.0, 0.04, Date::from_ymd(2031, 1, 28).unwrap());
/// let npv = pricer.npv(&bond.into()).unwrap();
/// assert!(npv > 990_000.0 && npv < 1_010_000.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct InstrumentPricer<'a> {
    curves: &'a CurveSet,
    fixings: &'a Fixings,
}

impl<'a> InstrumentPricer<'a> {
    /// Creates a pricer over the given curves and fixings.
    #[must_use]
    pub fn new(curves: &'a CurveSet, fixings: &'a Fixings) -> Self {
        Self { curves, fixings }
    }

    /// Curves used for pricing.
    #[must_use]
    pub fn curves(&self) -> &CurveSet {
        self.curves
    }

    /// Net present value in currency units.
    ///
    /// # Errors
    ///
    /// `MissingFixing` for a seasoned swap without its fixing, or a schedule failure.
    pub fn npv(&self, instrument: &Instrument) -> PricingResult<f64> {
        match instrument {
            Instrument::Bond(bond) => bond.npv(&self.curves.discount),
            Instrument::Swap(swap) => swap.npv(self.curves, self.fixings),
        }
    }
}
