//! Curve builder: quotes in, immutable curve pair out.

use std::sync::Arc;

use curvewatch_core::Date;
use curvewatch_math::solvers::SolverConfig;

use crate::bootstrap::Bootstrapper;
use crate::conventions::CurveConventions;
use crate::discount::DiscountCurve;
use crate::error::CurveResult;
use crate::interpolation::InterpolationMethod;
use crate::quotes::{MarketQuotes, QuoteSnapshot};

/// Discount and forecast curves built from one market state.
///
/// When both come from the same quotes the two `Arc`s point at the same curve.
#[derive(Debug, Clone)]
pub struct CurveSet {
    /// Curve used to discount cash flows.
    pub discount: Arc<DiscountCurve>,
    /// Curve used to project floating-rate fixings.
    pub forecast: Arc<DiscountCurve>,
    /// Reference date of both curves.
    pub valuation_date: Date,
}

impl CurveSet {
    /// True if forecasting and discounting share one curve.
    #[must_use]
    pub fn is_single_curve(&self) -> bool {
        Arc::ptr_eq(&self.discount, &self.forecast)
    }
}

/// Pure function from quotes to curves.
///
/// # Example
///
/// ```rust
/// use curvewatch_curves::{CurveBuilder, InterpolationMethod};
///
/// let builder = CurveBuilder::new().with_interpolation(InterpolationMethod::LogCubic);
/// assert_eq!(builder.interpolation(), InterpolationMethod::LogCubic);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CurveBuilder {
    interpolation: InterpolationMethod,
    conventions: CurveConventions,
    solver: SolverConfig,
}

impl CurveBuilder {
    /// Builder with log-linear interpolation and default conventions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the interpolation method.
    #[must_use]
    pub fn with_interpolation(mut self, method: InterpolationMethod) -> Self {
        self.interpolation = method;
        self
    }

    /// Sets the quote conventions.
    #[must_use]
    pub fn with_conventions(mut self, conventions: CurveConventions) -> Self {
        self.conventions = conventions;
        self
    }

    /// Sets the root-finder configuration.
    #[must_use]
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Configured interpolation method.
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMethod {
        self.interpolation
    }

    /// Configured quote conventions.
    #[must_use]
    pub fn conventions(&self) -> &CurveConventions {
        &self.conventions
    }

    /// Bootstraps one curve.
    ///
    /// # Errors
    ///
    /// `Inversion` if a discount factor would rise, `InsufficientQuotes` for an empty
    /// snapshot, `BootstrapFailed` if a pillar cannot be solved.
    pub fn build(&self, quotes: &QuoteSnapshot, valuation_date: Date) -> CurveResult<DiscountCurve> {
        Bootstrapper {
            reference_date: valuation_date,
            method: self.interpolation,
            conventions: &self.conventions,
            solver: self.solver,
        }
        .bootstrap(quotes)
    }

    /// Bootstraps the discount and forecast curves.
    ///
    /// # Errors
    ///
    /// Any error from [`CurveBuilder::build`] on either curve.
    pub fn rebuild(&self, market: &MarketQuotes, valuation_date: Date) -> CurveResult<CurveSet> {
        let discount = Arc::new(self.build(&market.discount, valuation_date)?);
        let forecast = match &market.forecast {
            Some(quotes) => Arc::new(self.build(quotes, valuation_date)?),
            None => Arc::clone(&discount),
        };
        Ok(CurveSet {
            discount,
            forecast,
            valuation_date,
        })
    }
}
