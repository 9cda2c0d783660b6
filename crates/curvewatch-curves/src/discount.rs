//! Immutable discount curve.

use curvewatch_core::{Date, DayCountConvention, Tenor};
use curvewatch_math::interpolation::{Interpolator, LogCubicInterpolator, LogLinearInterpolator};
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::interpolation::InterpolationMethod;

/// Curve time basis: ACT/365F from the reference date.
pub const TIME_BASIS: DayCountConvention = DayCountConvention::Act365Fixed;

/// A solved pillar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePillar {
    /// Quote tenor that produced the pillar.
    pub tenor: Tenor,
    /// Time in years from the reference date.
    pub time: f64,
    /// Discount factor.
    pub df: f64,
}

impl CurvePillar {
    /// Continuously compounded zero rate.
    #[must_use]
    pub fn zero_rate(&self) -> f64 {
        -self.df.ln() / self.time
    }
}

#[derive(Debug, Clone)]
enum Interp {
    LogLinear(LogLinearInterpolator),
    LogCubic(LogCubicInterpolator),
}

impl Interp {
    fn interpolate(&self, t: f64) -> Option<f64> {
        match self {
            Interp::LogLinear(i) => i.interpolate(t).ok(),
            Interp::LogCubic(i) => i.interpolate(t).ok(),
        }
    }
}

/// Discount factors from a reference date.
///
/// DF(0) = 1. Between pillars the configured method interpolates log discount
/// factors. Beyond the last pillar the forward of the last segment is held flat.
#[derive(Debug, Clone)]
pub struct DiscountCurve {
    reference_date: Date,
    method: InterpolationMethod,
    pillars: Vec<CurvePillar>,
    interp: Interp,
    /// Continuously compounded forward used past the last pillar.
    tail_forward: f64,
}

impl DiscountCurve {
    /// Builds a curve through `(0, 1)` and the given pillars.
    ///
    /// Log-cubic falls back to log-linear when fewer than three knots exist.
    ///
    /// # Errors
    ///
    /// No pillars, non-increasing times, or a non-positive discount factor.
    pub fn new(
        reference_date: Date,
        pillars: Vec<CurvePillar>,
        method: InterpolationMethod,
    ) -> CurveResult<Self> {
        if pillars.is_empty() {
            return Err(CurveError::InsufficientQuotes {
                required: 1,
                got: 0,
            });
        }

        let xs: Vec<f64> = std::iter::once(0.0).chain(pillars.iter().map(|p| p.time)).collect();
        let ys: Vec<f64> = std::iter::once(1.0).chain(pillars.iter().map(|p| p.df)).collect();

        let interp = if method == InterpolationMethod::LogCubic && xs.len() >= method.min_points() {
            Interp::LogCubic(LogCubicInterpolator::new(xs.clone(), ys.clone())?)
        } else {
            Interp::LogLinear(LogLinearInterpolator::new(xs.clone(), ys.clone())?)
        };

        let n = xs.len();
        let tail_forward = (ys[n - 2] / ys[n - 1]).ln() / (xs[n - 1] - xs[n - 2]);

        Ok(Self {
            reference_date,
            method,
            pillars,
            interp,
            tail_forward,
        })
    }

    /// Reference (valuation) date.
    #[must_use]
    pub fn reference_date(&self) -> Date {
        self.reference_date
    }

    /// Interpolation method requested at construction.
    #[must_use]
    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    /// Solved pillars, excluding the origin.
    #[must_use]
    pub fn pillars(&self) -> &[CurvePillar] {
        &self.pillars
    }

    /// Time of the last pillar.
    #[must_use]
    pub fn max_time(&self) -> f64 {
        self.pillars.last().map_or(0.0, |p| p.time)
    }

    /// Year fraction from the reference date to `date`, zero for earlier dates.
    #[must_use]
    pub fn time_of(&self, date: Date) -> f64 {
        TIME_BASIS.year_fraction(self.reference_date, date)
    }

    /// Discount factor at time `t` (years). 1 for `t <= 0`.
    #[must_use]
    pub fn df(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        let last = self.max_time();
        if t > last {
            return self.tail_df(last, t);
        }
        self.interp.interpolate(t).unwrap_or_else(|| self.tail_df(last, t))
    }

    /// Discount factor at a date. Dates on or before the reference date give 1.
    #[must_use]
    pub fn df_at(&self, date: Date) -> f64 {
        self.df(self.time_of(date))
    }

    /// Continuously compounded zero rate to time `t`.
    #[must_use]
    pub fn zero_rate(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return self.forward_rate(0.0, 1.0 / 365.0);
        }
        -self.df(t).ln() / t
    }

    /// Continuously compounded forward rate between two times.
    #[must_use]
    pub fn forward_rate(&self, t1: f64, t2: f64) -> f64 {
        if t2 <= t1 {
            return 0.0;
        }
        (self.df(t1) / self.df(t2)).ln() / (t2 - t1)
    }

    /// Simple forward rate over `[start, end]` with accrual fraction `tau`.
    #[must_use]
    pub fn simple_forward(&self, start: Date, end: Date, tau: f64) -> f64 {
        if tau <= 0.0 {
            return 0.0;
        }
        (self.df_at(start) / self.df_at(end) - 1.0) / tau
    }

    fn tail_df(&self, last: f64, t: f64) -> f64 {
        let last_df = self.pillars.last().map_or(1.0, |p| p.df);
        last_df * (-self.tail_forward * (t - last)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_curve(rate: f64, method: InterpolationMethod) -> DiscountCurve {
        let pillars = [("1Y", 1.0), ("2Y", 2.0), ("5Y", 5.0), ("10Y", 10.0)]
            .iter()
            .map(|(label, t)| CurvePillar {
                tenor: label.parse().unwrap(),
                time: *t,
                df: (-rate * t).exp(),
            })
            .collect();
        DiscountCurve::new(Date::from_ymd(2026, 1, 28).unwrap(), pillars, method).unwrap()
    }

    #[test]
    fn test_origin_is_one() {
        let curve = flat_curve(0.04, InterpolationMethod::LogLinear);
        assert_eq!(curve.df(0.0), 1.0);
        assert_eq!(curve.df(-1.0), 1.0);
        assert_eq!(curve.df_at(curve.reference_date()), 1.0);
    }

    #[test]
    fn test_flat_curve_rates() {
        for method in [InterpolationMethod::LogLinear, InterpolationMethod::LogCubic] {
            let curve = flat_curve(0.04, method);
            assert_relative_eq!(curve.zero_rate(3.3), 0.04, epsilon = 1e-12);
            assert_relative_eq!(curve.forward_rate(2.0, 7.0), 0.04, epsilon = 1e-12);
            assert_relative_eq!(curve.zero_rate(0.0), 0.04, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_flat_forward_extrapolation() {
        let pillars = vec![
            CurvePillar { tenor: "1Y".parse().unwrap(), time: 1.0, df: (-0.03f64).exp() },
            CurvePillar { tenor: "2Y".parse().unwrap(), time: 2.0, df: (-0.03f64 - 0.05).exp() },
        ];
        let curve = DiscountCurve::new(Date::from_ymd(2026, 1, 1).unwrap(), pillars, InterpolationMethod::LogLinear).unwrap();
        assert_relative_eq!(curve.forward_rate(2.0, 30.0), 0.05, epsilon = 1e-12);
        assert_relative_eq!(curve.df(3.0), (-0.03f64 - 0.05 - 0.05).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_simple_forward() {
        let curve = flat_curve(0.04, InterpolationMethod::LogLinear);
        let start = Date::from_ymd(2027, 1, 28).unwrap();
        let end = Date::from_ymd(2027, 4, 28).unwrap();
        let tau = 90.0 / 360.0;
        let expected = ((0.04 * 90.0 / 365.0_f64).exp() - 1.0) / tau;
        assert_relative_eq!(curve.simple_forward(start, end, tau), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_cubic_falls_back_with_one_pillar() {
        let pillars = vec![CurvePillar { tenor: "1Y".parse().unwrap(), time: 1.0, df: 0.96 }];
        let curve = DiscountCurve::new(Date::from_ymd(2026, 1, 1).unwrap(), pillars, InterpolationMethod::LogCubic).unwrap();
        assert_relative_eq!(curve.df(0.5), 0.96f64.sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn test_empty_is_error() {
        let err = DiscountCurve::new(Date::from_ymd(2026, 1, 1).unwrap(), Vec::new(), InterpolationMethod::LogLinear);
        assert!(matches!(err, Err(CurveError::InsufficientQuotes { .. })));
    }
}
