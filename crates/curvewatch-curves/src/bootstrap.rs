//! Sequential bootstrap.
//!
//! Pillars are solved in tenor order starting from DF(0) = 1. Deposits have a closed
//! form; par swaps are solved with Brent on the pillar discount factor, pricing the
//! fixed leg on a partial curve that already contains the trial pillar. The bracket
//! is built outward from the previous pillar by implied forward rate.

use curvewatch_core::{Date, Schedule};
use curvewatch_math::solvers::{bisection, brent, SolverConfig};

use crate::conventions::CurveConventions;
use crate::discount::{CurvePillar, DiscountCurve, TIME_BASIS};
use crate::error::{CurveError, CurveResult};
use crate::interpolation::InterpolationMethod;
use crate::quotes::{Quote, QuoteSnapshot};

/// Slack allowed when comparing consecutive discount factors.
pub(crate) const MONOTONICITY_TOLERANCE: f64 = 1e-12;

/// Starting forward for the lower bracket search.
const MIN_BRACKET_FORWARD: f64 = 0.01;

/// Continuously compounded forward at which the lower bracket search stops.
const MAX_BRACKET_FORWARD: f64 = 2.0;

pub(crate) struct Bootstrapper<'a> {
    pub reference_date: Date,
    pub method: InterpolationMethod,
    pub conventions: &'a CurveConventions,
    pub solver: SolverConfig,
}

impl Bootstrapper<'_> {
    pub fn bootstrap(&self, quotes: &QuoteSnapshot) -> CurveResult<DiscountCurve> {
        if quotes.is_empty() {
            return Err(CurveError::InsufficientQuotes {
                required: 1,
                got: 0,
            });
        }

        let mut pillars: Vec<CurvePillar> = Vec::with_capacity(quotes.len());
        for quote in quotes.quotes() {
            let maturity = quote.tenor.advance(self.reference_date)?;
            let time = TIME_BASIS.year_fraction(self.reference_date, maturity);
            let (previous_time, previous_df) = pillars.last().map_or((0.0, 1.0), |p| (p.time, p.df));

            if time <= previous_time {
                return Err(CurveError::bootstrap_failed(
                    quote.tenor,
                    format!("pillar time {time:.6} does not follow {previous_time:.6}"),
                ));
            }

            let df = if quote.tenor.is_money_market() {
                self.deposit_df(quote, maturity)?
            } else {
                self.par_swap_df(quote, maturity, (previous_time, time), previous_df, &pillars)?
            };

            if df.is_nan() || df <= 0.0 || df > previous_df + MONOTONICITY_TOLERANCE {
                return Err(CurveError::Inversion {
                    tenor: quote.tenor,
                    previous_df,
                    df,
                });
            }

            pillars.push(CurvePillar {
                tenor: quote.tenor,
                time,
                df,
            });
        }

        let curve = DiscountCurve::new(self.reference_date, pillars, self.method)?;
        check_monotone(&curve)?;
        Ok(curve)
    }

    fn deposit_df(&self, quote: &Quote, maturity: Date) -> CurveResult<f64> {
        let tau = self
            .conventions
            .deposit_day_count
            .year_fraction(self.reference_date, maturity);
        let denominator = 1.0 + quote.rate * tau;
        if denominator <= 0.0 {
            return Err(CurveError::InvalidQuote {
                tenor: quote.tenor.to_string(),
                value: quote.rate,
            });
        }
        Ok(1.0 / denominator)
    }

    fn par_swap_df(
        &self,
        quote: &Quote,
        maturity: Date,
        (previous_time, time): (f64, f64),
        previous_df: f64,
        solved: &[CurvePillar],
    ) -> CurveResult<f64> {
        let schedule = Schedule::forward(
            self.reference_date,
            maturity,
            self.conventions.swap_fixed_frequency,
        )?;
        let accruals: Vec<(Date, f64)> = schedule
            .periods()
            .iter()
            .map(|p| {
                (
                    p.end,
                    self.conventions.swap_fixed_day_count.year_fraction(p.start, p.end),
                )
            })
            .collect();

        // Par condition: r * sum(tau_i * DF_i) + DF_T - 1 = 0
        let residual = |df: f64| -> f64 {
            let mut trial = Vec::with_capacity(solved.len() + 1);
            trial.extend_from_slice(solved);
            trial.push(CurvePillar {
                tenor: quote.tenor,
                time,
                df,
            });
            match DiscountCurve::new(self.reference_date, trial, self.method) {
                Ok(curve) => {
                    let annuity: f64 = accruals.iter().map(|(d, tau)| tau * curve.df_at(*d)).sum();
                    quote.rate * annuity + df - 1.0
                }
                Err(_) => f64::NAN,
            }
        };

        let (lower, upper) = if residual(previous_df) > 0.0 {
            // Root below the previous pillar: raise the segment forward until the sign flips
            let dt = time - previous_time;
            let mut forward = quote.rate.max(MIN_BRACKET_FORWARD);
            let lower = loop {
                let candidate = previous_df * (-forward * dt).exp();
                if residual(candidate) <= 0.0 || forward >= MAX_BRACKET_FORWARD {
                    break candidate;
                }
                forward = (2.0 * forward).min(MAX_BRACKET_FORWARD);
            };
            (lower, previous_df)
        } else {
            // Root at or above the previous pillar, rejected as an inversion by the caller
            (previous_df, 2.0 * previous_df)
        };

        brent(residual, lower, upper, &self.solver)
            .or_else(|_| bisection(residual, lower, upper, &self.solver))
            .map(|r| r.root)
            .map_err(|e| CurveError::bootstrap_failed(quote.tenor, e.to_string()))
    }
}

/// Samples the finished curve monthly and rejects any rise in discount factor.
fn check_monotone(curve: &DiscountCurve) -> CurveResult<()> {
    let pillars = curve.pillars();
    let Some(last) = pillars.last() else {
        return Ok(());
    };

    let steps = (last.time * 12.0).ceil() as usize;
    let mut previous = 1.0;
    for k in 1..=steps {
        let t = (k as f64 / 12.0).min(last.time);
        let df = curve.df(t);
        if df.is_nan() || df <= 0.0 || df > previous + MONOTONICITY_TOLERANCE {
            let segment = pillars.iter().find(|p| p.time >= t).unwrap_or(last);
            return Err(CurveError::Inversion {
                tenor: segment.tenor,
                previous_df: previous,
                df,
            });
        }
        previous = df;
    }
    Ok(())
}
