//! Bumped curve scenarios.
//!
//! Every instrument in a cycle sees the same bumped curves, so each scenario is
//! bootstrapped once per cycle and shared read-only across the pricing pool.

use std::fmt;

use curvewatch_core::{Date, Tenor};
use curvewatch_curves::{CurveBuilder, CurveError, CurveResult, CurveSet, MarketQuotes};
use rayon::prelude::*;
use tracing::warn;

use crate::config::{BumpConfig, BumpMethod};
use crate::error::RiskResult;

/// A shift applied to the market quotes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scenario {
    /// Every quote on both curves moves by `shift`.
    Parallel {
        /// Rate shift in decimal.
        shift: f64,
    },
    /// One tenor on both curves moves by `shift`.
    KeyRate {
        /// Bumped tenor.
        tenor: Tenor,
        /// Rate shift in decimal.
        shift: f64,
    },
}

impl Scenario {
    /// Rate shift in decimal.
    #[must_use]
    pub fn shift(&self) -> f64 {
        match self {
            Scenario::Parallel { shift } | Scenario::KeyRate { shift, .. } => *shift,
        }
    }

    /// Quotes after the shift.
    #[must_use]
    pub fn apply(&self, market: &MarketQuotes) -> MarketQuotes {
        match self {
            Scenario::Parallel { shift } => market.bumped_parallel(*shift),
            Scenario::KeyRate { tenor, shift } => market.bumped_tenor(tenor, *shift),
        }
    }

    /// Rebuilds both curves under this scenario.
    ///
    /// # Errors
    ///
    /// Any curve construction error, typically an inversion.
    pub fn rebuild(
        &self,
        builder: &CurveBuilder,
        market: &MarketQuotes,
        valuation_date: Date,
    ) -> CurveResult<CurveSet> {
        builder.rebuild(&self.apply(market), valuation_date)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bp = self.shift() * 10_000.0;
        match self {
            Scenario::Parallel { .. } => write!(f, "parallel {bp:+.2}bp"),
            Scenario::KeyRate { tenor, .. } => write!(f, "key_rate {tenor} {bp:+.2}bp"),
        }
    }
}

/// Curves produced by one scenario, or the reason they could not be built.
#[derive(Debug, Clone)]
pub struct BumpedCurves {
    /// Applied shift.
    pub scenario: Scenario,
    /// Rebuilt curves.
    pub curves: Result<CurveSet, CurveError>,
}

impl BumpedCurves {
    fn build(builder: &CurveBuilder, market: &MarketQuotes, valuation: Date, scenario: Scenario) -> Self {
        let curves = scenario.rebuild(builder, market, valuation);
        if let Err(error) = &curves {
            warn!(
                scenario = %scenario,
                tenors = ?market.discount.quotes().iter().map(|q| q.tenor.to_string()).collect::<Vec<_>>(),
                error = %error,
                "Bumped curve rebuild failed"
            );
        }
        Self { scenario, curves }
    }
}

/// Up and, for central differences, down scenario of one bump.
#[derive(Debug, Clone)]
pub struct ScenarioPair {
    /// Shift by `+size`.
    pub up: BumpedCurves,
    /// Shift by `-size`; absent for one-sided differences.
    pub down: Option<BumpedCurves>,
}

impl ScenarioPair {
    fn build(
        builder: &CurveBuilder,
        market: &MarketQuotes,
        valuation: Date,
        config: &BumpConfig,
        scenario: impl Fn(f64) -> Scenario + Sync,
    ) -> Self {
        match config.method {
            BumpMethod::Central => {
                let (up, down) = rayon::join(
                    || BumpedCurves::build(builder, market, valuation, scenario(config.size)),
                    || BumpedCurves::build(builder, market, valuation, scenario(-config.size)),
                );
                Self {
                    up,
                    down: Some(down),
                }
            }
            BumpMethod::OneSided => Self {
                up: BumpedCurves::build(builder, market, valuation, scenario(config.size)),
                down: None,
            },
        }
    }
}

/// Base curves plus every bumped curve set a cycle needs.
#[derive(Debug, Clone)]
pub struct ScenarioSet {
    config: BumpConfig,
    base: CurveSet,
    parallel: ScenarioPair,
    key_rates: Vec<(Tenor, ScenarioPair)>,
    missing_key_tenors: Vec<Tenor>,
}

impl ScenarioSet {
    /// Builds the base curves, then every bumped scenario in parallel.
    ///
    /// Bumped scenarios that fail are kept with their error so each record can flag them.
    ///
    /// # Errors
    ///
    /// `InvalidBumpSize` for a bad config, `BaseCurve` if the unbumped curves fail.
    pub fn build(
        builder: &CurveBuilder,
        market: &MarketQuotes,
        valuation_date: Date,
        config: &BumpConfig,
    ) -> RiskResult<Self> {
        config.validate()?;
        let base = builder.rebuild(market, valuation_date)?;

        let (present, missing_key_tenors): (Vec<Tenor>, Vec<Tenor>) = config
            .key_tenors
            .iter()
            .copied()
            .partition(|tenor| market.contains(tenor));

        let (parallel, key_rates) = rayon::join(
            || {
                ScenarioPair::build(builder, market, valuation_date, config, |shift| {
                    Scenario::Parallel { shift }
                })
            },
            || {
                present
                    .par_iter()
                    .map(|&tenor| {
                        let pair = ScenarioPair::build(builder, market, valuation_date, config, |shift| {
                            Scenario::KeyRate { tenor, shift }
                        });
                        (tenor, pair)
                    })
                    .collect::<Vec<_>>()
            },
        );

        Ok(Self {
            config: config.clone(),
            base,
            parallel,
            key_rates,
            missing_key_tenors,
        })
    }

    /// Bump settings the set was built with.
    #[must_use]
    pub fn config(&self) -> &BumpConfig {
        &self.config
    }

    /// Unbumped curves.
    #[must_use]
    pub fn base(&self) -> &CurveSet {
        &self.base
    }

    /// Parallel scenario pair.
    #[must_use]
    pub fn parallel(&self) -> &ScenarioPair {
        &self.parallel
    }

    /// Key rate scenario pairs in key tenor order.
    #[must_use]
    pub fn key_rates(&self) -> &[(Tenor, ScenarioPair)] {
        &self.key_rates
    }

    /// Key tenors with no quote in the market snapshot.
    #[must_use]
    pub fn missing_key_tenors(&self) -> &[Tenor] {
        &self.missing_key_tenors
    }

    /// Number of bumped scenarios that failed to build.
    #[must_use]
    pub fn failed_scenarios(&self) -> usize {
        std::iter::once(&self.parallel)
            .chain(self.key_rates.iter().map(|(_, pair)| pair))
            .flat_map(|pair| std::iter::once(&pair.up).chain(pair.down.as_ref()))
            .filter(|bumped| bumped.curves.is_err())
            .count()
    }
}
