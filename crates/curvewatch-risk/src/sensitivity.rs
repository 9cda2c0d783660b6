//! Bump-and-reprice sensitivity engine.

use std::collections::BTreeMap;

use curvewatch_core::{Date, InstrumentId};
use curvewatch_curves::{CurveBuilder, MarketQuotes};
use curvewatch_pricing::{Fixings, Instrument, InstrumentPricer, PricingResult};
use rayon::prelude::*;

use crate::config::{BumpConfig, BumpMethod};
use crate::error::RiskResult;
use crate::record::{RiskRecord, SensitivityFlag};
use crate::scenario::{BumpedCurves, ScenarioPair, ScenarioSet};

/// Outcome of one instrument in a portfolio run.
#[derive(Debug, Clone)]
pub struct InstrumentOutcome {
    /// Instrument identifier.
    pub instrument_id: InstrumentId,
    /// Record, or why the base NPV could not be computed.
    pub result: PricingResult<RiskRecord>,
}

/// Computes NPV, DV01 and KRDs from a prepared [`ScenarioSet`].
///
/// # Example
///
/// ```rust
/// use curvewatch_core::Date;
/// use curvewatch_curves::{CurveBuilder, MarketQuotes, Quote, QuoteSnapshot};
/// use curvewatch_pricing::{FixedRateBond, Fixings};
/// use curvewatch_risk::{BumpConfig, SensitivityEngine};
///
/// let valuation = Date::from_ymd(2026, 1, 28).unwrap();
/// let quotes = QuoteSnapshot::from_quotes(["1Y", "2Y", "5Y", "10Y"].iter().map(|t| Quote {
///     tenor: t.parse().unwrap(),
///     rate: 0.04,
/// }));
///
/// let engine = SensitivityEngine::new(BumpConfig::default()).unwrap();
/// let scenarios = engine
///     .prepare(&CurveBuilder::new(), &MarketQuotes::shared(quotes), valuation)
///     .unwrap();
///
/// let bond = FixedRateBond::new("B1", 1_000_000.0, 0.04, Date::from_ymd(2031, 1, 28).unwrap());
/// let record = engine.evaluate(&bond.into(), &scenarios, &Fixings::new(), 0).unwrap();
/// assert!(record.dv01.unwrap() > 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SensitivityEngine {
    config: BumpConfig,
}

impl SensitivityEngine {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// `InvalidBumpSize` if the bump size is not finite and positive.
    pub fn new(config: BumpConfig) -> RiskResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Bump settings.
    #[must_use]
    pub fn config(&self) -> &BumpConfig {
        &self.config
    }

    /// Builds base and bumped curves for one cycle.
    ///
    /// # Errors
    ///
    /// `BaseCurve` if the unbumped curves fail.
    pub fn prepare(
        &self,
        builder: &CurveBuilder,
        market: &MarketQuotes,
        valuation_date: Date,
    ) -> RiskResult<ScenarioSet> {
        ScenarioSet::build(builder, market, valuation_date, &self.config)
    }

    /// Prices one instrument under every scenario.
    ///
    /// # Errors
    ///
    /// Only if the base NPV cannot be computed; bumped failures become flags.
    pub fn evaluate(
        &self,
        instrument: &Instrument,
        scenarios: &ScenarioSet,
        fixings: &Fixings,
        timestamp: i64,
    ) -> PricingResult<RiskRecord> {
        let base = scenarios.base();
        let npv = InstrumentPricer::new(base, fixings).npv(instrument)?;
        let scale = scenarios.config().scale();
        let method = scenarios.config().method;

        let mut flags = Vec::new();
        let dv01 = difference(instrument, npv, scenarios.parallel(), method, fixings, &mut flags)
            .map(|d| d * scale);

        let mut krd = BTreeMap::new();
        for (tenor, pair) in scenarios.key_rates() {
            if let Some(d) = difference(instrument, npv, pair, method, fixings, &mut flags) {
                krd.insert(*tenor, d * scale);
            }
        }
        flags.extend(
            scenarios
                .missing_key_tenors()
                .iter()
                .map(|&tenor| SensitivityFlag::KeyTenorMissing { tenor }),
        );

        Ok(RiskRecord {
            instrument_id: instrument.id().clone(),
            timestamp,
            valuation_date: base.valuation_date,
            npv,
            dv01,
            krd,
            flags,
        })
    }

    /// Evaluates every instrument in parallel on the current rayon pool.
    ///
    /// Results come back in portfolio order.
    #[must_use]
    pub fn evaluate_all(
        &self,
        instruments: &[Instrument],
        scenarios: &ScenarioSet,
        fixings: &Fixings,
        timestamp: i64,
    ) -> Vec<InstrumentOutcome> {
        instruments
            .par_iter()
            .map(|instrument| InstrumentOutcome {
                instrument_id: instrument.id().clone(),
                result: self.evaluate(instrument, scenarios, fixings, timestamp),
            })
            .collect()
    }
}

/// Unscaled difference for one bump: `(down - up) / 2` or `base - up`.
fn difference(
    instrument: &Instrument,
    base: f64,
    pair: &ScenarioPair,
    method: BumpMethod,
    fixings: &Fixings,
    flags: &mut Vec<SensitivityFlag>,
) -> Option<f64> {
    let up = reprice(instrument, &pair.up, fixings, flags)?;
    match (method, &pair.down) {
        (BumpMethod::Central, Some(down)) => {
            let down = reprice(instrument, down, fixings, flags)?;
            Some((down - up) / 2.0)
        }
        _ => Some(base - up),
    }
}

fn reprice(
    instrument: &Instrument,
    bumped: &BumpedCurves,
    fixings: &Fixings,
    flags: &mut Vec<SensitivityFlag>,
) -> Option<f64> {
    let outcome = match &bumped.curves {
        Ok(curves) => InstrumentPricer::new(curves, fixings)
            .npv(instrument)
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    match outcome {
        Ok(npv) => Some(npv),
        Err(reason) => {
            flags.push(SensitivityFlag::ScenarioFailed {
                scenario: bumped.scenario.to_string(),
                reason,
            });
            None
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;
    use approx::assert_relative_eq;
    use curvewatch_core::{Frequency, Tenor};
    use curvewatch_curves::{Quote, QuoteSnapshot};
    use curvewatch_pricing::{FixedRateBond, PricingError, VanillaSwap};

    const TENORS: [&str; 11] = ["1M", "3M", "6M", "1Y", "2Y", "3Y", "5Y", "7Y", "10Y", "20Y", "30Y"];

    fn valuation() -> Date {
        Date::from_ymd(2026, 1, 28).unwrap()
    }

    fn flat(rate: f64) -> MarketQuotes {
        MarketQuotes::shared(QuoteSnapshot::from_quotes(TENORS.iter().map(|t| Quote {
            tenor: t.parse().unwrap(),
            rate,
        })))
    }

    fn five_year_bond() -> Instrument {
        FixedRateBond::new("BOND-5Y", 1_000_000.0, 0.04, Date::from_ymd(2031, 1, 28).unwrap())
            .with_issue_date(valuation())
            .with_frequency(Frequency::Annual)
            .into()
    }

    fn run(config: BumpConfig, market: &MarketQuotes, instrument: &Instrument) -> RiskRecord {
        let engine = SensitivityEngine::new(config).unwrap();
        let scenarios = engine.prepare(&CurveBuilder::new(), market, valuation()).unwrap();
        engine.evaluate(instrument, &scenarios, &Fixings::new(), 0).unwrap()
    }

    #[test]
    fn test_flat_four_percent_bond_dv01() {
        let record = run(BumpConfig::default(), &flat(0.04), &five_year_bond());
        let dv01 = record.dv01.unwrap();
        assert!((445.0..=460.0).contains(&dv01), "dv01 {dv01}");
        assert!(record.is_complete());
    }

    #[test]
    fn test_one_sided_close_to_central() {
        let central = run(BumpConfig::default(), &flat(0.04), &five_year_bond());
        let one_sided = run(
            BumpConfig::default().with_method(BumpMethod::OneSided),
            &flat(0.04),
            &five_year_bond(),
        );
        // Convexity makes the one-sided estimate slightly smaller
        assert!(one_sided.dv01.unwrap() < central.dv01.unwrap());
        assert_relative_eq!(one_sided.dv01.unwrap(), central.dv01.unwrap(), max_relative = 1e-3);
    }

    #[test]
    fn test_krd_sum_matches_dv01() {
        let record = run(BumpConfig::default(), &flat(0.04), &five_year_bond());
        assert_eq!(record.krd.len(), 4);
        assert_relative_eq!(record.krd_sum(), record.dv01.unwrap(), max_relative = 0.05);
        let five: Tenor = "5Y".parse().unwrap();
        assert!(record.krd[&five] > 0.8 * record.dv01.unwrap());
    }

    #[test]
    fn test_bump_size_is_normalized_to_one_basis_point() {
        let one_bp = run(BumpConfig::default(), &flat(0.04), &five_year_bond());
        let ten_bp = run(BumpConfig::default().with_size(0.001), &flat(0.04), &five_year_bond());
        assert_relative_eq!(ten_bp.dv01.unwrap(), one_bp.dv01.unwrap(), max_relative = 1e-4);
    }

    #[test]
    fn test_zero_bump_reprices_to_base() {
        let builder = CurveBuilder::new();
        let market = flat(0.04);
        let base = builder.rebuild(&market, valuation()).unwrap();
        let fixings = Fixings::new();
        let instrument = five_year_bond();
        let base_npv = InstrumentPricer::new(&base, &fixings).npv(&instrument).unwrap();
        for scenario in [
            Scenario::Parallel { shift: 0.0 },
            Scenario::KeyRate {
                tenor: "5Y".parse().unwrap(),
                shift: 0.0,
            },
        ] {
            let bumped = scenario.rebuild(&builder, &market, valuation()).unwrap();
            let bumped_npv = InstrumentPricer::new(&bumped, &fixings).npv(&instrument).unwrap();
            assert_eq!(base_npv, bumped_npv, "{scenario}");
        }
    }

    #[test]
    fn test_missing_key_tenor_is_flagged() {
        let market = MarketQuotes::shared(QuoteSnapshot::from_quotes(
            ["1Y", "2Y", "5Y", "10Y"].iter().map(|t| Quote {
                tenor: t.parse().unwrap(),
                rate: 0.04,
            }),
        ));
        let record = run(BumpConfig::default(), &market, &five_year_bond());
        assert_eq!(record.krd.len(), 3);
        assert_eq!(
            record.flags,
            vec![SensitivityFlag::KeyTenorMissing {
                tenor: "30Y".parse().unwrap()
            }]
        );
        assert!(record.dv01.is_some());
    }

    #[test]
    fn test_failed_scenario_is_omitted_and_flagged() {
        // A 3% bump pushes the 2Y quote below half the 1Y quote and inverts the curve
        let market = MarketQuotes::shared(QuoteSnapshot::from_quotes(
            [("1Y", 0.05), ("2Y", 0.041), ("5Y", 0.06)].iter().map(|(t, r)| Quote {
                tenor: t.parse().unwrap(),
                rate: *r,
            }),
        ));
        let config = BumpConfig::default()
            .with_size(0.03)
            .with_key_tenors(vec!["2Y".parse().unwrap(), "5Y".parse().unwrap()]);
        let record = run(config, &market, &five_year_bond());

        let two: Tenor = "2Y".parse().unwrap();
        assert!(!record.krd.contains_key(&two));
        assert!(record.krd.contains_key(&"5Y".parse::<Tenor>().unwrap()));
        assert!(record.npv.is_finite());
        assert!(record.flags.iter().any(|flag| matches!(
            flag,
            SensitivityFlag::ScenarioFailed { scenario, .. } if scenario.starts_with("key_rate 2Y")
        )));
    }

    #[test]
    fn test_unpriceable_instrument_reports_error() {
        let swap: Instrument = VanillaSwap::new(
            "SWAP-OLD",
            1_000_000.0,
            0.04,
            Date::from_ymd(2025, 12, 1).unwrap(),
            Date::from_ymd(2030, 12, 3).unwrap(),
        )
        .into();
        let engine = SensitivityEngine::default();
        let scenarios = engine.prepare(&CurveBuilder::new(), &flat(0.04), valuation()).unwrap();
        let outcomes = engine.evaluate_all(&[five_year_bond(), swap], &scenarios, &Fixings::new(), 0);

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].result.is_ok());
        assert_eq!(outcomes[1].instrument_id.as_str(), "SWAP-OLD");
        assert!(outcomes[1].result.as_ref().is_err_and(PricingError::is_missing_fixing));
    }
}
