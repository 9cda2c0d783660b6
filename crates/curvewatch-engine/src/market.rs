//! Quote stores and the last good curve build.

use std::sync::Arc;

use curvewatch_core::{CurveId, Date};
use curvewatch_curves::{ApplyReport, MarketQuotes, QuoteStore};
use curvewatch_risk::ScenarioSet;
use curvewatch_traits::{CurveSection, CurveSnapshot, MarketDataEvent};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone)]
struct BuiltMarket {
    versions: (u64, u64),
    valuation_date: Date,
    scenarios: Arc<ScenarioSet>,
}

/// Live quotes for the discount curve and, when configured separately, the forecast curve.
///
/// Owned by the event loop. Curves are never mutated: a new [`ScenarioSet`] replaces the
/// previous one whenever quotes or the valuation date change.
#[derive(Debug, Clone)]
pub struct MarketState {
    discount_id: CurveId,
    forecast_id: CurveId,
    discount: QuoteStore,
    forecast: Option<QuoteStore>,
    built: Option<BuiltMarket>,
}

impl MarketState {
    /// Creates empty stores for the configured tenor set.
    ///
    /// # Errors
    ///
    /// `BaseCurve` if the tenor set is empty or has duplicates.
    pub fn new(curve: &CurveSection) -> EngineResult<Self> {
        let discount = QuoteStore::new(curve.tenors.iter().copied())?;
        let forecast = if curve.is_dual_curve() {
            Some(QuoteStore::new(curve.tenors.iter().copied())?)
        } else {
            None
        };
        Ok(Self {
            discount_id: curve.discount_curve.clone(),
            forecast_id: curve.forecast_curve.clone(),
            discount,
            forecast,
            built: None,
        })
    }

    /// True if the event's curve feeds one of the stores.
    #[must_use]
    pub fn tracks(&self, curve_id: &CurveId) -> bool {
        *curve_id == self.discount_id || *curve_id == self.forecast_id
    }

    /// Applies an event's rates to the store its curve id selects.
    ///
    /// # Errors
    ///
    /// `ConfigError` for a curve id that feeds neither store.
    pub fn apply(&mut self, event: &MarketDataEvent) -> EngineResult<ApplyReport> {
        let rates = event.rates.iter().map(|(label, rate)| (label.as_str(), *rate));
        if event.curve_id == self.discount_id {
            Ok(self.discount.apply(rates))
        } else if event.curve_id == self.forecast_id {
            match self.forecast.as_mut() {
                Some(store) => Ok(store.apply(rates)),
                None => Ok(self.discount.apply(rates)),
            }
        } else {
            Err(EngineError::config(format!("untracked curve '{}'", event.curve_id)))
        }
    }

    /// Immutable quotes for a curve build.
    #[must_use]
    pub fn market_quotes(&self) -> MarketQuotes {
        match &self.forecast {
            Some(forecast) => MarketQuotes::dual(self.discount.snapshot(), forecast.snapshot()),
            None => MarketQuotes::shared(self.discount.snapshot()),
        }
    }

    fn versions(&self) -> (u64, u64) {
        (
            self.discount.version(),
            self.forecast.as_ref().map_or(0, QuoteStore::version),
        )
    }

    /// Last build, if quotes and valuation date are unchanged since.
    #[must_use]
    pub fn current_scenarios(&self, valuation_date: Date) -> Option<Arc<ScenarioSet>> {
        let versions = self.versions();
        self.built
            .as_ref()
            .filter(|b| b.versions == versions && b.valuation_date == valuation_date)
            .map(|b| Arc::clone(&b.scenarios))
    }

    /// Stores a successful build for the current quotes.
    pub fn install(&mut self, valuation_date: Date, scenarios: Arc<ScenarioSet>) {
        self.built = Some(BuiltMarket {
            versions: self.versions(),
            valuation_date,
            scenarios,
        });
    }

    /// Most recent successful build, whatever quotes have arrived since.
    #[must_use]
    pub fn last_good(&self) -> Option<Arc<ScenarioSet>> {
        self.built.as_ref().map(|b| Arc::clone(&b.scenarios))
    }

    /// Publishable snapshots of the base curves in `scenarios`.
    #[must_use]
    pub fn curve_snapshots(
        &self,
        market: &MarketQuotes,
        scenarios: &ScenarioSet,
        timestamp: i64,
    ) -> Vec<CurveSnapshot> {
        let base = scenarios.base();
        let mut snapshots = vec![CurveSnapshot::new(
            self.discount_id.clone(),
            timestamp,
            &market.discount,
            &base.discount,
        )];
        if !base.is_single_curve() {
            snapshots.push(CurveSnapshot::new(
                self.forecast_id.clone(),
                timestamp,
                market.forecast_quotes(),
                &base.forecast,
            ));
        }
        snapshots
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use curvewatch_curves::CurveBuilder;
    use curvewatch_risk::BumpConfig;

    fn event(curve: &str, rates: &[(&str, f64)]) -> MarketDataEvent {
        MarketDataEvent::new(
            1_769_558_400_000,
            curve,
            rates.iter().map(|(t, r)| ((*t).to_string(), *r)),
        )
    }

    fn valuation() -> Date {
        Date::from_ymd(2026, 1, 28).unwrap()
    }

    #[test]
    fn test_unknown_tenor_is_rejected_rest_applied() {
        let mut market = MarketState::new(&CurveSection::default()).unwrap();
        let report = market
            .apply(&event("USD_SOFR", &[("2Y", 0.041), ("5Y", 0.043), ("99Y", 0.05)]))
            .unwrap();
        assert_eq!(report.applied, 2);
        assert_eq!(report.rejected[0].label, "99Y");
        assert_eq!(market.market_quotes().discount.len(), 2);
    }

    #[test]
    fn test_untracked_curve() {
        let mut market = MarketState::new(&CurveSection::default()).unwrap();
        assert!(!market.tracks(&"EUR_ESTR".into()));
        assert!(market.apply(&event("EUR_ESTR", &[("2Y", 0.02)])).is_err());
        assert!(market.market_quotes().discount.is_empty());
    }

    #[test]
    fn test_dual_curve_routing() {
        let section = CurveSection {
            forecast_curve: "USD_LIBOR".into(),
            ..CurveSection::default()
        };
        let mut market = MarketState::new(&section).unwrap();
        market.apply(&event("USD_SOFR", &[("1Y", 0.04)])).unwrap();
        market.apply(&event("USD_LIBOR", &[("1Y", 0.0415), ("2Y", 0.042)])).unwrap();

        let quotes = market.market_quotes();
        assert_eq!(quotes.discount.len(), 1);
        assert_eq!(quotes.forecast_quotes().len(), 2);
    }

    #[test]
    fn test_build_reused_until_quotes_or_date_change() {
        let mut market = MarketState::new(&CurveSection::default()).unwrap();
        market
            .apply(&event("USD_SOFR", &[("1Y", 0.04), ("2Y", 0.041), ("5Y", 0.042)]))
            .unwrap();
        assert!(market.current_scenarios(valuation()).is_none());

        let scenarios = ScenarioSet::build(
            &CurveBuilder::new(),
            &market.market_quotes(),
            valuation(),
            &BumpConfig::default(),
        )
        .unwrap();
        market.install(valuation(), Arc::new(scenarios));
        assert!(market.current_scenarios(valuation()).is_some());
        assert!(market.current_scenarios(valuation().add_days(1)).is_none());

        // same value again: no change, build still current
        market.apply(&event("USD_SOFR", &[("2Y", 0.041)])).unwrap();
        assert!(market.current_scenarios(valuation()).is_some());

        market.apply(&event("USD_SOFR", &[("2Y", 0.0412)])).unwrap();
        assert!(market.current_scenarios(valuation()).is_none());
        assert!(market.last_good().is_some());
    }

    #[test]
    fn test_curve_snapshots_per_curve() {
        let mut market = MarketState::new(&CurveSection::default()).unwrap();
        market
            .apply(&event("USD_SOFR", &[("1Y", 0.04), ("2Y", 0.041), ("5Y", 0.042)]))
            .unwrap();
        let quotes = market.market_quotes();
        let scenarios =
            ScenarioSet::build(&CurveBuilder::new(), &quotes, valuation(), &BumpConfig::default())
                .unwrap();

        let snapshots = market.curve_snapshots(&quotes, &scenarios, 42);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].curve_id.as_str(), "USD_SOFR");
        assert_eq!(snapshots[0].rates.len(), 3);
        assert_eq!(snapshots[0].timestamp, 42);
    }
}
