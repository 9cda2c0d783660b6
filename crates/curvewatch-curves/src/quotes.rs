//! Live quote storage and immutable snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use curvewatch_core::Tenor;
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};

// =============================================================================
// QUOTE STORE
// =============================================================================

/// Mutable rate per configured tenor.
///
/// The tenor set is fixed at construction. Reads and writes are O(1). Each accepted
/// change increments [`QuoteStore::version`], which is how callers detect that curves
/// built from an earlier snapshot are stale.
#[derive(Debug, Clone)]
pub struct QuoteStore {
    tenors: Vec<Tenor>,
    index: HashMap<Tenor, usize>,
    rates: Vec<Option<f64>>,
    version: u64,
}

/// Outcome of applying one event's quotes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Quotes accepted (changed or unchanged).
    pub applied: usize,
    /// Accepted quotes whose value differed from the stored one.
    pub changed: usize,
    /// Labels that were refused.
    pub rejected: Vec<RejectedQuote>,
}

/// A refused quote and why.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedQuote {
    /// Label as received.
    pub label: String,
    /// Rejection reason.
    pub error: CurveError,
}

impl QuoteStore {
    /// Creates a store for a fixed tenor set. All quotes start empty.
    ///
    /// # Errors
    ///
    /// `InvalidTenorSet` if the set is empty or contains duplicates.
    pub fn new(tenors: impl IntoIterator<Item = Tenor>) -> CurveResult<Self> {
        let mut tenors: Vec<Tenor> = tenors.into_iter().collect();
        tenors.sort();
        if tenors.is_empty() {
            return Err(CurveError::InvalidTenorSet {
                reason: "no tenors configured".to_string(),
            });
        }
        if let Some(w) = tenors.windows(2).find(|w| w[0] == w[1]) {
            return Err(CurveError::InvalidTenorSet {
                reason: format!("duplicate tenor {}", w[0]),
            });
        }

        let index = tenors.iter().enumerate().map(|(i, t)| (*t, i)).collect();
        let rates = vec![None; tenors.len()];
        Ok(Self {
            tenors,
            index,
            rates,
            version: 0,
        })
    }

    /// Sets one quote. Returns whether the stored value changed.
    ///
    /// # Errors
    ///
    /// `UnknownTenor` for a tenor outside the set, `InvalidQuote` for a non-finite rate.
    pub fn set(&mut self, tenor: Tenor, rate: f64) -> CurveResult<bool> {
        let slot = *self
            .index
            .get(&tenor)
            .ok_or_else(|| CurveError::unknown_tenor(tenor.to_string()))?;
        if !rate.is_finite() {
            return Err(CurveError::InvalidQuote {
                tenor: tenor.to_string(),
                value: rate,
            });
        }
        if self.rates[slot] == Some(rate) {
            return Ok(false);
        }
        self.rates[slot] = Some(rate);
        self.version += 1;
        Ok(true)
    }

    /// Current quote for a tenor.
    #[must_use]
    pub fn get(&self, tenor: &Tenor) -> Option<f64> {
        self.index.get(tenor).and_then(|&i| self.rates[i])
    }

    /// Applies a labelled rate map. Bad labels are collected, never fatal.
    pub fn apply<I, S>(&mut self, rates: I) -> ApplyReport
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut report = ApplyReport::default();
        for (label, rate) in rates {
            let label = label.as_ref();
            let outcome = label
                .parse::<Tenor>()
                .map_err(|_| CurveError::unknown_tenor(label))
                .and_then(|tenor| self.set(tenor, rate));
            match outcome {
                Ok(changed) => {
                    report.applied += 1;
                    report.changed += usize::from(changed);
                }
                Err(error) => report.rejected.push(RejectedQuote {
                    label: label.to_string(),
                    error,
                }),
            }
        }
        report
    }

    /// Immutable view of the populated quotes, ordered by tenor.
    #[must_use]
    pub fn snapshot(&self) -> QuoteSnapshot {
        let quotes: Vec<Quote> = self
            .tenors
            .iter()
            .zip(&self.rates)
            .filter_map(|(tenor, rate)| rate.map(|rate| Quote { tenor: *tenor, rate }))
            .collect();
        QuoteSnapshot {
            quotes: quotes.into(),
        }
    }

    /// Configured tenors in ascending order.
    #[must_use]
    pub fn tenors(&self) -> &[Tenor] {
        &self.tenors
    }

    /// Number of tenors that have a value.
    #[must_use]
    pub fn populated(&self) -> usize {
        self.rates.iter().filter(|r| r.is_some()).count()
    }

    /// Change counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

/// One tenor and its rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Tenor label.
    pub tenor: Tenor,
    /// Annualized rate (0.0425 = 4.25%).
    pub rate: f64,
}

/// Immutable, tenor-ordered quotes. Cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSnapshot {
    quotes: Arc<[Quote]>,
}

impl Default for QuoteSnapshot {
    fn default() -> Self {
        Self {
            quotes: Vec::<Quote>::new().into(),
        }
    }
}

impl QuoteSnapshot {
    /// Builds a snapshot from arbitrary quotes, sorting by tenor.
    #[must_use]
    pub fn from_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        let mut quotes: Vec<Quote> = quotes.into_iter().collect();
        quotes.sort_by(|a, b| a.tenor.cmp(&b.tenor));
        Self {
            quotes: quotes.into(),
        }
    }

    /// Quotes in tenor order.
    #[must_use]
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Rate for a tenor.
    #[must_use]
    pub fn get(&self, tenor: &Tenor) -> Option<f64> {
        self.quotes.iter().find(|q| q.tenor == *tenor).map(|q| q.rate)
    }

    /// True if the tenor is quoted.
    #[must_use]
    pub fn contains(&self, tenor: &Tenor) -> bool {
        self.get(tenor).is_some()
    }

    /// Number of quotes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// True if nothing is quoted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Every quote shifted by `shift`.
    #[must_use]
    pub fn bumped_parallel(&self, shift: f64) -> Self {
        self.map_rates(|_| shift)
    }

    /// Only `tenor` shifted by `shift`. Unchanged copy if the tenor is not quoted.
    #[must_use]
    pub fn bumped_tenor(&self, tenor: &Tenor, shift: f64) -> Self {
        self.map_rates(|q| if q.tenor == *tenor { shift } else { 0.0 })
    }

    fn map_rates(&self, shift_for: impl Fn(&Quote) -> f64) -> Self {
        let quotes: Vec<Quote> = self
            .quotes
            .iter()
            .map(|q| Quote {
                tenor: q.tenor,
                rate: q.rate + shift_for(q),
            })
            .collect();
        Self {
            quotes: quotes.into(),
        }
    }
}

/// Quotes for the discount curve and, optionally, a separate forecast curve.
///
/// With no forecast quotes both curves bootstrap from the discount quotes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarketQuotes {
    /// Quotes for the discounting curve.
    pub discount: QuoteSnapshot,
    /// Quotes for the forecasting curve, if distinct.
    pub forecast: Option<QuoteSnapshot>,
}

impl MarketQuotes {
    /// Single quote set used for both curves.
    #[must_use]
    pub fn shared(quotes: QuoteSnapshot) -> Self {
        Self {
            discount: quotes,
            forecast: None,
        }
    }

    /// Distinct discount and forecast quote sets.
    #[must_use]
    pub fn dual(discount: QuoteSnapshot, forecast: QuoteSnapshot) -> Self {
        Self {
            discount,
            forecast: Some(forecast),
        }
    }

    /// Quotes feeding the forecast curve.
    #[must_use]
    pub fn forecast_quotes(&self) -> &QuoteSnapshot {
        self.forecast.as_ref().unwrap_or(&self.discount)
    }

    /// Parallel shift of every quote on both curves.
    #[must_use]
    pub fn bumped_parallel(&self, shift: f64) -> Self {
        Self {
            discount: self.discount.bumped_parallel(shift),
            forecast: self.forecast.as_ref().map(|q| q.bumped_parallel(shift)),
        }
    }

    /// Shift of a single tenor on both curves.
    #[must_use]
    pub fn bumped_tenor(&self, tenor: &Tenor, shift: f64) -> Self {
        Self {
            discount: self.discount.bumped_tenor(tenor, shift),
            forecast: self.forecast.as_ref().map(|q| q.bumped_tenor(tenor, shift)),
        }
    }

    /// True if either quote set contains the tenor.
    #[must_use]
    pub fn contains(&self, tenor: &Tenor) -> bool {
        self.discount.contains(tenor) || self.forecast_quotes().contains(tenor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenors(labels: &[&str]) -> Vec<Tenor> {
        labels.iter().map(|l| l.parse().unwrap()).collect()
    }

    fn t(label: &str) -> Tenor {
        label.parse().unwrap()
    }

    #[test]
    fn test_new_sorts_and_validates() {
        let store = QuoteStore::new(tenors(&["10Y", "1M", "2Y"])).unwrap();
        assert_eq!(store.tenors(), tenors(&["1M", "2Y", "10Y"]).as_slice());
        assert!(QuoteStore::new(Vec::new()).is_err());
        assert!(QuoteStore::new(tenors(&["2Y", "2Y"])).is_err());
    }

    #[test]
    fn test_set_and_get() {
        let mut store = QuoteStore::new(tenors(&["1Y", "2Y"])).unwrap();
        assert_eq!(store.get(&t("1Y")), None);
        assert!(store.set(t("1Y"), 0.048).unwrap());
        assert_eq!(store.get(&t("1Y")), Some(0.048));
        assert_eq!(store.version(), 1);

        // Same value is not a change
        assert!(!store.set(t("1Y"), 0.048).unwrap());
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_set_rejects_unknown_and_nan() {
        let mut store = QuoteStore::new(tenors(&["1Y"])).unwrap();
        assert!(matches!(
            store.set(t("99Y"), 0.05),
            Err(CurveError::UnknownTenor { .. })
        ));
        assert!(matches!(
            store.set(t("1Y"), f64::NAN),
            Err(CurveError::InvalidQuote { .. })
        ));
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_apply_keeps_known_tenors() {
        let mut store = QuoteStore::new(tenors(&["1Y", "2Y", "5Y"])).unwrap();
        let report = store.apply([("1Y", 0.048), ("99Y", 0.05), ("2Y", 0.042), ("bogus", 0.01)]);
        assert_eq!(report.applied, 2);
        assert_eq!(report.changed, 2);
        let labels: Vec<&str> = report.rejected.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["99Y", "bogus"]);
        assert_eq!(store.get(&t("2Y")), Some(0.042));
    }

    #[test]
    fn test_partial_event_keeps_previous_values() {
        let mut store = QuoteStore::new(tenors(&["1Y", "2Y"])).unwrap();
        store.apply([("1Y", 0.04), ("2Y", 0.041)]);
        store.apply([("2Y", 0.043)]);
        assert_eq!(store.get(&t("1Y")), Some(0.04));
        assert_eq!(store.get(&t("2Y")), Some(0.043));
    }

    #[test]
    fn test_snapshot_skips_unpopulated() {
        let mut store = QuoteStore::new(tenors(&["1M", "1Y", "2Y"])).unwrap();
        store.apply([("2Y", 0.042), ("1M", 0.05)]);
        let snap = store.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.quotes()[0].tenor, t("1M"));
        assert_eq!(store.populated(), 2);

        // Later writes do not leak into the snapshot
        store.apply([("2Y", 0.05)]);
        assert_eq!(snap.get(&t("2Y")), Some(0.042));
    }

    #[test]
    fn test_bumps() {
        let snap = QuoteSnapshot::from_quotes([
            Quote { tenor: t("5Y"), rate: 0.04 },
            Quote { tenor: t("2Y"), rate: 0.03 },
        ]);
        let up = snap.bumped_parallel(0.0001);
        assert!((up.get(&t("2Y")).unwrap() - 0.0301).abs() < 1e-15);
        assert!((up.get(&t("5Y")).unwrap() - 0.0401).abs() < 1e-15);

        let kr = snap.bumped_tenor(&t("5Y"), 0.0001);
        assert_eq!(kr.get(&t("2Y")), Some(0.03));
        assert!((kr.get(&t("5Y")).unwrap() - 0.0401).abs() < 1e-15);

        assert_eq!(snap.bumped_parallel(0.0), snap);
    }

    #[test]
    fn test_market_quotes_forecast_fallback() {
        let disc = QuoteSnapshot::from_quotes([Quote { tenor: t("1Y"), rate: 0.04 }]);
        let fwd = QuoteSnapshot::from_quotes([Quote { tenor: t("1Y"), rate: 0.05 }]);
        assert_eq!(MarketQuotes::shared(disc.clone()).forecast_quotes(), &disc);

        let dual = MarketQuotes::dual(disc, fwd.clone()).bumped_tenor(&t("1Y"), 0.01);
        assert!((dual.forecast_quotes().get(&t("1Y")).unwrap() - 0.06).abs() < 1e-15);
        assert!((dual.discount.get(&t("1Y")).unwrap() - 0.05).abs() < 1e-15);
    }
}
