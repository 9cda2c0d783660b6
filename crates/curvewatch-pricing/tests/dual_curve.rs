//! Integration test: bond and swap valuation on bootstrapped curves.
//!
//! Discount curve: flat 4.00% quotes. Forecast curve: flat 4.00% or 4.50% quotes.
//!
//! | Instrument | Terms                                     |
//! |------------|-------------------------------------------|
//! | BOND-5Y    | 4.00% annual ACT/ACT, 1,000,000, 5Y      |
//! | SWAP-5Y    | pay 4.00% quarterly fixed vs SOFR, 5Y     |

use approx::assert_relative_eq;
use curvewatch_core::{Date, DayCountConvention, Frequency};
use curvewatch_curves::{CurveBuilder, CurveConventions, CurveSet, MarketQuotes, Quote, QuoteSnapshot};
use curvewatch_pricing::{FixedRateBond, Fixings, Instrument, InstrumentPricer, VanillaSwap};

const TENORS: [&str; 11] = ["1M", "3M", "6M", "1Y", "2Y", "3Y", "5Y", "7Y", "10Y", "20Y", "30Y"];
const NOTIONAL: f64 = 1_000_000.0;

fn valuation() -> Date {
    Date::from_ymd(2026, 1, 28).unwrap()
}

fn maturity() -> Date {
    Date::from_ymd(2031, 1, 28).unwrap()
}

fn flat(rate: f64) -> QuoteSnapshot {
    QuoteSnapshot::from_quotes(TENORS.iter().map(|t| Quote {
        tenor: t.parse().unwrap(),
        rate,
    }))
}

fn bond() -> Instrument {
    FixedRateBond::new("BOND-5Y", NOTIONAL, 0.04, maturity())
        .with_issue_date(valuation())
        .with_frequency(Frequency::Annual)
        .into()
}

fn swap() -> Instrument {
    VanillaSwap::new("SWAP-5Y", NOTIONAL, 0.04, valuation(), maturity())
        .with_effective_date(valuation())
        .into()
}

fn build(market: &MarketQuotes) -> CurveSet {
    CurveBuilder::new().rebuild(market, valuation()).unwrap()
}

#[test]
fn test_par_bond_prices_near_notional() {
    let curves = build(&MarketQuotes::shared(flat(0.04)));
    let fixings = Fixings::new();
    let npv = InstrumentPricer::new(&curves, &fixings).npv(&bond()).unwrap();
    // Quotes are ACT/360 money-market rates, slightly richer than a 4% annual bond yield
    assert_relative_eq!(npv, NOTIONAL, max_relative = 5e-3);
    assert!(npv < NOTIONAL);
}

#[test]
fn test_par_bond_exact_under_matching_conventions() {
    let conventions = CurveConventions {
        deposit_day_count: DayCountConvention::ActAct,
        swap_fixed_day_count: DayCountConvention::ActAct,
        swap_fixed_frequency: Frequency::Annual,
    };
    let curves = CurveBuilder::new()
        .with_conventions(conventions)
        .rebuild(&MarketQuotes::shared(flat(0.04)), valuation())
        .unwrap();
    let fixings = Fixings::new();
    let npv = InstrumentPricer::new(&curves, &fixings).npv(&bond()).unwrap();
    assert_relative_eq!(npv, NOTIONAL, max_relative = 1e-4);
}

#[test]
fn test_forecast_only_change_moves_swap_not_bond() {
    let base = build(&MarketQuotes::dual(flat(0.04), flat(0.04)));
    let shifted = build(&MarketQuotes::dual(flat(0.04), flat(0.045)));
    let fixings = Fixings::new();

    let base_pricer = InstrumentPricer::new(&base, &fixings);
    let shifted_pricer = InstrumentPricer::new(&shifted, &fixings);

    let bond_base = base_pricer.npv(&bond()).unwrap();
    let bond_shifted = shifted_pricer.npv(&bond()).unwrap();
    assert_eq!(bond_base, bond_shifted);

    let swap_base = base_pricer.npv(&swap()).unwrap();
    let swap_shifted = shifted_pricer.npv(&swap()).unwrap();
    // Roughly 50bp on a five-year annuity
    assert!(swap_shifted - swap_base > 15_000.0, "swap moved {}", swap_shifted - swap_base);
}

#[test]
fn test_pricing_is_deterministic() {
    let curves = build(&MarketQuotes::shared(flat(0.0425)));
    let fixings = Fixings::new();
    let pricer = InstrumentPricer::new(&curves, &fixings);
    for instrument in [bond(), swap()] {
        assert_eq!(pricer.npv(&instrument).unwrap(), pricer.npv(&instrument).unwrap());
    }
}
