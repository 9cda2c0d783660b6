//! Integration test: bootstrap a USD SOFR curve and check its structural properties.
//!
//! Market data, 28 January 2026:
//!
//! | Tenor | Instrument | Rate    |
//! |-------|------------|---------|
//! | 1M    | Deposit    | 4.310%  |
//! | 3M    | Deposit    | 4.290%  |
//! | 6M    | Deposit    | 4.220%  |
//! | 1Y    | Deposit    | 4.050%  |
//! | 2Y    | Par swap   | 3.820%  |
//! | 3Y    | Par swap   | 3.740%  |
//! | 5Y    | Par swap   | 3.710%  |
//! | 7Y    | Par swap   | 3.760%  |
//! | 10Y   | Par swap   | 3.850%  |
//! | 20Y   | Par swap   | 4.080%  |
//! | 30Y   | Par swap   | 4.010%  |

use approx::assert_relative_eq;
use curvewatch_core::{Date, Tenor};
use curvewatch_curves::{
    CurveBuilder, CurveConventions, CurveError, InterpolationMethod, MarketQuotes, Quote,
    QuoteSnapshot, QuoteStore,
};
use proptest::prelude::*;

const TENORS: [&str; 11] = ["1M", "3M", "6M", "1Y", "2Y", "3Y", "5Y", "7Y", "10Y", "20Y", "30Y"];
const SOFR: [f64; 11] = [
    0.0431, 0.0429, 0.0422, 0.0405, 0.0382, 0.0374, 0.0371, 0.0376, 0.0385, 0.0408, 0.0401,
];

fn valuation() -> Date {
    Date::from_ymd(2026, 1, 28).unwrap()
}

fn snapshot(rates: &[f64]) -> QuoteSnapshot {
    QuoteSnapshot::from_quotes(TENORS.iter().zip(rates).map(|(label, rate)| Quote {
        tenor: label.parse().unwrap(),
        rate: *rate,
    }))
}

fn assert_monotone_on_grid(curve: &curvewatch_curves::DiscountCurve) {
    let mut previous = curve.df(0.0);
    assert_eq!(previous, 1.0);
    // Weekly grid out past the last pillar
    for week in 1..=(52 * 35) {
        let df = curve.df(f64::from(week) / 52.0);
        assert!(df > 0.0, "non-positive df at week {week}");
        assert!(df <= previous + 1e-12, "df rose at week {week}: {previous} -> {df}");
        previous = df;
    }
}

#[test]
fn test_sofr_curve_builds_with_both_methods() {
    for method in [InterpolationMethod::LogLinear, InterpolationMethod::LogCubic] {
        let curve = CurveBuilder::new()
            .with_interpolation(method)
            .build(&snapshot(&SOFR), valuation())
            .unwrap();
        assert_eq!(curve.pillars().len(), TENORS.len());
        assert_monotone_on_grid(&curve);
    }
}

#[test]
fn test_deposits_reprice() {
    let conventions = CurveConventions::default();
    let curve = CurveBuilder::new().build(&snapshot(&SOFR), valuation()).unwrap();
    for (label, rate) in TENORS.iter().zip(SOFR).take(4) {
        let maturity = label.parse::<Tenor>().unwrap().advance(valuation()).unwrap();
        let tau = conventions.deposit_day_count.year_fraction(valuation(), maturity);
        assert_relative_eq!(curve.df_at(maturity) * (1.0 + rate * tau), 1.0, epsilon = 1e-14);
    }
}

#[test]
fn test_cubic_and_linear_agree_at_pillars_for_short_end() {
    let linear = CurveBuilder::new().build(&snapshot(&SOFR), valuation()).unwrap();
    let cubic = CurveBuilder::new()
        .with_interpolation(InterpolationMethod::LogCubic)
        .build(&snapshot(&SOFR), valuation())
        .unwrap();
    // Deposit pillars are closed form and do not depend on interpolation
    for (l, c) in linear.pillars().iter().zip(cubic.pillars()).take(4) {
        assert_relative_eq!(l.df, c.df, epsilon = 1e-15);
    }
    // Through 10Y every fixed coupon falls on or near a pillar
    for (l, c) in linear.pillars().iter().zip(cubic.pillars()).skip(4).take(5) {
        assert_relative_eq!(l.df, c.df, max_relative = 1e-4);
    }
    // 20Y and 30Y discount nine interpolated coupons each, where the methods part by ~0.3%
    for (l, c) in linear.pillars().iter().zip(cubic.pillars()).skip(9) {
        assert_relative_eq!(l.df, c.df, max_relative = 5e-3);
    }
}

#[test]
fn test_flat_curves_build_with_both_methods() {
    for step in 0..=12 {
        let rate = 0.02 + 0.005 * f64::from(step);
        for method in [InterpolationMethod::LogLinear, InterpolationMethod::LogCubic] {
            let curve = CurveBuilder::new()
                .with_interpolation(method)
                .build(&snapshot(&[rate; 11]), valuation())
                .unwrap_or_else(|e| panic!("flat {rate:.4} {method:?}: {e}"));
            assert_monotone_on_grid(&curve);
            // a flat par curve has a zero rate close to the par rate everywhere
            let last = curve.pillars().last().unwrap();
            assert!((last.zero_rate() - rate).abs() < 0.005, "{rate} -> {}", last.zero_rate());
        }
    }
}

#[test]
fn test_store_rejects_unconfigured_tenor_and_still_builds() {
    let tenors: Vec<Tenor> = TENORS.iter().map(|t| t.parse().unwrap()).collect();
    let mut store = QuoteStore::new(tenors).unwrap();
    let report = store.apply(TENORS.iter().copied().zip(SOFR).chain([("99Y", 0.05)]));
    assert_eq!(report.applied, TENORS.len());
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].label, "99Y");

    let curves = CurveBuilder::new()
        .rebuild(&MarketQuotes::shared(store.snapshot()), valuation())
        .unwrap();
    assert_eq!(curves.discount.pillars().len(), TENORS.len());
}

#[test]
fn test_very_long_pillar_builds() {
    let mut quotes: Vec<Quote> = snapshot(&SOFR).quotes().to_vec();
    quotes.push(Quote {
        tenor: "99Y".parse().unwrap(),
        rate: 0.04,
    });
    let curve = CurveBuilder::new()
        .build(&QuoteSnapshot::from_quotes(quotes), valuation())
        .unwrap();
    assert!(curve.max_time() > 98.0);
    assert!(curve.df(99.0) > 0.0);
}

#[test]
fn test_inverted_quotes_fail_explicitly() {
    let mut rates = SOFR;
    rates[4] = -0.01;
    let err = CurveBuilder::new().build(&snapshot(&rates), valuation()).unwrap_err();
    assert!(err.is_inversion(), "unexpected error {err:?}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_gently_sloped_curves_build_monotone(
        base in 0.02f64..0.08,
        jitter in prop::collection::vec(-0.001f64..0.001, 11),
        cubic in any::<bool>(),
    ) {
        let rates: Vec<f64> = jitter.iter().map(|j| base + j).collect();
        let method = if cubic { InterpolationMethod::LogCubic } else { InterpolationMethod::LogLinear };
        let curve = CurveBuilder::new()
            .with_interpolation(method)
            .build(&snapshot(&rates), valuation())
            .unwrap();
        let mut previous = 1.0;
        for pillar in curve.pillars() {
            prop_assert!(pillar.df > 0.0 && pillar.df <= previous);
            previous = pillar.df;
        }
    }

    #[test]
    fn prop_built_curves_are_never_inverted(
        rates in prop::collection::vec(-0.01f64..0.12, 11),
        cubic in any::<bool>(),
    ) {
        let method = if cubic { InterpolationMethod::LogCubic } else { InterpolationMethod::LogLinear };
        match CurveBuilder::new().with_interpolation(method).build(&snapshot(&rates), valuation()) {
            Ok(curve) => {
                let mut previous = 1.0;
                for month in 1..=360 {
                    let df = curve.df(f64::from(month) / 12.0);
                    prop_assert!(df > 0.0 && df <= previous + 1e-12);
                    previous = df;
                }
            }
            Err(CurveError::Inversion { .. } | CurveError::BootstrapFailed { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}
