//! Integration test: sensitivities of a mixed portfolio on a dual-curve market.
//!
//! | Instrument | Terms                                       | Expected DV01 sign |
//! |------------|---------------------------------------------|--------------------|
//! | BOND-10Y   | 4.25% semi-annual ACT/ACT, 5,000,000        | positive           |
//! | PAY-7Y     | pay 3.75% quarterly vs SOFR, 25,000,000     | negative           |
//! | REC-7Y     | receive 3.75% quarterly vs SOFR, 25,000,000 | positive           |

use approx::assert_relative_eq;
use curvewatch_core::Date;
use curvewatch_curves::{CurveBuilder, MarketQuotes, Quote, QuoteSnapshot};
use curvewatch_pricing::{FixedRateBond, Fixings, Instrument, PayReceive, VanillaSwap};
use curvewatch_risk::{BumpConfig, SensitivityEngine};

const TENORS: [&str; 11] = ["1M", "3M", "6M", "1Y", "2Y", "3Y", "5Y", "7Y", "10Y", "20Y", "30Y"];
const OIS: [f64; 11] = [
    0.0431, 0.0429, 0.0422, 0.0405, 0.0382, 0.0374, 0.0371, 0.0376, 0.0385, 0.0408, 0.0401,
];
const BASIS: f64 = 0.0015;

fn valuation() -> Date {
    Date::from_ymd(2026, 1, 28).unwrap()
}

fn snapshot(shift: f64) -> QuoteSnapshot {
    QuoteSnapshot::from_quotes(TENORS.iter().zip(OIS).map(|(t, rate)| Quote {
        tenor: t.parse().unwrap(),
        rate: rate + shift,
    }))
}

fn portfolio() -> Vec<Instrument> {
    let payer = VanillaSwap::new(
        "PAY-7Y",
        25_000_000.0,
        0.0375,
        valuation(),
        Date::from_ymd(2033, 1, 28).unwrap(),
    )
    .with_effective_date(valuation());
    let receiver = VanillaSwap {
        id: "REC-7Y".into(),
        ..payer.clone().with_side(PayReceive::Receive)
    };
    vec![
        FixedRateBond::new("BOND-10Y", 5_000_000.0, 0.0425, Date::from_ymd(2036, 2, 15).unwrap())
            .with_issue_date(Date::from_ymd(2026, 2, 15).unwrap())
            .into(),
        payer.into(),
        receiver.into(),
    ]
}

#[test]
fn test_dual_curve_portfolio_signs_and_symmetry() {
    let market = MarketQuotes::dual(snapshot(0.0), snapshot(BASIS));
    let engine = SensitivityEngine::new(BumpConfig::default()).unwrap();
    let scenarios = engine.prepare(&CurveBuilder::new(), &market, valuation()).unwrap();
    assert!(!scenarios.base().is_single_curve());

    let outcomes = engine.evaluate_all(&portfolio(), &scenarios, &Fixings::new(), 1_769_614_200_000);
    let records: Vec<_> = outcomes.into_iter().map(|o| o.result.unwrap()).collect();

    let bond = &records[0];
    let payer = &records[1];
    let receiver = &records[2];

    assert!(bond.dv01.unwrap() > 0.0);
    assert!(payer.dv01.unwrap() < 0.0);
    assert!(payer.npv > 0.0, "forecast basis favours the floating receiver");
    assert_relative_eq!(receiver.npv, -payer.npv, epsilon = 1e-6);
    assert_relative_eq!(receiver.dv01.unwrap(), -payer.dv01.unwrap(), epsilon = 1e-6);

    for record in &records {
        assert!(record.is_complete());
        assert_eq!(record.krd.len(), 4);
        assert_eq!(record.timestamp, 1_769_614_200_000);
        assert_eq!(record.valuation_date, valuation());
    }
    // The bond's risk sits on the 10Y key tenor; the 7Y swaps load on the unkeyed 7Y quote
    assert_relative_eq!(bond.krd_sum(), bond.dv01.unwrap(), max_relative = 0.15);
}

#[test]
fn test_larger_bump_reports_per_basis_point() {
    let market = MarketQuotes::shared(snapshot(0.0));
    let small = SensitivityEngine::new(BumpConfig::default()).unwrap();
    let large = SensitivityEngine::new(BumpConfig::default().with_size(0.0005)).unwrap();
    let fixings = Fixings::new();
    let builder = CurveBuilder::new();

    let small_set = small.prepare(&builder, &market, valuation()).unwrap();
    let large_set = large.prepare(&builder, &market, valuation()).unwrap();
    for instrument in portfolio() {
        let a = small.evaluate(&instrument, &small_set, &fixings, 0).unwrap();
        let b = large.evaluate(&instrument, &large_set, &fixings, 0).unwrap();
        assert_relative_eq!(a.dv01.unwrap(), b.dv01.unwrap(), max_relative = 1e-3);
        assert_eq!(a.npv, b.npv);
    }
}
