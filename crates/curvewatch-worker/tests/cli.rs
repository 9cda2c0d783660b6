//! Runs the `curvewatch` binary end to end.

use assert_cmd::Command;
use predicates::prelude::*;

const CURVES: &str = "\
timestamp,curve_type,1M,3M,6M,1Y,2Y,3Y,5Y,7Y,10Y,20Y,30Y
2026-01-28T10:00:00,USD_SOFR,0.0430,0.0428,0.0425,0.0420,0.0410,0.0405,0.0400,0.0402,0.0410,0.0425,0.0430
2026-01-28T10:00:01,USD_SOFR,0.0430,0.0428,0.0425,0.0420,0.0411,0.0406,0.0401,0.0403,0.0411,0.0426,0.0431
";

const INSTRUMENTS: &str = r#"[
    {"id": "UST-5Y", "instrument_type": "BOND", "notional": "1000000.00",
     "currency": "USD", "coupon_rate": "0.0400", "maturity_date": "2031-01-28",
     "payment_frequency": "SEMI_ANNUAL", "day_count_convention": "ACT/ACT"},
    {"id": "SWP-5Y", "instrument_type": "SWAP", "notional": 10000000,
     "fixed_rate": 0.039, "maturity_date": "2031-02-02", "trade_date": "2026-01-28",
     "pay_receive": "PAY", "float_index": "SOFR"}
]"#;

fn curvewatch() -> Command {
    let mut cmd = Command::cargo_bin("curvewatch").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_check_prints_merged_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("curvewatch.toml");
    std::fs::write(&config, "worker_id = \"from-file\"\n[stream]\npath = \"curves.jsonl\"\n")
        .unwrap();

    curvewatch()
        .arg("--config")
        .arg(&config)
        .arg("--check")
        .env("CURVEWATCH_CHANNEL", "risk_test")
        .assert()
        .success()
        .stdout(predicate::str::contains("worker_id = \"from-file\""))
        .stdout(predicate::str::contains("channel = \"risk_test\""));
}

#[test]
fn test_invalid_config_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("curvewatch.toml");
    std::fs::write(&config, "[risk]\nkey_tenors = [\"4Y\"]\n[stream]\npath = \"x.jsonl\"\n")
        .unwrap();

    curvewatch()
        .arg("-c")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("key_tenors"));
}

#[test]
fn test_replay_to_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let curves = dir.path().join("curves.csv");
    let instruments = dir.path().join("instruments.json");
    let output = dir.path().join("risk.jsonl");
    std::fs::write(&curves, CURVES).unwrap();
    std::fs::write(&instruments, INSTRUMENTS).unwrap();

    curvewatch()
        .arg("--stream-kind=csv")
        .arg("--stream-path")
        .arg(&curves)
        .arg("--reference-kind=file")
        .arg("--reference-path")
        .arg(&instruments)
        .arg("--output-kind=jsonl")
        .arg("--output-path")
        .arg(&output)
        .arg("--pricing-threads=2")
        .assert()
        .success();

    let lines: Vec<serde_json::Value> = std::fs::read_to_string(&output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let count = |kind: &str| lines.iter().filter(|l| l["kind"] == kind).count();
    assert_eq!(count("curve"), 2);
    assert_eq!(count("risk"), 4);
    assert_eq!(count("cycle"), 2);

    // each cycle's summary follows its records
    let last = lines.last().unwrap();
    assert_eq!(last["kind"], "cycle");
    assert_eq!(last["sequence"], 2);
    assert_eq!(last["priced"], 2);
}
