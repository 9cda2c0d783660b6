//! Key and field layout of the Redis output.
//!
//! ```text
//! trade:{id}:risk              hash   npv, dv01, krd_{tenor}, curve_timestamp, updated_at
//! yield_curve:latest           hash   rate_{tenor}, timestamp, updated_at
//! yield_curve:history          zset   rates JSON scored by curve timestamp
//! {channel}                    pubsub {"instrument_id", "timestamp"}
//! {channel}:cycles             pubsub cycle summary JSON
//! ```
//!
//! Curves other than the primary one get `yield_curve:{curve_id}:latest` and
//! `yield_curve:{curve_id}:history`. All values are strings.

use curvewatch_core::{CurveId, InstrumentId};
use curvewatch_risk::RiskRecord;
use curvewatch_traits::{CurveSnapshot, TraitError};

/// Curve history kept in the sorted set, in milliseconds.
pub const CURVE_HISTORY_WINDOW_MS: i64 = 3_600_000;

/// Hash key of an instrument's latest record.
#[must_use]
pub fn risk_key(instrument_id: &InstrumentId) -> String {
    format!("trade:{instrument_id}:risk")
}

/// Hash fields of a record. An absent DV01 leaves its field out.
#[must_use]
pub fn risk_fields(record: &RiskRecord, now_ms: i64) -> Vec<(String, String)> {
    let mut fields = vec![("npv".to_string(), record.npv.to_string())];
    if let Some(dv01) = record.dv01 {
        fields.push(("dv01".to_string(), dv01.to_string()));
    }
    fields.push(("curve_timestamp".to_string(), record.timestamp.to_string()));
    fields.push(("updated_at".to_string(), now_ms.to_string()));
    fields.extend(record.krd.iter().map(|(tenor, value)| {
        (
            format!("krd_{}", tenor.to_string().to_lowercase()),
            value.to_string(),
        )
    }));
    fields
}

/// Pub/sub payload announcing a new record.
#[must_use]
pub fn risk_notification(record: &RiskRecord) -> String {
    serde_json::json!({
        "instrument_id": record.instrument_id,
        "timestamp": record.timestamp,
    })
    .to_string()
}

/// `(latest, history)` keys of a curve.
#[must_use]
pub fn curve_keys(curve_id: &CurveId, primary: &CurveId) -> (String, String) {
    if curve_id == primary {
        ("yield_curve:latest".to_string(), "yield_curve:history".to_string())
    } else {
        (
            format!("yield_curve:{curve_id}:latest"),
            format!("yield_curve:{curve_id}:history"),
        )
    }
}

/// Hash fields of a curve's latest snapshot.
#[must_use]
pub fn curve_fields(snapshot: &CurveSnapshot, now_ms: i64) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = snapshot
        .rates
        .iter()
        .map(|(tenor, rate)| (format!("rate_{}", tenor.to_lowercase()), rate.to_string()))
        .collect();
    fields.push(("timestamp".to_string(), snapshot.timestamp.to_string()));
    fields.push(("updated_at".to_string(), now_ms.to_string()));
    fields
}

/// Sorted-set member of a curve snapshot.
///
/// # Errors
///
/// `SerializationError` if the rates cannot be encoded.
pub fn curve_history_member(snapshot: &CurveSnapshot) -> Result<String, TraitError> {
    serde_json::to_string(&snapshot.rates).map_err(|e| TraitError::SerializationError(e.to_string()))
}

/// Oldest history score kept at `now_ms`.
#[must_use]
pub fn history_cutoff(now_ms: i64) -> i64 {
    now_ms - CURVE_HISTORY_WINDOW_MS
}

/// Channel carrying cycle summaries.
#[must_use]
pub fn cycle_channel(channel: &str) -> String {
    format!("{channel}:cycles")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use curvewatch_core::Date;

    fn record(dv01: Option<f64>) -> RiskRecord {
        RiskRecord {
            instrument_id: "UST-5Y".into(),
            timestamp: 1_769_558_400_000,
            valuation_date: Date::from_ymd(2026, 1, 28).unwrap(),
            npv: 1_002_345.5,
            dv01,
            krd: BTreeMap::from([
                ("2Y".parse().unwrap(), 12.5),
                ("10Y".parse().unwrap(), 0.0),
            ]),
            flags: Vec::new(),
        }
    }

    fn snapshot(curve_id: &str) -> CurveSnapshot {
        CurveSnapshot {
            curve_id: curve_id.into(),
            valuation_date: Date::from_ymd(2026, 1, 28).unwrap(),
            timestamp: 1_769_558_400_000,
            rates: BTreeMap::from([("1Y".to_string(), 0.0425), ("10Y".to_string(), 0.0415)]),
            pillars: Vec::new(),
        }
    }

    #[test]
    fn test_risk_hash() {
        assert_eq!(risk_key(&"UST-5Y".into()), "trade:UST-5Y:risk");

        let fields: BTreeMap<String, String> =
            risk_fields(&record(Some(-450.25)), 1_769_558_400_123).into_iter().collect();
        assert_eq!(fields["npv"], "1002345.5");
        assert_eq!(fields["dv01"], "-450.25");
        assert_eq!(fields["curve_timestamp"], "1769558400000");
        assert_eq!(fields["updated_at"], "1769558400123");
        assert_eq!(fields["krd_2y"], "12.5");
        assert_eq!(fields["krd_10y"], "0");
        assert_eq!(fields.len(), 6);
    }

    #[test]
    fn test_missing_dv01_is_left_out() {
        let fields = risk_fields(&record(None), 0);
        assert!(fields.iter().all(|(name, _)| name != "dv01"));
    }

    #[test]
    fn test_notification_payload() {
        let payload: serde_json::Value =
            serde_json::from_str(&risk_notification(&record(None))).unwrap();
        assert_eq!(payload["instrument_id"], "UST-5Y");
        assert_eq!(payload["timestamp"], 1_769_558_400_000_i64);
    }

    #[test]
    fn test_curve_layout() {
        let primary = CurveId::from("USD_SOFR");
        assert_eq!(
            curve_keys(&primary, &primary),
            ("yield_curve:latest".to_string(), "yield_curve:history".to_string())
        );
        assert_eq!(
            curve_keys(&"USD_LIBOR".into(), &primary).0,
            "yield_curve:USD_LIBOR:latest"
        );

        let fields: BTreeMap<String, String> =
            curve_fields(&snapshot("USD_SOFR"), 5).into_iter().collect();
        assert_eq!(fields["rate_1y"], "0.0425");
        assert_eq!(fields["rate_10y"], "0.0415");
        assert_eq!(fields["timestamp"], "1769558400000");

        let member = curve_history_member(&snapshot("USD_SOFR")).unwrap();
        let rates: BTreeMap<String, f64> = serde_json::from_str(&member).unwrap();
        assert_eq!(rates["1Y"], 0.0425);

        assert_eq!(history_cutoff(3_600_500), 500);
        assert_eq!(cycle_channel("risk_updates"), "risk_updates:cycles");
    }
}
