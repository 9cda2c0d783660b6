//! Output publishing contracts.
//!
//! A [`RiskPublisher`] receives, per successful cycle and in this order:
//! - one [`CurveSnapshot`] per rebuilt curve
//! - one [`RiskRecord`] per priced instrument, possibly concurrently
//! - one [`CycleSummary`] after every record has been handed over

use std::collections::BTreeMap;

use async_trait::async_trait;
use curvewatch_core::{CurveId, Date, InstrumentId, Tenor};
use curvewatch_curves::{DiscountCurve, QuoteSnapshot};
use curvewatch_risk::RiskRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TraitError;

// =============================================================================
// CURVE SNAPSHOT
// =============================================================================

/// One bootstrapped pillar as published.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PillarPoint {
    /// Quote tenor
    pub tenor: Tenor,
    /// ACT/365F years from the valuation date
    pub time: f64,
    /// Discount factor
    pub df: f64,
    /// Continuously compounded zero rate
    pub zero_rate: f64,
}

/// A built curve and the quotes it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSnapshot {
    /// Curve identifier
    pub curve_id: CurveId,
    /// Valuation date
    pub valuation_date: Date,
    /// Market event timestamp, epoch milliseconds
    pub timestamp: i64,
    /// Input rates by tenor label
    pub rates: BTreeMap<String, f64>,
    /// Bootstrapped pillars, ascending
    pub pillars: Vec<PillarPoint>,
}

impl CurveSnapshot {
    /// Captures a curve and its inputs.
    #[must_use]
    pub fn new(
        curve_id: CurveId,
        timestamp: i64,
        quotes: &QuoteSnapshot,
        curve: &DiscountCurve,
    ) -> Self {
        Self {
            curve_id,
            valuation_date: curve.reference_date(),
            timestamp,
            rates: quotes
                .quotes()
                .iter()
                .map(|q| (q.tenor.to_string(), q.rate))
                .collect(),
            pillars: curve
                .pillars()
                .iter()
                .map(|p| PillarPoint {
                    tenor: p.tenor,
                    time: p.time,
                    df: p.df,
                    zero_rate: p.zero_rate(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// CYCLE SUMMARY
// =============================================================================

/// An instrument that produced no record this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnpriceableInstrument {
    /// Instrument identifier
    pub instrument_id: InstrumentId,
    /// Why it could not be priced
    pub reason: String,
}

/// Completion signal for one repricing cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    /// Unique cycle id
    pub cycle_id: Uuid,
    /// Worker that ran the cycle
    pub worker_id: String,
    /// Stream partition of the triggering event
    pub partition: u32,
    /// Sequence of the triggering event
    pub sequence: u64,
    /// Timestamp of the triggering event, epoch milliseconds
    pub event_timestamp: i64,
    /// Curve valuation date
    pub valuation_date: Date,
    /// Instruments in the portfolio cache
    pub instrument_count: usize,
    /// Instruments that produced a record, including records later dropped by the sink
    pub priced: usize,
    /// Priced records the sink did not accept after every publish attempt
    #[serde(default)]
    pub dropped: usize,
    /// Instruments without a record
    #[serde(default)]
    pub unpriceable: Vec<UnpriceableInstrument>,
    /// Records with at least one omitted sensitivity
    pub flagged: usize,
    /// Wall time from event receipt to last record handed over
    pub elapsed_ms: f64,
    /// Completion time, epoch milliseconds
    pub completed_at: i64,
}

impl CycleSummary {
    /// True if every cached instrument was priced.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unpriceable.is_empty() && self.priced == self.instrument_count
    }
}

// =============================================================================
// PUBLISHER
// =============================================================================

/// Sink for risk output.
#[async_trait]
pub trait RiskPublisher: Send + Sync {
    /// Writes one instrument's record.
    async fn publish_risk(&self, record: &RiskRecord) -> Result<(), TraitError>;

    /// Writes a curve snapshot.
    async fn publish_curve(&self, snapshot: &CurveSnapshot) -> Result<(), TraitError>;

    /// Signals that a cycle has finished.
    async fn cycle_complete(&self, summary: &CycleSummary) -> Result<(), TraitError>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

// =============================================================================
// TESTS
// =============================================================================
