//! Market data stream contracts.
//!
//! A [`MarketDataSource`] yields [`MarketDataEvent`]s in order. Each event carries the
//! partition it was read from and a per-partition sequence number, which the engine uses
//! for duplicate and stale detection before committing the event back to the source.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use curvewatch_core::{CurveId, Date};
use serde::{Deserialize, Serialize};

use crate::error::TraitError;

// =============================================================================
// EVENTS
// =============================================================================

/// One curve update from the market data stream.
///
/// Wire format (one JSON object per message):
///
/// ```json
/// {"timestamp": 1769558400000, "curve_date": "2026-01-28", "curve_type": "USD_SOFR",
///  "rates": {"2Y": 0.041, "5Y": 0.043}}
/// ```
///
/// `partition` and `sequence` are assigned by the source and are not part of the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDataEvent {
    /// Stream partition this event was read from
    #[serde(skip)]
    pub partition: u32,
    /// Position within the partition, strictly increasing
    #[serde(skip)]
    pub sequence: u64,
    /// Event time, Unix epoch milliseconds
    pub timestamp: i64,
    /// Curve identifier
    #[serde(rename = "curve_type", alias = "curve_id")]
    pub curve_id: CurveId,
    /// Curve date, if the publisher supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_date: Option<Date>,
    /// Tenor label to annualized rate
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
}

impl MarketDataEvent {
    /// Creates an event with no partition or sequence assigned.
    pub fn new(
        timestamp: i64,
        curve_id: impl Into<CurveId>,
        rates: impl IntoIterator<Item = (String, f64)>,
    ) -> Self {
        Self {
            partition: 0,
            sequence: 0,
            timestamp,
            curve_id: curve_id.into(),
            curve_date: None,
            rates: rates.into_iter().collect(),
        }
    }

    /// Sets the curve date.
    #[must_use]
    pub fn with_curve_date(mut self, date: Date) -> Self {
        self.curve_date = Some(date);
        self
    }

    /// Sets partition and sequence.
    #[must_use]
    pub fn with_position(mut self, partition: u32, sequence: u64) -> Self {
        self.partition = partition;
        self.sequence = sequence;
        self
    }

    /// Curve date, or the UTC date of the timestamp when absent.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the timestamp is out of range.
    pub fn valuation_date(&self) -> Result<Date, TraitError> {
        match self.curve_date {
            Some(date) => Ok(date),
            None => Date::from_timestamp_millis(self.timestamp)
                .map_err(|e| TraitError::InvalidInput(e.to_string())),
        }
    }

    /// Parses one wire-format message.
    ///
    /// # Errors
    ///
    /// `ParseError` if the message is not a valid event.
    pub fn from_json(line: &str) -> Result<Self, TraitError> {
        Ok(serde_json::from_str(line)?)
    }
}

// =============================================================================
// PARTITIONING
// =============================================================================

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Stable partition of a curve id: FNV-1a (32 bit) modulo `partition_count`.
#[must_use]
pub fn partition_for(curve_id: &str, partition_count: u32) -> u32 {
    if partition_count <= 1 {
        return 0;
    }
    let hash = curve_id.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    });
    hash % partition_count
}

/// The stream partitions one worker owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionAssignment {
    partitions: BTreeSet<u32>,
    partition_count: u32,
}

impl PartitionAssignment {
    /// Creates an assignment.
    ///
    /// # Errors
    ///
    /// `Configuration` if no partition is assigned or one is outside `0..partition_count`.
    pub fn new(
        partitions: impl IntoIterator<Item = u32>,
        partition_count: u32,
    ) -> Result<Self, TraitError> {
        let partitions: BTreeSet<u32> = partitions.into_iter().collect();
        if partitions.is_empty() {
            return Err(TraitError::Configuration("no partitions assigned".to_string()));
        }
        if let Some(p) = partitions.iter().find(|&&p| p >= partition_count) {
            return Err(TraitError::Configuration(format!(
                "partition {p} outside 0..{partition_count}"
            )));
        }
        Ok(Self {
            partitions,
            partition_count,
        })
    }

    /// Owns every partition of a single-partition stream.
    #[must_use]
    pub fn single() -> Self {
        Self {
            partitions: BTreeSet::from([0]),
            partition_count: 1,
        }
    }

    /// Total partitions in the stream.
    #[must_use]
    pub fn partition_count(&self) -> u32 {
        self.partition_count
    }

    /// Assigned partitions, ascending.
    pub fn partitions(&self) -> impl Iterator<Item = u32> + '_ {
        self.partitions.iter().copied()
    }

    /// Partition a curve id hashes to.
    #[must_use]
    pub fn partition_of(&self, curve_id: &str) -> u32 {
        partition_for(curve_id, self.partition_count)
    }

    /// True if this worker owns the partition.
    #[must_use]
    pub fn owns(&self, partition: u32) -> bool {
        self.partitions.contains(&partition)
    }
}

impl Default for PartitionAssignment {
    fn default() -> Self {
        Self::single()
    }
}

// =============================================================================
// SOURCE
// =============================================================================

/// Ordered stream of market data events.
#[async_trait]
pub trait MarketDataSource: Send {
    /// Next event, or `None` at end of stream.
    ///
    /// An `Err` item is a malformed message; the stream continues after it.
    async fn next_event(&mut self) -> Option<Result<MarketDataEvent, TraitError>>;

    /// Marks every event up to `sequence` on `partition` as consumed.
    async fn commit(&mut self, partition: u32, sequence: u64) -> Result<(), TraitError>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

// =============================================================================
// TESTS
// =============================================================================
