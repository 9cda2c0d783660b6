//! In-memory, file and logging risk sinks.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use curvewatch_core::{CurveId, InstrumentId};
use curvewatch_risk::RiskRecord;
use curvewatch_traits::{CurveSnapshot, CycleSummary, RiskPublisher, TraitError};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Debug, Clone)]
struct StoredRecord {
    record: RiskRecord,
    stored_at: Instant,
}

/// Keyed latest-record store with a validity window, the in-process analogue of the Redis
/// layout.
///
/// A record older than the window reads as absent. Staleness beyond that is the reader's
/// concern.
#[derive(Debug)]
pub struct MemoryRiskStore {
    ttl: Duration,
    records: DashMap<InstrumentId, StoredRecord>,
    curves: DashMap<CurveId, CurveSnapshot>,
    cycles: Mutex<Vec<CycleSummary>>,
}

impl MemoryRiskStore {
    /// Creates a store whose records expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            records: DashMap::new(),
            curves: DashMap::new(),
            cycles: Mutex::new(Vec::new()),
        }
    }

    /// Latest unexpired record of an instrument.
    #[must_use]
    pub fn get(&self, instrument_id: &InstrumentId) -> Option<RiskRecord> {
        let stored = self.records.get(instrument_id)?;
        if stored.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(stored.record.clone())
    }

    /// Number of unexpired records.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.records
            .iter()
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .count()
    }

    /// Drops expired records, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.records.len();
        self.records.retain(|_, stored| stored.stored_at.elapsed() < self.ttl);
        before - self.records.len()
    }

    /// Latest snapshot of a curve.
    #[must_use]
    pub fn latest_curve(&self, curve_id: &CurveId) -> Option<CurveSnapshot> {
        self.curves.get(curve_id).map(|c| c.clone())
    }

    /// Every completion signal received, oldest first.
    #[must_use]
    pub fn cycles(&self) -> Vec<CycleSummary> {
        self.cycles.lock().clone()
    }
}

#[async_trait]
impl RiskPublisher for MemoryRiskStore {
    async fn publish_risk(&self, record: &RiskRecord) -> Result<(), TraitError> {
        self.records.insert(
            record.instrument_id.clone(),
            StoredRecord {
                record: record.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn publish_curve(&self, snapshot: &CurveSnapshot) -> Result<(), TraitError> {
        self.curves.insert(snapshot.curve_id.clone(), snapshot.clone());
        Ok(())
    }

    async fn cycle_complete(&self, summary: &CycleSummary) -> Result<(), TraitError> {
        self.cycles.lock().push(summary.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory (ttl {}s)", self.ttl.as_secs())
    }
}

// =============================================================================
// JSON LINES WRITER
// =============================================================================

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum OutputLine<'a> {
    Risk(&'a RiskRecord),
    Curve(&'a CurveSnapshot),
    Cycle(&'a CycleSummary),
}

/// Appends every output as one tagged JSON object per line.
///
/// Lines carry `"kind": "risk" | "curve" | "cycle"`. The buffer is flushed on each cycle
/// completion.
pub struct JsonLinesRiskWriter {
    path: PathBuf,
    writer: tokio::sync::Mutex<BufWriter<File>>,
}

impl JsonLinesRiskWriter {
    /// Creates or appends to `path`.
    ///
    /// # Errors
    ///
    /// `IoError` if the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TraitError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| TraitError::IoError(format!("{}: {e}", path.display())))?;
        Ok(Self {
            path,
            writer: tokio::sync::Mutex::new(BufWriter::new(file)),
        })
    }

    async fn write_line(&self, line: &OutputLine<'_>, flush: bool) -> Result<(), TraitError> {
        let mut bytes =
            serde_json::to_vec(line).map_err(|e| TraitError::SerializationError(e.to_string()))?;
        bytes.push(b'\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(&bytes).await?;
        if flush {
            writer.flush().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RiskPublisher for JsonLinesRiskWriter {
    async fn publish_risk(&self, record: &RiskRecord) -> Result<(), TraitError> {
        self.write_line(&OutputLine::Risk(record), false).await
    }

    async fn publish_curve(&self, snapshot: &CurveSnapshot) -> Result<(), TraitError> {
        self.write_line(&OutputLine::Curve(snapshot), false).await
    }

    async fn cycle_complete(&self, summary: &CycleSummary) -> Result<(), TraitError> {
        self.write_line(&OutputLine::Cycle(summary), true).await
    }

    fn describe(&self) -> String {
        format!("jsonl {}", self.path.display())
    }
}

// =============================================================================
// LOGGING PUBLISHER
// =============================================================================

/// Writes outputs to the log: records at debug, cycles at info.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingRiskPublisher;

#[async_trait]
impl RiskPublisher for LoggingRiskPublisher {
    async fn publish_risk(&self, record: &RiskRecord) -> Result<(), TraitError> {
        debug!(
            instrument_id = %record.instrument_id,
            timestamp = record.timestamp,
            npv = record.npv,
            dv01 = record.dv01.unwrap_or(f64::NAN),
            krd = ?record.krd,
            "risk"
        );
        Ok(())
    }

    async fn publish_curve(&self, snapshot: &CurveSnapshot) -> Result<(), TraitError> {
        debug!(
            curve_id = %snapshot.curve_id,
            valuation_date = %snapshot.valuation_date,
            pillars = snapshot.pillars.len(),
            "curve"
        );
        Ok(())
    }

    async fn cycle_complete(&self, summary: &CycleSummary) -> Result<(), TraitError> {
        if summary.is_complete() && summary.dropped == 0 {
            info!(
                cycle_id = %summary.cycle_id,
                sequence = summary.sequence,
                priced = summary.priced,
                elapsed_ms = summary.elapsed_ms,
                "cycle"
            );
        } else {
            warn!(
                cycle_id = %summary.cycle_id,
                sequence = summary.sequence,
                priced = summary.priced,
                dropped = summary.dropped,
                unpriceable = summary.unpriceable.len(),
                flagged = summary.flagged,
                elapsed_ms = summary.elapsed_ms,
                "cycle with gaps"
            );
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "log".into()
    }
}

// =============================================================================
// TESTS
// =============================================================================
