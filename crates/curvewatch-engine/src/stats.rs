//! Running worker counters and periodic throughput logging.

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::cycle::CycleReport;

/// Counters kept by the event loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkerStats {
    /// Events read from the market data source.
    pub events_received: u64,
    /// Events that completed a full cycle.
    pub cycles_completed: u64,
    /// Cycles abandoned because the base curve could not be built.
    pub cycles_aborted: u64,
    /// Events skipped: malformed, unassigned, duplicate, stale or for an unknown curve.
    pub events_skipped: u64,
    /// Risk records accepted by the publisher.
    pub records_published: u64,
    /// Risk records dropped after retries.
    pub records_dropped: u64,
    /// Instruments reported unpriceable, summed over cycles.
    pub unpriceable: u64,
    /// Latency of the most recent cycle.
    pub last_latency_ms: Option<f64>,
    /// DV01 summed over the most recent cycle.
    pub last_dv01_sum: Option<f64>,
}

impl WorkerStats {
    /// Folds a finished cycle into the counters.
    pub fn record_cycle(&mut self, report: &CycleReport) {
        self.cycles_completed += 1;
        self.records_published += report.published as u64;
        self.records_dropped += report.dropped as u64;
        self.unpriceable += report.summary.unpriceable.len() as u64;
        self.last_latency_ms = Some(report.summary.elapsed_ms);
        self.last_dv01_sum = Some(report.dv01_sum);
    }
}

/// Emits a throughput line every `every` completed cycles.
#[derive(Debug)]
pub struct ThroughputLog {
    started: Instant,
    every: u64,
}

impl ThroughputLog {
    /// Starts the clock.
    #[must_use]
    pub fn new(every: u64) -> Self {
        Self {
            started: Instant::now(),
            every: every.max(1),
        }
    }

    /// True if this completed-cycle count is due a log line.
    #[must_use]
    pub fn is_due(&self, cycles_completed: u64) -> bool {
        cycles_completed > 0 && cycles_completed % self.every == 0
    }

    /// Events per second since start.
    #[must_use]
    pub fn rate(&self, events: u64) -> f64 {
        let secs = self.started.elapsed().as_secs_f64();
        if secs > 0.0 {
            events as f64 / secs
        } else {
            0.0
        }
    }

    /// Logs throughput if due.
    pub fn maybe_log(&self, stats: &WorkerStats, priced: usize) {
        if !self.is_due(stats.cycles_completed) {
            return;
        }
        info!(
            events = stats.events_received,
            cycles = stats.cycles_completed,
            events_per_sec = self.rate(stats.events_received),
            instruments_priced = priced,
            last_latency_ms = stats.last_latency_ms.unwrap_or_default(),
            dv01_sum = stats.last_dv01_sum.unwrap_or_default(),
            "throughput"
        );
    }
}
