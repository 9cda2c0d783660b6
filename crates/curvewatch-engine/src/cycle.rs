//! One repricing cycle: price, emit, signal.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use curvewatch_core::Date;
use curvewatch_curves::{CurveBuilder, MarketQuotes};
use curvewatch_pricing::Fixings;
use curvewatch_risk::{RiskRecord, ScenarioSet, SensitivityEngine};
use curvewatch_traits::{
    CurveSnapshot, CycleSection, CycleSummary, MarketDataEvent, RiskPublisher,
    UnpriceableInstrument,
};
use rayon::ThreadPool;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::PortfolioCache;
use crate::error::{EngineError, EngineResult};

/// What a finished cycle produced.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Completion signal as sent downstream.
    pub summary: CycleSummary,
    /// Records accepted by the publisher.
    pub published: usize,
    /// Records dropped after exhausting publish attempts.
    pub dropped: usize,
    /// Sum of DV01 over the records the publisher accepted.
    pub dv01_sum: f64,
}

/// Runs cycles on a dedicated pricing pool and hands results to the publisher.
pub struct CycleRunner {
    worker_id: String,
    settings: CycleSection,
    engine: SensitivityEngine,
    builder: CurveBuilder,
    pool: Arc<ThreadPool>,
    fixings: Arc<Fixings>,
    publisher: Arc<dyn RiskPublisher>,
}

impl CycleRunner {
    /// Creates a runner.
    #[must_use]
    pub fn new(
        worker_id: impl Into<String>,
        settings: CycleSection,
        engine: SensitivityEngine,
        builder: CurveBuilder,
        pool: Arc<ThreadPool>,
        fixings: Arc<Fixings>,
        publisher: Arc<dyn RiskPublisher>,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            settings,
            engine,
            builder,
            pool,
            fixings,
            publisher,
        }
    }

    /// Builds base and bumped curves on the pricing pool.
    ///
    /// # Errors
    ///
    /// `Risk` if the base curves fail, `TaskFailed` if the blocking task panicked.
    pub async fn build_scenarios(
        &self,
        market: MarketQuotes,
        valuation_date: Date,
    ) -> EngineResult<ScenarioSet> {
        let pool = Arc::clone(&self.pool);
        let engine = self.engine.clone();
        let builder = self.builder.clone();
        let scenarios = tokio::task::spawn_blocking(move || {
            pool.install(|| engine.prepare(&builder, &market, valuation_date))
        })
        .await
        .map_err(|e| EngineError::TaskFailed(e.to_string()))??;
        Ok(scenarios)
    }

    /// Publishes curves, prices every instrument, emits records, then signals completion.
    ///
    /// Per-instrument failures land in the summary. Publish failures are retried and then
    /// dropped. Only a failed pricing task is an error.
    ///
    /// # Errors
    ///
    /// `TaskFailed` if the pricing task panicked.
    pub async fn run(
        &self,
        event: &MarketDataEvent,
        scenarios: Arc<ScenarioSet>,
        curves: Vec<CurveSnapshot>,
        portfolio: &PortfolioCache,
        started: Instant,
    ) -> EngineResult<CycleReport> {
        let cycle_id = Uuid::new_v4();

        for snapshot in &curves {
            if let Err(e) = self.publisher.publish_curve(snapshot).await {
                warn!(%cycle_id, curve_id = %snapshot.curve_id, error = %e, "curve snapshot publish failed");
            }
        }

        let pool = Arc::clone(&self.pool);
        let engine = self.engine.clone();
        let fixings = Arc::clone(&self.fixings);
        let instruments = portfolio.instruments();
        let priced_on = Arc::clone(&scenarios);
        let timestamp = event.timestamp;
        let outcomes = tokio::task::spawn_blocking(move || {
            pool.install(|| engine.evaluate_all(&instruments, &priced_on, &fixings, timestamp))
        })
        .await
        .map_err(|e| EngineError::TaskFailed(e.to_string()))?;

        let mut tasks = JoinSet::new();
        let mut unpriceable = Vec::new();
        let mut flagged = 0;
        for outcome in outcomes {
            match outcome.result {
                Ok(record) => {
                    if !record.is_complete() {
                        flagged += 1;
                        debug!(%cycle_id, instrument_id = %record.instrument_id, flags = ?record.flags, "sensitivities omitted");
                    }
                    let publisher = Arc::clone(&self.publisher);
                    let attempts = self.settings.publish_attempts.max(1);
                    let delay = self.settings.publish_retry();
                    tasks.spawn(async move {
                        let accepted =
                            publish_with_retry(publisher.as_ref(), &record, attempts, delay).await;
                        accepted.then(|| record.dv01.unwrap_or(0.0))
                    });
                }
                Err(e) => {
                    warn!(%cycle_id, instrument_id = %outcome.instrument_id, error = %e, "instrument unpriceable");
                    unpriceable.push(UnpriceableInstrument {
                        instrument_id: outcome.instrument_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut published = 0;
        let mut dropped = 0;
        let mut dv01_sum = 0.0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(dv01)) => {
                    published += 1;
                    dv01_sum += dv01;
                }
                Ok(None) => dropped += 1,
                Err(e) => {
                    warn!(%cycle_id, error = %e, "publish task failed");
                    dropped += 1;
                }
            }
        }

        let elapsed = started.elapsed();
        let summary = CycleSummary {
            cycle_id,
            worker_id: self.worker_id.clone(),
            partition: event.partition,
            sequence: event.sequence,
            event_timestamp: event.timestamp,
            valuation_date: scenarios.base().valuation_date,
            instrument_count: portfolio.len(),
            priced: published + dropped,
            dropped,
            unpriceable,
            flagged,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            completed_at: Utc::now().timestamp_millis(),
        };

        if let Err(e) = self.publisher.cycle_complete(&summary).await {
            warn!(%cycle_id, error = %e, "cycle completion signal failed");
        }

        if elapsed > self.settings.latency_warn() {
            warn!(
                %cycle_id,
                elapsed_ms = summary.elapsed_ms,
                threshold_ms = self.settings.latency_warn_ms,
                instruments = summary.instrument_count,
                "cycle latency above threshold"
            );
        }
        debug!(
            %cycle_id,
            partition = summary.partition,
            sequence = summary.sequence,
            priced = summary.priced,
            dropped,
            unpriceable = summary.unpriceable.len(),
            flagged,
            elapsed_ms = summary.elapsed_ms,
            "cycle complete"
        );

        Ok(CycleReport {
            summary,
            published,
            dropped,
            dv01_sum,
        })
    }
}

/// Tries a record up to `attempts` times. Returns whether it was accepted.
async fn publish_with_retry(
    publisher: &dyn RiskPublisher,
    record: &RiskRecord,
    attempts: u32,
    delay: Duration,
) -> bool {
    for attempt in 1..=attempts {
        match publisher.publish_risk(record).await {
            Ok(()) => return true,
            Err(e) if attempt < attempts => {
                debug!(instrument_id = %record.instrument_id, attempt, error = %e, "publish failed, retrying");
                sleep(delay).await;
            }
            Err(e) => {
                warn!(instrument_id = %record.instrument_id, attempts, error = %e, "record dropped");
            }
        }
    }
    false
}

// =============================================================================
// TESTS
// =============================================================================
