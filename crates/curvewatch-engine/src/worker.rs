//! The worker event loop.

use std::sync::Arc;
use std::time::Instant;

use curvewatch_traits::{
    MarketDataEvent, MarketDataSource, PartitionAssignment, ReferenceDataSource, TraitError,
};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::cache::PortfolioCache;
use crate::cycle::CycleRunner;
use crate::error::{EngineError, EngineResult};
use crate::loader::PortfolioLoader;
use crate::market::MarketState;
use crate::sequencing::{SequenceDecision, SequenceTracker};
use crate::state::{StateMachine, WorkerState};
use crate::stats::{ThroughputLog, WorkerStats};

enum LoopInput {
    Shutdown,
    EndOfStream,
    Event(Result<MarketDataEvent, TraitError>),
}

/// Outcome of one event after sequencing accepted it.
enum CycleOutcome {
    Completed,
    Skipped,
    Aborted,
}

// =============================================================================
// HANDLE
// =============================================================================

/// Controls a running worker from outside the event loop.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    shutdown_tx: broadcast::Sender<()>,
    state_rx: watch::Receiver<WorkerState>,
    stats: Arc<Mutex<WorkerStats>>,
}

impl WorkerHandle {
    /// Asks the worker to stop after the event in flight.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> WorkerState {
        *self.state_rx.borrow()
    }

    /// Waits until the worker reaches `state`.
    ///
    /// # Errors
    ///
    /// `Shutdown` if the worker is gone or shut down first.
    pub async fn wait_for(&self, state: WorkerState) -> EngineResult<()> {
        let mut rx = self.state_rx.clone();
        let reached = rx
            .wait_for(|s| *s == state || *s == WorkerState::ShuttingDown)
            .await
            .map_err(|_| EngineError::Shutdown)?;
        if *reached == state {
            Ok(())
        } else {
            Err(EngineError::Shutdown)
        }
    }

    /// Copy of the current counters.
    #[must_use]
    pub fn stats(&self) -> WorkerStats {
        self.stats.lock().clone()
    }
}

// =============================================================================
// WORKER
// =============================================================================

/// One worker: a portfolio cache, live quotes and a market event stream.
///
/// Events are processed one at a time in arrival order. Pricing inside a cycle runs on the
/// rayon pool held by the [`CycleRunner`].
pub struct Worker {
    pub(crate) worker_id: String,
    pub(crate) assignment: PartitionAssignment,
    pub(crate) source: Box<dyn MarketDataSource>,
    pub(crate) reference: Arc<dyn ReferenceDataSource>,
    pub(crate) loader: PortfolioLoader,
    pub(crate) runner: CycleRunner,
    pub(crate) market: MarketState,
    pub(crate) tracker: SequenceTracker,
    pub(crate) state: StateMachine,
    pub(crate) shutdown_tx: broadcast::Sender<()>,
    pub(crate) shutdown_rx: broadcast::Receiver<()>,
    pub(crate) stats: Arc<Mutex<WorkerStats>>,
    pub(crate) throughput: ThroughputLog,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("worker_id", &self.worker_id)
            .field("source", &self.source.describe())
            .field("reference", &self.reference.describe())
            .field("state", &self.state.current())
            .finish_non_exhaustive()
    }
}

impl Worker {
    /// Handle for shutdown, state observation and counters.
    #[must_use]
    pub fn handle(&self) -> WorkerHandle {
        WorkerHandle {
            shutdown_tx: self.shutdown_tx.clone(),
            state_rx: self.state.subscribe(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Worker id used in logs and cycle summaries.
    #[must_use]
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> WorkerState {
        self.state.current()
    }

    /// Loads the portfolio, then processes events until shutdown or end of stream.
    ///
    /// # Errors
    ///
    /// `StartupFailed` or `EmptyPortfolio` if the portfolio never loads. Errors within a
    /// cycle are logged and do not stop the loop.
    pub async fn run(mut self) -> EngineResult<WorkerStats> {
        info!(
            worker_id = %self.worker_id,
            market_data = %self.source.describe(),
            reference_data = %self.reference.describe(),
            partitions = ?self.assignment.partitions().collect::<Vec<_>>(),
            "worker starting"
        );

        self.state.transition(WorkerState::Loading)?;
        let loaded = tokio::select! {
            result = self.loader.load(self.reference.as_ref()) => Some(result),
            _ = self.shutdown_rx.recv() => None,
        };
        let portfolio = match loaded {
            Some(Ok(portfolio)) => portfolio,
            Some(Err(e)) => {
                error!(worker_id = %self.worker_id, error = %e, "startup failed");
                self.state.transition(WorkerState::ShuttingDown)?;
                return Err(e);
            }
            None => {
                info!(worker_id = %self.worker_id, "shutdown requested during load");
                self.state.transition(WorkerState::ShuttingDown)?;
                return Ok(self.stats.lock().clone());
            }
        };
        self.state.transition(WorkerState::Ready)?;

        loop {
            let input = tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => LoopInput::Shutdown,
                next = self.source.next_event() => match next {
                    Some(result) => LoopInput::Event(result),
                    None => LoopInput::EndOfStream,
                },
            };

            match input {
                LoopInput::Shutdown => {
                    info!(worker_id = %self.worker_id, "shutdown requested");
                    break;
                }
                LoopInput::EndOfStream => {
                    info!(worker_id = %self.worker_id, "market data stream ended");
                    break;
                }
                LoopInput::Event(Err(e)) => {
                    warn!(error = %e, "malformed market event skipped");
                    let mut stats = self.stats.lock();
                    stats.events_received += 1;
                    stats.events_skipped += 1;
                }
                LoopInput::Event(Ok(event)) => self.handle_event(event, &portfolio).await?,
            }
        }

        self.state.transition(WorkerState::ShuttingDown)?;
        let stats = self.stats.lock().clone();
        info!(
            worker_id = %self.worker_id,
            events = stats.events_received,
            cycles = stats.cycles_completed,
            aborted = stats.cycles_aborted,
            skipped = stats.events_skipped,
            published = stats.records_published,
            "worker stopped"
        );
        Ok(stats)
    }

    /// Sequences one event and, if accepted, runs its cycle and commits it.
    async fn handle_event(
        &mut self,
        event: MarketDataEvent,
        portfolio: &PortfolioCache,
    ) -> EngineResult<()> {
        let started = Instant::now();
        self.stats.lock().events_received += 1;

        if !self.assignment.owns(event.partition) {
            debug!(partition = event.partition, "event for unassigned partition skipped");
            self.stats.lock().events_skipped += 1;
            return Ok(());
        }

        match self.tracker.check(event.partition, event.sequence, event.timestamp) {
            SequenceDecision::Apply => {}
            decision => {
                debug!(
                    partition = event.partition,
                    sequence = event.sequence,
                    last = ?self.tracker.last_sequence(event.partition),
                    ?decision,
                    "out-of-order event skipped"
                );
                self.stats.lock().events_skipped += 1;
                return Ok(());
            }
        }

        self.state.transition(WorkerState::Processing)?;
        let outcome = self.process(&event, portfolio, started).await;
        self.tracker.record(event.partition, event.sequence, event.timestamp);

        // the cycle's records and completion signal are out before the commit
        if let Err(e) = self.source.commit(event.partition, event.sequence).await {
            warn!(partition = event.partition, sequence = event.sequence, error = %e, "commit failed");
        }
        self.state.transition(WorkerState::Ready)?;

        let mut stats = self.stats.lock();
        match outcome {
            Ok(CycleOutcome::Completed) => {}
            Ok(CycleOutcome::Skipped) => stats.events_skipped += 1,
            Ok(CycleOutcome::Aborted) => stats.cycles_aborted += 1,
            Err(e) => {
                error!(sequence = event.sequence, error = %e, "cycle failed");
                stats.cycles_aborted += 1;
            }
        }
        Ok(())
    }

    async fn process(
        &mut self,
        event: &MarketDataEvent,
        portfolio: &PortfolioCache,
        started: Instant,
    ) -> EngineResult<CycleOutcome> {
        if !self.market.tracks(&event.curve_id) {
            warn!(curve_id = %event.curve_id, "event for unknown curve skipped");
            return Ok(CycleOutcome::Skipped);
        }

        let report = self.market.apply(event)?;
        for rejected in &report.rejected {
            warn!(curve_id = %event.curve_id, tenor = %rejected.label, error = %rejected.error, "quote rejected");
        }

        let valuation_date = match event.valuation_date() {
            Ok(date) => date,
            Err(e) => {
                warn!(timestamp = event.timestamp, error = %e, "event has no usable valuation date");
                return Ok(CycleOutcome::Skipped);
            }
        };

        let quotes = self.market.market_quotes();
        let scenarios = match self.market.current_scenarios(valuation_date) {
            Some(scenarios) => scenarios,
            None => match self.runner.build_scenarios(quotes.clone(), valuation_date).await {
                Ok(scenarios) => {
                    let scenarios = Arc::new(scenarios);
                    self.market.install(valuation_date, Arc::clone(&scenarios));
                    scenarios
                }
                Err(e) if e.is_curve_failure() => {
                    error!(
                        curve_id = %event.curve_id,
                        sequence = event.sequence,
                        %valuation_date,
                        discount_quotes = ?quotes.discount.quotes(),
                        forecast_quotes = ?quotes.forecast_quotes().quotes(),
                        has_last_good = self.market.last_good().is_some(),
                        error = %e,
                        "base curve build failed, cycle aborted"
                    );
                    return Ok(CycleOutcome::Aborted);
                }
                Err(e) => return Err(e),
            },
        };

        let curves = self
            .market
            .curve_snapshots(&quotes, &scenarios, event.timestamp);
        let report = self
            .runner
            .run(event, scenarios, curves, portfolio, started)
            .await?;

        let mut stats = self.stats.lock();
        stats.record_cycle(&report);
        self.throughput.maybe_log(&stats, report.summary.priced);
        Ok(CycleOutcome::Completed)
    }
}
