//! Builder wiring sources, sinks and configuration into a [`Worker`].

use std::sync::Arc;

use curvewatch_pricing::Fixings;
use curvewatch_risk::SensitivityEngine;
use curvewatch_traits::{MarketDataSource, ReferenceDataSource, RiskPublisher, WorkerConfig};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::cycle::CycleRunner;
use crate::error::{EngineError, EngineResult};
use crate::loader::{PortfolioLoader, RetryPolicy};
use crate::market::MarketState;
use crate::sequencing::SequenceTracker;
use crate::state::StateMachine;
use crate::stats::{ThroughputLog, WorkerStats};
use crate::worker::Worker;

/// Builder for a [`Worker`].
///
/// The market data source, reference data source and publisher are required.
pub struct WorkerBuilder {
    config: WorkerConfig,
    market_data: Option<Box<dyn MarketDataSource>>,
    reference_data: Option<Arc<dyn ReferenceDataSource>>,
    publisher: Option<Arc<dyn RiskPublisher>>,
    fixings: Fixings,
}

impl WorkerBuilder {
    /// Creates a builder from configuration.
    #[must_use]
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config,
            market_data: None,
            reference_data: None,
            publisher: None,
            fixings: Fixings::new(),
        }
    }

    /// Sets the market event stream.
    #[must_use]
    pub fn with_market_data(mut self, source: impl MarketDataSource + 'static) -> Self {
        self.market_data = Some(Box::new(source));
        self
    }

    /// Sets an already boxed market event stream.
    #[must_use]
    pub fn with_boxed_market_data(mut self, source: Box<dyn MarketDataSource>) -> Self {
        self.market_data = Some(source);
        self
    }

    /// Sets the reference data source.
    #[must_use]
    pub fn with_reference_data(mut self, source: Arc<dyn ReferenceDataSource>) -> Self {
        self.reference_data = Some(source);
        self
    }

    /// Sets the output sink.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn RiskPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Supplies index fixings for floating periods already in progress.
    #[must_use]
    pub fn with_fixings(mut self, fixings: Fixings) -> Self {
        self.fixings = fixings;
        self
    }

    /// Validates the curve, risk and partition settings and assembles the worker.
    ///
    /// # Errors
    ///
    /// `ConfigError` if a component is missing, the partition assignment is invalid or the
    /// pricing pool cannot start. `BaseCurve`/`Risk` for an invalid tenor set or bump.
    pub fn build(self) -> EngineResult<Worker> {
        let config = self.config;
        let source = self
            .market_data
            .ok_or_else(|| EngineError::config("market data source not configured"))?;
        let reference = self
            .reference_data
            .ok_or_else(|| EngineError::config("reference data source not configured"))?;
        let publisher = self
            .publisher
            .ok_or_else(|| EngineError::config("risk publisher not configured"))?;

        let assignment = config
            .partition_assignment()
            .map_err(|e| EngineError::config(e.to_string()))?;
        let market = MarketState::new(&config.curve)?;
        let engine = SensitivityEngine::new(config.bump_config())?;

        let worker_id = config.worker_id.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.risk.pricing_threads)
            .thread_name({
                let worker_id = worker_id.clone();
                move |i| format!("curvewatch-pricing-{worker_id}-{i}")
            })
            .build()
            .map_err(|e| EngineError::config(format!("pricing pool: {e}")))?;

        let runner = CycleRunner::new(
            worker_id.clone(),
            config.cycle.clone(),
            engine,
            config.curve_builder(),
            Arc::new(pool),
            Arc::new(self.fixings),
            publisher,
        );
        let loader = PortfolioLoader::new(RetryPolicy::from(&config.reference.retry))
            .with_allow_empty(config.reference.allow_empty_portfolio);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        Ok(Worker {
            worker_id,
            assignment,
            source,
            reference,
            loader,
            runner,
            market,
            tracker: SequenceTracker::new(),
            state: StateMachine::new(),
            shutdown_tx,
            shutdown_rx,
            stats: Arc::new(Mutex::new(WorkerStats::default())),
            throughput: ThroughputLog::new(config.cycle.log_every),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_components() {
        let err = WorkerBuilder::new(WorkerConfig::default()).build().unwrap_err();
        assert!(err.to_string().contains("market data source"));
    }
}
