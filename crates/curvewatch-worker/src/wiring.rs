//! Builds sources and sinks from the configured kinds.

use std::sync::Arc;

use anyhow::{Context, Result};
use curvewatch_ext_file::{
    load_fixings_csv, CsvReplaySource, JsonFileReferenceSource, JsonLinesRiskWriter,
    JsonLinesSource, LoggingRiskPublisher,
};
use curvewatch_ext_http::SecurityMasterClient;
use curvewatch_ext_redis::RedisRiskPublisher;
use curvewatch_pricing::Fixings;
use curvewatch_traits::{
    MarketDataSource, OutputKind, ReferenceDataSource, ReferenceKind, RiskPublisher, StreamKind,
    WorkerConfig,
};

fn required<'a, T>(value: &'a Option<T>, field: &str) -> Result<&'a T> {
    value
        .as_ref()
        .with_context(|| format!("{field} is not configured"))
}

/// Market data stream.
pub async fn market_data(config: &WorkerConfig) -> Result<Box<dyn MarketDataSource>> {
    let assignment = config.partition_assignment()?;
    let stream = &config.stream;
    let source: Box<dyn MarketDataSource> = match stream.kind {
        StreamKind::Jsonl => {
            let path = required(&stream.path, "stream.path")?;
            Box::new(JsonLinesSource::open(path, assignment).await?)
        }
        StreamKind::Csv => {
            let path = required(&stream.path, "stream.path")?;
            Box::new(CsvReplaySource::new(path, assignment, stream.replay_speed)?)
        }
        StreamKind::Stdin => Box::new(JsonLinesSource::stdin(assignment)),
    };
    Ok(source)
}

/// Instrument universe.
pub fn reference_data(config: &WorkerConfig) -> Result<Arc<dyn ReferenceDataSource>> {
    let reference = &config.reference;
    let source: Arc<dyn ReferenceDataSource> = match reference.kind {
        ReferenceKind::Http => Arc::new(SecurityMasterClient::from_section(reference)?),
        ReferenceKind::File => Arc::new(JsonFileReferenceSource::new(required(
            &reference.path,
            "reference.path",
        )?)),
    };
    Ok(source)
}

/// Risk output sink.
pub async fn publisher(config: &WorkerConfig) -> Result<Arc<dyn RiskPublisher>> {
    let output = &config.output;
    let publisher: Arc<dyn RiskPublisher> = match output.kind {
        OutputKind::Redis => Arc::new(
            RedisRiskPublisher::connect(output, config.curve.discount_curve.clone())
                .await
                .with_context(|| format!("connecting to {}", output.redis_url))?,
        ),
        OutputKind::Jsonl => Arc::new(
            JsonLinesRiskWriter::open(required(&output.path, "output.path")?).await?,
        ),
        OutputKind::Log => Arc::new(LoggingRiskPublisher),
    };
    Ok(publisher)
}

/// Index fixings, empty unless a file is configured.
pub fn fixings(config: &WorkerConfig) -> Result<Fixings> {
    match &config.risk.fixings_path {
        Some(path) => Ok(load_fixings_csv(path)?),
        None => Ok(Fixings::new()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
