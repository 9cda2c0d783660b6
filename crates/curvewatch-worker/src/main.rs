//! Curvewatch worker entry point.
//!
//! # Usage
//!
//! ```bash
//! # Run with a config file
//! curvewatch --config config/curvewatch.toml
//!
//! # Replay a CSV into JSON lines, overriding the file
//! CURVEWATCH_OUTPUT_KIND=jsonl curvewatch -c config/curvewatch.toml \
//!     --stream-kind csv --stream-path data/curves.csv --output-path risk.jsonl
//!
//! # Validate and print the merged configuration
//! curvewatch -c config/curvewatch.toml --check
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use curvewatch_engine::WorkerBuilder;
use curvewatch_traits::WorkerConfig;

mod cli;
mod config;
mod wiring;

use cli::Cli;

fn init_tracing(config: &WorkerConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("invalid log_level '{}'", config.log_level))?,
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    Ok(())
}

fn log_banner(config: &WorkerConfig, source: Option<&std::path::Path>) {
    info!("Curvewatch worker v{}", env!("CARGO_PKG_VERSION"));
    match source {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => info!("using default configuration"),
    }
    info!(
        worker_id = %config.worker_id,
        stream = %config.stream.kind,
        partitions = ?config.stream.partitions,
        partition_count = config.stream.partition_count,
        reference = %config.reference.kind,
        reference_url = %config.reference.url,
        output = %config.output.kind,
        redis_url = %config.output.redis_url,
        "endpoints"
    );
    info!(
        discount_curve = %config.curve.discount_curve,
        forecast_curve = %config.curve.forecast_curve,
        interpolation = %config.curve.interpolation,
        tenors = ?config.curve.tenors.iter().map(ToString::to_string).collect::<Vec<_>>(),
        key_tenors = ?config.risk.key_tenors.iter().map(ToString::to_string).collect::<Vec<_>>(),
        bump_size = config.risk.bump_size,
        method = ?config.risk.method,
        "curve and risk settings"
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, source) = config::load(&cli)?;

    if cli.check {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    init_tracing(&config)?;
    log_banner(&config, source.as_deref());

    let worker = WorkerBuilder::new(config.clone())
        .with_boxed_market_data(wiring::market_data(&config).await?)
        .with_reference_data(wiring::reference_data(&config)?)
        .with_publisher(wiring::publisher(&config).await?)
        .with_fixings(wiring::fixings(&config)?)
        .build()?;

    let handle = worker.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, finishing the event in flight");
            handle.shutdown();
        }
    });

    let stats = worker.run().await?;
    if stats.records_dropped > 0 || stats.unpriceable > 0 {
        warn!(
            dropped = stats.records_dropped,
            unpriceable = stats.unpriceable,
            "worker finished with gaps"
        );
    }
    Ok(())
}
