//! CLI argument definitions.
//!
//! Every override is also read from a `CURVEWATCH_*` environment variable. Flags win over the
//! environment, which wins over the config file.

use std::path::PathBuf;

use clap::{Args, Parser};
use curvewatch_core::Tenor;
use curvewatch_curves::InterpolationMethod;
use curvewatch_traits::{OutputKind, ReferenceKind, StreamKind, WorkerConfig};

/// Curvewatch - streaming interest-rate risk worker
#[derive(Debug, Parser)]
#[command(name = "curvewatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "CURVEWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the merged configuration and exit
    #[arg(long)]
    pub check: bool,

    #[command(flatten)]
    pub overrides: Overrides,
}

/// Values that replace their config file counterparts.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Worker identity
    #[arg(long, env = "CURVEWATCH_WORKER_ID")]
    pub worker_id: Option<String>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, env = "CURVEWATCH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// log_linear or log_cubic
    #[arg(long, env = "CURVEWATCH_INTERPOLATION")]
    pub interpolation: Option<InterpolationMethod>,

    /// Bump size as a decimal rate
    #[arg(long, env = "CURVEWATCH_BUMP_SIZE")]
    pub bump_size: Option<f64>,

    /// Key rate tenors, comma separated
    #[arg(long, env = "CURVEWATCH_KEY_TENORS", value_delimiter = ',')]
    pub key_tenors: Option<Vec<Tenor>>,

    /// Pricing pool threads, 0 for one per core
    #[arg(long, env = "CURVEWATCH_PRICING_THREADS")]
    pub pricing_threads: Option<usize>,

    /// CSV of index fixings
    #[arg(long, env = "CURVEWATCH_FIXINGS_PATH")]
    pub fixings_path: Option<PathBuf>,

    /// jsonl, csv or stdin
    #[arg(long, env = "CURVEWATCH_STREAM_KIND")]
    pub stream_kind: Option<StreamKind>,

    /// Market data file
    #[arg(long, env = "CURVEWATCH_STREAM_PATH")]
    pub stream_path: Option<PathBuf>,

    /// Owned partitions, comma separated
    #[arg(long, env = "CURVEWATCH_PARTITIONS", value_delimiter = ',')]
    pub partitions: Option<Vec<u32>>,

    /// Total partitions in the stream
    #[arg(long, env = "CURVEWATCH_PARTITION_COUNT")]
    pub partition_count: Option<u32>,

    /// CSV replay pacing, 0 for unpaced
    #[arg(long, env = "CURVEWATCH_REPLAY_SPEED")]
    pub replay_speed: Option<f64>,

    /// http or file
    #[arg(long, env = "CURVEWATCH_REFERENCE_KIND")]
    pub reference_kind: Option<ReferenceKind>,

    /// Security master base URL
    #[arg(long, env = "CURVEWATCH_REFERENCE_URL")]
    pub reference_url: Option<String>,

    /// Instrument file
    #[arg(long, env = "CURVEWATCH_REFERENCE_PATH")]
    pub reference_path: Option<PathBuf>,

    /// redis, jsonl or log
    #[arg(long, env = "CURVEWATCH_OUTPUT_KIND")]
    pub output_kind: Option<OutputKind>,

    /// Redis connection URL
    #[arg(long, env = "CURVEWATCH_REDIS_URL")]
    pub redis_url: Option<String>,

    /// Record validity window in seconds
    #[arg(long, env = "CURVEWATCH_TTL_SECS")]
    pub ttl_secs: Option<u64>,

    /// Notification channel
    #[arg(long, env = "CURVEWATCH_CHANNEL")]
    pub channel: Option<String>,

    /// Output file for jsonl
    #[arg(long, env = "CURVEWATCH_OUTPUT_PATH")]
    pub output_path: Option<PathBuf>,
}

impl Overrides {
    /// Writes every given value into `config`.
    pub fn apply(&self, config: &mut WorkerConfig) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut config.worker_id, &self.worker_id);
        set(&mut config.log_level, &self.log_level);
        set(&mut config.curve.interpolation, &self.interpolation);
        set(&mut config.risk.bump_size, &self.bump_size);
        set(&mut config.risk.key_tenors, &self.key_tenors);
        set(&mut config.risk.pricing_threads, &self.pricing_threads);
        set(&mut config.stream.kind, &self.stream_kind);
        set(&mut config.stream.partitions, &self.partitions);
        set(&mut config.stream.partition_count, &self.partition_count);
        set(&mut config.stream.replay_speed, &self.replay_speed);
        set(&mut config.reference.kind, &self.reference_kind);
        set(&mut config.reference.url, &self.reference_url);
        set(&mut config.output.kind, &self.output_kind);
        set(&mut config.output.redis_url, &self.redis_url);
        set(&mut config.output.ttl_secs, &self.ttl_secs);
        set(&mut config.output.channel, &self.channel);

        if self.fixings_path.is_some() {
            config.risk.fixings_path.clone_from(&self.fixings_path);
        }
        if self.stream_path.is_some() {
            config.stream.path.clone_from(&self.stream_path);
        }
        if self.reference_path.is_some() {
            config.reference.path.clone_from(&self.reference_path);
        }
        if self.output_path.is_some() {
            config.output.path.clone_from(&self.output_path);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "curvewatch",
            "--worker-id",
            "worker-9",
            "--interpolation",
            "log_cubic",
            "--key-tenors",
            "5Y,10Y",
            "--partitions",
            "1,3",
            "--partition-count",
            "4",
            "--stream-kind",
            "csv",
            "--stream-path",
            "data/curves.csv",
            "--output-kind",
            "log",
        ])
        .unwrap();

        let mut config = WorkerConfig::default();
        cli.overrides.apply(&mut config);

        assert_eq!(config.worker_id, "worker-9");
        assert_eq!(config.curve.interpolation, InterpolationMethod::LogCubic);
        assert_eq!(config.risk.key_tenors.len(), 2);
        assert_eq!(config.stream.partitions, vec![1, 3]);
        assert_eq!(config.stream.partition_count, 4);
        assert_eq!(config.stream.kind, StreamKind::Csv);
        assert_eq!(config.stream.path, Some(PathBuf::from("data/curves.csv")));
        assert_eq!(config.output.kind, OutputKind::Log);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let cli = Cli::try_parse_from(["curvewatch"]).unwrap();
        let mut config = WorkerConfig::default();
        config.stream.path = Some(PathBuf::from("curves.jsonl"));
        cli.overrides.apply(&mut config);
        assert_eq!(config.stream.path, Some(PathBuf::from("curves.jsonl")));
        assert_eq!(config.output.channel, "risk_updates");
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["curvewatch", "--output-kind", "kafka"]).is_err());
        assert!(Cli::try_parse_from(["curvewatch", "--key-tenors", "5Q"]).is_err());
    }
}
