//! Worker configuration.
//!
//! Every field has a serde default, so an empty document is a valid configuration:
//!
//! ```toml
//! worker_id = "worker-2"
//!
//! [curve]
//! discount_curve = "USD_SOFR"
//! forecast_curve = "USD_SOFR"
//! interpolation = "log_linear"
//!
//! [risk]
//! bump_size = 0.0001
//! method = "central"
//! key_tenors = ["2Y", "5Y", "10Y", "30Y"]
//!
//! [stream]
//! kind = "jsonl"
//! path = "data/curves.jsonl"
//! partitions = [0, 1]
//! partition_count = 4
//! ```
//!
//! Configuration holds conventions and endpoints. It never holds market data or instrument
//! terms.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use curvewatch_core::{CurveId, DayCountConvention, Frequency, Tenor};
use curvewatch_curves::{CurveBuilder, CurveConventions, InterpolationMethod};
use curvewatch_risk::{BumpConfig, BumpMethod};
use serde::{Deserialize, Serialize};

use crate::error::TraitError;
use crate::market_data::PartitionAssignment;

/// Curve tenors supported when none are configured.
pub const DEFAULT_TENORS: [&str; 11] =
    ["1M", "3M", "6M", "1Y", "2Y", "3Y", "5Y", "7Y", "10Y", "20Y", "30Y"];

/// Key rate tenors when none are configured.
pub const DEFAULT_KEY_TENORS: [&str; 4] = ["2Y", "5Y", "10Y", "30Y"];

fn tenors_from(labels: &[&str]) -> Vec<Tenor> {
    labels.iter().filter_map(|label| label.parse().ok()).collect()
}

// =============================================================================
// WORKER
// =============================================================================

/// Complete worker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Worker identity stamped on logs and cycle summaries
    #[serde(default = "default_worker_id")]
    pub worker_id: String,

    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Curve construction
    #[serde(default)]
    pub curve: CurveSection,

    /// Sensitivities
    #[serde(default)]
    pub risk: RiskSection,

    /// Cycle pacing and publishing
    #[serde(default)]
    pub cycle: CycleSection,

    /// Market data stream
    #[serde(default)]
    pub stream: StreamSection,

    /// Reference data service
    #[serde(default)]
    pub reference: ReferenceSection,

    /// Risk output sink
    #[serde(default)]
    pub output: OutputSection,
}

fn default_worker_id() -> String {
    "worker-1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_id: default_worker_id(),
            log_level: default_log_level(),
            curve: CurveSection::default(),
            risk: RiskSection::default(),
            cycle: CycleSection::default(),
            stream: StreamSection::default(),
            reference: ReferenceSection::default(),
            output: OutputSection::default(),
        }
    }
}

impl WorkerConfig {
    /// Checks the merged configuration.
    ///
    /// # Errors
    ///
    /// `Configuration` describing the first problem found.
    pub fn validate(&self) -> Result<(), TraitError> {
        let invalid = |msg: String| Err(TraitError::Configuration(msg));

        if self.worker_id.trim().is_empty() {
            return invalid("worker_id is empty".to_string());
        }

        if self.curve.tenors.is_empty() {
            return invalid("curve.tenors is empty".to_string());
        }
        let mut seen = BTreeSet::new();
        for tenor in &self.curve.tenors {
            if !seen.insert(*tenor) {
                return invalid(format!("curve.tenors lists {tenor} twice"));
            }
        }
        if let Some(t) = self.risk.key_tenors.iter().find(|t| !seen.contains(*t)) {
            return invalid(format!("risk.key_tenors: {t} is not a curve tenor"));
        }

        self.bump_config()
            .validate()
            .or_else(|e| invalid(format!("risk.bump_size: {e}")))?;

        self.partition_assignment()?;

        if !(self.stream.replay_speed.is_finite() && self.stream.replay_speed >= 0.0) {
            return invalid(format!(
                "stream.replay_speed must be >= 0, got {}",
                self.stream.replay_speed
            ));
        }
        if self.stream.kind != StreamKind::Stdin && self.stream.path.is_none() {
            return invalid(format!("stream.path is required for kind '{}'", self.stream.kind));
        }

        match self.reference.kind {
            ReferenceKind::Http if self.reference.url.trim().is_empty() => {
                return invalid("reference.url is empty".to_string())
            }
            ReferenceKind::File if self.reference.path.is_none() => {
                return invalid("reference.path is required for kind 'file'".to_string())
            }
            _ => {}
        }
        if self.reference.page_size == 0 {
            return invalid("reference.page_size must be positive".to_string());
        }
        let retry = &self.reference.retry;
        if retry.max_attempts == 0 {
            return invalid("reference.retry.max_attempts must be positive".to_string());
        }
        if !(retry.multiplier.is_finite() && retry.multiplier >= 1.0) {
            return invalid(format!(
                "reference.retry.multiplier must be >= 1, got {}",
                retry.multiplier
            ));
        }

        if self.cycle.publish_attempts == 0 {
            return invalid("cycle.publish_attempts must be positive".to_string());
        }
        if self.cycle.log_every == 0 {
            return invalid("cycle.log_every must be positive".to_string());
        }

        if self.output.kind == OutputKind::Jsonl && self.output.path.is_none() {
            return invalid("output.path is required for kind 'jsonl'".to_string());
        }
        if self.output.ttl_secs == 0 {
            return invalid("output.ttl_secs must be positive".to_string());
        }
        Ok(())
    }

    /// Curve builder for the configured conventions.
    #[must_use]
    pub fn curve_builder(&self) -> CurveBuilder {
        CurveBuilder::new()
            .with_interpolation(self.curve.interpolation)
            .with_conventions(self.curve.conventions())
    }

    /// Bump settings.
    #[must_use]
    pub fn bump_config(&self) -> BumpConfig {
        BumpConfig::default()
            .with_size(self.risk.bump_size)
            .with_method(self.risk.method)
            .with_key_tenors(self.risk.key_tenors.clone())
    }

    /// Partitions this worker consumes.
    ///
    /// # Errors
    ///
    /// `Configuration` for an empty or out-of-range assignment.
    pub fn partition_assignment(&self) -> Result<PartitionAssignment, TraitError> {
        PartitionAssignment::new(
            self.stream.partitions.iter().copied(),
            self.stream.partition_count,
        )
    }
}

/// Display and parsing of the `kind` selectors by their config names.
macro_rules! kind_names {
    ($kind:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl std::fmt::Display for $kind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let name = match self {
                    $($kind::$variant => $name,)+
                };
                f.write_str(name)
            }
        }

        impl std::str::FromStr for $kind {
            type Err = TraitError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($name => Ok($kind::$variant),)+
                    other => Err(TraitError::Configuration(format!(
                        "unknown {} '{other}'",
                        stringify!($kind)
                    ))),
                }
            }
        }
    };
}

kind_names!(StreamKind { Jsonl => "jsonl", Csv => "csv", Stdin => "stdin" });
kind_names!(ReferenceKind { Http => "http", File => "file" });
kind_names!(OutputKind { Redis => "redis", Jsonl => "jsonl", Log => "log" });

// =============================================================================
// SECTIONS
// =============================================================================

/// `[curve]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSection {
    /// Curve id of discount quotes
    #[serde(default = "default_curve_id")]
    pub discount_curve: CurveId,

    /// Curve id of forecast quotes; equal to `discount_curve` for a single curve
    #[serde(default = "default_curve_id")]
    pub forecast_curve: CurveId,

    /// Supported tenors, fixed for the worker's lifetime
    #[serde(default = "default_tenors")]
    pub tenors: Vec<Tenor>,

    /// Discount factor interpolation
    #[serde(default)]
    pub interpolation: InterpolationMethod,

    /// Deposit accrual basis
    #[serde(default = "default_act360")]
    pub deposit_day_count: DayCountConvention,

    /// Par swap fixed leg accrual basis
    #[serde(default = "default_act360")]
    pub swap_fixed_day_count: DayCountConvention,

    /// Par swap fixed leg frequency
    #[serde(default = "default_annual")]
    pub swap_fixed_frequency: Frequency,
}

fn default_curve_id() -> CurveId {
    CurveId::new("USD_SOFR")
}

fn default_tenors() -> Vec<Tenor> {
    tenors_from(&DEFAULT_TENORS)
}

fn default_act360() -> DayCountConvention {
    DayCountConvention::Act360
}

fn default_annual() -> Frequency {
    Frequency::Annual
}

impl Default for CurveSection {
    fn default() -> Self {
        Self {
            discount_curve: default_curve_id(),
            forecast_curve: default_curve_id(),
            tenors: default_tenors(),
            interpolation: InterpolationMethod::default(),
            deposit_day_count: default_act360(),
            swap_fixed_day_count: default_act360(),
            swap_fixed_frequency: default_annual(),
        }
    }
}

impl CurveSection {
    /// True when forecast quotes come from their own curve id.
    #[must_use]
    pub fn is_dual_curve(&self) -> bool {
        self.discount_curve != self.forecast_curve
    }

    /// Bootstrap conventions.
    #[must_use]
    pub fn conventions(&self) -> CurveConventions {
        CurveConventions {
            deposit_day_count: self.deposit_day_count,
            swap_fixed_day_count: self.swap_fixed_day_count,
            swap_fixed_frequency: self.swap_fixed_frequency,
        }
    }
}

/// `[risk]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSection {
    /// Bump size in decimal rate units
    #[serde(default = "default_bump_size")]
    pub bump_size: f64,

    /// Central or one-sided differences
    #[serde(default)]
    pub method: BumpMethod,

    /// Key rate tenors, a subset of `curve.tenors`
    #[serde(default = "default_key_tenors")]
    pub key_tenors: Vec<Tenor>,

    /// Pricing pool size; 0 means one thread per core
    #[serde(default)]
    pub pricing_threads: usize,

    /// Historical fixings CSV (`index,date,rate`)
    #[serde(default)]
    pub fixings_path: Option<PathBuf>,
}

fn default_bump_size() -> f64 {
    0.0001
}

fn default_key_tenors() -> Vec<Tenor> {
    tenors_from(&DEFAULT_KEY_TENORS)
}

impl Default for RiskSection {
    fn default() -> Self {
        Self {
            bump_size: default_bump_size(),
            method: BumpMethod::default(),
            key_tenors: default_key_tenors(),
            pricing_threads: 0,
            fixings_path: None,
        }
    }
}

/// `[cycle]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSection {
    /// Cycle latency above which a warning is logged
    #[serde(default = "default_latency_warn_ms")]
    pub latency_warn_ms: u64,

    /// Throughput is logged every this many processed events
    #[serde(default = "default_log_every")]
    pub log_every: u64,

    /// Attempts per record before it is dropped
    #[serde(default = "default_publish_attempts")]
    pub publish_attempts: u32,

    /// Delay between publish attempts
    #[serde(default = "default_publish_retry_ms")]
    pub publish_retry_ms: u64,
}

fn default_latency_warn_ms() -> u64 {
    50
}

fn default_log_every() -> u64 {
    5
}

fn default_publish_attempts() -> u32 {
    3
}

fn default_publish_retry_ms() -> u64 {
    100
}

impl Default for CycleSection {
    fn default() -> Self {
        Self {
            latency_warn_ms: default_latency_warn_ms(),
            log_every: default_log_every(),
            publish_attempts: default_publish_attempts(),
            publish_retry_ms: default_publish_retry_ms(),
        }
    }
}

impl CycleSection {
    /// Latency warning threshold.
    #[must_use]
    pub fn latency_warn(&self) -> Duration {
        Duration::from_millis(self.latency_warn_ms)
    }

    /// Delay between publish attempts.
    #[must_use]
    pub fn publish_retry(&self) -> Duration {
        Duration::from_millis(self.publish_retry_ms)
    }
}

/// Market data stream kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// JSON lines file, one wire event per line
    #[default]
    Jsonl,
    /// CSV replay file
    Csv,
    /// JSON lines on standard input
    Stdin,
}


/// `[stream]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSection {
    /// Source kind
    #[serde(default)]
    pub kind: StreamKind,

    /// Input file for `jsonl` and `csv`
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Partitions this worker owns
    #[serde(default = "default_partitions")]
    pub partitions: Vec<u32>,

    /// Total partitions in the stream
    #[serde(default = "default_partition_count")]
    pub partition_count: u32,

    /// Replay pacing multiplier for CSV; 0 replays as fast as possible
    #[serde(default)]
    pub replay_speed: f64,
}

fn default_partitions() -> Vec<u32> {
    vec![0]
}

fn default_partition_count() -> u32 {
    1
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            kind: StreamKind::default(),
            path: None,
            partitions: default_partitions(),
            partition_count: default_partition_count(),
            replay_speed: 0.0,
        }
    }
}

/// Reference data source kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Security master REST API
    #[default]
    Http,
    /// JSON file of instrument records
    File,
}

/// `[reference]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSection {
    /// Source kind
    #[serde(default)]
    pub kind: ReferenceKind,

    /// Security master base URL
    #[serde(default = "default_reference_url")]
    pub url: String,

    /// Instrument file for `file`
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Items requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Accept a fetch that returns no instruments
    #[serde(default)]
    pub allow_empty_portfolio: bool,

    /// Startup retry policy
    #[serde(default)]
    pub retry: RetrySection,
}

fn default_reference_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ReferenceSection {
    fn default() -> Self {
        Self {
            kind: ReferenceKind::default(),
            url: default_reference_url(),
            path: None,
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            allow_empty_portfolio: false,
            retry: RetrySection::default(),
        }
    }
}

/// `[reference.retry]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySection {
    /// Total attempts including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failure
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound on any single delay
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Growth factor between delays
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

/// Output sink kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Redis hashes plus pub/sub notifications
    #[default]
    Redis,
    /// JSON lines file
    Jsonl,
    /// Log lines only
    Log,
}

/// `[output]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    /// Sink kind
    #[serde(default)]
    pub kind: OutputKind,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Record validity window
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Notification channel
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Output file for `jsonl`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_channel() -> String {
    "risk_updates".to_string()
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            kind: OutputKind::default(),
            redis_url: default_redis_url(),
            ttl_secs: default_ttl_secs(),
            channel: default_channel(),
            path: None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
