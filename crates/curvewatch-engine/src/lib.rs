//! # Curvewatch Engine
//!
//! The event-driven risk worker.
//!
//! This crate provides:
//! - [`Worker`]: lifecycle, event loop and commit ordering
//! - [`WorkerBuilder`]: wiring of sources, sinks and configuration
//! - [`PortfolioLoader`]: startup fetch with exponential backoff
//! - [`MarketState`]: live quote stores and the last good curve build
//! - [`CycleRunner`]: parallel repricing and record emission
//! - [`SequenceTracker`]: per-partition duplicate and stale detection
//!
//! ## Architecture
//!
//! ```text
//! MarketDataSource ─> sequencing ─> MarketState ─> curves + bumped scenarios
//!                                                        │
//! ReferenceDataSource ─> PortfolioCache ─────────────────┤
//!                                                        ▼
//!                                          CycleRunner (rayon pool)
//!                                                        │
//!                          RiskPublisher <─ records ─────┤
//!                          RiskPublisher <─ cycle summary┘
//!                                                        │
//!                                         MarketDataSource::commit
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let worker = WorkerBuilder::new(config)
//!     .with_market_data(market_data_source)
//!     .with_reference_data(reference_source)
//!     .with_publisher(publisher)
//!     .with_fixings(fixings)
//!     .build()?;
//!
//! let handle = worker.handle();
//! tokio::spawn(async move { ctrl_c().await; handle.shutdown() });
//! let stats = worker.run().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod cycle;
pub mod error;
pub mod loader;
pub mod market;
pub mod sequencing;
pub mod state;
pub mod stats;
pub mod worker;

mod cache;

// Re-exports
pub use builder::WorkerBuilder;
pub use cache::PortfolioCache;
pub use cycle::{CycleReport, CycleRunner};
pub use error::{EngineError, EngineResult};
pub use loader::{PortfolioLoader, RetryPolicy};
pub use market::MarketState;
pub use sequencing::{SequenceDecision, SequenceTracker};
pub use state::{StateMachine, WorkerState};
pub use stats::{ThroughputLog, WorkerStats};
pub use worker::{Worker, WorkerHandle};
