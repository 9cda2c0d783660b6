//! # Curvewatch Traits
//!
//! Contracts between the risk worker and the outside world.
//!
//! This crate contains trait definitions, wire types and configuration only. All
//! implementations live in the extension crates.
//!
//! ## Module Structure
//!
//! - [`market_data`]: the ordered event stream and its partitioning
//! - [`reference_data`]: the instrument universe and its wire records
//! - [`output`]: risk records, curve snapshots and cycle completion
//! - [`config`]: the worker configuration document
//!
//! ## Dependency Injection
//!
//! The worker uses these traits via dependency injection:
//!
//! ```ignore
//! WorkerBuilder::new(config)
//!     .with_market_data(impl MarketDataSource)
//!     .with_reference_data(impl ReferenceDataSource)
//!     .with_publisher(impl RiskPublisher)
//!     .build()
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod market_data;
pub mod output;
pub mod reference_data;

// Re-export commonly used types
pub use config::{
    CurveSection, CycleSection, OutputKind, OutputSection, ReferenceKind, ReferenceSection,
    RetrySection, RiskSection, StreamKind, StreamSection, WorkerConfig,
};
pub use error::TraitError;
pub use market_data::{partition_for, MarketDataEvent, MarketDataSource, PartitionAssignment};
pub use output::{CurveSnapshot, CycleSummary, PillarPoint, RiskPublisher, UnpriceableInstrument};
pub use reference_data::{
    InstrumentRecord, ReferenceDataSource, ReferenceSnapshot, RejectedInstrument,
};
