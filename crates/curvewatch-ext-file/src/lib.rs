//! # Curvewatch Ext File
//!
//! File-based and in-memory adapters for the curvewatch worker.
//!
//! This crate provides default implementations for replay, testing and embedding:
//! - [`CsvReplaySource`]: paced replay of curve snapshot CSVs
//! - [`JsonLinesSource`]: wire-format events from a file or stdin
//! - [`ChannelMarketDataSource`]: events pushed from the same process
//! - [`JsonFileReferenceSource`] and [`StaticReferenceSource`]: the instrument universe
//! - [`MemoryRiskStore`], [`JsonLinesRiskWriter`] and [`LoggingRiskPublisher`]: risk sinks
//! - [`load_fixings_csv`]: index fixings for seasoned swaps
//!
//! For production streaming output, use the Redis extension.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod fixings;
mod market_data;
mod output;
mod reference_data;

pub use fixings::load_fixings_csv;
pub use market_data::{
    parse_timestamp, ChannelMarketDataSource, CsvReplaySource, JsonLinesSource, DEFAULT_CURVE_TYPE,
};
pub use output::{JsonLinesRiskWriter, LoggingRiskPublisher, MemoryRiskStore};
pub use reference_data::{JsonFileReferenceSource, StaticReferenceSource};
