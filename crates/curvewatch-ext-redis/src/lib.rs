//! # Curvewatch Ext Redis
//!
//! Redis output for the curvewatch worker.
//!
//! [`RedisRiskPublisher`] keeps the latest record of every instrument in a hash with a TTL,
//! announces each record on a pub/sub channel, and keeps the latest curve plus a one-hour
//! curve history. Cycle summaries go to `{channel}:cycles`. See [`layout`] for the keys.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod layout;
mod publisher;

pub use publisher::RedisRiskPublisher;
