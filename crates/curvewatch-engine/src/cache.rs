//! Immutable portfolio held by one worker.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use curvewatch_pricing::Instrument;

/// Read-only instrument universe loaded at startup.
///
/// Cloning is cheap: the instruments are shared behind an `Arc` and handed to the
/// pricing pool without copying.
#[derive(Debug, Clone)]
pub struct PortfolioCache {
    instruments: Arc<[Instrument]>,
    loaded_at: DateTime<Utc>,
}

impl PortfolioCache {
    /// Wraps a fully loaded instrument list.
    #[must_use]
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self {
            instruments: instruments.into(),
            loaded_at: Utc::now(),
        }
    }

    /// Shared handle to the instruments.
    #[must_use]
    pub fn instruments(&self) -> Arc<[Instrument]> {
        Arc::clone(&self.instruments)
    }

    /// Number of cached instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// True if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Number of bonds.
    #[must_use]
    pub fn bond_count(&self) -> usize {
        self.instruments
            .iter()
            .filter(|i| matches!(i, Instrument::Bond(_)))
            .count()
    }

    /// Number of swaps.
    #[must_use]
    pub fn swap_count(&self) -> usize {
        self.len() - self.bond_count()
    }

    /// When the cache was filled.
    #[must_use]
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
