//! Startup portfolio load with retry.

use std::time::Duration;

use curvewatch_traits::{ReferenceDataSource, ReferenceSnapshot, RetrySection, TraitError};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::cache::PortfolioCache;
use crate::error::{EngineError, EngineResult};

// =============================================================================
// RETRY POLICY
// =============================================================================

/// Exponential backoff schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Delay after the first failure.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySection::default())
    }
}

impl From<&RetrySection> for RetryPolicy {
    fn from(section: &RetrySection) -> Self {
        Self {
            max_attempts: section.max_attempts.max(1),
            initial_delay: Duration::from_millis(section.initial_backoff_ms),
            max_delay: Duration::from_millis(section.max_backoff_ms),
            backoff_multiplier: section.multiplier,
        }
    }
}

impl RetryPolicy {
    /// Delay after the `failures`-th consecutive failure (1-based).
    #[must_use]
    pub fn delay_for_attempt(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(30) as i32;
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped = delay_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Worst-case total time spent sleeping between attempts.
    #[must_use]
    pub fn total_wait(&self) -> Duration {
        (1..self.max_attempts).map(|n| self.delay_for_attempt(n)).sum()
    }
}

// =============================================================================
// LOADER
// =============================================================================

/// Fills the portfolio cache from a reference data source.
#[derive(Debug, Clone, Default)]
pub struct PortfolioLoader {
    policy: RetryPolicy,
    allow_empty: bool,
}

impl PortfolioLoader {
    /// Creates a loader.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            allow_empty: false,
        }
    }

    /// Accept a fetch that returns no instruments.
    #[must_use]
    pub fn with_allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    /// Retry schedule.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches until a complete snapshot arrives or attempts run out.
    ///
    /// # Errors
    ///
    /// `StartupFailed` after the last attempt. The final error is embedded.
    pub async fn load(&self, source: &dyn ReferenceDataSource) -> EngineResult<PortfolioCache> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(attempt, source = %source.describe(), "fetching portfolio");

            let outcome = match source.fetch_instruments().await {
                Ok(snapshot) => self.accept(snapshot),
                Err(e) => Err(EngineError::Source(e)),
            };

            match outcome {
                Ok(cache) => {
                    info!(
                        instruments = cache.len(),
                        bonds = cache.bond_count(),
                        swaps = cache.swap_count(),
                        attempt,
                        "portfolio loaded"
                    );
                    return Ok(cache);
                }
                Err(e) if attempt >= self.policy.max_attempts => {
                    warn!(attempt, error = %e, "all portfolio load attempts exhausted");
                    return Err(EngineError::StartupFailed {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => {
                    let delay = self.policy.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "portfolio load failed, retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// Checks one snapshot for completeness.
    fn accept(&self, snapshot: ReferenceSnapshot) -> EngineResult<PortfolioCache> {
        for rejected in &snapshot.rejected {
            warn!(instrument_id = %rejected.id, reason = %rejected.reason, "instrument rejected");
        }
        if snapshot.is_partial() {
            return Err(TraitError::PartialFetch {
                received: snapshot.accounted(),
                expected: snapshot.reported_total.unwrap_or_default(),
            }
            .into());
        }
        if snapshot.instruments.is_empty() && !self.allow_empty {
            return Err(EngineError::EmptyPortfolio);
        }
        Ok(PortfolioCache::new(snapshot.instruments))
    }
}

// =============================================================================
// TESTS
// =============================================================================
