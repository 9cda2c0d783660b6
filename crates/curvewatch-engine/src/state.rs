//! Worker lifecycle.
//!
//! ```text
//!   Uninitialized ──► Loading ──► Ready ◄──► Processing
//!         │              │          │            │
//!         └──────────────┴──────────┴────────────┴──► ShuttingDown
//! ```
//!
//! The current state is published on a watch channel so supervisors and tests can
//! observe it without touching the event loop.

use std::fmt;

use tokio::sync::watch;

use crate::error::{EngineError, EngineResult};

/// Lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Created, not started.
    Uninitialized,
    /// Fetching the portfolio.
    Loading,
    /// Waiting for the next market event.
    Ready,
    /// Running a repricing cycle.
    Processing,
    /// Terminal.
    ShuttingDown,
}

impl WorkerState {
    /// True if `self -> next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, next),
            (Uninitialized, Loading)
                | (Loading, Ready)
                | (Ready, Processing)
                | (Processing, Ready)
                | (Uninitialized | Loading | Ready | Processing, ShuttingDown)
        )
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Uninitialized => "uninitialized",
            WorkerState::Loading => "loading",
            WorkerState::Ready => "ready",
            WorkerState::Processing => "processing",
            WorkerState::ShuttingDown => "shutting_down",
        };
        f.write_str(name)
    }
}

/// Guards transitions and broadcasts the current state.
#[derive(Debug)]
pub struct StateMachine {
    tx: watch::Sender<WorkerState>,
}

impl StateMachine {
    /// Starts in `Uninitialized`.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(WorkerState::Uninitialized);
        Self { tx }
    }

    /// Current state.
    #[must_use]
    pub fn current(&self) -> WorkerState {
        *self.tx.borrow()
    }

    /// Receiver that sees every later state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.tx.subscribe()
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if the lifecycle does not allow it; the state is unchanged.
    pub fn transition(&self, next: WorkerState) -> EngineResult<()> {
        let from = self.current();
        if !from.can_transition_to(next) {
            return Err(EngineError::InvalidTransition { from, to: next });
        }
        self.tx.send_replace(next);
        tracing::debug!(%from, to = %next, "state transition");
        Ok(())
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
