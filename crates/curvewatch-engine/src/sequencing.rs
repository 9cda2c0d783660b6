//! Per-partition ordering of market events.

use std::collections::HashMap;

/// What to do with an incoming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceDecision {
    /// Newer than anything applied on its partition.
    Apply,
    /// Same sequence as the last applied event.
    Duplicate,
    /// Older sequence or older timestamp than the last applied event.
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct Position {
    sequence: u64,
    timestamp: i64,
}

/// Last applied position of every partition seen so far.
#[derive(Debug, Clone, Default)]
pub struct SequenceTracker {
    positions: HashMap<u32, Position>,
}

impl SequenceTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies an event against its partition's last applied position.
    #[must_use]
    pub fn check(&self, partition: u32, sequence: u64, timestamp: i64) -> SequenceDecision {
        let Some(last) = self.positions.get(&partition) else {
            return SequenceDecision::Apply;
        };
        if sequence == last.sequence {
            SequenceDecision::Duplicate
        } else if sequence < last.sequence || timestamp < last.timestamp {
            SequenceDecision::Stale
        } else {
            SequenceDecision::Apply
        }
    }

    /// Records an applied event.
    pub fn record(&mut self, partition: u32, sequence: u64, timestamp: i64) {
        self.positions.insert(partition, Position { sequence, timestamp });
    }

    /// Last applied sequence of a partition.
    #[must_use]
    pub fn last_sequence(&self, partition: u32) -> Option<u64> {
        self.positions.get(&partition).map(|p| p.sequence)
    }
}
