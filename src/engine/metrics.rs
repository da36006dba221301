//! Engine decision counters.

use serde::Serialize;

use crate::signal::SignalType;

/// Append-only counters describing engine decisions.
///
/// Counters never decrease across a session; `metrics()` hands out a
/// clone so readers never observe a half-updated set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FocusMetrics {
    /// Authoritative switches emitted
    pub focus_changes: u64,

    /// Signals that took the cooldown confidence penalty
    pub cooldown_blocks: u64,

    /// Candidate changes that restarted the dwell clock
    pub dwell_resets: u64,

    /// Signals suppressed by the idle gate
    pub idle_blocks: u64,

    /// Signals seen, by kind, in priority order
    signal_counts: [u64; SignalType::ALL.len()],
}

impl FocusMetrics {
    /// Record one incoming signal of the given kind
    pub(crate) fn record_signal(&mut self, signal_type: SignalType) {
        self.signal_counts[signal_type.index()] += 1;
    }

    /// Signals seen for one kind
    pub fn signal_count(&self, signal_type: SignalType) -> u64 {
        self.signal_counts[signal_type.index()]
    }

    /// Total signals seen across all kinds
    pub fn total_signals(&self) -> u64 {
        self.signal_counts.iter().sum()
    }
}
