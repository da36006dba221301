//! Focus event records and the outgoing sink contract.

use serde::{Deserialize, Serialize};

use crate::display::ScreenId;
use crate::signal::SignalType;

/// Engine operating mode as seen by viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusMode {
    /// Automatic switching from inferred intent
    Auto,
    /// Operator pinned a screen manually
    Manual,
    /// Automatic switching held by the operator
    Frozen,
}

/// Authoritative focus transition, emitted once per switch.
///
/// Events are self-describing records; `sequence` is strictly increasing
/// per session so transports can discard stale deliveries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusChangeEvent {
    /// Session this event belongs to
    pub session_id: String,

    /// Newly active display
    pub screen_id: ScreenId,

    /// Signal kind that caused the switch
    pub reason: SignalType,

    /// Decision confidence, rounded to two decimals
    pub confidence: f64,

    /// How long the display was candidate before switching (ms)
    pub dwell_ms: u64,

    /// Strictly increasing per-session sequence number, starting at 1
    pub sequence: u64,

    /// Timestamp of the causing signal (ms)
    pub timestamp_ms: u64,
}

/// Summary of the engine state for late-joining viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusStateSnapshot {
    /// Currently active display, if any displays exist
    pub active_screen_id: Option<ScreenId>,

    /// Operating mode (manual override beats frozen beats auto)
    pub mode: FocusMode,

    /// Raw freeze flag, preserved even under a manual override
    pub frozen: bool,

    /// Sequence of the most recent focus change
    pub sequence: u64,

    /// Highest timestamp the engine has observed (ms)
    pub timestamp_ms: u64,
}

/// Outgoing event contract implemented by the signaling collaborator.
///
/// The engine invokes sinks strictly after its own state mutation, so a
/// sink that panics leaves the engine consistent with the event having
/// been emitted.
pub trait FocusSink: Send {
    /// Invoked once per authoritative focus change. Receivers relay the
    /// event verbatim to connected viewers and cache the latest for
    /// late-joiner sync.
    fn on_focus_change(&self, event: &FocusChangeEvent);

    /// Invoked on mode changes and stay-refreshes. Lossy; receivers may
    /// coalesce.
    fn on_focus_state(&self, state: &FocusStateSnapshot);
}

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FocusSink for NullSink {
    fn on_focus_change(&self, _event: &FocusChangeEvent) {}
    fn on_focus_state(&self, _state: &FocusStateSnapshot) {}
}
