//! Signal and operator-command type definitions.

use serde::{Deserialize, Serialize};

use crate::display::ScreenId;

/// Kind of presenter interaction, ordered by conflict priority.
///
/// The enumeration is closed: adding a kind forces every match site to be
/// revisited, which keeps the confidence and dwell tables in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    /// Operator selected a screen explicitly
    Manual,
    /// Single mouse click
    Click,
    /// Drag started
    DragStart,
    /// Double click
    DoubleClick,
    /// Drag finished
    DragEnd,
    /// OS reported a window-focus change
    WindowFocus,
    /// Keyboard typing
    Typing,
    /// Scroll wheel or trackpad scroll
    Scroll,
    /// Multi-touch or trackpad gesture
    Gesture,
    /// Pointer lingering inside the hover radius
    Hover,
    /// Pointer displacement above the movement threshold
    PointerMove,
}

impl SignalType {
    /// All signal kinds in priority order
    pub const ALL: [SignalType; 11] = [
        SignalType::Manual,
        SignalType::Click,
        SignalType::DragStart,
        SignalType::DoubleClick,
        SignalType::DragEnd,
        SignalType::WindowFocus,
        SignalType::Typing,
        SignalType::Scroll,
        SignalType::Gesture,
        SignalType::Hover,
        SignalType::PointerMove,
    ];

    /// Conflict-resolution priority. Lower wins.
    pub fn priority(self) -> u8 {
        match self {
            SignalType::Manual => 0,
            SignalType::Click => 1,
            SignalType::DragStart => 2,
            SignalType::DoubleClick => 3,
            SignalType::DragEnd => 4,
            SignalType::WindowFocus => 5,
            SignalType::Typing => 6,
            SignalType::Scroll => 7,
            SignalType::Gesture => 8,
            SignalType::Hover => 9,
            SignalType::PointerMove => 10,
        }
    }

    /// Base confidence before modifiers are applied.
    pub fn base_confidence(self) -> f64 {
        match self {
            SignalType::Manual => 1.00,
            SignalType::Click | SignalType::DragStart | SignalType::DoubleClick => 0.95,
            SignalType::WindowFocus | SignalType::Typing => 0.90,
            SignalType::Scroll | SignalType::Gesture | SignalType::DragEnd => 0.85,
            SignalType::Hover => 0.70,
            SignalType::PointerMove => 0.40,
        }
    }

    /// Whether this kind counts as presenter activity.
    ///
    /// Everything except pure pointer traffic; hover and movement cannot
    /// keep a session out of idle on their own.
    pub fn is_activity(self) -> bool {
        !matches!(self, SignalType::PointerMove | SignalType::Hover)
    }

    /// Dense index for per-type counters
    pub(crate) fn index(self) -> usize {
        self.priority() as usize
    }
}

/// Immutable interaction signal flowing into the focus engine.
///
/// Timestamps are monotonic milliseconds supplied by the producer; the
/// engine never reads a clock of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentSignal {
    /// Kind of interaction
    pub signal_type: SignalType,

    /// Pre-attributed display, set only when authoritative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_id: Option<ScreenId>,

    /// X coordinate in the unified space
    pub x: f64,
    /// Y coordinate in the unified space
    pub y: f64,

    /// Monotonic timestamp in milliseconds
    pub timestamp_ms: u64,

    /// Pointer speed in px/s; meaningful only for `PointerMove`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_px_per_s: Option<f64>,

    /// Display of the focused window, when the OS reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_display_id: Option<ScreenId>,
}

impl IntentSignal {
    /// Create a bare signal at a position and time
    pub fn new(signal_type: SignalType, x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self {
            signal_type,
            screen_id: None,
            x,
            y,
            timestamp_ms,
            speed_px_per_s: None,
            window_display_id: None,
        }
    }

    /// Attach an authoritative screen id
    pub fn with_screen(mut self, id: ScreenId) -> Self {
        self.screen_id = Some(id);
        self
    }

    /// Attach a pointer speed
    pub fn with_speed(mut self, speed_px_per_s: f64) -> Self {
        self.speed_px_per_s = Some(speed_px_per_s);
        self
    }

    /// Attach the focused window's display
    pub fn with_window_display(mut self, id: ScreenId) -> Self {
        self.window_display_id = Some(id);
        self
    }
}

/// Operator action on the focus engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    /// Flip automatic focus switching on/off
    ToggleAutoFocus,
    /// Flip the freeze state
    ToggleFreeze,
    /// Pin the active screen manually
    ManualSelect,
    /// Drop the manual pin
    ClearManual,
}

/// Explicit operator command, bypassing the intent stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorCommand {
    /// Requested action
    pub action: CommandAction,

    /// Target screen; required only for `ManualSelect`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_id: Option<ScreenId>,

    /// Command timestamp in milliseconds
    pub timestamp_ms: u64,
}

impl OperatorCommand {
    /// Toggle automatic focus switching
    pub fn toggle_auto_focus(timestamp_ms: u64) -> Self {
        Self {
            action: CommandAction::ToggleAutoFocus,
            screen_id: None,
            timestamp_ms,
        }
    }

    /// Toggle the freeze state
    pub fn toggle_freeze(timestamp_ms: u64) -> Self {
        Self {
            action: CommandAction::ToggleFreeze,
            screen_id: None,
            timestamp_ms,
        }
    }

    /// Pin a screen manually
    pub fn manual_select(screen_id: ScreenId, timestamp_ms: u64) -> Self {
        Self {
            action: CommandAction::ManualSelect,
            screen_id: Some(screen_id),
            timestamp_ms,
        }
    }

    /// Clear the manual pin
    pub fn clear_manual(timestamp_ms: u64) -> Self {
        Self {
            action: CommandAction::ClearManual,
            screen_id: None,
            timestamp_ms,
        }
    }
}
