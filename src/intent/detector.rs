//! Cursor sampling and intent-signal synthesis.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::display::{attribute, ScreenId, SharedDisplayMap};
use crate::engine::ConfigError;
use crate::signal::{IntentSignal, SignalType};

/// Configuration for the intent detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Cursor poll cadence in milliseconds (default 50, i.e. 20 Hz)
    #[serde(default = "default_poll_interval_ms")]
    pub cursor_poll_interval_ms: u64,

    /// Displacement below which a sample emits no movement (pixels)
    #[serde(default = "default_movement_threshold")]
    pub movement_threshold_px: f64,

    /// Radius the pointer may wander while still hovering (pixels)
    #[serde(default = "default_hover_radius")]
    pub hover_radius_px: f64,

    /// Time the pointer must stay anchored before a hover emits (ms)
    #[serde(default = "default_hover_threshold_ms")]
    pub hover_threshold_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    50
}
fn default_movement_threshold() -> f64 {
    3.0
}
fn default_hover_radius() -> f64 {
    8.0
}
fn default_hover_threshold_ms() -> u64 {
    300
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cursor_poll_interval_ms: default_poll_interval_ms(),
            movement_threshold_px: default_movement_threshold(),
            hover_radius_px: default_hover_radius(),
            hover_threshold_ms: default_hover_threshold_ms(),
        }
    }
}

impl DetectorConfig {
    /// Validate parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cursor_poll_interval_ms == 0 {
            return Err(ConfigError::NotPositive {
                name: "cursor_poll_interval_ms",
                value: 0.0,
            });
        }
        if !(self.movement_threshold_px >= 0.0) || !(self.hover_radius_px >= 0.0) {
            return Err(ConfigError::NotPositive {
                name: "movement_threshold_px / hover_radius_px",
                value: self.movement_threshold_px.min(self.hover_radius_px),
            });
        }
        Ok(())
    }
}

/// One cursor reading from the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CursorSample {
    /// X position in the unified space
    pub x: f64,
    /// Y position in the unified space
    pub y: f64,
    /// Display the OS reports the cursor on, when known
    pub display_id: Option<ScreenId>,
}

/// Synchronous cursor position source supplied by the host shell.
pub trait CursorProvider: Send {
    /// Current pointer position plus the OS-reported display, if any
    fn position(&self) -> CursorSample;
}

/// Monotonic millisecond clock seam.
///
/// Only the detector reads a clock; the engine takes every timestamp
/// from its inputs. Tests substitute a manual implementation.
pub trait Clock: Send + Sync {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}

/// Production clock based on a process-local monotonic origin
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock anchored at the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Converts cursor samples and discrete host events into attributed
/// intent signals.
///
/// Owned by the presenter side of a session. `poll()` runs once per tick
/// and emits at most two signals (one movement, one hover); the `on_*`
/// inject methods map discrete OS events. Every produced signal is
/// attributed against the shared display map; unattributable input is
/// suppressed.
pub struct IntentDetector {
    config: DetectorConfig,
    displays: SharedDisplayMap,
    provider: Box<dyn CursorProvider>,
    clock: Box<dyn Clock>,

    /// Previous poll sample: (x, y, timestamp)
    last_sample: Option<(f64, f64, u64)>,

    /// Hover anchor: (x, y, anchored-at)
    hover_anchor: (f64, f64, u64),
    /// Single-shot flag: one hover per anchor interval
    hover_emitted: bool,

    /// Most recent cursor position, for events that arrive without one
    last_cursor: (f64, f64),
}

impl IntentDetector {
    /// Create a detector over a cursor provider and clock
    pub fn new(
        config: DetectorConfig,
        displays: SharedDisplayMap,
        provider: Box<dyn CursorProvider>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            displays,
            provider,
            clock,
            last_sample: None,
            hover_anchor: (0.0, 0.0, 0),
            hover_emitted: false,
            last_cursor: (0.0, 0.0),
        })
    }

    /// Detector configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run one poll tick: sample the cursor, synthesize movement and
    /// hover signals. Returns at most two signals.
    pub fn poll(&mut self) -> Vec<IntentSignal> {
        let now = self.clock.now_ms();
        let sample = self.provider.position();
        self.last_cursor = (sample.x, sample.y);

        let mut out = Vec::with_capacity(2);

        let Some((last_x, last_y, last_ts)) = self.last_sample else {
            self.last_sample = Some((sample.x, sample.y, now));
            self.hover_anchor = (sample.x, sample.y, now);
            self.hover_emitted = false;
            return out;
        };

        let dist = euclid(sample.x - last_x, sample.y - last_y);
        let dt_ms = now.saturating_sub(last_ts);
        let speed = if dt_ms > 0 {
            dist / dt_ms as f64 * 1000.0
        } else {
            0.0
        };

        if dist >= self.config.movement_threshold_px {
            let movement = IntentSignal::new(SignalType::PointerMove, sample.x, sample.y, now)
                .with_speed(speed);
            if let Some(signal) = self.attributed(movement, sample.display_id) {
                out.push(signal);
            }
        }

        let (anchor_x, anchor_y, anchored_at) = self.hover_anchor;
        if euclid(sample.x - anchor_x, sample.y - anchor_y) > self.config.hover_radius_px {
            self.hover_anchor = (sample.x, sample.y, now);
            self.hover_emitted = false;
        } else if !self.hover_emitted
            && now.saturating_sub(anchored_at) >= self.config.hover_threshold_ms
        {
            self.hover_emitted = true;
            let hover = IntentSignal::new(SignalType::Hover, sample.x, sample.y, now);
            if let Some(signal) = self.attributed(hover, sample.display_id) {
                out.push(signal);
            }
        }

        self.last_sample = Some((sample.x, sample.y, now));
        trace!(
            x = sample.x,
            y = sample.y,
            dist,
            speed,
            emitted = out.len(),
            "cursor poll"
        );
        out
    }

    /// Map a host mouse click to a signal
    pub fn on_mouse_click(&mut self, x: f64, y: f64, is_double: bool) -> Option<IntentSignal> {
        let kind = if is_double {
            SignalType::DoubleClick
        } else {
            SignalType::Click
        };
        let signal = IntentSignal::new(kind, x, y, self.clock.now_ms());
        self.attributed(signal, None)
    }

    /// Map a host drag start to a signal
    pub fn on_drag_start(&mut self, x: f64, y: f64) -> Option<IntentSignal> {
        let signal = IntentSignal::new(SignalType::DragStart, x, y, self.clock.now_ms());
        self.attributed(signal, None)
    }

    /// Map a host drag end to a signal
    pub fn on_drag_end(&mut self, x: f64, y: f64) -> Option<IntentSignal> {
        let signal = IntentSignal::new(SignalType::DragEnd, x, y, self.clock.now_ms());
        self.attributed(signal, None)
    }

    /// Map a host scroll to a signal
    pub fn on_scroll(&mut self, x: f64, y: f64) -> Option<IntentSignal> {
        let signal = IntentSignal::new(SignalType::Scroll, x, y, self.clock.now_ms());
        self.attributed(signal, None)
    }

    /// Map typing to a signal.
    ///
    /// When the OS reports the focused window's display, that display is
    /// authoritative; otherwise the current cursor position stands in.
    pub fn on_typing(&mut self, window_display_id: Option<ScreenId>) -> Option<IntentSignal> {
        let (x, y) = self.last_cursor;
        let mut signal = IntentSignal::new(SignalType::Typing, x, y, self.clock.now_ms());
        if let Some(display) = window_display_id {
            signal = signal.with_screen(display).with_window_display(display);
        }
        self.attributed(signal, None)
    }

    /// Map an OS window-focus change to a signal
    pub fn on_window_focus_change(&mut self, window_display_id: ScreenId) -> Option<IntentSignal> {
        let (x, y) = self.last_cursor;
        let signal = IntentSignal::new(SignalType::WindowFocus, x, y, self.clock.now_ms())
            .with_window_display(window_display_id);
        self.attributed(signal, None)
    }

    /// Attribute and finalize a signal; `None` suppresses it.
    fn attributed(
        &self,
        mut signal: IntentSignal,
        host_display: Option<ScreenId>,
    ) -> Option<IntentSignal> {
        if signal.screen_id.is_none() {
            signal.screen_id = host_display;
        }
        let map = self.displays.current();
        let resolved = attribute(&signal, &map)?;
        signal.screen_id = Some(resolved);
        Some(signal)
    }
}

fn euclid(dx: f64, dy: f64) -> f64 {
    (dx * dx + dy * dy).sqrt()
}
