//! The focus engine state machine.

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::display::{attribute, DisplayError, DisplayMap, ScreenId, SharedDisplayMap};
use crate::engine::confidence::{self, ScoreContext};
use crate::engine::{
    ConfigError, EngineConfig, FocusChangeEvent, FocusMetrics, FocusMode, FocusSink,
    FocusStateSnapshot,
};
use crate::signal::{CommandAction, IntentSignal, OperatorCommand, SignalType};

/// Errors surfaced by engine construction and reconfiguration
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid display topology
    #[error(transparent)]
    Display(#[from] DisplayError),
}

/// Deterministic presenter-intent state machine for one session.
///
/// Single-owner: every entry point takes `&mut self` and runs to
/// completion without suspension. Callers serialize access (the session
/// layer holds a mutex for the duration of each call). The engine never
/// reads a clock; all time comparisons use the timestamps carried by
/// incoming signals and commands.
pub struct FocusEngine {
    session_id: String,
    config: EngineConfig,
    displays: SharedDisplayMap,
    sink: Box<dyn FocusSink>,

    active_screen_id: Option<ScreenId>,
    frozen: bool,
    auto_enabled: bool,
    manual_override: Option<ScreenId>,

    last_switch_ts: u64,
    candidate_screen_id: Option<ScreenId>,
    candidate_since_ts: u64,
    last_activity_ts: u64,
    resume_grace_until: u64,

    /// Highest timestamp observed so far; used by clock-free snapshots
    last_seen_ts: u64,

    sequence: u64,
    metrics: FocusMetrics,
}

impl FocusEngine {
    /// Create an engine for one session.
    ///
    /// The active screen initializes to the first display of the map (in
    /// deterministic order); it stays unset only while the map is empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration fails validation or the
    /// map exceeds the configured display cap.
    pub fn new(
        session_id: impl Into<String>,
        config: EngineConfig,
        displays: SharedDisplayMap,
        sink: Box<dyn FocusSink>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let map = displays.current();
        if map.len() > config.max_screens {
            return Err(DisplayError::TooManyDisplays {
                count: map.len(),
                max: config.max_screens,
            }
            .into());
        }

        let session_id = session_id.into();
        info!(
            session = %session_id,
            displays = map.len(),
            "focus engine created"
        );

        Ok(Self {
            session_id,
            config,
            sink,
            active_screen_id: map.first(),
            displays,
            frozen: false,
            auto_enabled: true,
            manual_override: None,
            last_switch_ts: 0,
            candidate_screen_id: None,
            candidate_since_ts: 0,
            last_activity_ts: 0,
            resume_grace_until: 0,
            last_seen_ts: 0,
            sequence: 0,
            metrics: FocusMetrics::default(),
        })
    }

    /// Process one attributed intent signal.
    ///
    /// Runs the full pipeline: activity tracking, precedence checks,
    /// attribution, confidence, idle gate, cooldown penalty, candidate
    /// tracking, dwell gate, hysteresis. At most one focus change is
    /// emitted per call.
    pub fn process_signal(&mut self, signal: &IntentSignal) {
        let now = signal.timestamp_ms;
        self.last_seen_ts = self.last_seen_ts.max(now);
        self.metrics.record_signal(signal.signal_type);

        if signal.signal_type.is_activity() {
            self.last_activity_ts = now;
        }

        if self.frozen {
            trace!(signal = ?signal.signal_type, "frozen, signal dropped");
            return;
        }

        if !self.auto_enabled {
            trace!(signal = ?signal.signal_type, "auto focus disabled, signal dropped");
            return;
        }

        if let Some(pinned) = self.manual_override {
            // Re-assert the pin in case the active screen drifted
            if self.active_screen_id != Some(pinned) {
                self.realign_candidate(pinned, now);
                self.set_active(pinned, SignalType::Manual, 1.0, now);
            }
            return;
        }

        let map = self.displays.current();
        let Some(cand) = attribute(signal, &map) else {
            trace!(signal = ?signal.signal_type, "unattributable signal suppressed");
            return;
        };

        // Noise floor: known-slow pointer motion is sensor jitter
        if signal.signal_type == SignalType::PointerMove {
            if let Some(speed) = signal.speed_px_per_s {
                if speed < self.config.idle_motion_px_per_s {
                    return;
                }
            }
        }

        let mut conf = confidence::score(
            signal,
            cand,
            &ScoreContext {
                active: self.active_screen_id,
                candidate: self.candidate_screen_id,
                candidate_since_ts: self.candidate_since_ts,
                last_switch_ts: self.last_switch_ts,
            },
            &self.config,
        );

        if now.saturating_sub(self.last_activity_ts) > self.config.idle_ms {
            self.metrics.idle_blocks += 1;
            debug!(
                signal = ?signal.signal_type,
                idle_for_ms = now.saturating_sub(self.last_activity_ts),
                "idle gate suppressed signal"
            );
            return;
        }

        // Inclusive: a signal at exactly cooldown_ms after a switch is
        // still penalized
        if signal.signal_type != SignalType::Manual
            && now.saturating_sub(self.last_switch_ts) <= self.config.cooldown_ms
        {
            conf = (conf - confidence::COOLDOWN_PENALTY).max(0.0);
            self.metrics.cooldown_blocks += 1;
        }

        if self.candidate_screen_id != Some(cand) {
            self.candidate_screen_id = Some(cand);
            self.candidate_since_ts = now;
            self.metrics.dwell_resets += 1;
            trace!(candidate = %cand, "candidate changed, dwell restarted");
        }

        // Strict: a signal at exactly candidate_since + dwell passes
        let dwell_needed = self.config.dwell_ms(signal.signal_type);
        if now.saturating_sub(self.candidate_since_ts) < dwell_needed {
            return;
        }

        if self.active_screen_id != Some(cand) {
            if now < self.resume_grace_until {
                debug!(candidate = %cand, "switch blocked by resume grace");
                return;
            }
            if conf >= self.config.switch_threshold {
                self.set_active(cand, signal.signal_type, conf, now);
            } else {
                debug!(
                    candidate = %cand,
                    confidence = conf,
                    threshold = self.config.switch_threshold,
                    "switch below threshold"
                );
            }
        } else if conf >= self.config.stay_threshold {
            let snapshot = self.snapshot_at(now);
            self.sink.on_focus_state(&snapshot);
        }
    }

    /// Apply an explicit operator command.
    ///
    /// Commands bypass the intent stream and are exempt from idle,
    /// cooldown, and dwell.
    pub fn handle_operator_command(&mut self, command: &OperatorCommand) {
        let now = command.timestamp_ms;
        self.last_seen_ts = self.last_seen_ts.max(now);

        match command.action {
            CommandAction::ToggleAutoFocus => {
                self.auto_enabled = !self.auto_enabled;
                info!(enabled = self.auto_enabled, "auto focus toggled");
                let snapshot = self.snapshot_at(now);
                self.sink.on_focus_state(&snapshot);
            }

            CommandAction::ToggleFreeze => {
                self.frozen = !self.frozen;
                if !self.frozen {
                    // Resume grace: candidates re-accrue their dwell and
                    // cross-display switches stay blocked briefly
                    self.candidate_since_ts = now;
                    self.resume_grace_until = now.saturating_add(self.config.resume_grace_ms);
                }
                info!(frozen = self.frozen, "freeze toggled");
                let snapshot = self.snapshot_at(now);
                self.sink.on_focus_state(&snapshot);
            }

            CommandAction::ManualSelect => {
                let Some(target) = command.screen_id else {
                    warn!("manual select without a screen id ignored");
                    return;
                };
                if !self.displays.current().contains(target) {
                    debug!(screen = %target, "manual select of unknown screen ignored");
                    return;
                }

                self.manual_override = Some(target);
                if self.active_screen_id != Some(target) {
                    self.realign_candidate(target, now);
                    self.set_active(target, SignalType::Manual, 1.0, now);
                } else {
                    // Already active: the pin changes mode, not focus
                    let snapshot = self.snapshot_at(now);
                    self.sink.on_focus_state(&snapshot);
                }
            }

            CommandAction::ClearManual => {
                self.manual_override = None;
                info!("manual override cleared");
                let snapshot = self.snapshot_at(now);
                self.sink.on_focus_state(&snapshot);
            }
        }
    }

    /// Atomically replace the display topology.
    ///
    /// Vanished candidate and override screens are dropped; a vanished
    /// active screen re-homes to the first display of the new map with a
    /// Manual-reason change event.
    ///
    /// # Errors
    ///
    /// Returns an error when the new map exceeds the display cap; the
    /// previous topology stays in effect.
    pub fn update_displays(&mut self, map: DisplayMap) -> Result<(), DisplayError> {
        if map.len() > self.config.max_screens {
            return Err(DisplayError::TooManyDisplays {
                count: map.len(),
                max: self.config.max_screens,
            });
        }

        info!(displays = map.len(), "display topology replaced");
        self.displays.replace(map);
        let map = self.displays.current();

        if let Some(pinned) = self.manual_override {
            if !map.contains(pinned) {
                warn!(screen = %pinned, "manual override screen vanished, override cleared");
                self.manual_override = None;
            }
        }

        if let Some(cand) = self.candidate_screen_id {
            if !map.contains(cand) {
                self.candidate_screen_id = None;
            }
        }

        let active_still_present = self
            .active_screen_id
            .map(|active| map.contains(active))
            .unwrap_or(false);

        if !active_still_present {
            let now = self.last_seen_ts;
            if let Some(first) = map.first() {
                self.realign_candidate(first, now);
                self.set_active(first, SignalType::Manual, 1.0, now);
            } else {
                self.active_screen_id = None;
                let snapshot = self.snapshot_at(now);
                self.sink.on_focus_state(&snapshot);
            }
        }

        Ok(())
    }

    /// Current state summary for late-joining viewers.
    ///
    /// Callable at any time; never mutates state.
    pub fn snapshot(&self) -> FocusStateSnapshot {
        self.snapshot_at(self.last_seen_ts)
    }

    /// Snapshot of the decision counters.
    pub fn metrics(&self) -> FocusMetrics {
        self.metrics.clone()
    }

    /// Currently active display, if any displays exist
    pub fn active_screen(&self) -> Option<ScreenId> {
        self.active_screen_id
    }

    /// Whether automatic switching is held by the operator
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Whether automatic switching is enabled
    pub fn auto_enabled(&self) -> bool {
        self.auto_enabled
    }

    /// Operator-pinned screen, if any
    pub fn manual_override(&self) -> Option<ScreenId> {
        self.manual_override
    }

    /// Session this engine belongs to
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn snapshot_at(&self, timestamp_ms: u64) -> FocusStateSnapshot {
        let mode = if self.manual_override.is_some() {
            FocusMode::Manual
        } else if self.frozen {
            FocusMode::Frozen
        } else {
            FocusMode::Auto
        };

        FocusStateSnapshot {
            active_screen_id: self.active_screen_id,
            mode,
            frozen: self.frozen,
            sequence: self.sequence,
            timestamp_ms,
        }
    }

    /// Make `screen` the candidate as of `now` so the emitted change
    /// carries zero dwell (manual actions owe no tenure).
    fn realign_candidate(&mut self, screen: ScreenId, now: u64) {
        self.candidate_screen_id = Some(screen);
        self.candidate_since_ts = now;
    }

    /// Commit a focus change and emit the event.
    ///
    /// State mutates before the sink runs, so a panicking sink leaves the
    /// engine consistent with the event having been emitted.
    fn set_active(&mut self, screen: ScreenId, reason: SignalType, conf: f64, now: u64) {
        self.sequence += 1;
        let dwell_ms = now.saturating_sub(self.candidate_since_ts);
        self.active_screen_id = Some(screen);
        self.last_switch_ts = now;
        self.metrics.focus_changes += 1;

        let event = FocusChangeEvent {
            session_id: self.session_id.clone(),
            screen_id: screen,
            reason,
            confidence: confidence::round(conf),
            dwell_ms,
            sequence: self.sequence,
            timestamp_ms: now,
        };

        info!(
            screen = %screen,
            reason = ?reason,
            confidence = event.confidence,
            dwell_ms,
            sequence = event.sequence,
            "focus changed"
        );
        self.sink.on_focus_change(&event);
    }
}
