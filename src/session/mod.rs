//! Session Orchestration Module
//!
//! Wires one presenter's detector, focus engine, and viewer fan-out into
//! a single owned unit with a deterministic processing order.
//!
//! # Architecture
//!
//! ```text
//! Host events ──> DetectorTask ──> signal queue (bounded) ──┐
//! Operator UI ───────────────────> command queue ───────────┤
//!                                                           ▼
//!                                               session pump (one actor)
//!                                                 ├─> FocusEngine (mutex)
//!                                                 └─> broadcast fan-out
//!                                                       ├─> viewer A
//!                                                       ├─> viewer B
//!                                                       └─> late joiner (snapshot first)
//! ```
//!
//! # Queue priorities
//!
//! Operator commands always drain before intent signals: a freeze or a
//! manual pin submitted while pointer traffic queues up takes effect
//! before that traffic is interpreted.
//!
//! # Ordering toward viewers
//!
//! Focus changes carry a strictly increasing `sequence`. The broadcast
//! channel preserves order per receiver; a viewer that lags far enough to
//! observe `Lagged` must re-sync from [`FocusSession::attach_viewer`] and
//! discard anything older than the snapshot it receives.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::display::{DisplayBounds, DisplayMap, ScreenId, SharedDisplayMap};
use crate::engine::{
    ConfigError, EngineConfig, EngineError, FocusChangeEvent, FocusEngine, FocusMetrics,
    FocusSink, FocusStateSnapshot,
};
use crate::intent::{Clock, CursorProvider, DetectorConfig, DetectorTask, IntentDetector};
use crate::signal::{IntentSignal, OperatorCommand};

/// Session-level queue and fan-out configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Capacity of the intent-signal queue
    #[serde(default = "default_signal_queue")]
    pub signal_queue_capacity: usize,

    /// Capacity of the operator-command queue
    #[serde(default = "default_command_queue")]
    pub command_queue_capacity: usize,

    /// Per-viewer broadcast buffer before lagging kicks in
    #[serde(default = "default_viewer_buffer")]
    pub viewer_event_buffer: usize,
}

fn default_signal_queue() -> usize {
    64
}
fn default_command_queue() -> usize {
    16
}
fn default_viewer_buffer() -> usize {
    64
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signal_queue_capacity: default_signal_queue(),
            command_queue_capacity: default_command_queue(),
            viewer_event_buffer: default_viewer_buffer(),
        }
    }
}

impl SessionConfig {
    /// Validate parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("signal_queue_capacity", self.signal_queue_capacity),
            ("command_queue_capacity", self.command_queue_capacity),
            ("viewer_event_buffer", self.viewer_event_buffer),
        ] {
            if value == 0 {
                return Err(ConfigError::NotPositive { name, value: 0.0 });
            }
        }
        Ok(())
    }
}

/// Event fanned out to connected viewers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Authoritative focus transition
    FocusChange(FocusChangeEvent),
    /// Mode change or stay-refresh; lossy
    FocusState(FocusStateSnapshot),
}

/// Everything a newly attached viewer needs to render immediately.
pub struct ViewerSync {
    /// Current engine state
    pub snapshot: FocusStateSnapshot,
    /// Most recent focus change, if any happened yet
    pub latest_change: Option<FocusChangeEvent>,
    /// Live event stream from this point on
    pub events: broadcast::Receiver<SessionEvent>,
}

/// Engine sink that fans events out to viewers and caches the latest
/// change for late joiners.
struct BroadcastSink {
    events_tx: broadcast::Sender<SessionEvent>,
    latest_change: Arc<Mutex<Option<FocusChangeEvent>>>,
}

impl FocusSink for BroadcastSink {
    fn on_focus_change(&self, event: &FocusChangeEvent) {
        *self.latest_change.lock() = Some(event.clone());
        // No receivers is fine; the cache still serves late joiners
        let _ = self.events_tx.send(SessionEvent::FocusChange(event.clone()));
    }

    fn on_focus_state(&self, state: &FocusStateSnapshot) {
        let _ = self.events_tx.send(SessionEvent::FocusState(state.clone()));
    }
}

/// One presenter's focus session.
///
/// Owns the engine exclusively; every mutation funnels through the
/// session pump or through entry points that hold the engine mutex for
/// the duration of the call. Dropping the session after
/// [`FocusSession::shutdown`] releases all state; viewers observe their
/// event streams closing.
pub struct FocusSession {
    id: String,
    engine: Arc<Mutex<FocusEngine>>,
    displays: SharedDisplayMap,
    signal_tx: mpsc::Sender<IntentSignal>,
    command_tx: mpsc::Sender<OperatorCommand>,
    events_tx: broadcast::Sender<SessionEvent>,
    latest_change: Arc<Mutex<Option<FocusChangeEvent>>>,
    detector_task: Option<DetectorTask>,
    pump: Option<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl FocusSession {
    /// Start a session over the given display topology.
    ///
    /// Spawns the pump task on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error when a configuration section fails validation or
    /// the topology exceeds the display cap.
    pub fn start(
        engine_config: EngineConfig,
        session_config: SessionConfig,
        displays: DisplayMap,
    ) -> Result<Self, EngineError> {
        session_config.validate()?;

        let id = Uuid::new_v4().to_string();
        let shared = SharedDisplayMap::new(displays);
        let (events_tx, _) = broadcast::channel(session_config.viewer_event_buffer);
        let latest_change = Arc::new(Mutex::new(None));

        let sink = BroadcastSink {
            events_tx: events_tx.clone(),
            latest_change: latest_change.clone(),
        };
        let engine = Arc::new(Mutex::new(FocusEngine::new(
            id.clone(),
            engine_config,
            shared.clone(),
            Box::new(sink),
        )?));

        let (signal_tx, signal_rx) = mpsc::channel(session_config.signal_queue_capacity);
        let (command_tx, command_rx) = mpsc::channel(session_config.command_queue_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let pump = tokio::spawn(Self::pump(
            engine.clone(),
            signal_rx,
            command_rx,
            shutdown_rx,
        ));

        info!(session = %id, "focus session started");
        Ok(Self {
            id,
            engine,
            displays: shared,
            signal_tx,
            command_tx,
            events_tx,
            latest_change,
            detector_task: None,
            pump: Some(pump),
            shutdown_tx,
        })
    }

    /// Session identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Attach the cursor-driven intent detector.
    ///
    /// The detector polls the provider at the configured cadence and
    /// publishes into this session's signal queue.
    pub fn start_detector(
        &mut self,
        config: DetectorConfig,
        provider: Box<dyn CursorProvider>,
        clock: Box<dyn Clock>,
    ) -> Result<(), ConfigError> {
        let detector = IntentDetector::new(config, self.displays.clone(), provider, clock)?;
        self.detector_task = Some(DetectorTask::spawn(detector, self.signal_tx.clone()));
        Ok(())
    }

    /// Handle to the running detector, for host event injection
    pub fn detector(&self) -> Option<&DetectorTask> {
        self.detector_task.as_ref()
    }

    /// Submit an intent signal from an external producer.
    ///
    /// Never blocks; excess pointer traffic is dropped.
    pub fn submit_signal(&self, signal: IntentSignal) {
        if self.signal_tx.try_send(signal).is_err() {
            debug!("signal queue full, signal dropped");
        }
    }

    /// Submit an operator command.
    ///
    /// Commands outrank signals in the pump; delivery is expected to be
    /// rare (user keystrokes).
    pub fn submit_command(&self, command: OperatorCommand) {
        if self.command_tx.try_send(command).is_err() {
            warn!("command queue full, operator command dropped");
        }
    }

    /// Attach a viewer: snapshot plus the live event stream.
    ///
    /// A late joiner renders from `snapshot` (and `latest_change`, when
    /// present) immediately instead of waiting for the next switch.
    pub fn attach_viewer(&self) -> ViewerSync {
        ViewerSync {
            snapshot: self.engine.lock().snapshot(),
            latest_change: self.latest_change.lock().clone(),
            events: self.events_tx.subscribe(),
        }
    }

    /// Current engine state; never mutates
    pub fn snapshot(&self) -> FocusStateSnapshot {
        self.engine.lock().snapshot()
    }

    /// Current decision counters
    pub fn metrics(&self) -> FocusMetrics {
        self.engine.lock().metrics()
    }

    /// Currently active display
    pub fn active_screen(&self) -> Option<ScreenId> {
        self.engine.lock().active_screen()
    }

    /// Atomically replace the display topology for engine and detector.
    pub fn update_displays(&self, displays: Vec<DisplayBounds>) -> Result<(), EngineError> {
        let map = DisplayMap::new(displays)?;
        self.engine.lock().update_displays(map)?;
        Ok(())
    }

    /// Stop the detector and the pump, then release the session.
    ///
    /// In-flight work completes first.
    pub async fn shutdown(mut self) {
        if let Some(detector) = self.detector_task.take() {
            detector.stop().await;
        }
        let _ = self.shutdown_tx.send(true);
        if let Some(pump) = self.pump.take() {
            if let Err(e) = pump.await {
                warn!(error = %e, "session pump join failed");
            }
        }
        info!(session = %self.id, "focus session stopped");
    }

    /// Single consumer of both queues; commands outrank signals.
    async fn pump(
        engine: Arc<Mutex<FocusEngine>>,
        mut signal_rx: mpsc::Receiver<IntentSignal>,
        mut command_rx: mpsc::Receiver<OperatorCommand>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }

                Some(command) = command_rx.recv() => {
                    engine.lock().handle_operator_command(&command);
                }

                Some(signal) = signal_rx.recv() => {
                    // A command that raced in still beats this signal
                    while let Ok(command) = command_rx.try_recv() {
                        engine.lock().handle_operator_command(&command);
                    }
                    engine.lock().process_signal(&signal);
                }

                else => break,
            }
        }
        debug!("session pump stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalType;
    use tokio::time::{timeout, Duration};

    fn three_wide() -> DisplayMap {
        DisplayMap::new(vec![
            DisplayBounds::new(ScreenId(1), 0, 0, 1920, 1080),
            DisplayBounds::new(ScreenId(2), 1920, 0, 1920, 1080),
            DisplayBounds::new(ScreenId(3), 4480, 0, 1920, 1080),
        ])
        .unwrap()
    }

    fn click(screen: ScreenId, ts: u64) -> IntentSignal {
        IntentSignal::new(SignalType::Click, 0.0, 0.0, ts).with_screen(screen)
    }

    async fn next_change(rx: &mut broadcast::Receiver<SessionEvent>) -> FocusChangeEvent {
        loop {
            match timeout(Duration::from_secs(2), rx.recv()).await.unwrap() {
                Ok(SessionEvent::FocusChange(event)) => return event,
                Ok(SessionEvent::FocusState(_)) => continue,
                Err(e) => panic!("event stream failed: {e}"),
            }
        }
    }

    #[tokio::test]
    async fn test_signal_to_viewer_pipeline() {
        let session = FocusSession::start(
            EngineConfig::default(),
            SessionConfig::default(),
            three_wide(),
        )
        .unwrap();
        let mut viewer = session.attach_viewer();
        assert_eq!(viewer.snapshot.active_screen_id, Some(ScreenId(1)));
        assert!(viewer.latest_change.is_none());

        session.submit_signal(click(ScreenId(2), 1000));
        session.submit_signal(click(ScreenId(2), 1400));

        let event = next_change(&mut viewer.events).await;
        assert_eq!(event.screen_id, ScreenId(2));
        assert_eq!(event.sequence, 1);

        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_late_joiner_gets_cached_change() {
        let session = FocusSession::start(
            EngineConfig::default(),
            SessionConfig::default(),
            three_wide(),
        )
        .unwrap();
        let mut early = session.attach_viewer();

        session.submit_signal(click(ScreenId(3), 1000));
        session.submit_signal(click(ScreenId(3), 1400));
        next_change(&mut early.events).await;

        // Joined after the switch: state arrives without waiting
        let late = session.attach_viewer();
        assert_eq!(late.snapshot.active_screen_id, Some(ScreenId(3)));
        let cached = late.latest_change.unwrap();
        assert_eq!(cached.screen_id, ScreenId(3));
        assert_eq!(cached.sequence, 1);

        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_command_flows_through_pump() {
        let session = FocusSession::start(
            EngineConfig::default(),
            SessionConfig::default(),
            three_wide(),
        )
        .unwrap();
        let mut viewer = session.attach_viewer();

        session.submit_command(OperatorCommand::manual_select(ScreenId(2), 500));
        let event = next_change(&mut viewer.events).await;
        assert_eq!(event.reason, SignalType::Manual);
        assert_eq!(event.screen_id, ScreenId(2));
        assert_eq!(session.active_screen(), Some(ScreenId(2)));

        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_update_displays_propagates() {
        let session = FocusSession::start(
            EngineConfig::default(),
            SessionConfig::default(),
            three_wide(),
        )
        .unwrap();

        session
            .update_displays(vec![DisplayBounds::new(ScreenId(5), 0, 0, 2560, 1440)])
            .unwrap();
        assert_eq!(session.active_screen(), Some(ScreenId(5)));

        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_is_clean() {
        let session = FocusSession::start(
            EngineConfig::default(),
            SessionConfig::default(),
            three_wide(),
        )
        .unwrap();
        session.submit_signal(click(ScreenId(2), 1000));
        session.shutdown().await;
    }
}
