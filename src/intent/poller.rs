//! Periodic cursor poll task feeding the session's signal queue.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::display::ScreenId;
use crate::intent::IntentDetector;
use crate::signal::IntentSignal;

/// Handle to the running detector pump.
///
/// Owns the interval task that polls the cursor at the configured
/// cadence and publishes signals to a bounded queue. Discrete host
/// events are injected through the `inject_*` methods and travel the
/// same queue. Signals are dropped (with accounting) rather than ever
/// blocking the host.
pub struct DetectorTask {
    detector: Arc<Mutex<IntentDetector>>,
    signal_tx: mpsc::Sender<IntentSignal>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl DetectorTask {
    /// Spawn the poll task on the current tokio runtime.
    pub fn spawn(detector: IntentDetector, signal_tx: mpsc::Sender<IntentSignal>) -> Self {
        let poll_interval = detector.config().cursor_poll_interval_ms;
        let detector = Arc::new(Mutex::new(detector));
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task_detector = detector.clone();
        let task_tx = signal_tx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(poll_interval));
            // Jitter tolerance: a stalled host skips ticks instead of
            // bursting to catch up
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let mut dropped: u64 = 0;
            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        let signals = task_detector.lock().poll();
                        for signal in signals {
                            if task_tx.try_send(signal).is_err() {
                                dropped += 1;
                                if dropped % 100 == 1 {
                                    debug!(dropped, "signal queue full, pointer traffic dropped");
                                }
                            }
                        }
                    }
                }
            }
            debug!("cursor poll task stopped");
        });

        Self {
            detector,
            signal_tx,
            shutdown_tx,
            handle,
        }
    }

    /// Inject a host mouse click
    pub fn inject_click(&self, x: f64, y: f64, is_double: bool) {
        let signal = self.detector.lock().on_mouse_click(x, y, is_double);
        self.publish(signal);
    }

    /// Inject a host drag start
    pub fn inject_drag_start(&self, x: f64, y: f64) {
        let signal = self.detector.lock().on_drag_start(x, y);
        self.publish(signal);
    }

    /// Inject a host drag end
    pub fn inject_drag_end(&self, x: f64, y: f64) {
        let signal = self.detector.lock().on_drag_end(x, y);
        self.publish(signal);
    }

    /// Inject a host scroll
    pub fn inject_scroll(&self, x: f64, y: f64) {
        let signal = self.detector.lock().on_scroll(x, y);
        self.publish(signal);
    }

    /// Inject typing, optionally with the focused window's display
    pub fn inject_typing(&self, window_display_id: Option<ScreenId>) {
        let signal = self.detector.lock().on_typing(window_display_id);
        self.publish(signal);
    }

    /// Inject an OS window-focus change
    pub fn inject_window_focus(&self, window_display_id: ScreenId) {
        let signal = self.detector.lock().on_window_focus_change(window_display_id);
        self.publish(signal);
    }

    /// Stop the poll task; the in-flight tick completes first.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "cursor poll task join failed");
        }
    }

    fn publish(&self, signal: Option<IntentSignal>) {
        if let Some(signal) = signal {
            if self.signal_tx.try_send(signal).is_err() {
                warn!("signal queue full, host event dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayBounds, DisplayMap, SharedDisplayMap};
    use crate::intent::{Clock, CursorProvider, CursorSample, DetectorConfig};
    use crate::signal::SignalType;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Clone, Default)]
    struct FixedCursor {
        position: Arc<Mutex<CursorSample>>,
    }

    impl CursorProvider for FixedCursor {
        fn position(&self) -> CursorSample {
            *self.position.lock()
        }
    }

    #[derive(Clone, Default)]
    struct ManualClock {
        now: Arc<AtomicU64>,
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.now.load(Ordering::SeqCst)
        }
    }

    fn single_display() -> SharedDisplayMap {
        SharedDisplayMap::new(
            DisplayMap::new(vec![DisplayBounds::new(ScreenId(1), 0, 0, 1920, 1080)]).unwrap(),
        )
    }

    fn spawn_task(capacity: usize) -> (DetectorTask, mpsc::Receiver<IntentSignal>) {
        let detector = IntentDetector::new(
            DetectorConfig::default(),
            single_display(),
            Box::new(FixedCursor::default()),
            Box::new(ManualClock::default()),
        )
        .unwrap();
        let (tx, rx) = mpsc::channel(capacity);
        (DetectorTask::spawn(detector, tx), rx)
    }

    #[tokio::test]
    async fn test_injected_click_reaches_queue() {
        let (task, mut rx) = spawn_task(8);

        task.inject_click(100.0, 100.0, false);
        let signal = rx.recv().await.unwrap();
        assert_eq!(signal.signal_type, SignalType::Click);
        assert_eq!(signal.screen_id, Some(ScreenId(1)));

        task.stop().await;
    }

    #[tokio::test]
    async fn test_full_queue_drops_instead_of_blocking() {
        let (task, mut rx) = spawn_task(1);

        task.inject_click(10.0, 10.0, false);
        task.inject_click(20.0, 20.0, false);
        task.inject_click(30.0, 30.0, false);

        // Only the first survived; the rest were dropped silently
        assert_eq!(rx.recv().await.unwrap().x, 10.0);
        assert!(rx.try_recv().is_err());

        task.stop().await;
    }

    #[tokio::test]
    async fn test_stop_terminates_task() {
        let (task, _rx) = spawn_task(8);
        // Returns only once the task has actually joined
        task.stop().await;
    }
}
