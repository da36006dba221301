//! Deterministic trace replay.
//!
//! Replays a JSONL interaction trace through a real focus engine and
//! prints every emitted event as a JSON line. Because the engine takes
//! all timestamps from the trace, a replay is bit-for-bit reproducible;
//! the tool exists to debug focus decisions offline from recorded
//! sessions.
//!
//! # Trace format
//!
//! One record per line, tagged by `kind`:
//!
//! ```text
//! {"kind":"displays","displays":[{"id":1,"x":0,"y":0,"width":1920,"height":1080}, …]}
//! {"kind":"signal","signal_type":"click","x":2100.0,"y":400.0,"timestamp_ms":1000}
//! {"kind":"command","action":"manual_select","screen_id":2,"timestamp_ms":1500}
//! ```
//!
//! The first record must declare the displays; later `displays` records
//! replace the topology atomically.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::display::{DisplayBounds, DisplayMap, SharedDisplayMap};
use crate::engine::{
    EngineConfig, FocusChangeEvent, FocusEngine, FocusMetrics, FocusSink, FocusStateSnapshot,
};
use crate::session::SessionEvent;
use crate::signal::{IntentSignal, OperatorCommand};

/// One line of a replay trace
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceRecord {
    /// Declare or replace the display topology
    Displays {
        /// Display rectangles in the unified space
        displays: Vec<DisplayBounds>,
    },

    /// An intent signal
    Signal {
        /// The signal, inlined into the record
        #[serde(flatten)]
        signal: IntentSignal,
    },

    /// An operator command
    Command {
        /// The command, inlined into the record
        #[serde(flatten)]
        command: OperatorCommand,
    },
}

/// Outcome of a replay run
#[derive(Debug, Serialize)]
pub struct ReplaySummary {
    /// Signals fed to the engine
    pub signals: usize,
    /// Operator commands applied
    pub commands: usize,
    /// Topology declarations seen
    pub topology_updates: usize,
    /// Final engine counters
    pub metrics: FocusMetrics,
}

/// Sink that streams events as JSON lines
struct JsonLineSink<W: Write + Send> {
    out: Arc<Mutex<W>>,
}

impl<W: Write + Send> JsonLineSink<W> {
    fn emit(&self, event: &SessionEvent) {
        let mut out = self.out.lock();
        if let Ok(json) = serde_json::to_string(event) {
            if writeln!(out, "{}", json).is_err() {
                warn!("replay output write failed");
            }
        }
    }
}

impl<W: Write + Send> FocusSink for JsonLineSink<W> {
    fn on_focus_change(&self, event: &FocusChangeEvent) {
        self.emit(&SessionEvent::FocusChange(event.clone()));
    }

    fn on_focus_state(&self, state: &FocusStateSnapshot) {
        self.emit(&SessionEvent::FocusState(state.clone()));
    }
}

/// Replay a trace through a fresh engine, streaming events to `writer`.
///
/// # Errors
///
/// Fails on unreadable input, malformed records, a signal or command
/// before the first `displays` record, or an invalid topology.
pub fn run<R, W>(engine_config: EngineConfig, reader: R, writer: W) -> Result<ReplaySummary>
where
    R: BufRead,
    W: Write + Send + 'static,
{
    let out = Arc::new(Mutex::new(writer));
    let mut engine: Option<FocusEngine> = None;

    let mut signals = 0usize;
    let mut commands = 0usize;
    let mut topology_updates = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read trace line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: TraceRecord = serde_json::from_str(&line)
            .with_context(|| format!("malformed trace record on line {}", index + 1))?;

        match record {
            TraceRecord::Displays { displays } => {
                let map = DisplayMap::new(displays)
                    .with_context(|| format!("invalid display topology on line {}", index + 1))?;
                topology_updates += 1;

                match engine.as_mut() {
                    Some(engine) => engine
                        .update_displays(map)
                        .with_context(|| format!("topology rejected on line {}", index + 1))?,
                    None => {
                        let sink = JsonLineSink { out: out.clone() };
                        engine = Some(
                            FocusEngine::new(
                                "replay",
                                engine_config.clone(),
                                SharedDisplayMap::new(map),
                                Box::new(sink),
                            )
                            .context("engine construction failed")?,
                        );
                    }
                }
            }

            TraceRecord::Signal { signal } => {
                let engine = engine
                    .as_mut()
                    .context("trace must declare displays before signals")?;
                engine.process_signal(&signal);
                signals += 1;
            }

            TraceRecord::Command { command } => {
                let engine = engine
                    .as_mut()
                    .context("trace must declare displays before commands")?;
                engine.handle_operator_command(&command);
                commands += 1;
            }
        }
    }

    let metrics = engine.map(|e| e.metrics()).unwrap_or_default();
    out.lock().flush().ok();

    Ok(ReplaySummary {
        signals,
        commands,
        topology_updates,
        metrics,
    })
}
