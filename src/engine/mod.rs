//! Focus Engine Module
//!
//! The deterministic presenter-intent state machine: consumes attributed
//! interaction signals and operator commands, decides which display is
//! active, and emits authoritative focus events to the signaling layer.
//!
//! # Processing pipeline
//!
//! Every intent signal runs the same gauntlet, in order:
//!
//! ```text
//! IntentSignal
//!   ├─> count + activity tracking
//!   ├─> freeze precedence        (frozen ⇒ drop)
//!   ├─> auto-enabled precedence  (auto off ⇒ drop)
//!   ├─> manual precedence        (override pinned ⇒ re-assert, drop)
//!   ├─> attribution              (no display ⇒ drop)
//!   ├─> confidence model         (base + modifiers, clamped)
//!   ├─> idle gate                (no activity for idle_ms ⇒ drop)
//!   ├─> cooldown penalty         (recent switch ⇒ −0.15, inclusive)
//!   ├─> candidate tracking       (new candidate ⇒ dwell restarts)
//!   ├─> dwell gate               (candidate too young ⇒ drop)
//!   └─> hysteresis               (switch ≥ 0.80 / stay ≥ 0.50)
//! ```
//!
//! # Stability properties
//!
//! - **No thrash on transit:** pointer motion carries low base confidence,
//!   fast motion is penalized further, and movement dwell is the longest.
//! - **No accidental switches:** a candidate display must survive its
//!   dwell window; any competing display restarts the clock.
//! - **Quick deliberate reaction:** clicks and typing carry high base
//!   confidence and short dwell.
//! - **Explainability:** every emitted event carries the reason signal,
//!   the rounded confidence, and the dwell the candidate accrued.
//!
//! # Time discipline
//!
//! The engine never reads a clock. Every comparison uses the timestamp of
//! the incoming signal or command, which makes behavior fully
//! deterministic under test.

mod config;
mod confidence;
mod events;
mod focus;
mod metrics;

pub use config::{ConfigError, EngineConfig};
pub use events::{FocusChangeEvent, FocusMode, FocusSink, FocusStateSnapshot, NullSink};
pub use focus::{EngineError, FocusEngine};
pub use metrics::FocusMetrics;
