//! Intent Detection Module
//!
//! Converts the raw cursor-sample stream plus discrete host events into
//! the canonical attributed signal stream consumed by the focus engine.
//!
//! # Pipeline
//!
//! ```text
//! Host scheduler (20 Hz)          Host event hooks
//!   └─> DetectorTask tick           └─> inject_click / inject_typing / …
//!         └─> IntentDetector.poll()       └─> IntentDetector.on_*()
//!               ├─> PointerMove  (displacement ≥ threshold)
//!               └─> Hover        (anchored ≤ radius for ≥ threshold ms)
//!                     └─> bounded mpsc queue ──> focus engine actor
//! ```
//!
//! # Hover synthesis
//!
//! The detector keeps a hover anchor. Leaving the hover radius moves the
//! anchor and re-arms emission; staying inside it for the hover threshold
//! emits exactly one `Hover` per anchor interval.
//!
//! # Time
//!
//! The detector is the only producer that reads a clock, through the
//! [`Clock`] seam so tests stay deterministic. Each tick is synchronous
//! and non-blocking; the detector never calls into the focus engine
//! directly; signals travel through the session's queue.

mod detector;
mod poller;

pub use detector::{Clock, CursorProvider, CursorSample, DetectorConfig, IntentDetector, MonotonicClock};
pub use poller::DetectorTask;
