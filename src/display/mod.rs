//! Display Geometry Module
//!
//! Models the set of shared displays as a unified virtual-desktop
//! coordinate space and attributes interaction signals to displays.
//!
//! # Overview
//!
//! All displays in a session live in a single pixel coordinate space:
//!
//! ```text
//! ┌────────────┐┌────────────┐   gap   ┌────────────┐
//! │     D1     ││     D2     │         │     D3     │
//! │ 1920x1080  ││ 1920x1080  │         │ 1920x1080  │
//! │ (0, 0)     ││ (1920, 0)  │         │ (4480, 0)  │
//! └────────────┘└────────────┘         └────────────┘
//! ```
//!
//! Rectangles may tile with gaps but never overlap. Containment is
//! half-open: a point at `x + width` belongs to the neighbouring display,
//! not the current one.
//!
//! # Attribution
//!
//! [`attribute`] maps a signal to at most one display:
//!
//! 1. A trusted pre-attributed screen id is returned unchanged.
//! 2. A window-focus signal with a known window display wins next.
//! 3. Otherwise the pointer position decides: exact containment, or the
//!    display with the highest proximity `1 / (1 + distance)`.
//!
//! Attribution never fails loudly: an unattributable signal is simply
//! suppressed by the caller.
//!
//! # Dynamic reconfiguration
//!
//! The display set is fixed at session start but may be replaced
//! atomically via [`SharedDisplayMap`], which swaps an `Arc` snapshot so
//! concurrent readers always observe a consistent map.

mod attribution;
mod layout;

pub use attribution::attribute;
pub use layout::{DisplayBounds, DisplayError, DisplayMap, ScreenId, SharedDisplayMap};
