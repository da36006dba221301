//! Signal-to-display attribution.

use tracing::trace;

use crate::display::{DisplayMap, ScreenId};
use crate::signal::{IntentSignal, SignalType};

/// Map a signal to at most one display.
///
/// Rules, in order:
///
/// 1. A pre-attributed screen id known to the map is trusted unchanged
///    (manual commands, host-tagged events).
/// 2. A `WindowFocus` signal with a known window display id resolves to
///    that display.
/// 3. Pointer-based attribution on `(x, y)`: half-open containment first,
///    otherwise the display with the highest proximity
///    `1 / (1 + distance)`, ties broken by map iteration order.
/// 4. An empty map resolves nothing.
///
/// Pure over the supplied map; never panics. Callers suppress the signal
/// when attribution returns `None`.
pub fn attribute(signal: &IntentSignal, map: &DisplayMap) -> Option<ScreenId> {
    if let Some(tagged) = signal.screen_id {
        if map.contains(tagged) {
            return Some(tagged);
        }
    }

    if signal.signal_type == SignalType::WindowFocus {
        if let Some(window_display) = signal.window_display_id {
            if map.contains(window_display) {
                return Some(window_display);
            }
        }
    }

    let resolved = map.locate(signal.x, signal.y);
    trace!(
        signal = ?signal.signal_type,
        x = signal.x,
        y = signal.y,
        ?resolved,
        "pointer attribution"
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayBounds;

    fn two_wide() -> DisplayMap {
        DisplayMap::new(vec![
            DisplayBounds::new(ScreenId(1), 0, 0, 1920, 1080),
            DisplayBounds::new(ScreenId(2), 1920, 0, 1920, 1080),
        ])
        .unwrap()
    }

    #[test]
    fn test_trusted_tag_wins_over_position() {
        let map = two_wide();
        // Position is on D1 but the host tagged D2
        let signal = IntentSignal::new(SignalType::Click, 100.0, 100.0, 1000)
            .with_screen(ScreenId(2));
        assert_eq!(attribute(&signal, &map), Some(ScreenId(2)));
    }

    #[test]
    fn test_unknown_tag_falls_back_to_position() {
        let map = two_wide();
        let signal = IntentSignal::new(SignalType::Click, 100.0, 100.0, 1000)
            .with_screen(ScreenId(42));
        assert_eq!(attribute(&signal, &map), Some(ScreenId(1)));
    }

    #[test]
    fn test_window_focus_uses_window_display() {
        let map = two_wide();
        let signal = IntentSignal::new(SignalType::WindowFocus, 100.0, 100.0, 1000)
            .with_window_display(ScreenId(2));
        assert_eq!(attribute(&signal, &map), Some(ScreenId(2)));
    }

    #[test]
    fn test_window_display_ignored_for_other_types() {
        let map = two_wide();
        // Typing carries a window display hint but attribution rule 2 is
        // WindowFocus-only; position decides (the hint still feeds the
        // confidence model).
        let signal = IntentSignal::new(SignalType::Typing, 100.0, 100.0, 1000)
            .with_window_display(ScreenId(2));
        assert_eq!(attribute(&signal, &map), Some(ScreenId(1)));
    }

    #[test]
    fn test_containment_boundary_is_half_open() {
        let map = two_wide();
        let signal = IntentSignal::new(SignalType::Click, 1920.0, 500.0, 1000);
        assert_eq!(attribute(&signal, &map), Some(ScreenId(2)));
    }

    #[test]
    fn test_empty_map_resolves_nothing() {
        let map = DisplayMap::default();
        let signal = IntentSignal::new(SignalType::Click, 100.0, 100.0, 1000);
        assert_eq!(attribute(&signal, &map), None);
    }
}
