//! Conflict resolution for near-simultaneous signals.

use crate::signal::IntentSignal;

/// Reduce a batch of near-simultaneous signals to the single winner.
///
/// Ordering: lower priority number, then higher base confidence, then
/// later timestamp. Stable for equal triples: the earliest such signal
/// in the slice wins.
pub fn resolve(signals: &[IntentSignal]) -> Option<&IntentSignal> {
    let mut winner: Option<&IntentSignal> = None;

    for candidate in signals {
        match winner {
            None => winner = Some(candidate),
            Some(current) => {
                if beats(candidate, current) {
                    winner = Some(candidate);
                }
            }
        }
    }

    winner
}

/// Strict "candidate outranks current" comparison; equality keeps current.
fn beats(candidate: &IntentSignal, current: &IntentSignal) -> bool {
    let cand_prio = candidate.signal_type.priority();
    let curr_prio = current.signal_type.priority();
    if cand_prio != curr_prio {
        return cand_prio < curr_prio;
    }

    let cand_base = candidate.signal_type.base_confidence();
    let curr_base = current.signal_type.base_confidence();
    if cand_base != curr_base {
        return cand_base > curr_base;
    }

    candidate.timestamp_ms > current.timestamp_ms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalType;

    fn sig(t: SignalType, ts: u64) -> IntentSignal {
        IntentSignal::new(t, 0.0, 0.0, ts)
    }

    #[test]
    fn test_empty_batch() {
        assert!(resolve(&[]).is_none());
    }

    #[test]
    fn test_priority_wins() {
        let batch = [
            sig(SignalType::PointerMove, 100),
            sig(SignalType::Click, 50),
            sig(SignalType::Hover, 90),
        ];
        assert_eq!(resolve(&batch).unwrap().signal_type, SignalType::Click);
    }

    #[test]
    fn test_manual_beats_everything() {
        let batch = [
            sig(SignalType::Click, 200),
            sig(SignalType::Manual, 10),
            sig(SignalType::DragStart, 150),
        ];
        assert_eq!(resolve(&batch).unwrap().signal_type, SignalType::Manual);
    }

    #[test]
    fn test_later_timestamp_breaks_tie() {
        let batch = [sig(SignalType::Click, 100), sig(SignalType::Click, 140)];
        assert_eq!(resolve(&batch).unwrap().timestamp_ms, 140);
    }

    #[test]
    fn test_stable_for_equal_triples() {
        let mut first = sig(SignalType::Scroll, 100);
        first.x = 1.0;
        let mut second = sig(SignalType::Scroll, 100);
        second.x = 2.0;

        let batch = [first, second];
        // Equal priority, base confidence, and timestamp: first stays
        assert_eq!(resolve(&batch).unwrap().x, 1.0);
    }
}
