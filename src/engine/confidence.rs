//! Confidence model: base table plus ordered additive modifiers.

use crate::display::ScreenId;
use crate::engine::EngineConfig;
use crate::signal::IntentSignal;

/// Bonus when the OS-reported window display corroborates the candidate
pub(crate) const CORROBORATION_BONUS: f64 = 0.05;

/// Bonus once the candidate has been sustained long enough
pub(crate) const SUSTAINED_BONUS: f64 = 0.05;

/// Candidate tenure required before the sustained bonus applies (ms)
pub(crate) const SUSTAINED_CANDIDATE_MS: u64 = 1000;

/// Penalty for pointer movement above the transit speed
pub(crate) const TRANSIT_PENALTY: f64 = 0.10;

/// Penalty applied to cross-display evidence inside the cooldown window.
///
/// The same 0.15 is subtracted again by the pipeline's cooldown step;
/// the stacking is intended, so a cross-display click inside cooldown
/// lands at 0.65 and cannot clear the 0.80 switch threshold.
pub(crate) const COOLDOWN_PENALTY: f64 = 0.15;

/// Engine state the confidence model reads, frozen at scoring time.
pub(crate) struct ScoreContext {
    /// Currently active display
    pub active: Option<ScreenId>,
    /// Current candidate display (before this signal updates it)
    pub candidate: Option<ScreenId>,
    /// When the candidate was established (ms)
    pub candidate_since_ts: u64,
    /// When the last switch happened (ms)
    pub last_switch_ts: u64,
}

/// Score a signal for the attributed candidate display.
///
/// Modifiers apply in a fixed order on top of the base table, and the
/// result is clamped to `[0, 1]`.
pub(crate) fn score(
    signal: &IntentSignal,
    cand: ScreenId,
    ctx: &ScoreContext,
    config: &EngineConfig,
) -> f64 {
    let now = signal.timestamp_ms;
    let mut conf = signal.signal_type.base_confidence();

    if signal.window_display_id == Some(cand) {
        conf += CORROBORATION_BONUS;
    }

    if ctx.candidate == Some(cand)
        && now.saturating_sub(ctx.candidate_since_ts) >= SUSTAINED_CANDIDATE_MS
    {
        conf += SUSTAINED_BONUS;
    }

    if let Some(speed) = signal.speed_px_per_s {
        if signal.signal_type == crate::signal::SignalType::PointerMove
            && speed > config.movement_speed_high_px_per_s
        {
            conf -= TRANSIT_PENALTY;
        }
    }

    if ctx.active != Some(cand) && now.saturating_sub(ctx.last_switch_ts) <= config.cooldown_ms {
        conf -= COOLDOWN_PENALTY;
    }

    conf.clamp(0.0, 1.0)
}

/// Round to the two decimals carried by emitted events.
pub(crate) fn round(confidence: f64) -> f64 {
    (confidence * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalType;

    fn ctx() -> ScoreContext {
        ScoreContext {
            active: Some(ScreenId(1)),
            candidate: None,
            candidate_since_ts: 0,
            last_switch_ts: 0,
        }
    }

    #[test]
    fn test_base_only() {
        let signal = IntentSignal::new(SignalType::Click, 0.0, 0.0, 5000);
        assert_eq!(
            score(&signal, ScreenId(1), &ctx(), &EngineConfig::default()),
            0.95
        );
    }

    #[test]
    fn test_window_corroboration_bonus() {
        let signal = IntentSignal::new(SignalType::Typing, 0.0, 0.0, 5000)
            .with_window_display(ScreenId(1));
        let conf = score(&signal, ScreenId(1), &ctx(), &EngineConfig::default());
        assert!((conf - 0.95).abs() < 1e-9, "0.90 + 0.05 corroboration, got {conf}");
    }

    #[test]
    fn test_sustained_candidate_bonus() {
        let mut context = ctx();
        context.candidate = Some(ScreenId(2));
        context.candidate_since_ts = 1000;

        let early = IntentSignal::new(SignalType::Hover, 0.0, 0.0, 1400);
        assert_eq!(
            score(&early, ScreenId(2), &context, &EngineConfig::default()),
            0.70,
            "candidate held 400ms earns no bonus"
        );

        let sustained = IntentSignal::new(SignalType::Hover, 0.0, 0.0, 2000);
        let conf = score(&sustained, ScreenId(2), &context, &EngineConfig::default());
        assert!(
            (conf - 0.75).abs() < 1e-9,
            "candidate held 1000ms earns the bonus, got {conf}"
        );
    }

    #[test]
    fn test_transit_penalty() {
        let signal = IntentSignal::new(SignalType::PointerMove, 0.0, 0.0, 5000).with_speed(2000.0);
        let conf = score(&signal, ScreenId(1), &ctx(), &EngineConfig::default());
        assert!((conf - 0.30).abs() < 1e-9);
    }

    #[test]
    fn test_slow_movement_keeps_base() {
        let signal = IntentSignal::new(SignalType::PointerMove, 0.0, 0.0, 5000).with_speed(300.0);
        assert_eq!(
            score(&signal, ScreenId(1), &ctx(), &EngineConfig::default()),
            0.40
        );
    }

    #[test]
    fn test_cross_display_cooldown_penalty_is_inclusive() {
        let mut context = ctx();
        context.last_switch_ts = 1000;

        // Exactly cooldown_ms after the switch: still penalized
        let signal = IntentSignal::new(SignalType::Click, 0.0, 0.0, 1500);
        let conf = score(&signal, ScreenId(2), &context, &EngineConfig::default());
        assert!((conf - 0.80).abs() < 1e-9);

        // One ms later: clean
        let signal = IntentSignal::new(SignalType::Click, 0.0, 0.0, 1501);
        assert_eq!(score(&signal, ScreenId(2), &context, &EngineConfig::default()), 0.95);
    }

    #[test]
    fn test_same_display_escapes_cooldown_modifier() {
        let mut context = ctx();
        context.last_switch_ts = 1000;

        let signal = IntentSignal::new(SignalType::Click, 0.0, 0.0, 1100);
        assert_eq!(score(&signal, ScreenId(1), &context, &EngineConfig::default()), 0.95);
    }

    #[test]
    fn test_clamped_to_unit_interval() {
        let mut context = ctx();
        context.last_switch_ts = 1000;

        let signal = IntentSignal::new(SignalType::PointerMove, 0.0, 0.0, 1100).with_speed(5000.0);
        let conf = score(&signal, ScreenId(2), &context, &EngineConfig::default());
        assert!((0.0..=1.0).contains(&conf));
        assert!((conf - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_round_two_decimals() {
        assert_eq!(round(0.6499999), 0.65);
        assert_eq!(round(0.875), 0.88);
        assert_eq!(round(1.0), 1.0);
    }
}
