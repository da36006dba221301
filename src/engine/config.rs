//! Engine configuration and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signal::SignalType;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A threshold left the unit interval
    #[error("{name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// Switch threshold below stay threshold breaks hysteresis
    #[error("switch_threshold ({switch}) must be >= stay_threshold ({stay})")]
    ThresholdOrder {
        /// Configured switch threshold
        switch: f64,
        /// Configured stay threshold
        stay: f64,
    },

    /// A parameter that must be strictly positive was not
    #[error("{name} must be > 0, got {value}")]
    NotPositive {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },
}

/// Tunable parameters of the focus engine.
///
/// Defaults are authoritative; every field can be overridden from the
/// TOML configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of shared displays
    #[serde(default = "default_max_screens")]
    pub max_screens: usize,

    /// Confidence required to switch to a different display
    #[serde(default = "default_switch_threshold")]
    pub switch_threshold: f64,

    /// Confidence required to refresh the current display
    #[serde(default = "default_stay_threshold")]
    pub stay_threshold: f64,

    /// Window after a switch during which further switches are penalized
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Activity gap after which automatic switching is suppressed
    #[serde(default = "default_idle_ms")]
    pub idle_ms: u64,

    /// Pointer speed below which motion is treated as sensor noise
    #[serde(default = "default_idle_motion")]
    pub idle_motion_px_per_s: f64,

    /// Dwell for click-class signals (click, double-click, drag start)
    #[serde(default = "default_short_dwell_ms")]
    pub click_dwell_ms: u64,

    /// Dwell for typing and window-focus signals
    #[serde(default = "default_short_dwell_ms")]
    pub typing_dwell_ms: u64,

    /// Dwell for scroll and gesture signals
    #[serde(default = "default_short_dwell_ms")]
    pub scroll_dwell_ms: u64,

    /// Dwell for hover signals
    #[serde(default = "default_hover_dwell_ms")]
    pub hover_dwell_ms: u64,

    /// Dwell for pointer movement and anything unclassified
    #[serde(default = "default_movement_dwell_ms")]
    pub movement_dwell_ms: u64,

    /// Pointer speed above which movement is treated as transit
    #[serde(default = "default_movement_speed_high")]
    pub movement_speed_high_px_per_s: f64,

    /// Quiet period after un-freezing before cross-display switches resume
    #[serde(default = "default_resume_grace_ms")]
    pub resume_grace_ms: u64,
}

fn default_max_screens() -> usize {
    3
}
fn default_switch_threshold() -> f64 {
    0.80
}
fn default_stay_threshold() -> f64 {
    0.50
}
fn default_cooldown_ms() -> u64 {
    500
}
fn default_idle_ms() -> u64 {
    2000
}
fn default_idle_motion() -> f64 {
    5.0
}
fn default_short_dwell_ms() -> u64 {
    300
}
fn default_hover_dwell_ms() -> u64 {
    500
}
fn default_movement_dwell_ms() -> u64 {
    800
}
fn default_movement_speed_high() -> f64 {
    1200.0
}
fn default_resume_grace_ms() -> u64 {
    300
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_screens: default_max_screens(),
            switch_threshold: default_switch_threshold(),
            stay_threshold: default_stay_threshold(),
            cooldown_ms: default_cooldown_ms(),
            idle_ms: default_idle_ms(),
            idle_motion_px_per_s: default_idle_motion(),
            click_dwell_ms: default_short_dwell_ms(),
            typing_dwell_ms: default_short_dwell_ms(),
            scroll_dwell_ms: default_short_dwell_ms(),
            hover_dwell_ms: default_hover_dwell_ms(),
            movement_dwell_ms: default_movement_dwell_ms(),
            movement_speed_high_px_per_s: default_movement_speed_high(),
            resume_grace_ms: default_resume_grace_ms(),
        }
    }
}

impl EngineConfig {
    /// Validate parameter ranges.
    ///
    /// Rejected configurations never reach a running engine; the error is
    /// surfaced at construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("switch_threshold", self.switch_threshold),
            ("stay_threshold", self.stay_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }

        if self.switch_threshold < self.stay_threshold {
            return Err(ConfigError::ThresholdOrder {
                switch: self.switch_threshold,
                stay: self.stay_threshold,
            });
        }

        if self.max_screens == 0 {
            return Err(ConfigError::NotPositive {
                name: "max_screens",
                value: 0.0,
            });
        }

        if !(self.movement_speed_high_px_per_s > 0.0) {
            return Err(ConfigError::NotPositive {
                name: "movement_speed_high_px_per_s",
                value: self.movement_speed_high_px_per_s,
            });
        }

        if !(self.idle_motion_px_per_s >= 0.0) {
            return Err(ConfigError::NotPositive {
                name: "idle_motion_px_per_s",
                value: self.idle_motion_px_per_s,
            });
        }

        Ok(())
    }

    /// Minimum candidate tenure before a signal of this kind may switch.
    pub fn dwell_ms(&self, signal_type: SignalType) -> u64 {
        match signal_type {
            SignalType::Manual => 0,
            SignalType::Click | SignalType::DoubleClick | SignalType::DragStart => {
                self.click_dwell_ms
            }
            SignalType::Typing | SignalType::WindowFocus => self.typing_dwell_ms,
            SignalType::Scroll | SignalType::Gesture => self.scroll_dwell_ms,
            SignalType::Hover => self.hover_dwell_ms,
            SignalType::PointerMove | SignalType::DragEnd => self.movement_dwell_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let config = EngineConfig {
            switch_threshold: 0.4,
            stay_threshold: 0.6,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let config = EngineConfig {
            switch_threshold: 1.2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOutOfRange {
                name: "switch_threshold",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_zero_max_screens() {
        let config = EngineConfig {
            max_screens: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dwell_table() {
        let config = EngineConfig::default();
        assert_eq!(config.dwell_ms(SignalType::Manual), 0);
        assert_eq!(config.dwell_ms(SignalType::Click), 300);
        assert_eq!(config.dwell_ms(SignalType::DoubleClick), 300);
        assert_eq!(config.dwell_ms(SignalType::DragStart), 300);
        assert_eq!(config.dwell_ms(SignalType::Typing), 300);
        assert_eq!(config.dwell_ms(SignalType::WindowFocus), 300);
        assert_eq!(config.dwell_ms(SignalType::Scroll), 300);
        assert_eq!(config.dwell_ms(SignalType::Gesture), 300);
        assert_eq!(config.dwell_ms(SignalType::Hover), 500);
        assert_eq!(config.dwell_ms(SignalType::PointerMove), 800);
        // DragEnd is unclassified and inherits the movement dwell
        assert_eq!(config.dwell_ms(SignalType::DragEnd), 800);
    }

    #[test]
    fn test_toml_partial_override() {
        let config: EngineConfig = toml::from_str("cooldown_ms = 750").unwrap();
        assert_eq!(config.cooldown_ms, 750);
        assert_eq!(config.switch_threshold, 0.80);
        assert_eq!(config.hover_dwell_ms, 500);
    }
}
