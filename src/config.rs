//! Match configuration
//!
//! Everything here is a programmer-facing tuning knob, not runtime input, so
//! invalid values are rejected up front instead of being clamped silently.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Rejected configuration values
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max score must be at least 1")]
    ZeroMaxScore,
    #[error("field {0}x{1} cannot contain the paddles and ball")]
    DegenerateField(f32, f32),
    #[error("{0} must be positive, got {1}")]
    NonPositiveDuration(&'static str, f64),
    #[error("volume percentage must be within 0..=100, got {0}")]
    VolumeOutOfRange(f32),
}

/// Tunable match parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Playing field dimensions in logical pixels
    pub field_width: f32,
    pub field_height: f32,
    /// Points needed to win a round
    pub max_score: u32,
    /// Seconds between a point and the next serve going live
    pub serve_delay: f64,
    /// Seconds of end-of-round flourish before scores reset
    pub round_over_timeout: f64,
    /// Seconds without human input before a ghost retakes its paddle
    pub ghost_inactivity_timeout: f64,
    /// Tone amplitude as a percentage of full scale
    pub volume_percentage: f32,
    /// Allow `TickInput::award_point` to change the score
    pub cheats_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            max_score: 11,
            serve_delay: 2.0,
            round_over_timeout: 6.0,
            ghost_inactivity_timeout: 10.0,
            volume_percentage: 2.5,
            cheats_enabled: false,
        }
    }
}

impl Config {
    /// Check every invariant the simulation divides or clamps against
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_score == 0 {
            return Err(ConfigError::ZeroMaxScore);
        }
        let fits_paddles = self.field_width > 2.0 * (PADDLE_MARGIN_X + PADDLE_WIDTH)
            && self.field_height > PADDLE_HEIGHT;
        let fits_ball = self.field_width > BALL_SIZE && self.field_height > BALL_SIZE;
        if !fits_paddles || !fits_ball {
            return Err(ConfigError::DegenerateField(
                self.field_width,
                self.field_height,
            ));
        }
        for (name, value) in [
            ("serve delay", self.serve_delay),
            ("round-over timeout", self.round_over_timeout),
            ("ghost inactivity timeout", self.ghost_inactivity_timeout),
        ] {
            if value <= 0.0 || !value.is_finite() {
                return Err(ConfigError::NonPositiveDuration(name, value));
            }
        }
        if !(0.0..=100.0).contains(&self.volume_percentage) {
            return Err(ConfigError::VolumeOutOfRange(self.volume_percentage));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn zero_max_score_rejected() {
        let config = Config {
            max_score: 0,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxScore));
    }

    #[test]
    fn degenerate_field_rejected() {
        let config = Config {
            field_width: 40.0,
            field_height: 30.0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DegenerateField(..))
        ));
    }

    #[test]
    fn non_positive_timeout_rejected() {
        let config = Config {
            round_over_timeout: 0.0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveDuration("round-over timeout", _))
        ));
    }

    #[test]
    fn volume_out_of_range_rejected() {
        let config = Config {
            volume_percentage: 120.0,
            ..Config::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::VolumeOutOfRange(120.0))
        );
    }
}
