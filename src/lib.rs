//! Pong simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, round state machine, ghost AI)
//! - `tonegen`: Square-wave tone generator fed by gameplay events
//! - `config`: Runtime-tunable match configuration with fail-fast validation
//!
//! Rendering, window management and input-device handling live outside this
//! crate: a frontend feeds `TickInput` and a wall-clock delta into
//! [`sim::advance`], reads rectangles and scores back through the accessors
//! on [`sim::GameState`], and drains [`tonegen::ToneGen`] into its audio sink.

pub mod config;
pub mod sim;
pub mod tonegen;

pub use config::{Config, ConfigError};
pub use sim::{GameEvent, GameState, Side, TickInput};
pub use tonegen::{Tone, ToneGen};

/// Game configuration constants
pub mod consts {
    /// Longest simulation sub-step; frame deltas are subdivided to this cap
    pub const MAX_STEP: f64 = 1.0 / 60.0;

    /// Playing field dimensions (logical pixels)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    /// Width of the center net, used to offset the serve position
    pub const NET_WIDTH: f32 = 5.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 10.0;
    pub const PADDLE_HEIGHT: f32 = 50.0;
    pub const PADDLE_MARGIN_X: f32 = 50.0;
    pub const PADDLE_MAX_SPEED: f32 = 500.0;

    /// Ball defaults
    pub const BALL_SIZE: f32 = 14.0;
    pub const BALL_SERVE_SPEED: f32 = 360.0;
    /// Speed stops incrementing on paddle hits once it reaches this limit
    pub const BALL_SPEED_LIMIT: f32 = 540.0;
    pub const BALL_SPEED_INCREMENT: f32 = 10.0;

    /// Steepest return angle off a paddle face (radians from horizontal)
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_4;
    /// Half-width of the random serve cone (radians)
    pub const SERVE_ANGLE_SPREAD: f32 = std::f32::consts::FRAC_PI_6;
}

/// Sign of `x` as ±1.0, with 0.0 for exact zero
#[inline]
pub fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
