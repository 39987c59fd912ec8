//! Game state and core simulation types
//!
//! Everything that must be persisted for snapshots/determinism lives here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};
use crate::consts::*;
use crate::tonegen::Tone;

/// Axis-aligned rectangle, position at top-left
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// Which side of the net a paddle defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A gameplay event that triggers a tone, ordered by priority
///
/// When several events land in the same frame only the highest-priority one
/// is audible, so the variants are ordered lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameEvent {
    /// Ball bounced off the top or bottom field edge
    WallHit,
    /// Ball was returned by a paddle
    PaddleHit,
    /// A paddle let the ball past; a point was scored
    Missed,
}

impl GameEvent {
    /// Tone played when this event fires
    pub fn tone(self) -> Tone {
        match self {
            GameEvent::Missed => Tone::new(240, 510),
            GameEvent::PaddleHit => Tone::new(480, 35),
            GameEvent::WallHit => Tone::new(240, 20),
        }
    }
}

/// A player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    pub rect: Rect,
    /// Current vertical velocity (px/s), signed
    pub velocity: f32,
    pub max_speed: f32,
    pub score: u32,
}

impl Paddle {
    pub fn new(side: Side, config: &Config) -> Self {
        let size = Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT);
        let x = match side {
            Side::Left => PADDLE_MARGIN_X,
            Side::Right => config.field_width - PADDLE_MARGIN_X,
        };
        let y = (config.field_height - size.y) / 2.0;
        Self {
            side,
            rect: Rect::new(Vec2::new(x, y), size),
            velocity: 0.0,
            max_speed: PADDLE_MAX_SPEED,
            score: 0,
        }
    }
}

/// The ball (also used for the ghost's noisy tracking copy)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub rect: Rect,
    pub velocity: Vec2,
    /// False while waiting out the serve delay; position is frozen until then
    pub served: bool,
    /// Absolute simulation time at which the ball goes live
    pub serve_deadline: f64,
    /// Bounce off the left/right field edges too (round-over flourish only)
    pub horizontal_bounce: bool,
}

impl Ball {
    /// Create a fresh ball on the net side of `target`, heading toward it at
    /// a random angle within the serve cone. A full re-creation, never an
    /// in-place adjustment.
    pub fn serve(target: Side, round_over: bool, now: f64, config: &Config, rng: &mut Pcg32) -> Self {
        let size = Vec2::splat(BALL_SIZE);
        let net_offset = match target {
            Side::Left => -2.0 * NET_WIDTH,
            Side::Right => 2.0 * NET_WIDTH,
        };
        let x = (config.field_width - size.x) / 2.0 + net_offset;
        let y = rng.random_range(0.0..=config.field_height - size.y);

        let mut angle = rng.random_range(-1.0..=1.0f32) * SERVE_ANGLE_SPREAD;
        if target == Side::Left {
            angle += std::f32::consts::PI;
        }
        let velocity = Vec2::new(angle.cos(), -angle.sin()) * BALL_SERVE_SPEED;

        // A round-over ball goes live immediately; it only exists to bounce
        // around during the intermission.
        let serve_deadline = if round_over { now } else { now + config.serve_delay };

        Self {
            rect: Rect::new(Vec2::new(x, y), size),
            velocity,
            served: false,
            serve_deadline,
            horizontal_bounce: false,
        }
    }

    /// Copy of `ball` with its speed perturbed along the same heading. The
    /// perturbation range shrinks as sharpness rises, bounding how well a
    /// ghost can ever track the real ball.
    pub fn ghost_of(ball: &Ball, sharpness: f32, rng: &mut Pcg32) -> Self {
        let mut ghost = ball.clone();
        let angle = ball.velocity.y.atan2(ball.velocity.x);
        let mut speed = ball.velocity.length();
        let max_difference = (60.0 * (1.0 - sharpness)).max(20.0);
        speed += rng.random_range(-max_difference..=max_difference);
        ghost.velocity = Vec2::new(angle.cos(), angle.sin()) * speed;
        ghost
    }
}

/// Autoplay controller state for one paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ghost {
    /// Whether the ghost currently owns its paddle
    pub active: bool,
    /// Fraction of the paddle's max speed the ghost is allowed to use
    pub speed_scale: f32,
    /// Per-rally aim offset in [-1, 1], scaled by half the paddle height
    pub bias: f32,
    /// Per-point resting offset from field center while the ball is unserved
    pub idle_offset: f32,
    /// Last computed paddle velocity command
    pub velocity: f32,
}

/// Complete match state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub config: Config,
    /// Indexed by `Side::index()`
    pub paddles: [Paddle; 2],
    pub ghosts: [Ghost; 2],
    /// Ghost difficulty in [0, 1]; ratchets upward across rounds
    pub sharpness: f32,
    pub ball: Ball,
    /// Noisy copy of the ball the ghosts aim at
    pub ghost_ball: Ball,
    /// Monotonic simulation clock in seconds; frozen while paused
    pub time: f64,
    pub paused: bool,
    pub round_over: bool,
    /// Absolute sim time at which a finished round restarts
    pub round_restart_deadline: f64,
    /// Latched once any human input has ever been seen
    pub first_human_input: bool,
    /// Sim time of the last human command per paddle
    pub last_input_time: [f64; 2],
    pending_event: Option<GameEvent>,
}

impl GameState {
    /// New match with the default configuration
    pub fn new(seed: u64) -> Self {
        Self::build(seed, Config::default())
    }

    /// New match with a custom configuration, rejected if invalid
    pub fn with_config(seed: u64, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(seed, config))
    }

    fn build(seed: u64, config: Config) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let sharpness = 1.0;
        let ghosts = [
            Ghost::new(sharpness, &config, &mut rng),
            Ghost::new(sharpness, &config, &mut rng),
        ];
        let first_serve = if rng.random_range(0..2) == 0 {
            Side::Left
        } else {
            Side::Right
        };
        let ball = Ball::serve(first_serve, false, 0.0, &config, &mut rng);
        let ghost_ball = Ball::ghost_of(&ball, sharpness, &mut rng);
        Self {
            seed,
            rng,
            paddles: [Paddle::new(Side::Left, &config), Paddle::new(Side::Right, &config)],
            ghosts,
            sharpness,
            ball,
            ghost_ball,
            time: 0.0,
            paused: false,
            round_over: false,
            round_restart_deadline: 0.0,
            first_human_input: false,
            last_input_time: [0.0; 2],
            pending_event: None,
            config,
        }
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        &self.paddles[side.index()]
    }

    pub fn ghost(&self, side: Side) -> &Ghost {
        &self.ghosts[side.index()]
    }

    pub fn score(&self, side: Side) -> u32 {
        self.paddles[side.index()].score
    }

    // === Presentation-facing accessors (read-only between steps) ===

    pub fn paddle_rect(&self, side: Side) -> Rect {
        self.paddles[side.index()].rect
    }

    /// Paddles are hidden during the end-of-round flourish
    pub fn paddles_visible(&self) -> bool {
        !self.round_over
    }

    pub fn ball_rect(&self) -> Rect {
        self.ball.rect
    }

    /// The ball is only drawn once it has been served
    pub fn ball_visible(&self) -> bool {
        self.ball.served
    }

    /// Tracking ball rectangle, for debug overlays
    pub fn ghost_ball_rect(&self) -> Rect {
        self.ghost_ball.rect
    }

    pub fn round_over(&self) -> bool {
        self.round_over
    }

    /// Record a gameplay event; a lower-priority event never displaces a
    /// higher-priority one already pending this frame.
    pub(crate) fn record_event(&mut self, event: GameEvent) {
        self.pending_event = self.pending_event.max(Some(event));
    }

    /// Drain the pending event. Call exactly once per rendered frame to
    /// drive the tone generator.
    pub fn take_event(&mut self) -> Option<GameEvent> {
        self.pending_event.take()
    }
}
