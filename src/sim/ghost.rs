//! Ghost autoplay controller
//!
//! Stands in for an idle player. The ghost aims at the noisy ghost ball, not
//! the real one, and its commanded speed is shaped by three damping factors
//! so it reads as a person tracking the ball rather than a servo locked onto
//! it. It yields its paddle the instant real input shows up.

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Ball, Ghost, Paddle, Side};
use crate::config::Config;
use crate::sign;

/// Sharpness increment applied when a round outcome earns a ratchet
const SHARPNESS_STEP: f32 = 0.2;

impl Ghost {
    pub(crate) fn new(sharpness: f32, config: &Config, rng: &mut Pcg32) -> Self {
        let mut ghost = Self {
            active: true,
            speed_scale: 0.0,
            bias: 0.0,
            idle_offset: 0.0,
            velocity: 0.0,
        };
        ghost.rescale_speed(sharpness);
        ghost.rerandomize_bias(rng);
        ghost.rerandomize_idle_offset(config, rng);
        ghost
    }

    /// Derive the usable fraction of paddle speed from global sharpness
    pub fn rescale_speed(&mut self, sharpness: f32) {
        self.speed_scale = (0.70 + sharpness * 0.25).min(0.95);
    }

    /// New per-rally aim offset, so returns don't always come off dead center
    pub(crate) fn rerandomize_bias(&mut self, rng: &mut Pcg32) {
        self.bias = rng.random_range(-1.0..=1.0);
    }

    /// New per-point resting spot for the serve wait
    pub(crate) fn rerandomize_idle_offset(&mut self, config: &Config, rng: &mut Pcg32) {
        let max_distance = config.field_height / 8.0;
        self.idle_offset = rng.random_range(-max_distance..=max_distance);
    }

    /// Compute this sub-step's velocity command from the tracked ball.
    /// Does nothing while inactive; the paddle belongs to the player then.
    pub fn track(&mut self, paddle: &Paddle, ball: &Ball, config: &Config) {
        if !self.active {
            return;
        }

        let mut target = (config.field_height - paddle.rect.size.y) / 2.0 + self.idle_offset;
        if ball.served {
            let bias = (paddle.rect.size.y / 2.0) * self.bias;
            target = ball.rect.pos.y - (paddle.rect.size.y - ball.rect.size.y) / 2.0 + bias;
        }

        // React less urgently the farther away the ball is horizontally.
        let ball_distance = (ball.rect.pos.x - paddle.rect.pos.x).abs();
        let cutoff = config.field_width / 1.1;
        let ball_dist_factor = 1.0 - ball_distance.min(cutoff) / cutoff;

        // Ease in near the target to avoid jitter and overshoot.
        let target_distance = (target - paddle.rect.pos.y).abs();
        let cutoff = paddle.rect.size.y / 2.0;
        let target_dist_factor = target_distance.min(cutoff) / cutoff;

        // The tracked ball teleports when it is remade off a paddle hit;
        // halving the response while it moves away smooths that jump out.
        let moving_away = match paddle.side {
            Side::Left => ball.velocity.x > 0.0,
            Side::Right => ball.velocity.x < 0.0,
        };
        let ball_dir_factor = if moving_away { 0.5 } else { 1.0 };

        let speed = paddle.max_speed
            * self.speed_scale
            * ball_dist_factor
            * target_dist_factor
            * ball_dir_factor;
        self.velocity = sign(target - paddle.rect.pos.y) * speed;
    }
}

/// Post-round difficulty hook: sharpness only ratchets upward, and only when
/// a human won the round or two ghosts played each other. A ghost beating a
/// human never raises it, so lucky human losses don't inflate difficulty.
pub fn ratchet_sharpness(sharpness: f32, winner_is_human: bool, loser_is_human: bool) -> f32 {
    if winner_is_human || (!winner_is_human && !loser_is_human) {
        (sharpness + SHARPNESS_STEP).min(1.0)
    } else {
        sharpness
    }
}
