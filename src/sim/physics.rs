//! Kinematic updates and paddle-ball collision resolution
//!
//! All functions are pure over the passed state: position integration with
//! explicit clamping, the net-facing half-width intersection test, and the
//! angle-based bounce that gives returns their spin-free arcade feel.

use glam::Vec2;

use super::state::{Ball, Paddle, Side};
use crate::consts::*;

/// Integrate paddle position and clamp it to the field
pub fn update_paddle(paddle: &mut Paddle, dt: f32, field_height: f32) {
    paddle.rect.pos.y += paddle.velocity * dt;
    paddle.rect.pos.y = paddle
        .rect
        .pos
        .y
        .clamp(0.0, field_height - paddle.rect.size.y);
}

/// Advance the ball by one sub-step.
///
/// Unserved balls hold position until the serve deadline passes. The ball
/// always bounces off the top/bottom edges; it only bounces off the
/// left/right edges when `horizontal_bounce` is set (round-over flourish).
/// Returns whether a top/bottom bounce occurred this step.
pub fn update_ball(ball: &mut Ball, dt: f32, now: f64, field: Vec2) -> bool {
    if ball.served {
        ball.rect.pos += ball.velocity * dt;
    } else if now >= ball.serve_deadline {
        ball.served = true;
    }

    let mut wall_bounce = false;
    if ball.rect.pos.y < 0.0 || ball.rect.bottom() > field.y {
        ball.velocity.y = -ball.velocity.y;
        ball.rect.pos.y = ball.rect.pos.y.clamp(0.0, field.y - ball.rect.size.y);
        wall_bounce = true;
    }

    if ball.horizontal_bounce && (ball.rect.pos.x < 0.0 || ball.rect.right() > field.x) {
        ball.velocity.x = -ball.velocity.x;
        ball.rect.pos.x = ball.rect.pos.x.clamp(0.0, field.x - ball.rect.size.x);
    }

    wall_bounce
}

/// Overlap test restricted to the half of the paddle facing the net, so a
/// ball clipping the back of the paddle doesn't count as a return.
pub fn paddle_intersects_ball(paddle: &Paddle, ball: &Ball) -> bool {
    let y_overlap =
        paddle.rect.pos.y < ball.rect.bottom() && paddle.rect.bottom() > ball.rect.pos.y;
    let half_width = paddle.rect.size.x / 2.0;
    match paddle.side {
        Side::Left => {
            paddle.rect.pos.x + half_width < ball.rect.right()
                && paddle.rect.right() > ball.rect.pos.x
                && y_overlap
        }
        Side::Right => {
            paddle.rect.pos.x < ball.rect.right()
                && paddle.rect.pos.x + half_width > ball.rect.pos.x
                && y_overlap
        }
    }
}

/// Resolve a paddle hit: the return angle scales with how far off-center the
/// ball struck, up to `MAX_BOUNCE_ANGLE`; speed picks up a fixed increment
/// until the limit; the ball is repositioned flush against the paddle face
/// so it can't stick or tunnel.
pub fn bounce_ball_off_paddle(ball: &mut Ball, paddle: &Paddle) {
    let intersect = paddle.rect.center().y - ball.rect.center().y;
    let mut bounce_angle = (intersect / (paddle.rect.size.y / 2.0)) * MAX_BOUNCE_ANGLE;

    let mut speed = ball.velocity.length();
    if speed < BALL_SPEED_LIMIT {
        speed += BALL_SPEED_INCREMENT;
    }

    match paddle.side {
        Side::Left => {
            ball.rect.pos.x = paddle.rect.right();
        }
        Side::Right => {
            ball.rect.pos.x = paddle.rect.pos.x - ball.rect.size.x;
            // Mirror so the return heads back across the net.
            bounce_angle = std::f32::consts::PI - bounce_angle;
        }
    }

    ball.velocity = Vec2::new(bounce_angle.cos(), -bounce_angle.sin()) * speed;
}
