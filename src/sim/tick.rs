//! Fixed timestep simulation tick
//!
//! `tick` advances the match by one sub-step; `advance` subdivides an
//! arbitrary frame delta into sub-steps no longer than `MAX_STEP` so the
//! physics behaves identically whether the host renders at 30, 60 or 240 Hz.

use rand::Rng;

use super::ghost::ratchet_sharpness;
use super::physics::{bounce_ball_off_paddle, paddle_intersects_ball, update_ball, update_paddle};
use super::state::{Ball, GameEvent, GameState, Side};
use crate::consts::MAX_STEP;

/// Input commands for a single frame (deterministic)
///
/// `pause`, `restart` and `award_point` are one-shot edges: when a frame is
/// subdivided they apply to the first sub-step only.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Requested paddle velocity per side (px/s, clamped to the paddle's max).
    /// `None` means no human is touching that paddle this frame; a nonzero
    /// value evicts the ghost from it.
    pub paddle_velocity: [Option<f32>; 2],
    /// Toggle pause
    pub pause: bool,
    /// Reset scores and serve a fresh ball
    pub restart: bool,
    /// Grant a point to this side (ignored unless cheats are enabled)
    pub award_point: Option<Side>,
}

/// Advance the match by one frame's worth of wall-clock time.
///
/// The delta is cut into sub-steps of at most `MAX_STEP` seconds, so a long
/// stall (a dragged window, a background tab) replays as many ordinary steps
/// instead of one giant unstable one. One-shot inputs fire on the first
/// sub-step only.
pub fn advance(state: &mut GameState, input: &TickInput, frame_dt: f64) {
    let mut input = input.clone();
    let mut remaining = frame_dt.max(0.0);
    loop {
        let step = remaining.min(MAX_STEP);
        tick(state, &input, step as f32);
        input.pause = false;
        input.restart = false;
        input.award_point = None;
        remaining -= step;
        if remaining <= 0.0 {
            break;
        }
    }
}

/// Advance the game state by one fixed sub-step
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        state.paused = !state.paused;
    }
    if state.paused {
        return;
    }
    if input.restart {
        restart_match(state);
    }

    state.time += dt as f64;

    if state.config.cheats_enabled
        && let Some(side) = input.award_point
    {
        award_point(state, side);
    }

    resolve_paddle_controls(state, input);
    for paddle in &mut state.paddles {
        update_paddle(paddle, dt, state.config.field_height);
    }

    let field = glam::Vec2::new(state.config.field_width, state.config.field_height);
    let wall_bounce = update_ball(&mut state.ball, dt, state.time, field);
    if wall_bounce && !state.round_over {
        state.record_event(GameEvent::WallHit);
    }
    update_ball(&mut state.ghost_ball, dt, state.time, field);

    check_paddle_missed_ball(state);
    check_paddle_hit_ball(state);
    check_round_over(state);
    check_round_restart(state);
}

/// Route each paddle to its human or its ghost for this sub-step
fn resolve_paddle_controls(state: &mut GameState, input: &TickInput) {
    for side in Side::BOTH {
        let i = side.index();

        if let Some(velocity) = input.paddle_velocity[i]
            && velocity != 0.0
        {
            state.last_input_time[i] = state.time;
            if state.ghosts[i].active {
                log::debug!("{side:?} paddle taken over by player");
                state.ghosts[i].active = false;
            }
            // The demo plays itself at full sharpness; the first real player
            // gets a fresh ramp from the bottom.
            if !state.first_human_input {
                state.first_human_input = true;
                state.sharpness = 0.0;
                for ghost in &mut state.ghosts {
                    ghost.rescale_speed(0.0);
                }
            }
        }

        // Idle paddles revert to their ghost after the inactivity window.
        if !state.ghosts[i].active
            && state.time >= state.last_input_time[i] + state.config.ghost_inactivity_timeout
        {
            log::debug!("{side:?} paddle idle, ghost resumes");
            state.ghosts[i].active = true;
        }

        state.ghosts[i].track(&state.paddles[i], &state.ghost_ball, &state.config);

        state.paddles[i].velocity = if state.ghosts[i].active {
            state.ghosts[i].velocity
        } else {
            let max = state.paddles[i].max_speed;
            input.paddle_velocity[i].unwrap_or(0.0).clamp(-max, max)
        };
    }
}

/// Score against `loser` and serve the next ball toward them.
///
/// The round-winning point gets no score tone and no loser-directed serve;
/// `check_round_over` takes it from there with the flourish ball.
fn score_point(state: &mut GameState, loser: Side) {
    let winner = loser.opposite();
    state.paddles[winner.index()].score += 1;
    if state.paddles[winner.index()].score >= state.config.max_score {
        return;
    }
    state.record_event(GameEvent::Missed);
    serve_next_ball(state, loser, false);
    for ghost in &mut state.ghosts {
        ghost.rerandomize_idle_offset(&state.config, &mut state.rng);
    }
}

fn award_point(state: &mut GameState, side: Side) {
    if !state.round_over {
        score_point(state, side.opposite());
    }
}

/// Replace both balls: the real serve and the ghosts' noisy copy of it
fn serve_next_ball(state: &mut GameState, target: Side, round_over: bool) {
    let mut ball = Ball::serve(target, round_over, state.time, &state.config, &mut state.rng);
    ball.horizontal_bounce = round_over;
    state.ghost_ball = Ball::ghost_of(&ball, state.sharpness, &mut state.rng);
    state.ball = ball;
}

fn check_paddle_missed_ball(state: &mut GameState) {
    if state.round_over || !state.ball.served {
        return;
    }
    if state.ball.rect.right() < 0.0 {
        score_point(state, Side::Left);
    } else if state.ball.rect.pos.x > state.config.field_width {
        score_point(state, Side::Right);
    }
}

fn check_paddle_hit_ball(state: &mut GameState) {
    if state.round_over || !state.ball.served {
        return;
    }
    for side in Side::BOTH {
        let toward_paddle = match side {
            Side::Left => state.ball.velocity.x < 0.0,
            Side::Right => state.ball.velocity.x > 0.0,
        };
        if toward_paddle && paddle_intersects_ball(&state.paddles[side.index()], &state.ball) {
            bounce_ball_off_paddle(&mut state.ball, &state.paddles[side.index()]);
            state.record_event(GameEvent::PaddleHit);
            // New heading means a new noisy copy for the ghosts to chase,
            // and a fresh aim offset for the defender's return.
            state.ghost_ball = Ball::ghost_of(&state.ball, state.sharpness, &mut state.rng);
            state.ghosts[side.opposite().index()].rerandomize_bias(&mut state.rng);
            return;
        }
    }
}

fn check_round_over(state: &mut GameState) {
    if state.round_over {
        return;
    }
    let Some(winner) = Side::BOTH
        .into_iter()
        .find(|side| state.score(*side) >= state.config.max_score)
    else {
        return;
    };
    log::debug!(
        "round over, {winner:?} wins {}-{}",
        state.score(winner),
        state.score(winner.opposite())
    );
    state.round_over = true;
    state.round_restart_deadline = state.time + state.config.round_over_timeout;
    // Intermission flourish: a live ball caroming off every edge.
    serve_next_ball(state, winner, true);
}

fn check_round_restart(state: &mut GameState) {
    if !state.round_over || state.time < state.round_restart_deadline {
        return;
    }
    let winner = if state.score(Side::Left) >= state.score(Side::Right) {
        Side::Left
    } else {
        Side::Right
    };
    let winner_is_human = !state.ghosts[winner.index()].active;
    let loser_is_human = !state.ghosts[winner.opposite().index()].active;
    let sharpness = ratchet_sharpness(state.sharpness, winner_is_human, loser_is_human);
    if sharpness != state.sharpness {
        log::debug!("ghost sharpness {} -> {sharpness}", state.sharpness);
        state.sharpness = sharpness;
    }
    restart_match(state);
}

/// Zero the scores and serve fresh; sharpness carries over
fn restart_match(state: &mut GameState) {
    state.round_over = false;
    for paddle in &mut state.paddles {
        paddle.score = 0;
    }
    for ghost in &mut state.ghosts {
        ghost.rescale_speed(state.sharpness);
        ghost.rerandomize_idle_offset(&state.config, &mut state.rng);
        ghost.rerandomize_bias(&mut state.rng);
    }
    let target = if state.rng.random_range(0..2) == 0 {
        Side::Left
    } else {
        Side::Right
    };
    serve_next_ball(state, target, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::consts::*;

    fn cheat_state(seed: u64) -> GameState {
        let config = Config {
            cheats_enabled: true,
            ..Config::default()
        };
        GameState::with_config(seed, config).unwrap()
    }

    fn step_frames(state: &mut GameState, input: &TickInput, frames: usize) {
        for _ in 0..frames {
            advance(state, input, MAX_STEP);
        }
    }

    #[test]
    fn subdividing_a_stall_matches_steady_frames() {
        let mut stalled = GameState::new(77);
        let mut steady = GameState::new(77);

        advance(&mut stalled, &TickInput::default(), 5.0);
        step_frames(&mut steady, &TickInput::default(), 300);

        assert_eq!(stalled.ball.rect.pos, steady.ball.rect.pos);
        assert_eq!(stalled.ghost_ball.rect.pos, steady.ghost_ball.rect.pos);
        assert_eq!(
            stalled.paddle_rect(Side::Left),
            steady.paddle_rect(Side::Left)
        );
        assert_eq!(stalled.score(Side::Left), steady.score(Side::Left));
        assert_eq!(stalled.score(Side::Right), steady.score(Side::Right));
        assert!((stalled.time - steady.time).abs() < 1e-9);
    }

    #[test]
    fn identical_seeds_stay_in_lockstep() {
        let mut a = GameState::new(11);
        let mut b = GameState::new(11);
        step_frames(&mut a, &TickInput::default(), 600);
        step_frames(&mut b, &TickInput::default(), 600);
        assert_eq!(a.ball.rect.pos, b.ball.rect.pos);
        assert_eq!(a.sharpness, b.sharpness);
        assert_eq!(a.score(Side::Left), b.score(Side::Left));
        assert_eq!(a.score(Side::Right), b.score(Side::Right));
    }

    #[test]
    fn pause_freezes_the_clock() {
        let mut state = GameState::new(3);
        step_frames(&mut state, &TickInput::default(), 10);
        let frozen_time = state.time;
        let frozen_ball = state.ball_rect();

        let pause = TickInput {
            pause: true,
            ..TickInput::default()
        };
        advance(&mut state, &pause, MAX_STEP);
        step_frames(&mut state, &TickInput::default(), 120);
        assert_eq!(state.time, frozen_time);
        assert_eq!(state.ball_rect(), frozen_ball);

        advance(&mut state, &pause, MAX_STEP);
        step_frames(&mut state, &TickInput::default(), 1);
        assert!(state.time > frozen_time);
    }

    #[test]
    fn human_input_evicts_ghost_and_resets_sharpness() {
        let mut state = GameState::new(21);
        assert!(state.ghost(Side::Left).active);
        assert_eq!(state.sharpness, 1.0);

        let input = TickInput {
            paddle_velocity: [Some(-200.0), None],
            ..TickInput::default()
        };
        advance(&mut state, &input, MAX_STEP);
        assert!(!state.ghost(Side::Left).active);
        assert!(state.ghost(Side::Right).active);
        assert_eq!(state.sharpness, 0.0);
        assert!((state.ghost(Side::Right).speed_scale - 0.70).abs() < 1e-6);
    }

    #[test]
    fn ghost_reclaims_idle_paddle_after_timeout() {
        let mut state = GameState::new(21);
        let input = TickInput {
            paddle_velocity: [Some(-200.0), None],
            ..TickInput::default()
        };
        advance(&mut state, &input, MAX_STEP);
        assert!(!state.ghost(Side::Left).active);

        // Just under the inactivity window: still the player's paddle.
        advance(&mut state, &TickInput::default(), 9.5);
        assert!(!state.ghost(Side::Left).active);

        advance(&mut state, &TickInput::default(), 1.0);
        assert!(state.ghost(Side::Left).active);
    }

    #[test]
    fn pause_does_not_age_the_ghost_timeout() {
        let mut state = GameState::new(33);
        let input = TickInput {
            paddle_velocity: [Some(150.0), None],
            ..TickInput::default()
        };
        advance(&mut state, &input, MAX_STEP);
        assert!(!state.ghost(Side::Left).active);

        // Three times the inactivity window passes on the wall clock, all of
        // it paused: the ghost must not reclaim the paddle.
        let pause = TickInput {
            pause: true,
            ..TickInput::default()
        };
        advance(&mut state, &pause, MAX_STEP);
        advance(&mut state, &TickInput::default(), 30.0);
        advance(&mut state, &pause, MAX_STEP);
        assert!(!state.ghost(Side::Left).active);

        // Unpaused sim time still ages it out.
        advance(&mut state, &TickInput::default(), 11.0);
        assert!(state.ghost(Side::Left).active);
    }

    #[test]
    fn zero_velocity_input_does_not_evict_ghost() {
        let mut state = GameState::new(21);
        let input = TickInput {
            paddle_velocity: [Some(0.0), Some(0.0)],
            ..TickInput::default()
        };
        step_frames(&mut state, &input, 30);
        assert!(state.ghost(Side::Left).active);
        assert!(state.ghost(Side::Right).active);
    }

    #[test]
    fn award_point_requires_cheats() {
        let mut honest = GameState::new(4);
        let cheat = TickInput {
            award_point: Some(Side::Left),
            ..TickInput::default()
        };
        advance(&mut honest, &cheat, MAX_STEP);
        assert_eq!(honest.score(Side::Left), 0);

        let mut rigged = cheat_state(4);
        advance(&mut rigged, &cheat, MAX_STEP);
        assert_eq!(rigged.score(Side::Left), 1);
        assert_eq!(rigged.take_event(), Some(GameEvent::Missed));
    }

    #[test]
    fn round_winning_point_skips_the_score_tone() {
        let mut state = GameState::new(6);
        state.paddles[Side::Left.index()].score = state.config.max_score - 1;
        // Match point: ball fully past the right edge, already served.
        state.ball.served = true;
        state.ball.rect.pos.x = state.config.field_width + state.ball.rect.size.x;
        state.ball.velocity = glam::Vec2::new(300.0, 0.0);
        advance(&mut state, &TickInput::default(), MAX_STEP);

        assert!(state.round_over());
        assert_eq!(state.score(Side::Left), state.config.max_score);
        // Straight into the intermission, no 510 ms score tone first.
        assert_eq!(state.take_event(), None);
        assert!(state.ball.horizontal_bounce);
    }

    #[test]
    fn round_lifecycle_scores_flourish_reset() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut state = cheat_state(8);
        let cheat = TickInput {
            award_point: Some(Side::Left),
            ..TickInput::default()
        };
        for _ in 0..state.config.max_score {
            advance(&mut state, &cheat, MAX_STEP);
        }

        assert!(state.round_over());
        assert!(!state.paddles_visible());
        assert_eq!(state.score(Side::Left), state.config.max_score);
        // Flourish ball goes live immediately and bounces off every edge.
        assert!(state.ball.horizontal_bounce);

        // Scores hold through the intermission.
        advance(&mut state, &TickInput::default(), 3.0);
        assert!(state.round_over());
        assert_eq!(state.score(Side::Left), state.config.max_score);

        advance(&mut state, &TickInput::default(), 4.0);
        assert!(!state.round_over());
        assert!(state.paddles_visible());
        assert_eq!(state.score(Side::Left), 0);
        assert_eq!(state.score(Side::Right), 0);
        assert!(!state.ball.horizontal_bounce);
    }

    #[test]
    fn ghost_round_ratchets_sharpness() {
        let mut state = cheat_state(8);
        state.sharpness = 0.0;
        for ghost in &mut state.ghosts {
            ghost.rescale_speed(0.0);
        }
        let cheat = TickInput {
            award_point: Some(Side::Right),
            ..TickInput::default()
        };
        for _ in 0..state.config.max_score {
            advance(&mut state, &cheat, MAX_STEP);
        }
        advance(&mut state, &TickInput::default(), 7.0);
        assert!(!state.round_over());
        // Both paddles were ghost-held, so the difficulty steps up.
        assert!((state.sharpness - 0.2).abs() < 1e-6);
    }

    #[test]
    fn scores_never_decrease_within_a_round() {
        let mut state = GameState::new(99);
        let mut last = (0, 0);
        for _ in 0..(60 * 60) {
            advance(&mut state, &TickInput::default(), MAX_STEP);
            let now = (state.score(Side::Left), state.score(Side::Right));
            let reset = now == (0, 0);
            assert!(
                reset || (now.0 >= last.0 && now.1 >= last.1),
                "scores went backward: {last:?} -> {now:?}"
            );
            last = now;
        }
    }

    #[test]
    fn restart_zeroes_scores_mid_round() {
        let mut state = cheat_state(15);
        let cheat = TickInput {
            award_point: Some(Side::Right),
            ..TickInput::default()
        };
        step_frames(&mut state, &cheat, 3);
        assert_eq!(state.score(Side::Right), 3);

        let restart = TickInput {
            restart: true,
            ..TickInput::default()
        };
        advance(&mut state, &restart, MAX_STEP);
        assert_eq!(state.score(Side::Left), 0);
        assert_eq!(state.score(Side::Right), 0);
        assert!(!state.round_over());
    }

    #[test]
    fn miss_scores_and_serves_toward_the_loser() {
        let mut state = GameState::new(1);
        // Force a miss: ball fully past the left edge, already served.
        state.ball.served = true;
        state.ball.rect.pos.x = -2.0 * state.ball.rect.size.x;
        state.ball.velocity = glam::Vec2::new(-300.0, 0.0);
        advance(&mut state, &TickInput::default(), MAX_STEP);

        assert_eq!(state.score(Side::Right), 1);
        assert_eq!(state.score(Side::Left), 0);
        assert_eq!(state.take_event(), Some(GameEvent::Missed));
        // Next serve targets the side that just lost the point.
        assert!(state.ball.rect.center().x < state.config.field_width / 2.0);
        assert!(state.ball.velocity.x < 0.0);
        assert!(!state.ball.served);
    }

    #[test]
    fn paddle_return_raises_event_and_remakes_ghost_ball() {
        let mut state = GameState::new(2);
        let paddle = state.paddle_rect(Side::Left);
        state.ball.served = true;
        state.ball.rect.pos = glam::Vec2::new(paddle.right() - 1.0, paddle.pos.y);
        state.ball.velocity = glam::Vec2::new(-300.0, 0.0);
        let old_ghost_ball = state.ghost_ball.rect.pos;

        advance(&mut state, &TickInput::default(), MAX_STEP);
        assert!(
            state.ball.velocity.x > 0.0,
            "return heads back across the net"
        );
        assert_eq!(state.take_event(), Some(GameEvent::PaddleHit));
        assert_ne!(state.ghost_ball.rect.pos, old_ghost_ball);
    }

    #[test]
    fn missed_tone_outranks_wall_hit_in_one_frame() {
        let mut state = GameState::new(5);
        // Ball exits left while also clipping the top edge this frame.
        state.ball.served = true;
        state.ball.rect.pos = glam::Vec2::new(-2.0 * BALL_SIZE, -1.0);
        state.ball.velocity = glam::Vec2::new(-300.0, -300.0);
        advance(&mut state, &TickInput::default(), MAX_STEP);
        assert_eq!(state.take_event(), Some(GameEvent::Missed));
    }
}
