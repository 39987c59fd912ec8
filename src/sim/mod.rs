//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod ghost;
pub mod physics;
pub mod state;
pub mod tick;

pub use ghost::ratchet_sharpness;
pub use physics::{bounce_ball_off_paddle, paddle_intersects_ball, update_ball, update_paddle};
pub use state::{Ball, GameEvent, GameState, Ghost, Paddle, Rect, Side};
pub use tick::{TickInput, advance, tick};
