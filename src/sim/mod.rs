//! Simulation core
//!
//! All gameplay logic lives here. It never touches a renderer or the DOM:
//! - Scene changes go through [`crate::scene::RenderTarget`]
//! - Score/health notifications go through [`crate::scene::SessionSink`]
//! - Randomness comes only from the session's seeded RNG

pub mod animation;
pub mod collision;
pub mod factory;
pub mod movement;
pub mod spawn;
pub mod state;
pub mod tick;

pub use animation::{animate_coins, animate_engine, animate_obstacles, update_animations};
pub use collision::{CollisionOutcome, overlaps, resolve_collisions};
pub use factory::{build_coin, build_obstacle, build_ship, random_obstacle_kind};
pub use movement::integrate_ship;
pub use spawn::{advance, find_coin_spot, prune, reset_state, spawn_coin, spawn_obstacle};
pub use state::{
    BlinkEffect, Coin, EngineFx, GameEvent, GamePhase, InputState, Obstacle, ObstacleAnim,
    ObstacleKind, SessionState, ShipState, SpinAxis,
};
pub use tick::{FrameClock, FrameScheduler, TickReport, clamp_delta, tick};
