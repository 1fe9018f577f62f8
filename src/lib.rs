//! Star Racer - A 3D space lane racer
//!
//! Core modules:
//! - `sim`: Simulation core (spawning, movement, collisions, animation, frame scheduling)
//! - `config`: Data-driven game tuning
//! - `scene`: Boundary traits toward the renderer and the hosting UI
//! - `highscores`: Local best-run table

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod config;
pub mod highscores;
pub mod scene;
pub mod sim;

pub use config::{Config, ConfigError, RollAxis, ShipConfig, ShipId};
pub use highscores::HighScores;
pub use scene::{NullScene, ObjectDesc, RenderTarget, SceneHandle, SessionSink, Transform};

use glam::Vec3;

/// Fixed game constants (not data-driven)
pub mod consts {
    /// Frame rate the per-frame tuning values were authored against
    pub const BASELINE_FPS: f32 = 60.0;
    /// Starting (and maximum) health
    pub const MAX_HEALTH: u8 = 3;
    /// Frames the ship blinks after an obstacle hit
    pub const BLINK_FRAMES: u8 = 4;
    /// Engine animation clock speed (per baseline frame)
    pub const ENGINE_CLOCK_RATE: f32 = 5.0;
    /// Flame scale multiplier while boosting
    pub const BOOST_FLAME_INTENSITY: f32 = 1.15;
    /// Flames never grow past this multiple of their base scale
    pub const FLAME_SCALE_CAP: f32 = 1.2;
    /// Side thruster scale while pushing against a turn
    pub const THRUSTER_TURN_SCALE: f32 = 1.3;
    /// Extra spin applied to a cube obstacle's chosen axis (per baseline frame)
    pub const CUBE_SPIN_RATE: f32 = 0.05;
    /// Breathing phase advance for spiky obstacles (per baseline frame)
    pub const SPIKY_PHASE_RATE: f32 = 0.02;
}

/// Convert a frame delta in seconds to baseline frames (1.0 at 60 FPS)
#[inline]
pub fn frame_scale(delta: f32) -> f32 {
    delta * consts::BASELINE_FPS
}

/// Distance between two points projected on the track plane (ignores height)
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}
