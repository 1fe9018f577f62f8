//! Spatial object factory
//!
//! Builds fully initialized ships, obstacles and coins. Construction never
//! touches the scene; adding the result is the caller's job.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use super::state::{Coin, EngineFx, Obstacle, ObstacleAnim, ObstacleKind, ShipState, SpinAxis};
use crate::config::{Config, ShipId};

/// Pick one of the obstacle kinds uniformly
pub fn random_obstacle_kind<R: Rng + ?Sized>(rng: &mut R) -> ObstacleKind {
    ObstacleKind::ALL[rng.random_range(0..ObstacleKind::ALL.len())]
}

/// Build an obstacle of the given kind at `position`
pub fn build_obstacle<R: Rng + ?Sized>(
    id: u32,
    kind: ObstacleKind,
    position: Vec3,
    config: &Config,
    rng: &mut R,
) -> Obstacle {
    debug_assert!(position.is_finite(), "obstacle position must be finite");

    let (rotation_speed, anim) = match kind {
        ObstacleKind::Cube => {
            let spin_axis = if rng.random_bool(0.5) {
                SpinAxis::Y
            } else {
                SpinAxis::X
            };
            (Vec3::new(0.01, 0.03, 0.01), ObstacleAnim::Cube { spin_axis })
        }
        ObstacleKind::Asteroid => {
            // Slow independent tumble, jittered per instance
            let mut jitter = [0.0f32; 3];
            for rate in &mut jitter {
                *rate = 0.005 + rng.random::<f32>() * 0.01;
            }
            (Vec3::from_array(jitter), ObstacleAnim::Asteroid)
        }
        ObstacleKind::SpikySphere => {
            let phase = rng.random::<f32>() * TAU;
            let amount = 0.2 + rng.random::<f32>() * 0.3;
            (
                Vec3::new(0.015, 0.02, 0.01),
                ObstacleAnim::SpikySphere {
                    phase,
                    amount,
                    spike_scale: Vec3::ONE,
                },
            )
        }
    };

    let rotation = Vec3::new(
        rng.random::<f32>() * PI,
        rng.random::<f32>() * PI,
        rng.random::<f32>() * PI,
    );

    Obstacle {
        id,
        position,
        rotation,
        scale: config.obstacle_scale,
        collision_radius: config.obstacle_collision_radius,
        rotation_speed,
        anim,
    }
}

/// Build a coin at `position`, standing upright to face the camera
pub fn build_coin(id: u32, position: Vec3, config: &Config) -> Coin {
    debug_assert!(position.is_finite(), "coin position must be finite");

    Coin {
        id,
        position,
        rotation: Vec3::new(PI / 2.0, 0.0, 0.0),
        collision_radius: config.coin_collision_radius,
        rotation_speed: config.coin_spin_rate,
        value: config.coin_value,
    }
}

/// Build the player ship at its configured start pose
pub fn build_ship(id: ShipId, config: &Config) -> ShipState {
    let ship = config.ship(id);
    ShipState {
        id,
        position: ship.start_position,
        rotation: ship.start_rotation,
        lateral_velocity: 0.0,
        boost_velocity: 0.0,
        collision_radius: ship.collision_radius,
        blink: Default::default(),
        engine: EngineFx::new(&ship.flame_scales),
    }
}
