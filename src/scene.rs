//! Boundary contracts between the simulation core and its host
//!
//! The core never touches a rendering library directly. It creates and
//! removes objects through [`RenderTarget`] using opaque [`SceneHandle`]s, and
//! reports score/health changes through [`SessionSink`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::ShipId;
use crate::sim::{EngineFx, ObstacleKind};

/// Opaque scene object handle (entity id; 0 is the player ship)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SceneHandle(pub u32);

impl SceneHandle {
    pub const SHIP: SceneHandle = SceneHandle(0);
}

/// World transform of a scene object (rotation as Euler XYZ radians)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// What the renderer should build for a new handle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectDesc {
    Ship(ShipId),
    Obstacle(ObstacleKind),
    Coin,
}

/// Scene graph operations the core needs from the renderer
pub trait RenderTarget {
    fn add_object(&mut self, handle: SceneHandle, desc: ObjectDesc, transform: &Transform);
    /// Removing a handle that is not in the scene must be a no-op
    fn remove_object(&mut self, handle: SceneHandle);
    fn set_transform(&mut self, handle: SceneHandle, transform: &Transform);

    /// Tint an object with the hit colour (blink effect) or restore it
    fn set_flash(&mut self, _handle: SceneHandle, _on: bool) {}

    /// Per-spike breathing scale for spiky obstacles
    fn set_spike_scale(&mut self, _handle: SceneHandle, _scale: Vec3) {}

    /// Engine flame layer scales and side thruster scales for a ship
    fn set_engine(&mut self, _handle: SceneHandle, _engine: &EngineFx) {}
}

/// Render target that discards everything (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScene;

impl RenderTarget for NullScene {
    fn add_object(&mut self, _handle: SceneHandle, _desc: ObjectDesc, _transform: &Transform) {}
    fn remove_object(&mut self, _handle: SceneHandle) {}
    fn set_transform(&mut self, _handle: SceneHandle, _transform: &Transform) {}
}

/// Session hooks invoked by the collision resolver and scheduler
///
/// All methods default to no-ops so hosts implement only what they show.
pub trait SessionSink {
    fn on_session_start(&mut self) {}
    fn on_score_change(&mut self, _delta: u32) {}
    fn on_health_change(&mut self, _health: u8) {}
    fn on_game_over(&mut self) {}
    fn on_coin_collected(&mut self, _value: u32) {}
    fn on_obstacle_hit(&mut self) {}
}

/// Sink that ignores every event
impl SessionSink for () {}

/// Test doubles shared by the simulation tests
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;

    use super::*;

    /// Scene that mirrors the live object set and counts every call
    #[derive(Debug, Default)]
    pub struct RecordingScene {
        pub live: BTreeMap<SceneHandle, (ObjectDesc, Transform)>,
        pub added: u32,
        pub removed: Vec<SceneHandle>,
        pub flashes: Vec<bool>,
        /// Last engine state pushed for the ship
        pub engine: Option<EngineFx>,
    }

    impl RenderTarget for RecordingScene {
        fn add_object(&mut self, handle: SceneHandle, desc: ObjectDesc, transform: &Transform) {
            self.added += 1;
            self.live.insert(handle, (desc, *transform));
        }

        fn remove_object(&mut self, handle: SceneHandle) {
            self.live.remove(&handle);
            self.removed.push(handle);
        }

        fn set_transform(&mut self, handle: SceneHandle, transform: &Transform) {
            if let Some(entry) = self.live.get_mut(&handle) {
                entry.1 = *transform;
            }
        }

        fn set_flash(&mut self, handle: SceneHandle, on: bool) {
            if handle == SceneHandle::SHIP {
                self.flashes.push(on);
            }
        }

        fn set_engine(&mut self, handle: SceneHandle, engine: &EngineFx) {
            if handle == SceneHandle::SHIP {
                self.engine = Some(engine.clone());
            }
        }
    }

    /// Sink that records every hook call
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub score_deltas: Vec<u32>,
        pub health: Vec<u8>,
        pub game_overs: u32,
        pub coins: Vec<u32>,
        pub hits: u32,
        pub starts: u32,
    }

    impl SessionSink for RecordingSink {
        fn on_session_start(&mut self) {
            self.starts += 1;
        }
        fn on_score_change(&mut self, delta: u32) {
            self.score_deltas.push(delta);
        }
        fn on_health_change(&mut self, health: u8) {
            self.health.push(health);
        }
        fn on_game_over(&mut self) {
            self.game_overs += 1;
        }
        fn on_coin_collected(&mut self, value: u32) {
            self.coins.push(value);
        }
        fn on_obstacle_hit(&mut self) {
            self.hits += 1;
        }
    }
}
