//! Session state and core simulation types
//!
//! Everything a run needs lives in [`SessionState`]; the frame scheduler owns
//! it and threads it through every component call.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::{Config, ShipId};
use crate::consts::MAX_HEALTH;
use crate::scene::{ObjectDesc, SceneHandle, Transform};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen
    Start,
    /// Choosing a ship (optional step before playing)
    ShipSelect,
    /// Active run; the only phase in which ticks simulate
    Playing,
    /// Run ended (terminal until the player returns to start)
    GameOver,
}

/// Control input sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub boost: bool,
}

/// Frame-counted hit flash on the ship
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlinkEffect {
    pub frames_left: u8,
    /// Whether the hit tint is applied this frame
    pub tinted: bool,
}

/// Engine exhaust animation state
#[derive(Debug, Clone, PartialEq)]
pub struct EngineFx {
    /// Animation clock (advances 5 per baseline frame)
    pub time: f32,
    /// Resting scale of each flame layer
    pub base_scales: Vec<Vec3>,
    /// Current scale of each flame layer
    pub flame_scales: Vec<Vec3>,
    /// Uniform scale of the left/right side thrusters
    pub left_thruster: f32,
    pub right_thruster: f32,
}

impl EngineFx {
    pub fn new(base_scales: &[Vec3]) -> Self {
        Self {
            time: 0.0,
            base_scales: base_scales.to_vec(),
            flame_scales: base_scales.to_vec(),
            left_thruster: 1.0,
            right_thruster: 1.0,
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, PartialEq)]
pub struct ShipState {
    pub id: ShipId,
    pub position: Vec3,
    pub rotation: Vec3,
    pub lateral_velocity: f32,
    pub boost_velocity: f32,
    pub collision_radius: f32,
    pub blink: BlinkEffect,
    pub engine: EngineFx,
}

impl ShipState {
    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: self.rotation,
            scale: Vec3::ONE,
        }
    }
}

/// Obstacle shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Cube,
    Asteroid,
    SpikySphere,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [
        ObstacleKind::Cube,
        ObstacleKind::Asteroid,
        ObstacleKind::SpikySphere,
    ];
}

/// Axis a cube obstacle spins around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinAxis {
    X,
    Y,
}

/// Kind-specific animation fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleAnim {
    Cube { spin_axis: SpinAxis },
    /// Tumble rates are baked into `rotation_speed` with per-instance jitter
    Asteroid,
    SpikySphere {
        /// Free-running breathing phase (radians)
        phase: f32,
        /// Breathing amplitude
        amount: f32,
        /// Current per-spike scale
        spike_scale: Vec3,
    },
}

/// An obstacle entity
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
    pub collision_radius: f32,
    /// Rotation rate per axis (radians per baseline frame)
    pub rotation_speed: Vec3,
    pub anim: ObstacleAnim,
}

impl Obstacle {
    pub fn kind(&self) -> ObstacleKind {
        match self.anim {
            ObstacleAnim::Cube { .. } => ObstacleKind::Cube,
            ObstacleAnim::Asteroid => ObstacleKind::Asteroid,
            ObstacleAnim::SpikySphere { .. } => ObstacleKind::SpikySphere,
        }
    }

    pub fn handle(&self) -> SceneHandle {
        SceneHandle(self.id)
    }

    pub fn desc(&self) -> ObjectDesc {
        ObjectDesc::Obstacle(self.kind())
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: self.rotation,
            scale: Vec3::splat(self.scale),
        }
    }
}

/// A collectible coin
#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    pub id: u32,
    pub position: Vec3,
    pub rotation: Vec3,
    pub collision_radius: f32,
    /// Y-axis spin rate (radians per baseline frame)
    pub rotation_speed: f32,
    pub value: u32,
}

impl Coin {
    pub fn handle(&self) -> SceneHandle {
        SceneHandle(self.id)
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: self.rotation,
            scale: Vec3::ONE,
        }
    }
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    CoinCollected { id: u32, value: u32 },
    ObstacleHit { id: u32, health: u8 },
    GameOver { score: u64, distance: f32 },
}

/// Complete per-session simulation state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub config: Config,
    /// Seed the session RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub ship: ShipState,
    /// Live obstacles (in spawn order)
    pub obstacles: Vec<Obstacle>,
    /// Live coins (in spawn order)
    pub coins: Vec<Coin>,
    /// Spawn cursor: forward-most Z already populated
    pub next_spawn_z: f32,
    pub score: u64,
    pub health: u8,
    /// Forward distance covered this run
    pub distance: f32,
    /// Simulated ticks this run
    pub time_ticks: u64,
    /// Next entity ID (0 is reserved for the ship)
    next_id: u32,
}

impl SessionState {
    /// Create a session in the start phase with the ship at its start pose
    pub fn new(config: Config, ship: ShipId, seed: u64) -> Self {
        let ship = super::factory::build_ship(ship, &config);
        let next_spawn_z = ship.position.z - config.spawn_interval;
        Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Start,
            ship,
            obstacles: Vec::new(),
            coins: Vec::new(),
            next_spawn_z,
            score: 0,
            health: MAX_HEALTH,
            distance: 0.0,
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Number of live scene objects besides the ship
    pub fn live_objects(&self) -> usize {
        self.obstacles.len() + self.coins.len()
    }
}
