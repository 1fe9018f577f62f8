//! Game tuning configuration
//!
//! Loaded once at startup and never mutated afterwards. Every field has a
//! default, so a partial JSON document only overrides the keys it names.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Selectable player ships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShipId {
    #[default]
    Speeder,
    Bumble,
}

impl ShipId {
    pub const ALL: [ShipId; 2] = [ShipId::Speeder, ShipId::Bumble];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipId::Speeder => "Speeder",
            ShipId::Bumble => "Bumble",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "speeder" | "ship_1" => Some(ShipId::Speeder),
            "bumble" | "ship_2" => Some(ShipId::Bumble),
            _ => None,
        }
    }
}

/// Axis the ship banks around when steering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RollAxis {
    X,
    #[default]
    Z,
}

/// Per-ship tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipConfig {
    /// Radius used against both obstacles and coins
    pub collision_radius: f32,
    /// Pose applied on session start
    pub start_position: Vec3,
    pub start_rotation: Vec3,
    pub roll_axis: RollAxis,
    /// Resting scale of each main engine flame layer (inner to outer)
    pub flame_scales: Vec<Vec3>,
}

impl ShipConfig {
    fn speeder() -> Self {
        Self {
            collision_radius: 5.0,
            start_position: Vec3::new(0.0, RIDE_HEIGHT, 0.0),
            start_rotation: Vec3::ZERO,
            roll_axis: RollAxis::Z,
            flame_scales: vec![
                Vec3::ONE,
                Vec3::new(1.2, 1.2, 1.1),
                Vec3::new(1.5, 1.5, 1.2),
            ],
        }
    }

    fn bumble() -> Self {
        Self {
            collision_radius: 5.5,
            start_position: Vec3::new(0.0, RIDE_HEIGHT, 0.0),
            start_rotation: Vec3::ZERO,
            roll_axis: RollAxis::Z,
            flame_scales: vec![Vec3::ONE, Vec3::new(1.3, 1.3, 1.2)],
        }
    }
}

/// Height of the ship above the track plane
const RIDE_HEIGHT: f32 = 2.2;

/// Complete game tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Track ===
    pub track_width: f32,
    /// Height objects are placed relative to (obstacles and coins add their offsets)
    pub ride_height: f32,

    // === Movement ===
    pub max_lateral_speed: f32,
    pub forward_speed: f32,
    pub boost_speed: f32,
    /// Linear boost decay per baseline frame once boost is released
    pub boost_decay: f32,
    pub acceleration: f32,
    /// Lateral velocity multiplier per baseline frame (0-1, lower = more friction)
    pub friction: f32,
    pub rotation_sensitivity: f32,
    /// Debug: freeze forward travel
    pub disable_z_movement: bool,

    // === Coins ===
    pub coin_spawn_rate: f32,
    pub coin_spawn_distance: f32,
    /// Extra random distance (0..jitter) added beyond coin_spawn_distance
    pub coin_spawn_jitter: f32,
    pub coin_y_offset: f32,
    pub coin_collision_radius: f32,
    pub coin_spin_rate: f32,
    pub coin_value: u32,
    /// Placement tries before a coin spawn is skipped
    pub coin_placement_attempts: u32,

    // === Obstacles ===
    pub obstacle_spawn_rate: f32,
    pub obstacle_spawn_distance: f32,
    pub obstacle_y_offset: f32,
    pub obstacle_collision_radius: f32,
    pub obstacle_scale: f32,

    // === Spawning ===
    pub spawn_interval: f32,
    pub despawn_distance: f32,
    /// Spawn intervals filled ahead of the ship on reset
    pub prepopulate_intervals: u32,

    // === Frame timing ===
    /// Upper clamp on a single frame delta (seconds)
    pub max_frame_delta: f32,

    // === Ships ===
    pub speeder: ShipConfig,
    pub bumble: ShipConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            track_width: 50.0,
            ride_height: RIDE_HEIGHT,

            max_lateral_speed: 0.7,
            forward_speed: 2.5,
            boost_speed: 2.7,
            boost_decay: 0.02,
            acceleration: 0.085,
            friction: 0.88,
            rotation_sensitivity: 0.5,
            disable_z_movement: false,

            coin_spawn_rate: 0.3,
            coin_spawn_distance: 100.0,
            coin_spawn_jitter: 20.0,
            coin_y_offset: 1.0,
            coin_collision_radius: 2.0,
            coin_spin_rate: 0.03,
            coin_value: 1,
            coin_placement_attempts: 5,

            obstacle_spawn_rate: 0.5,
            obstacle_spawn_distance: 150.0,
            obstacle_y_offset: 2.0,
            obstacle_collision_radius: 4.0,
            obstacle_scale: 5.0,

            spawn_interval: 50.0,
            despawn_distance: 100.0,
            prepopulate_intervals: 10,

            max_frame_delta: 0.1,

            speeder: ShipConfig::speeder(),
            bumble: ShipConfig::bumble(),
        }
    }
}

/// Rejected configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{name}` must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
    #[error("`{name}` must be greater than zero, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("`{name}` is a probability and must lie in [0, 1], got {value}")]
    NotProbability { name: &'static str, value: f32 },
    #[error("`friction` must lie in (0, 1], got {0}")]
    Friction(f32),
    #[error("`coin_placement_attempts` must be at least 1")]
    NoPlacementAttempts,
}

impl Config {
    /// Half the track width; the hard clamp on the ship's sideways position
    #[inline]
    pub fn lateral_bounds(&self) -> f32 {
        self.track_width / 2.0
    }

    /// Minimum spacing between a freshly placed coin and any obstacle
    #[inline]
    pub fn coin_clearance(&self) -> f32 {
        self.obstacle_collision_radius + self.coin_collision_radius
    }

    pub fn ship(&self, id: ShipId) -> &ShipConfig {
        match id {
            ShipId::Speeder => &self.speeder,
            ShipId::Bumble => &self.bumble,
        }
    }

    /// Parse and validate a (possibly partial) JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every value the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("track_width", self.track_width),
            ("ride_height", self.ride_height),
            ("max_lateral_speed", self.max_lateral_speed),
            ("forward_speed", self.forward_speed),
            ("boost_speed", self.boost_speed),
            ("boost_decay", self.boost_decay),
            ("acceleration", self.acceleration),
            ("friction", self.friction),
            ("rotation_sensitivity", self.rotation_sensitivity),
            ("coin_spawn_rate", self.coin_spawn_rate),
            ("coin_spawn_distance", self.coin_spawn_distance),
            ("coin_spawn_jitter", self.coin_spawn_jitter),
            ("coin_y_offset", self.coin_y_offset),
            ("coin_collision_radius", self.coin_collision_radius),
            ("coin_spin_rate", self.coin_spin_rate),
            ("obstacle_spawn_rate", self.obstacle_spawn_rate),
            ("obstacle_spawn_distance", self.obstacle_spawn_distance),
            ("obstacle_y_offset", self.obstacle_y_offset),
            ("obstacle_collision_radius", self.obstacle_collision_radius),
            ("obstacle_scale", self.obstacle_scale),
            ("spawn_interval", self.spawn_interval),
            ("despawn_distance", self.despawn_distance),
            ("max_frame_delta", self.max_frame_delta),
            ("speeder.collision_radius", self.speeder.collision_radius),
            ("bumble.collision_radius", self.bumble.collision_radius),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }

        let positive = [
            ("track_width", self.track_width),
            ("max_lateral_speed", self.max_lateral_speed),
            ("coin_collision_radius", self.coin_collision_radius),
            ("obstacle_collision_radius", self.obstacle_collision_radius),
            ("spawn_interval", self.spawn_interval),
            ("despawn_distance", self.despawn_distance),
            ("max_frame_delta", self.max_frame_delta),
            ("speeder.collision_radius", self.speeder.collision_radius),
            ("bumble.collision_radius", self.bumble.collision_radius),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        for (name, value) in [
            ("coin_spawn_rate", self.coin_spawn_rate),
            ("obstacle_spawn_rate", self.obstacle_spawn_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::NotProbability { name, value });
            }
        }

        if self.friction <= 0.0 || self.friction > 1.0 {
            return Err(ConfigError::Friction(self.friction));
        }
        if self.coin_placement_attempts == 0 {
            return Err(ConfigError::NoPlacementAttempts);
        }
        Ok(())
    }

    /// LocalStorage key for a user-supplied config override
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "star_racer_config";

    /// Load config override from LocalStorage, falling back to defaults (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config override from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
