//! Data-driven game balance
//!
//! Loaded once at startup (JSON) and owned immutably by the simulation
//! context afterwards. Missing fields fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::asteroid::AsteroidSize;

/// Physical size and toughness of one asteroid size class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsteroidTypeData {
    /// Visual/physical scale (also the split offset radius)
    pub diameter: f32,
    /// Hits required to break the asteroid
    pub max_health: i32,
}

impl AsteroidTypeData {
    pub const fn new(diameter: f32, max_health: i32) -> Self {
        Self {
            diameter,
            max_health,
        }
    }
}

/// Size/health table, one entry per runtime size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsteroidTable {
    pub small: AsteroidTypeData,
    pub medium: AsteroidTypeData,
    pub large: AsteroidTypeData,
}

impl Default for AsteroidTable {
    fn default() -> Self {
        Self {
            small: AsteroidTypeData::new(1.0, 2),
            medium: AsteroidTypeData::new(2.2, 10),
            large: AsteroidTypeData::new(4.0, 50),
        }
    }
}

impl AsteroidTable {
    /// Look up the data for a size class
    pub fn get(&self, size: AsteroidSize) -> AsteroidTypeData {
        match size {
            AsteroidSize::Small => self.small,
            AsteroidSize::Medium => self.medium,
            AsteroidSize::Large => self.large,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.small.diameter <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "small asteroid diameter",
                value: self.small.diameter,
            });
        }
        if self.small.max_health <= 0 {
            return Err(ConfigError::NonPositive {
                field: "small asteroid health",
                value: self.small.max_health as f32,
            });
        }
        if !(self.small.diameter < self.medium.diameter && self.medium.diameter < self.large.diameter)
        {
            return Err(ConfigError::InvalidSizeOrdering { field: "diameter" });
        }
        if !(self.small.max_health < self.medium.max_health
            && self.medium.max_health < self.large.max_health)
        {
            return Err(ConfigError::InvalidSizeOrdering {
                field: "max_health",
            });
        }
        Ok(())
    }
}

/// Ship flight model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    /// Linear speed cap (units/s)
    pub max_speed: f32,
    /// Thrust acceleration (units/s²)
    pub acceleration: f32,
    /// Linear drag (0-10, applied per tick while not thrusting)
    pub drag: f32,
    /// Angular speed cap (radians/s)
    pub max_turn_speed: f32,
    /// Angular acceleration (radians/s²)
    pub turn_acceleration: f32,
    /// Angular drag (0-10, applied per tick while not turning)
    pub turn_drag: f32,
    /// Inclusion radius for toroidal wrap
    pub wrap_radius: f32,
    /// Collision radius against asteroids
    pub collision_radius: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            max_speed: 12.0,
            acceleration: 18.0,
            drag: 0.2,
            max_turn_speed: 5.5,
            turn_acceleration: 30.0,
            turn_drag: 1.5,
            wrap_radius: 1.0,
            collision_radius: 0.5,
        }
    }
}

/// All balance constants for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub asteroids: AsteroidTable,
    /// Edge-spawn launch speed range (min, max)
    pub speed_range: (f32, f32),
    /// Per-axis velocity kick magnitude given to split fragments (min, max)
    pub split_kick: (f32, f32),
    /// Seconds between edge spawn attempts
    pub spawn_interval_secs: f32,
    /// Bullet muzzle speed added on top of the ship's velocity
    pub bullet_speed: f32,
    /// How long a hit/explosion effect holds its pool slot
    pub hit_effect_secs: f32,
    /// Delay between ship destruction and the full reset
    pub respawn_delay_secs: f32,
    pub ship: ShipTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            asteroids: AsteroidTable::default(),
            speed_range: (2.0, 5.0),
            split_kick: (2.0, 4.0),
            spawn_interval_secs: 1.0,
            bullet_speed: 25.0,
            hit_effect_secs: 0.5,
            respawn_delay_secs: 3.0,
            ship: ShipTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.asteroids.validate()?;
        check_range("speed_range", self.speed_range)?;
        check_range("split_kick", self.split_kick)?;
        check_positive("spawn_interval_secs", self.spawn_interval_secs)?;
        check_positive("bullet_speed", self.bullet_speed)?;
        check_positive("hit_effect_secs", self.hit_effect_secs)?;
        check_positive("respawn_delay_secs", self.respawn_delay_secs)?;
        check_positive("ship.max_speed", self.ship.max_speed)?;
        check_positive("ship.max_turn_speed", self.ship.max_turn_speed)?;
        check_positive("ship.wrap_radius", self.ship.wrap_radius)?;
        check_range("ship.drag", (self.ship.drag, 10.0))?;
        check_range("ship.turn_drag", (self.ship.turn_drag, 10.0))?;
        Ok(())
    }
}

fn check_range(field: &'static str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    if min < 0.0 || min > max || !min.is_finite() || !max.is_finite() {
        return Err(ConfigError::InvalidRange { field, min, max });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
