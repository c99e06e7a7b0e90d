//! Asteroid Field - pooled simulation core for an Asteroids-style arcade game
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (pools, registries, split logic, ship)
//! - `tuning`: Data-driven game balance, loaded once at startup
//! - `services`: External collaborators (effects, score UI, outline builder)
//! - `error`: Pool and configuration error types

pub mod error;
pub mod services;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, PoolError};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Vertices per asteroid outline
    pub const ASTEROID_SEGMENTS: usize = 10;
    /// Asteroid pool capacity
    pub const ASTEROID_MAX: usize = 200;
    /// Bullet pool capacity
    pub const BULLET_MAX: usize = 200;
    /// Effect pool capacity (one hit effect per possible bullet)
    pub const EFFECT_MAX: usize = BULLET_MAX;

    /// Margin beyond the visible arena used for spawning and despawning
    pub const ARENA_BUFFER: f32 = 5.0;
    /// Despawn margin: entities are recycled only after clearing twice the buffer
    pub const DESPAWN_BUFFER: f32 = ARENA_BUFFER * 2.0;
}

/// Convert seconds to whole simulation ticks (at least one)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    ((secs / consts::SIM_DT).round() as u64).max(1)
}

/// Unit "up" vector for a body rotated by `rotation` radians (counter-clockwise)
#[inline]
pub fn heading_from_rotation(rotation: f32) -> Vec2 {
    Vec2::new(-rotation.sin(), rotation.cos())
}
