//! Error types
//!
//! Only misuse and bad configuration produce errors. Normal gameplay
//! conditions (empty pool, out of bounds, zero health) are expressed with
//! `Option`/outcome values instead.

use thiserror::Error;

/// Errors reported by [`FixedPool`](crate::sim::pool::FixedPool)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// No free instances left
    #[error("pool exhausted (capacity {capacity})")]
    Exhausted { capacity: usize },

    /// Handle was not issued by this pool, or its slot is not currently live
    #[error("invalid release of slot {slot}: {reason}")]
    InvalidRelease { slot: usize, reason: &'static str },

    /// Slot has been recycled since the handle was issued
    #[error("stale handle for slot {slot} (generation {generation}, live {live})")]
    StaleHandle {
        slot: usize,
        generation: u32,
        live: u32,
    },
}

/// Errors raised while loading or validating [`Tuning`](crate::Tuning)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    /// Asteroid sizes must strictly grow Small < Medium < Large
    #[error("asteroid {field} must strictly increase from small to large")]
    InvalidSizeOrdering { field: &'static str },

    #[error("{field} range is empty or negative ({min}..{max})")]
    InvalidRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    /// A required collaborator or resource was never supplied
    #[error("required configuration missing: {0}")]
    Missing(&'static str),
}
