//! Arena geometry
//!
//! The arena is the visible viewport, centred on the origin. It is fixed
//! for the session once the camera reports its extents.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::ARENA_BUFFER;

/// Half extents of the visible arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub half_width: f32,
    pub half_height: f32,
}

impl ArenaBounds {
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_width,
            half_height,
        }
    }

    /// Derive bounds from an orthographic camera (`ortho_size` is the half height)
    pub fn from_camera(ortho_size: f32, aspect: f32) -> Self {
        Self::new(ortho_size * aspect, ortho_size)
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.half_width, self.half_height)
    }

    /// True once `pos` has left the arena grown by `inclusion_radius + buffer`
    ///
    /// The limit itself still counts as inside.
    pub fn is_out_of_bounds(&self, pos: Vec2, inclusion_radius: f32, buffer: f32) -> bool {
        let limit = self.half_extents() + Vec2::splat(inclusion_radius + buffer);
        pos.x < -limit.x || pos.x > limit.x || pos.y < -limit.y || pos.y > limit.y
    }

    /// Toroidal wrap: mirror any out-of-range axis to the opposite edge
    ///
    /// The out-of-range coordinate is clamped to the limit before mirroring,
    /// so the body reappears exactly on the far boundary. Returns `None`
    /// when `pos` is inside.
    pub fn wrap(&self, pos: Vec2, inclusion_radius: f32) -> Option<Vec2> {
        let limit = self.half_extents() + Vec2::splat(inclusion_radius);
        let mut wrapped = pos;
        let mut moved = false;

        if pos.x.abs() > limit.x {
            wrapped.x = -pos.x.clamp(-limit.x, limit.x);
            moved = true;
        }
        if pos.y.abs() > limit.y {
            wrapped.y = -pos.y.clamp(-limit.y, limit.y);
            moved = true;
        }

        moved.then_some(wrapped)
    }

    /// Uniform point inside the visible arena
    pub fn random_interior_point(&self, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(
            rng.random_range(-self.half_width..=self.half_width),
            rng.random_range(-self.half_height..=self.half_height),
        )
    }

    /// Point just outside the visible arena, inside the spawn band
    ///
    /// Picks the X or Y edge with equal probability, then a random side of
    /// that edge. The clamped axis lands within one buffer of
    /// `bound + ARENA_BUFFER`; the free axis spans the full spawn band.
    pub fn random_edge_point(&self, rng: &mut impl Rng) -> Vec2 {
        let band = self.half_extents() + Vec2::splat(ARENA_BUFFER * 2.0);
        let clamp_x = rng.random_bool(0.5);
        let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let jitter = rng.random_range(-ARENA_BUFFER..=ARENA_BUFFER);

        if clamp_x {
            Vec2::new(
                side * (self.half_width + ARENA_BUFFER + jitter),
                rng.random_range(-band.y..=band.y),
            )
        } else {
            Vec2::new(
                rng.random_range(-band.x..=band.x),
                side * (self.half_height + ARENA_BUFFER + jitter),
            )
        }
    }
}
