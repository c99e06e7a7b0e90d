//! Asteroids: size classes, pooled entities and the spawn/split registry
//!
//! Each pooled asteroid is either dormant or active with a size and health.
//! Breaking a non-small asteroid re-enables the same slot one size down and
//! spawns at most one sibling of that size; small asteroids just vanish.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arena::ArenaBounds;
use super::pool::{FixedPool, Handle, Poolable};
use crate::consts::{ASTEROID_SEGMENTS, DESPAWN_BUFFER};
use crate::error::PoolError;
use crate::services::{AsteroidOutline, OutlineBuilder};
use crate::tuning::{AsteroidTable, AsteroidTypeData, Tuning};

/// Spin rate bound, radians per second
const MAX_SPIN: f32 = 1.5;

/// Runtime asteroid size. "No preference" is `Option::None` at spawn sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsteroidSize {
    Small,
    Medium,
    Large,
}

impl AsteroidSize {
    pub const ALL: [AsteroidSize; 3] = [AsteroidSize::Small, AsteroidSize::Medium, AsteroidSize::Large];

    /// Size produced by splitting, or `None` for the smallest class
    pub fn smaller(self) -> Option<AsteroidSize> {
        match self {
            AsteroidSize::Large => Some(AsteroidSize::Medium),
            AsteroidSize::Medium => Some(AsteroidSize::Small),
            AsteroidSize::Small => None,
        }
    }

    /// Uniform pick among all sizes
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

pub type AsteroidHandle = Handle<Asteroid>;

/// A pooled asteroid
#[derive(Debug, Clone)]
pub struct Asteroid {
    pub slot: usize,
    pub size: AsteroidSize,
    pub health: i32,
    pub diameter: f32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing in radians; cosmetic, randomised on every movement reset
    pub rotation: f32,
    /// Radians per second
    pub spin: f32,
    pub active: bool,
    outline: AsteroidOutline,
}

impl Poolable for Asteroid {
    fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Asteroid {
    fn new(slot: usize, outline: AsteroidOutline) -> Self {
        Self {
            slot,
            size: AsteroidSize::Small,
            health: 0,
            diameter: 0.0,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            spin: 0.0,
            active: false,
            outline,
        }
    }

    /// Reset size, health and scale, park at the origin at rest, mark active
    pub fn enable(&mut self, size: AsteroidSize, data: AsteroidTypeData) {
        self.size = size;
        self.health = data.max_health;
        self.diameter = data.diameter;
        self.set_movement(Vec2::ZERO, Vec2::ZERO, 0.0, 0.0);
        self.active = true;
    }

    pub fn set_movement(&mut self, pos: Vec2, vel: Vec2, rotation: f32, spin: f32) {
        self.pos = pos;
        self.vel = vel;
        self.rotation = rotation;
        self.spin = spin;
    }

    /// Radius of the scaled outline, used for overlap tests
    pub fn collision_radius(&self) -> f32 {
        self.outline.max_radius() * self.diameter
    }

    pub fn outline(&self) -> &AsteroidOutline {
        &self.outline
    }

    /// Remove one point of health; true when the asteroid breaks
    fn take_hit(&mut self) -> bool {
        self.health = (self.health - 1).max(0);
        self.health == 0
    }
}

/// Result of a single hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOutcome {
    /// Still alive with `health` remaining
    Damaged { health: i32 },
    /// Small asteroid broke and returned to the pool
    Destroyed,
    /// Broke into `size`: `survivor` is the original slot, `fragment` the
    /// best-effort sibling (`None` if the pool was exhausted)
    SplitInto {
        size: AsteroidSize,
        survivor: AsteroidHandle,
        fragment: Option<AsteroidHandle>,
    },
}

/// Owns every asteroid and the spawn/split policy
pub struct AsteroidRegistry {
    pool: FixedPool<Asteroid>,
    table: AsteroidTable,
    speed_range: (f32, f32),
    split_kick: (f32, f32),
}

impl AsteroidRegistry {
    /// Build `capacity` asteroids, each with its own outline
    pub fn new(capacity: usize, tuning: &Tuning, outlines: &mut dyn OutlineBuilder) -> Self {
        let pool = FixedPool::new(capacity, |slot| {
            Asteroid::new(slot, outlines.build_asteroid_outline(ASTEROID_SEGMENTS))
        });

        Self {
            pool,
            table: tuning.asteroids,
            speed_range: tuning.speed_range,
            split_kick: tuning.split_kick,
        }
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn get(&self, handle: AsteroidHandle) -> Option<&Asteroid> {
        self.pool.get(handle)
    }

    /// Ok when `handle` still refers to a live asteroid
    pub fn check(&self, handle: AsteroidHandle) -> Result<(), PoolError> {
        self.pool.check(handle).map(|_| ())
    }

    pub fn iter(&self) -> impl Iterator<Item = (AsteroidHandle, &Asteroid)> + '_ {
        self.pool.iter_live()
    }

    /// Activate an asteroid; random size when `size` is `None`
    ///
    /// With `at_edge` it is placed just off screen and launched toward a
    /// random point inside the arena. Returns `None` when the pool is empty.
    pub fn spawn(
        &mut self,
        size: Option<AsteroidSize>,
        at_edge: bool,
        arena: &ArenaBounds,
        rng: &mut impl Rng,
    ) -> Option<AsteroidHandle> {
        let size = size.unwrap_or_else(|| AsteroidSize::random(rng));
        let handle = self.acquire(size)?;

        if at_edge {
            let pos = arena.random_edge_point(rng);
            let target = arena.random_interior_point(rng);
            let speed = rng.random_range(self.speed_range.0..=self.speed_range.1);
            let vel = (target - pos).normalize_or_zero() * speed;
            self.set_movement(handle, pos, vel, rng);
            log::debug!(
                "Spawned {size:?} asteroid in slot {} at ({:.1}, {:.1})",
                handle.slot(),
                pos.x,
                pos.y
            );
        }

        Some(handle)
    }

    /// Place and launch a live asteroid; false if the handle is dead
    pub fn set_movement(
        &mut self,
        handle: AsteroidHandle,
        pos: Vec2,
        vel: Vec2,
        rng: &mut impl Rng,
    ) -> bool {
        let rotation = rng.random_range(0.0..std::f32::consts::TAU);
        let spin = rng.random_range(-MAX_SPIN..=MAX_SPIN);
        match self.pool.get_mut(handle) {
            Some(asteroid) => {
                asteroid.set_movement(pos, vel, rotation, spin);
                true
            }
            None => false,
        }
    }

    /// Apply one hit at `impact`
    ///
    /// Errors only for handles that are no longer live (e.g. a second
    /// collision event for an asteroid that already broke this tick).
    pub fn apply_damage(
        &mut self,
        handle: AsteroidHandle,
        impact: Vec2,
        rng: &mut impl Rng,
    ) -> Result<SplitOutcome, PoolError> {
        let asteroid = self.pool.try_get_mut(handle)?;

        log::trace!(
            "Asteroid {} hit at ({:.2}, {:.2}), health {}",
            handle.slot(),
            impact.x,
            impact.y,
            asteroid.health
        );

        if !asteroid.take_hit() {
            return Ok(SplitOutcome::Damaged {
                health: asteroid.health,
            });
        }

        let parent_size = asteroid.size;
        let parent_pos = asteroid.pos;
        let parent_vel = asteroid.vel;
        let spread = self.table.get(parent_size).diameter;

        let Some(next) = parent_size.smaller() else {
            self.pool.release(handle)?;
            log::debug!("Asteroid {} destroyed", handle.slot());
            return Ok(SplitOutcome::Destroyed);
        };

        // Survivor drifts toward +x/+y, the sibling toward -x/-y so the pair separates
        let (kick_min, kick_max) = self.split_kick;
        let offset = Vec2::new(rng.random_range(0.0..=spread), rng.random_range(0.0..=spread));
        let kick = Vec2::new(
            rng.random_range(kick_min..=kick_max),
            rng.random_range(kick_min..=kick_max),
        );
        let data = self.table.get(next);
        if let Some(asteroid) = self.pool.get_mut(handle) {
            asteroid.enable(next, data);
        }
        self.set_movement(handle, parent_pos + offset, parent_vel + kick, rng);

        let fragment = self.acquire(next);
        if let Some(fragment) = fragment {
            let offset = Vec2::new(
                rng.random_range(-spread..=0.0),
                rng.random_range(-spread..=0.0),
            );
            let kick = Vec2::new(
                rng.random_range(-kick_max..=-kick_min),
                rng.random_range(-kick_max..=-kick_min),
            );
            self.set_movement(fragment, parent_pos + offset, parent_vel + kick, rng);
        }

        log::debug!(
            "Asteroid {} split {parent_size:?} -> {next:?} (sibling: {})",
            handle.slot(),
            fragment.map_or("dropped".to_string(), |f| f.slot().to_string())
        );

        Ok(SplitOutcome::SplitInto {
            size: next,
            survivor: handle,
            fragment,
        })
    }

    /// Advance positions by `dt`
    pub fn integrate(&mut self, dt: f32) {
        self.pool.for_each_live_mut(|asteroid| {
            asteroid.pos += asteroid.vel * dt;
            asteroid.rotation += asteroid.spin * dt;
        });
    }

    /// Recycle every asteroid that has drifted past the despawn margin
    pub fn sweep(&mut self, arena: &ArenaBounds) -> usize {
        let mut recycled = 0;
        for handle in self.pool.live_handles() {
            let out = self
                .pool
                .get(handle)
                .is_some_and(|a| arena.is_out_of_bounds(a.pos, a.diameter / 2.0, DESPAWN_BUFFER));
            if out && self.pool.release(handle).is_ok() {
                recycled += 1;
            }
        }
        if recycled > 0 {
            log::trace!("Swept {recycled} asteroids out of bounds");
        }
        recycled
    }

    /// Return a live asteroid to the pool without scoring
    pub fn despawn(&mut self, handle: AsteroidHandle) -> Result<(), PoolError> {
        self.pool.release(handle)
    }

    /// Force-reclaim every asteroid
    pub fn reset_all(&mut self) -> usize {
        self.pool.reset_all()
    }

    fn acquire(&mut self, size: AsteroidSize) -> Option<AsteroidHandle> {
        let handle = self.pool.try_acquire()?;
        let data = self.table.get(size);
        if let Some(asteroid) = self.pool.get_mut(handle) {
            asteroid.enable(size, data);
        }
        Some(handle)
    }
}
