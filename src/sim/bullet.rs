//! Bullets: pooled one-shot projectiles
//!
//! A bullet lives until it leaves the arena or touches an asteroid. There
//! is no penetration and no rate limit beyond pool capacity.

use glam::Vec2;
use rand::Rng;

use super::arena::ArenaBounds;
use super::asteroid::{AsteroidHandle, AsteroidRegistry, SplitOutcome};
use super::pool::{FixedPool, Handle, Poolable};
use crate::consts::DESPAWN_BUFFER;
use crate::error::PoolError;
use crate::tuning::Tuning;

/// A pooled bullet
#[derive(Debug, Clone, Copy)]
pub struct Bullet {
    pub slot: usize,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Unit facing at launch
    pub heading: Vec2,
    pub active: bool,
}

impl Poolable for Bullet {
    fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Bullet {
    fn new(slot: usize) -> Self {
        Self {
            slot,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            heading: Vec2::Y,
            active: false,
        }
    }

    fn launch(&mut self, origin: Vec2, heading: Vec2, muzzle_speed: f32, carried: Vec2) {
        self.pos = origin;
        self.heading = heading;
        // Muzzle impulse plus the shooter's own velocity, kept exactly
        self.vel = heading * muzzle_speed + carried;
        self.active = true;
    }
}

pub type BulletHandle = Handle<Bullet>;

/// What happened when a bullet struck an asteroid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    /// Bullet position at impact
    pub impact: Vec2,
    /// Bullet facing at impact
    pub heading: Vec2,
    pub outcome: SplitOutcome,
}

/// Owns every bullet and the fire/release policy
pub struct BulletRegistry {
    pool: FixedPool<Bullet>,
    speed: f32,
}

impl BulletRegistry {
    pub fn new(capacity: usize, tuning: &Tuning) -> Self {
        Self {
            pool: FixedPool::new(capacity, Bullet::new),
            speed: tuning.bullet_speed,
        }
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn get(&self, handle: BulletHandle) -> Option<&Bullet> {
        self.pool.get(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BulletHandle, &Bullet)> + '_ {
        self.pool.iter_live()
    }

    /// Launch one bullet from `origin` along `heading`, inheriting `carried`
    ///
    /// Returns `None` (and does nothing) when every bullet is in flight.
    pub fn fire(&mut self, origin: Vec2, heading: Vec2, carried: Vec2) -> Option<BulletHandle> {
        let handle = self.pool.try_acquire()?;
        let heading = heading.normalize_or(Vec2::Y);
        if let Some(bullet) = self.pool.get_mut(handle) {
            bullet.launch(origin, heading, self.speed, carried);
        }
        Some(handle)
    }

    /// Bullet struck `asteroid`: release the bullet and apply one hit
    ///
    /// Fails without side effects when either entity is no longer live,
    /// so a bullet never spends itself on an asteroid that already broke.
    pub fn on_hit(
        &mut self,
        bullet: BulletHandle,
        asteroid: AsteroidHandle,
        asteroids: &mut AsteroidRegistry,
        rng: &mut impl Rng,
    ) -> Result<HitReport, PoolError> {
        let fired = *self.pool.try_get(bullet)?;
        asteroids.check(asteroid)?;

        self.pool.release(bullet)?;
        let outcome = asteroids.apply_damage(asteroid, fired.pos, rng)?;

        Ok(HitReport {
            impact: fired.pos,
            heading: fired.heading,
            outcome,
        })
    }

    pub fn integrate(&mut self, dt: f32) {
        self.pool.for_each_live_mut(|bullet| bullet.pos += bullet.vel * dt);
    }

    /// Recycle bullets past the despawn margin (bullets are points)
    pub fn sweep(&mut self, arena: &ArenaBounds) -> usize {
        let mut recycled = 0;
        for handle in self.pool.live_handles() {
            let out = self
                .pool
                .get(handle)
                .is_some_and(|b| arena.is_out_of_bounds(b.pos, 0.0, DESPAWN_BUFFER));
            if out && self.pool.release(handle).is_ok() {
                recycled += 1;
            }
        }
        recycled
    }

    pub fn reset_all(&mut self) -> usize {
        self.pool.reset_all()
    }
}
