//! Simulation context and game-level state
//!
//! One `SimulationContext` owns every registry, the arena, the RNG and the
//! delay queue. It is built once and passed explicitly; there are no global
//! managers.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::ArenaBounds;
use super::asteroid::{AsteroidRegistry, SplitOutcome};
use super::bullet::BulletRegistry;
use super::collision::{CollisionEvent, Contact};
use super::effects::{EffectKind, EffectPool};
use super::schedule::{Continuation, DelayQueue};
use super::ship::Ship;
use crate::consts::{ASTEROID_MAX, BULLET_MAX, EFFECT_MAX};
use crate::error::ConfigError;
use crate::secs_to_ticks;
use crate::services::{EffectSink, NullServices, OutlineBuilder, RandomOutline, ScoreSink};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ship flying, asteroids spawning
    Playing,
    /// Ship destroyed; the world keeps moving until the respawn reset
    Respawning,
}

/// Collaborators the simulation reports to
pub struct Services {
    pub effects: Box<dyn EffectSink>,
    pub score: Box<dyn ScoreSink>,
}

/// Everything the fixed tick mutates
pub struct SimulationContext {
    tuning: Tuning,
    pub arena: ArenaBounds,
    pub asteroids: AsteroidRegistry,
    pub bullets: BulletRegistry,
    pub effects: EffectPool,
    pub ship: Ship,
    pub schedule: DelayQueue<Continuation>,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Tick at which the next edge spawn is attempted
    pub next_spawn_tick: u64,
    services: Services,
}

impl SimulationContext {
    /// Balance constants for this session (read-only)
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn spawn_interval_ticks(&self) -> u64 {
        secs_to_ticks(self.tuning.spawn_interval_secs)
    }

    /// Fire one bullet from the ship; false if dead or out of bullets
    pub fn fire(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.bullets
            .fire(self.ship.pos, self.ship.heading(), self.ship.vel)
            .is_some()
    }

    /// Attempt one edge spawn of a random size
    pub fn spawn_from_edge(&mut self) -> bool {
        self.asteroids
            .spawn(None, true, &self.arena, &mut self.rng)
            .is_some()
    }

    /// Resolve one boundary-delivered collision
    pub fn handle_collision(&mut self, event: CollisionEvent) {
        match event.classify() {
            Contact::BulletAsteroid { bullet, asteroid } => {
                // The slot is gone once a small asteroid breaks
                let centre = self.asteroids.get(asteroid).map(|a| a.pos);
                let report =
                    match self
                        .bullets
                        .on_hit(bullet, asteroid, &mut self.asteroids, &mut self.rng)
                    {
                        Ok(report) => report,
                        Err(err) => {
                            log::debug!("Ignoring collision with recycled entity: {err}");
                            return;
                        }
                    };

                self.play_effect(EffectKind::BulletHit, report.impact, -report.heading, 1.0);

                if report.outcome == SplitOutcome::Destroyed {
                    let diameter = self.tuning.asteroids.small.diameter;
                    self.play_effect(
                        EffectKind::AsteroidExplosion,
                        centre.unwrap_or(report.impact),
                        report.heading,
                        diameter,
                    );
                    self.add_score(1);
                }
            }
            Contact::ShipAsteroid { asteroid } => {
                if self.phase == GamePhase::Playing && self.asteroids.check(asteroid).is_ok() {
                    self.destroy_ship();
                }
            }
            Contact::Ignored => {
                log::trace!("Unhandled contact {event:?}");
            }
        }
    }

    /// Ship hit: explode, then reset everything after the respawn delay
    pub fn destroy_ship(&mut self) {
        log::info!(
            "Ship destroyed at tick {} (score {})",
            self.time_ticks,
            self.score
        );
        self.ship.alive = false;
        self.phase = GamePhase::Respawning;
        self.play_effect(EffectKind::ShipExplosion, self.ship.pos, self.ship.heading(), 1.0);

        let at = self.time_ticks + secs_to_ticks(self.tuning.respawn_delay_secs);
        self.schedule.schedule(at, Continuation::Respawn);
    }

    /// Force-reset every pool, pending continuation and the score
    pub fn restart(&mut self) {
        let asteroids = self.asteroids.reset_all();
        let bullets = self.bullets.reset_all();
        let effects = self.effects.reset_all();
        let pending = self.schedule.invalidate_all();

        self.score = 0;
        self.services.score.on_reset();
        self.ship.reset();
        self.phase = GamePhase::Playing;
        self.next_spawn_tick = self.time_ticks;

        log::info!(
            "Restarted: reclaimed {asteroids} asteroids, {bullets} bullets, {effects} effects; dropped {pending} pending"
        );
    }

    /// Run every continuation due at the current tick
    pub fn run_due(&mut self) {
        while let Some(continuation) = self.schedule.pop_due(self.time_ticks) {
            match continuation {
                Continuation::ReleaseEffect(handle) => {
                    if let Err(err) = self.effects.release(handle) {
                        log::debug!("Effect slot already reclaimed: {err}");
                    }
                }
                Continuation::Respawn => self.restart(),
            }
        }
    }

    fn play_effect(&mut self, kind: EffectKind, pos: Vec2, direction: Vec2, scale: f32) {
        let played = self
            .effects
            .play(kind, pos, direction, scale, self.services.effects.as_mut());
        if let Some(handle) = played {
            let at = self.time_ticks + self.effects.hold_ticks();
            self.schedule.schedule(at, Continuation::ReleaseEffect(handle));
        }
    }

    fn add_score(&mut self, delta: u32) {
        self.score += u64::from(delta);
        self.services.score.on_score(delta);
    }
}

/// Assembles a [`SimulationContext`] from its collaborators
///
/// Arena bounds are required. Missing sinks degrade to no-ops with a
/// warning; a missing outline builder falls back to [`RandomOutline`].
pub struct ContextBuilder {
    tuning: Option<Tuning>,
    arena: Option<ArenaBounds>,
    seed: u64,
    effects: Option<Box<dyn EffectSink>>,
    score: Option<Box<dyn ScoreSink>>,
    outlines: Option<Box<dyn OutlineBuilder>>,
    asteroid_capacity: usize,
    bullet_capacity: usize,
    effect_capacity: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            tuning: None,
            arena: None,
            seed: 0,
            effects: None,
            score: None,
            outlines: None,
            asteroid_capacity: ASTEROID_MAX,
            bullet_capacity: BULLET_MAX,
            effect_capacity: EFFECT_MAX,
        }
    }

    pub fn tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = Some(tuning);
        self
    }

    pub fn arena(mut self, arena: ArenaBounds) -> Self {
        self.arena = Some(arena);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn effects(mut self, sink: impl EffectSink + 'static) -> Self {
        self.effects = Some(Box::new(sink));
        self
    }

    pub fn score(mut self, sink: impl ScoreSink + 'static) -> Self {
        self.score = Some(Box::new(sink));
        self
    }

    pub fn outlines(mut self, builder: impl OutlineBuilder + 'static) -> Self {
        self.outlines = Some(Box::new(builder));
        self
    }

    /// Override pool sizes (tests and constrained hosts)
    pub fn capacities(mut self, asteroids: usize, bullets: usize, effects: usize) -> Self {
        self.asteroid_capacity = asteroids;
        self.bullet_capacity = bullets;
        self.effect_capacity = effects;
        self
    }

    pub fn build(self) -> Result<SimulationContext, ConfigError> {
        let arena = self.arena.ok_or(ConfigError::Missing("arena bounds"))?;
        for value in [arena.half_width, arena.half_height] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NonPositive {
                    field: "arena half extent",
                    value,
                });
            }
        }

        let tuning = self.tuning.unwrap_or_default();
        tuning.validate()?;

        let effects = self.effects.unwrap_or_else(|| {
            log::warn!("No effect sink bound; visual effects disabled");
            Box::new(NullServices)
        });
        let score = self.score.unwrap_or_else(|| {
            log::warn!("No score sink bound; score display disabled");
            Box::new(NullServices)
        });
        let mut outlines = self
            .outlines
            .unwrap_or_else(|| Box::new(RandomOutline::new(self.seed.wrapping_add(1))));

        let asteroids = AsteroidRegistry::new(self.asteroid_capacity, &tuning, outlines.as_mut());
        let bullets = BulletRegistry::new(self.bullet_capacity, &tuning);
        let effect_pool = EffectPool::new(self.effect_capacity, &tuning);

        log::info!(
            "Simulation ready: arena {:.1}x{:.1}, {} asteroids, {} bullets, seed {}",
            arena.half_width * 2.0,
            arena.half_height * 2.0,
            asteroids.capacity(),
            bullets.capacity(),
            self.seed
        );

        Ok(SimulationContext {
            tuning,
            arena,
            asteroids,
            bullets,
            effects: effect_pool,
            ship: Ship::default(),
            schedule: DelayQueue::new(),
            rng: Pcg32::seed_from_u64(self.seed),
            phase: GamePhase::Playing,
            score: 0,
            time_ticks: 0,
            next_spawn_tick: 0,
            services: Services { effects, score },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Recorder;
    use crate::sim::asteroid::AsteroidSize;
    use crate::sim::collision::EntityKind;

    fn context(recorder: &Recorder) -> SimulationContext {
        ContextBuilder::new()
            .arena(ArenaBounds::new(16.0, 9.0))
            .seed(1234)
            .effects(recorder.clone())
            .score(recorder.clone())
            .build()
            .unwrap()
    }

    fn bullet_hits(ctx: &mut SimulationContext, asteroid: crate::sim::AsteroidHandle) {
        let bullet = ctx.bullets.fire(Vec2::ZERO, Vec2::Y, Vec2::ZERO).unwrap();
        ctx.handle_collision(CollisionEvent::new(
            EntityKind::Bullet(bullet),
            EntityKind::Asteroid(asteroid),
        ));
    }

    #[test]
    fn test_build_requires_arena() {
        let err = ContextBuilder::new().build().err().unwrap();
        assert!(matches!(err, ConfigError::Missing("arena bounds")));
    }

    #[test]
    fn test_build_rejects_degenerate_arena() {
        for (w, h) in [
            (f32::NAN, 9.0),
            (16.0, f32::INFINITY),
            (0.0, 9.0),
            (16.0, -1.0),
        ] {
            let result = ContextBuilder::new().arena(ArenaBounds::new(w, h)).build();
            assert!(
                matches!(result, Err(ConfigError::NonPositive { .. })),
                "arena {w}x{h} accepted"
            );
        }
    }

    #[test]
    fn test_build_rejects_invalid_tuning() {
        let tuning = Tuning {
            bullet_speed: 0.0,
            ..Tuning::default()
        };
        let result = ContextBuilder::new()
            .arena(ArenaBounds::new(16.0, 9.0))
            .tuning(tuning)
            .build();
        assert!(matches!(result, Err(ConfigError::NonPositive { .. })));
    }

    #[test]
    fn test_build_without_sinks_degrades() {
        let ctx = ContextBuilder::new()
            .arena(ArenaBounds::new(16.0, 9.0))
            .build()
            .unwrap();
        assert_eq!(ctx.asteroids.capacity(), ASTEROID_MAX);
        assert_eq!(ctx.bullets.capacity(), BULLET_MAX);
    }

    #[test]
    fn test_destroying_small_asteroid_scores() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        let rock = ctx
            .asteroids
            .spawn(Some(AsteroidSize::Small), false, &ctx.arena, &mut ctx.rng)
            .unwrap();

        bullet_hits(&mut ctx, rock);
        assert_eq!(ctx.score, 0);
        bullet_hits(&mut ctx, rock);

        assert_eq!(ctx.score, 1);
        assert_eq!(recorder.snapshot().score, 1);
        assert_eq!(recorder.count(EffectKind::BulletHit), 2);
        assert_eq!(recorder.count(EffectKind::AsteroidExplosion), 1);
        assert_eq!(ctx.asteroids.live_count(), 0);
        assert_eq!(ctx.bullets.live_count(), 0);
    }

    #[test]
    fn test_explosion_plays_at_asteroid_centre() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        let rock = ctx
            .asteroids
            .spawn(Some(AsteroidSize::Small), false, &ctx.arena, &mut ctx.rng)
            .unwrap();
        ctx.asteroids
            .set_movement(rock, Vec2::new(4.0, -2.0), Vec2::ZERO, &mut ctx.rng);

        bullet_hits(&mut ctx, rock);
        bullet_hits(&mut ctx, rock);

        let explosion = recorder
            .snapshot()
            .effects
            .into_iter()
            .find(|e| e.kind == EffectKind::AsteroidExplosion)
            .unwrap();
        assert_eq!(explosion.position, Vec2::new(4.0, -2.0));
    }

    #[test]
    fn test_release_of_reclaimed_effect_is_harmless() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        let rock = ctx
            .asteroids
            .spawn(Some(AsteroidSize::Large), false, &ctx.arena, &mut ctx.rng)
            .unwrap();
        bullet_hits(&mut ctx, rock);
        assert_eq!(ctx.schedule.len(), 1);

        // Slot reclaimed behind the queue's back
        ctx.effects.reset_all();
        ctx.time_ticks += ctx.effects.hold_ticks();
        ctx.run_due();

        assert!(ctx.schedule.is_empty());
        assert_eq!(ctx.effects.live_count(), 0);
    }

    #[test]
    fn test_hit_effect_direction_faces_shooter() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        let rock = ctx
            .asteroids
            .spawn(Some(AsteroidSize::Large), false, &ctx.arena, &mut ctx.rng)
            .unwrap();
        bullet_hits(&mut ctx, rock);

        let effect = recorder.snapshot().effects[0];
        assert_eq!(effect.kind, EffectKind::BulletHit);
        assert!((effect.direction - Vec2::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn test_effect_slot_released_after_hold() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        let rock = ctx
            .asteroids
            .spawn(Some(AsteroidSize::Large), false, &ctx.arena, &mut ctx.rng)
            .unwrap();
        bullet_hits(&mut ctx, rock);
        assert_eq!(ctx.effects.live_count(), 1);

        let hold = ctx.effects.hold_ticks();
        ctx.time_ticks += hold - 1;
        ctx.run_due();
        assert_eq!(ctx.effects.live_count(), 1);

        ctx.time_ticks += 1;
        ctx.run_due();
        assert_eq!(ctx.effects.live_count(), 0);
    }

    #[test]
    fn test_ship_collision_schedules_full_reset() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        let rock = ctx
            .asteroids
            .spawn(Some(AsteroidSize::Medium), false, &ctx.arena, &mut ctx.rng)
            .unwrap();
        ctx.score = 7;
        ctx.bullets.fire(Vec2::ZERO, Vec2::Y, Vec2::ZERO).unwrap();

        ctx.handle_collision(CollisionEvent::new(EntityKind::Ship, EntityKind::Asteroid(rock)));
        assert_eq!(ctx.phase, GamePhase::Respawning);
        assert!(!ctx.ship.alive);
        assert!(!ctx.fire());
        assert_eq!(recorder.count(EffectKind::ShipExplosion), 1);

        // A second contact during the respawn window changes nothing
        ctx.handle_collision(CollisionEvent::new(EntityKind::Asteroid(rock), EntityKind::Ship));
        assert_eq!(ctx.schedule.len(), 2);

        ctx.time_ticks += secs_to_ticks(ctx.tuning().respawn_delay_secs);
        ctx.run_due();

        assert_eq!(ctx.phase, GamePhase::Playing);
        assert!(ctx.ship.alive);
        assert_eq!(ctx.score, 0);
        assert_eq!(ctx.asteroids.live_count(), 0);
        assert_eq!(ctx.bullets.live_count(), 0);
        assert_eq!(ctx.effects.live_count(), 0);
        assert!(ctx.schedule.is_empty());
        assert_eq!(recorder.snapshot().resets, 1);
    }

    #[test]
    fn test_restart_preempts_pending_effect_release() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        let rock = ctx
            .asteroids
            .spawn(Some(AsteroidSize::Large), false, &ctx.arena, &mut ctx.rng)
            .unwrap();
        bullet_hits(&mut ctx, rock);
        assert_eq!(ctx.schedule.len(), 1);

        ctx.restart();
        assert!(ctx.schedule.is_empty());
        assert_eq!(ctx.effects.live_count(), 0);

        // Nothing left to fire later
        ctx.time_ticks += 1_000;
        ctx.run_due();
        assert_eq!(ctx.effects.live_count(), 0);
    }

    #[test]
    fn test_fire_uses_ship_state() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        ctx.ship.pos = Vec2::new(2.0, 3.0);
        ctx.ship.vel = Vec2::new(1.0, 0.0);
        assert!(ctx.fire());

        let (_, bullet) = ctx.bullets.iter().next().unwrap();
        assert_eq!(bullet.pos, Vec2::new(2.0, 3.0));
        let expected = Vec2::Y * ctx.tuning().bullet_speed + Vec2::new(1.0, 0.0);
        assert!((bullet.vel - expected).length() < 1e-4);
    }
}
