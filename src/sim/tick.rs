//! Fixed timestep simulation tick
//!
//! One call advances the world by exactly one step. Order within a step is
//! fixed: restart, collision events, controls, integration, spawn timer,
//! out-of-bounds sweeps, then due continuations.

use super::collision::CollisionEvent;
use super::state::{GamePhase, SimulationContext};

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// -1..1, positive turns counter-clockwise
    pub turn: f32,
    /// 0..1
    pub thrust: f32,
    /// Fire one bullet this tick
    pub fire: bool,
    /// Abandon the round and start over
    pub restart: bool,
}

/// Advance the simulation by one fixed timestep
///
/// `events` are the contacts observed at the end of the previous step.
pub fn tick(ctx: &mut SimulationContext, input: &TickInput, events: &[CollisionEvent], dt: f32) {
    if input.restart {
        ctx.restart();
    }

    for event in events {
        ctx.handle_collision(*event);
    }

    if ctx.phase == GamePhase::Playing {
        let ship_tuning = ctx.tuning().ship;
        ctx.ship
            .apply_controls(input.turn, input.thrust, &ship_tuning, dt);
        if input.fire && !ctx.fire() {
            log::trace!("Fire ignored: no free bullet");
        }
    }

    // Physics
    ctx.asteroids.integrate(dt);
    ctx.bullets.integrate(dt);
    if ctx.ship.alive {
        ctx.ship.integrate(dt);
        let wrap_radius = ctx.tuning().ship.wrap_radius;
        ctx.ship.wrap(&ctx.arena, wrap_radius);
    }

    // Spawn timer
    if ctx.time_ticks >= ctx.next_spawn_tick {
        ctx.spawn_from_edge();
        ctx.next_spawn_tick = ctx.time_ticks + ctx.spawn_interval_ticks();
    }

    ctx.asteroids.sweep(&ctx.arena);
    ctx.bullets.sweep(&ctx.arena);

    ctx.time_ticks += 1;
    ctx.run_due();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::secs_to_ticks;
    use crate::services::Recorder;
    use crate::sim::arena::ArenaBounds;
    use crate::sim::asteroid::AsteroidSize;
    use crate::sim::collision::EntityKind;
    use crate::sim::state::ContextBuilder;
    use glam::Vec2;

    fn context(recorder: &Recorder) -> SimulationContext {
        ContextBuilder::new()
            .arena(ArenaBounds::new(16.0, 9.0))
            .seed(99)
            .effects(recorder.clone())
            .score(recorder.clone())
            .build()
            .unwrap()
    }

    fn idle(ctx: &mut SimulationContext, ticks: u64) {
        for _ in 0..ticks {
            tick(ctx, &TickInput::default(), &[], SIM_DT);
        }
    }

    #[test]
    fn test_first_tick_spawns_immediately() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        tick(&mut ctx, &TickInput::default(), &[], SIM_DT);
        assert_eq!(ctx.asteroids.live_count(), 1);
        assert_eq!(ctx.time_ticks, 1);
    }

    #[test]
    fn test_spawn_interval() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        let interval = ctx.spawn_interval_ticks();

        idle(&mut ctx, interval);
        assert_eq!(ctx.asteroids.live_count(), 1);
        idle(&mut ctx, 1);
        assert_eq!(ctx.asteroids.live_count(), 2);
    }

    #[test]
    fn test_fire_only_while_playing() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };

        tick(&mut ctx, &fire, &[], SIM_DT);
        assert_eq!(ctx.bullets.live_count(), 1);

        ctx.destroy_ship();
        tick(&mut ctx, &fire, &[], SIM_DT);
        assert_eq!(ctx.bullets.live_count(), 1);
    }

    #[test]
    fn test_fire_with_single_bullet_pool() {
        let recorder = Recorder::new();
        let mut ctx = ContextBuilder::new()
            .arena(ArenaBounds::new(16.0, 9.0))
            .effects(recorder.clone())
            .score(recorder.clone())
            .capacities(8, 1, 8)
            .build()
            .unwrap();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };

        tick(&mut ctx, &fire, &[], SIM_DT);
        let (first, _) = ctx.bullets.iter().next().unwrap();
        tick(&mut ctx, &fire, &[], SIM_DT);
        assert_eq!(ctx.bullets.live_count(), 1);
        // Same bullet still in flight; the second press was dropped
        assert!(ctx.bullets.get(first).is_some());
    }

    #[test]
    fn test_thrust_moves_ship() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        let thrust = TickInput {
            thrust: 1.0,
            ..Default::default()
        };
        for _ in 0..60 {
            tick(&mut ctx, &thrust, &[], SIM_DT);
        }
        assert!(ctx.ship.pos.y > 0.0);
        assert!(ctx.ship.vel.y > 0.0);
    }

    #[test]
    fn test_ship_wraps_through_tick() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        ctx.ship.pos = Vec2::new(0.0, 9.0 + 1.0);
        ctx.ship.vel = Vec2::new(0.0, 6.0);
        tick(&mut ctx, &TickInput::default(), &[], SIM_DT);
        assert!(ctx.ship.pos.y < -9.0);
    }

    #[test]
    fn test_collision_events_are_applied() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        let rock = ctx
            .asteroids
            .spawn(Some(AsteroidSize::Small), false, &ctx.arena, &mut ctx.rng)
            .unwrap();
        ctx.asteroids
            .set_movement(rock, Vec2::new(3.0, 3.0), Vec2::ZERO, &mut ctx.rng);
        let shot = ctx.bullets.fire(Vec2::new(3.0, 3.0), Vec2::Y, Vec2::ZERO).unwrap();
        let event = CollisionEvent::new(EntityKind::Bullet(shot), EntityKind::Asteroid(rock));

        tick(&mut ctx, &TickInput::default(), &[event], SIM_DT);
        assert_eq!(ctx.asteroids.get(rock).unwrap().health, 1);
        assert!(ctx.bullets.get(shot).is_none());

        // Replaying the same event is stale and changes nothing
        tick(&mut ctx, &TickInput::default(), &[event], SIM_DT);
        assert_eq!(ctx.asteroids.get(rock).unwrap().health, 1);
    }

    #[test]
    fn test_bullets_swept_after_leaving_arena() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        ctx.bullets.fire(Vec2::ZERO, Vec2::X, Vec2::ZERO).unwrap();
        // 25 units/s needs a bit over a second to clear 16 + 10
        idle(&mut ctx, secs_to_ticks(1.2));
        assert_eq!(ctx.bullets.live_count(), 0);
    }

    #[test]
    fn test_respawn_after_delay() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        idle(&mut ctx, 5);
        ctx.score = 3;
        ctx.destroy_ship();

        let delay = secs_to_ticks(ctx.tuning().respawn_delay_secs);
        idle(&mut ctx, delay - 1);
        assert_eq!(ctx.phase, GamePhase::Respawning);
        assert!(ctx.asteroids.live_count() > 0);

        idle(&mut ctx, 1);
        assert_eq!(ctx.phase, GamePhase::Playing);
        assert_eq!(ctx.score, 0);
        assert_eq!(ctx.asteroids.live_count(), 0);
        assert!(ctx.ship.alive);
        assert_eq!(ctx.ship.pos, Vec2::ZERO);
        assert_eq!(recorder.snapshot().resets, 1);

        // Spawning resumes on the very next tick
        idle(&mut ctx, 1);
        assert_eq!(ctx.asteroids.live_count(), 1);
    }

    #[test]
    fn test_restart_input() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        idle(&mut ctx, 300);
        assert!(ctx.asteroids.live_count() > 0);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut ctx, &restart, &[], SIM_DT);
        // Restart runs first, so the same tick's spawn attempt lands on a clean field
        assert_eq!(ctx.asteroids.live_count(), 1);
        assert_eq!(recorder.snapshot().resets, 1);
    }
}
