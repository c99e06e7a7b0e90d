//! Collision events and overlap detection
//!
//! Contacts arrive as pairs of tagged entities at tick boundaries. Dispatch
//! switches on [`EntityKind`]; nothing is looked up by type at runtime.
//! Hosts with their own physics push events directly, everyone else can
//! use [`detect_overlaps`].

use super::asteroid::AsteroidHandle;
use super::bullet::BulletHandle;
use super::state::{GamePhase, SimulationContext};

/// Something that can take part in a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Asteroid(AsteroidHandle),
    Bullet(BulletHandle),
    Ship,
}

/// Two entities touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a: EntityKind,
    pub b: EntityKind,
}

/// What a contact means for gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    BulletAsteroid {
        bullet: BulletHandle,
        asteroid: AsteroidHandle,
    },
    ShipAsteroid {
        asteroid: AsteroidHandle,
    },
    /// Pairs with no response (asteroid/asteroid, bullet/ship, ...)
    Ignored,
}

impl CollisionEvent {
    pub fn new(a: EntityKind, b: EntityKind) -> Self {
        Self { a, b }
    }

    /// Resolve the pair regardless of the order it was reported in
    pub fn classify(&self) -> Contact {
        use EntityKind::*;
        match (self.a, self.b) {
            (Bullet(bullet), Asteroid(asteroid)) | (Asteroid(asteroid), Bullet(bullet)) => {
                Contact::BulletAsteroid { bullet, asteroid }
            }
            (Ship, Asteroid(asteroid)) | (Asteroid(asteroid), Ship) => {
                Contact::ShipAsteroid { asteroid }
            }
            _ => Contact::Ignored,
        }
    }
}

/// Circle-overlap contacts for the current positions
///
/// Each bullet reports at most one asteroid (the lowest slot it touches),
/// so a bullet never damages two rocks. The ship reports only while
/// flying.
pub fn detect_overlaps(ctx: &SimulationContext) -> Vec<CollisionEvent> {
    let mut events = Vec::new();

    for (bullet, b) in ctx.bullets.iter() {
        let hit = ctx
            .asteroids
            .iter()
            .find(|(_, a)| a.pos.distance(b.pos) <= a.collision_radius());
        if let Some((asteroid, _)) = hit {
            events.push(CollisionEvent::new(
                EntityKind::Bullet(bullet),
                EntityKind::Asteroid(asteroid),
            ));
        }
    }

    if ctx.ship.alive && ctx.phase == GamePhase::Playing {
        let ship_radius = ctx.tuning().ship.collision_radius;
        let hit = ctx
            .asteroids
            .iter()
            .find(|(_, a)| a.pos.distance(ctx.ship.pos) <= ship_radius + a.collision_radius());
        if let Some((asteroid, _)) = hit {
            events.push(CollisionEvent::new(
                EntityKind::Ship,
                EntityKind::Asteroid(asteroid),
            ));
        }
    }

    events
}
