//! Simulation module
//!
//! All gameplay logic lives here. This module stays host-agnostic:
//! - Fixed timestep only
//! - Seeded RNG owned by the context
//! - Stable iteration order (by pool slot)
//! - No rendering, audio or platform dependencies

pub mod arena;
pub mod asteroid;
pub mod bullet;
pub mod clock;
pub mod collision;
pub mod effects;
pub mod pool;
pub mod schedule;
pub mod ship;
pub mod state;
pub mod tick;

pub use arena::ArenaBounds;
pub use asteroid::{Asteroid, AsteroidHandle, AsteroidRegistry, AsteroidSize, SplitOutcome};
pub use bullet::{Bullet, BulletHandle, BulletRegistry, HitReport};
pub use clock::FixedStepDriver;
pub use collision::{CollisionEvent, Contact, EntityKind, detect_overlaps};
pub use effects::{Effect, EffectHandle, EffectKind, EffectPool};
pub use pool::{FixedPool, Handle, Poolable};
pub use schedule::{Continuation, DelayQueue};
pub use ship::Ship;
pub use state::{ContextBuilder, GamePhase, Services, SimulationContext};
pub use tick::{TickInput, tick};
