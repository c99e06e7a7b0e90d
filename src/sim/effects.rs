//! Pooled visual effects
//!
//! Playback itself belongs to the host's [`EffectSink`]; the simulation only
//! rations effect slots so bursts of hits can't flood the renderer. A slot
//! is held for a fixed time and then released by a scheduled continuation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::{FixedPool, Handle, Poolable};
use crate::error::PoolError;
use crate::secs_to_ticks;
use crate::services::EffectSink;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Spark where a bullet struck an asteroid
    BulletHit,
    /// Small asteroid breaking apart
    AsteroidExplosion,
    /// Player ship destroyed
    ShipExplosion,
}

/// A pooled effect slot
#[derive(Debug, Clone, Copy)]
pub struct Effect {
    pub kind: EffectKind,
    pub pos: Vec2,
    pub active: bool,
}

impl Poolable for Effect {
    fn deactivate(&mut self) {
        self.active = false;
    }
}

pub type EffectHandle = Handle<Effect>;

pub struct EffectPool {
    pool: FixedPool<Effect>,
    hold_ticks: u64,
}

impl EffectPool {
    pub fn new(capacity: usize, tuning: &Tuning) -> Self {
        Self {
            pool: FixedPool::new(capacity, |_| Effect {
                kind: EffectKind::BulletHit,
                pos: Vec2::ZERO,
                active: false,
            }),
            hold_ticks: secs_to_ticks(tuning.hit_effect_secs),
        }
    }

    /// Ticks a played effect keeps its slot
    pub fn hold_ticks(&self) -> u64 {
        self.hold_ticks
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    /// Take a slot and start playback; skipped entirely when the pool is empty
    pub fn play(
        &mut self,
        kind: EffectKind,
        pos: Vec2,
        direction: Vec2,
        scale: f32,
        sink: &mut dyn EffectSink,
    ) -> Option<EffectHandle> {
        let handle = self.pool.try_acquire()?;
        if let Some(effect) = self.pool.get_mut(handle) {
            effect.kind = kind;
            effect.pos = pos;
            effect.active = true;
        }
        sink.play_effect(kind, pos, direction, scale);
        Some(handle)
    }

    pub fn release(&mut self, handle: EffectHandle) -> Result<(), PoolError> {
        self.pool.release(handle)
    }

    pub fn reset_all(&mut self) -> usize {
        self.pool.reset_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Recorder;

    #[test]
    fn test_play_reaches_sink() {
        let recorder = Recorder::new();
        let mut sink = recorder.clone();
        let mut effects = EffectPool::new(2, &Tuning::default());

        let h = effects
            .play(EffectKind::BulletHit, Vec2::new(1.0, 1.0), Vec2::NEG_Y, 1.0, &mut sink)
            .unwrap();
        assert_eq!(effects.live_count(), 1);
        assert_eq!(recorder.count(EffectKind::BulletHit), 1);

        effects.release(h).unwrap();
        assert_eq!(effects.live_count(), 0);
    }

    #[test]
    fn test_exhausted_pool_skips_playback() {
        let recorder = Recorder::new();
        let mut sink = recorder.clone();
        let mut effects = EffectPool::new(1, &Tuning::default());

        assert!(effects.play(EffectKind::BulletHit, Vec2::ZERO, Vec2::Y, 1.0, &mut sink).is_some());
        assert!(effects.play(EffectKind::BulletHit, Vec2::ZERO, Vec2::Y, 1.0, &mut sink).is_none());
        assert_eq!(recorder.count(EffectKind::BulletHit), 1);
    }

    #[test]
    fn test_hold_ticks_from_tuning() {
        let effects = EffectPool::new(1, &Tuning::default());
        assert_eq!(effects.hold_ticks(), 60);
    }
}
