//! External collaborators
//!
//! The simulation never renders, plays sound or draws UI. It reports what
//! happened through these narrow traits and the host decides what to show.

use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::effects::EffectKind;

/// Visual effect playback (fire-and-forget)
pub trait EffectSink {
    /// Start an effect at `position`, oriented along `direction`, scaled by `scale`
    fn play_effect(&mut self, kind: EffectKind, position: Vec2, direction: Vec2, scale: f32);
}

/// Score display
pub trait ScoreSink {
    fn on_score(&mut self, delta: u32);
    fn on_reset(&mut self);
}

/// Closed polygon describing an asteroid's silhouette in unit space
#[derive(Debug, Clone, PartialEq)]
pub struct AsteroidOutline {
    vertices: Vec<Vec2>,
}

impl AsteroidOutline {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Distance of the nearest vertex from the centre
    pub fn min_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.length())
            .fold(f32::INFINITY, f32::min)
            .min(self.max_radius())
    }

    /// Distance of the farthest vertex from the centre (0 for an empty outline)
    pub fn max_radius(&self) -> f32 {
        self.vertices.iter().map(|v| v.length()).fold(0.0, f32::max)
    }
}

/// Mesh/outline construction
pub trait OutlineBuilder {
    fn build_asteroid_outline(&mut self, segments: usize) -> AsteroidOutline;
}

/// Jagged outline: evenly spaced angles, each vertex at a random radius in [0.5, 1)
pub struct RandomOutline {
    rng: Pcg32,
}

impl RandomOutline {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl OutlineBuilder for RandomOutline {
    fn build_asteroid_outline(&mut self, segments: usize) -> AsteroidOutline {
        let step = TAU / segments.max(1) as f32;
        let vertices = (0..segments)
            .map(|i| {
                let dist = self.rng.random_range(0.5..1.0);
                let theta = step * i as f32;
                Vec2::new(dist * theta.cos(), dist * theta.sin())
            })
            .collect();
        AsteroidOutline::new(vertices)
    }
}

/// Collaborator that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullServices;

impl EffectSink for NullServices {
    fn play_effect(&mut self, _kind: EffectKind, _position: Vec2, _direction: Vec2, _scale: f32) {}
}

impl ScoreSink for NullServices {
    fn on_score(&mut self, _delta: u32) {}
    fn on_reset(&mut self) {}
}

/// Collaborator that reports through the `log` facade (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogServices;

impl EffectSink for LogServices {
    fn play_effect(&mut self, kind: EffectKind, position: Vec2, _direction: Vec2, scale: f32) {
        log::trace!("effect {kind:?} at ({:.1}, {:.1}) x{scale:.1}", position.x, position.y);
    }
}

impl ScoreSink for LogServices {
    fn on_score(&mut self, delta: u32) {
        log::debug!("score +{delta}");
    }

    fn on_reset(&mut self) {
        log::info!("score reset");
    }
}

/// One effect request seen by a [`Recorder`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedEffect {
    pub kind: EffectKind,
    pub position: Vec2,
    pub direction: Vec2,
    pub scale: f32,
}

/// Everything a [`Recorder`] has observed
#[derive(Debug, Default, Clone)]
pub struct Recording {
    pub effects: Vec<RecordedEffect>,
    pub score: u64,
    pub resets: u32,
}

/// Shared-log collaborator; clones observe the same recording
///
/// Lets a host (or a test) hand one clone to the simulation and read the
/// other after ticking.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    inner: Rc<RefCell<Recording>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Recording {
        self.inner.borrow().clone()
    }

    pub fn count(&self, kind: EffectKind) -> usize {
        self.inner
            .borrow()
            .effects
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }
}

impl EffectSink for Recorder {
    fn play_effect(&mut self, kind: EffectKind, position: Vec2, direction: Vec2, scale: f32) {
        self.inner.borrow_mut().effects.push(RecordedEffect {
            kind,
            position,
            direction,
            scale,
        });
    }
}

impl ScoreSink for Recorder {
    fn on_score(&mut self, delta: u32) {
        self.inner.borrow_mut().score += u64::from(delta);
    }

    fn on_reset(&mut self) {
        let mut rec = self.inner.borrow_mut();
        rec.score = 0;
        rec.resets += 1;
    }
}
