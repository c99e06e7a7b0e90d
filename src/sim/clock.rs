//! Variable-rate frames to fixed-rate ticks
//!
//! Hosts call [`FixedStepDriver::sample_input`] whenever they poll devices
//! and [`FixedStepDriver::advance`] once per frame. One-shot buttons are
//! latched until a tick consumes them, so a press between two ticks is
//! never lost and never fires twice.

use std::mem;

use super::collision::{CollisionEvent, detect_overlaps};
use super::state::SimulationContext;
use super::tick::{TickInput, tick};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Longest frame the driver will simulate; anything longer is a stall
const MAX_FRAME_DT: f32 = 0.1;

pub struct FixedStepDriver {
    accumulator: f32,
    input: TickInput,
    pending: Vec<CollisionEvent>,
    detect_collisions: bool,
}

impl Default for FixedStepDriver {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FixedStepDriver {
    /// `detect_collisions` runs the built-in overlap pass after every tick;
    /// hosts with their own physics turn it off and push events instead.
    pub fn new(detect_collisions: bool) -> Self {
        Self {
            accumulator: 0.0,
            input: TickInput::default(),
            pending: Vec::new(),
            detect_collisions,
        }
    }

    /// Record the latest device state
    pub fn sample_input(&mut self, sampled: TickInput) {
        self.input.turn = sampled.turn;
        self.input.thrust = sampled.thrust;
        self.input.fire |= sampled.fire;
        self.input.restart |= sampled.restart;
    }

    /// Queue a contact for the next tick
    pub fn push_collision(&mut self, event: CollisionEvent) {
        self.pending.push(event);
    }

    pub fn pending_collisions(&self) -> usize {
        self.pending.len()
    }

    /// Run as many fixed ticks as `frame_dt` covers; returns how many ran
    pub fn advance(&mut self, ctx: &mut SimulationContext, frame_dt: f32) -> u32 {
        // A bogus frame time counts as no time at all
        let frame_dt = if frame_dt.is_finite() { frame_dt } else { 0.0 };
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let events = mem::take(&mut self.pending);
            tick(ctx, &self.input, &events, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.fire = false;
            self.input.restart = false;

            if self.detect_collisions {
                self.pending.extend(detect_overlaps(ctx));
            }
        }

        if self.accumulator >= SIM_DT {
            log::debug!("Dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }

        substeps
    }
}
