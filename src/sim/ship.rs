//! Player ship flight model
//!
//! Thrust-and-turn with drag that only engages while the matching control
//! is released, so holding a control never bleeds speed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::ArenaBounds;
use crate::heading_from_rotation;
use crate::tuning::ShipTuning;

/// Controls below this magnitude count as released
const INPUT_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Radians, counter-clockwise; 0 faces +Y
    pub rotation: f32,
    /// Radians per second
    pub angular_vel: f32,
    pub alive: bool,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            angular_vel: 0.0,
            alive: true,
        }
    }
}

impl Ship {
    /// Unit facing vector
    pub fn heading(&self) -> Vec2 {
        heading_from_rotation(self.rotation)
    }

    /// Apply one tick of controls
    ///
    /// `turn` in [-1, 1] (positive turns counter-clockwise), `thrust` in
    /// [0, 1]; reverse thrust is clamped away.
    pub fn apply_controls(&mut self, turn: f32, thrust: f32, tuning: &ShipTuning, dt: f32) {
        let turn = turn.clamp(-1.0, 1.0);
        let thrust = thrust.clamp(0.0, 1.0);

        let mut angular_vel = self.angular_vel + turn * tuning.turn_acceleration * dt;
        if turn.abs() < INPUT_EPSILON {
            angular_vel *= 1.0 - tuning.turn_drag / 10.0;
        }
        self.angular_vel = angular_vel.clamp(-tuning.max_turn_speed, tuning.max_turn_speed);

        let mut vel = self.vel + self.heading() * thrust * tuning.acceleration * dt;
        if thrust < INPUT_EPSILON {
            vel *= 1.0 - tuning.drag / 10.0;
        }
        self.vel = vel.clamp_length_max(tuning.max_speed);
    }

    pub fn integrate(&mut self, dt: f32) {
        self.rotation += self.angular_vel * dt;
        self.pos += self.vel * dt;
    }

    /// Toroidal wrap at the arena edge; true if the ship was teleported
    pub fn wrap(&mut self, arena: &ArenaBounds, inclusion_radius: f32) -> bool {
        match arena.wrap(self.pos, inclusion_radius) {
            Some(pos) => {
                self.pos = pos;
                true
            }
            None => false,
        }
    }

    /// Back to the centre, at rest, alive
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_thrust_accelerates_along_heading() {
        let tuning = ShipTuning::default();
        let mut ship = Ship::default();
        ship.apply_controls(0.0, 1.0, &tuning, SIM_DT);
        assert!(ship.vel.y > 0.0);
        assert!(ship.vel.x.abs() < 1e-6);
    }

    #[test]
    fn test_reverse_thrust_is_ignored() {
        let tuning = ShipTuning::default();
        let mut ship = Ship::default();
        ship.apply_controls(0.0, -1.0, &tuning, SIM_DT);
        assert_eq!(ship.vel, Vec2::ZERO);
    }

    #[test]
    fn test_speed_is_capped() {
        let tuning = ShipTuning::default();
        let mut ship = Ship::default();
        for _ in 0..10_000 {
            ship.apply_controls(0.0, 1.0, &tuning, SIM_DT);
        }
        assert!(ship.vel.length() <= tuning.max_speed + 1e-4);
    }

    #[test]
    fn test_drag_only_when_coasting() {
        let tuning = ShipTuning::default();
        let mut ship = Ship::default();
        ship.vel = Vec2::new(0.0, 5.0);
        ship.apply_controls(0.0, 1.0, &tuning, SIM_DT);
        assert!(ship.vel.y > 5.0);

        let before = ship.vel.length();
        ship.apply_controls(0.0, 0.0, &tuning, SIM_DT);
        let expected = before * (1.0 - tuning.drag / 10.0);
        assert!((ship.vel.length() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_turning_is_capped_and_decays() {
        let tuning = ShipTuning::default();
        let mut ship = Ship::default();
        for _ in 0..1_000 {
            ship.apply_controls(1.0, 0.0, &tuning, SIM_DT);
        }
        assert!((ship.angular_vel - tuning.max_turn_speed).abs() < 1e-4);

        ship.apply_controls(0.0, 0.0, &tuning, SIM_DT);
        assert!(ship.angular_vel < tuning.max_turn_speed);
    }

    #[test]
    fn test_wrap_mirrors_clamped_position() {
        let arena = ArenaBounds::new(16.0, 9.0);
        let mut ship = Ship {
            pos: Vec2::new(16.0 + 1.5, 0.0),
            ..Default::default()
        };
        assert!(ship.wrap(&arena, 1.0));
        assert!((ship.pos.x + 17.0).abs() < 1e-5);
        assert!(!ship.wrap(&arena, 1.0));
    }
}
