//! Ladder climbing: vertical movement driven by the forward input.

use engine_core::{is_nearly_zero, is_nearly_zero_f32, plane_project, safe_normal_2d, SemanticTag, Vec3};
use physics::ProbeResult;

use crate::base::MIN_TICK_TIME;
use crate::config::LocomotionConfig;
use crate::env::{Env, Probe};
use crate::kinematic::KinematicState;
use crate::mode::{Mode, ModeTag};
use crate::movement::CharacterMovement;
use crate::transitions::Attempt;

/// Input this close to the facing direction counts as "toward the ladder".
const FACING_TOLERANCE: f32 = 1.0e-4;

/// Ladder in reach ahead, if the character may climb it.
///
/// Input that does not point at the ladder refuses the climb while the
/// floor is close underneath, so a grounded character can walk away.
pub fn can_climb_ladder(
    state: &KinematicState,
    config: &LocomotionConfig,
    input: Vec3,
    probe: Probe<'_>,
) -> Option<ProbeResult> {
    let start = state.position();
    let forward = state.transform.forward();

    let toward = safe_normal_2d(input).dot(safe_normal_2d(forward)) >= 1.0 - FACING_TOLERANCE;
    if !is_nearly_zero(input) && !toward {
        let depth = state.capsule.radius + config.ladder.min_floor_height;
        if probe.ray(start, start - Vec3::Y * depth).blocking {
            return None;
        }
    }

    let hit = probe.ray(start, start + forward * config.ladder.reach);
    (hit.is_valid_blocking_hit() && hit.has_tag(SemanticTag::Ladder)).then_some(hit)
}

impl CharacterMovement {
    pub(crate) fn try_climb_ladder(&mut self, env: &mut Env<'_>) -> Attempt {
        if !matches!(self.mode, Mode::Walking | Mode::Falling) {
            return Attempt::Declined;
        }
        let Some(ladder) = can_climb_ladder(&self.state, &self.config, self.input_vector, env.probe())
        else {
            return Attempt::Declined;
        };

        if matches!(self.mode, Mode::Falling) {
            self.state.velocity = safe_normal_2d(plane_project(self.state.velocity, ladder.normal));
        }
        self.set_mode(Mode::ClimbLadder, env);
        Attempt::Committed(ModeTag::ClimbLadder)
    }

    fn update_climb_direction(&mut self, direction: f32) {
        let unset = is_nearly_zero_f32(self.last_climb_direction);
        if unset || (!is_nearly_zero_f32(direction) && direction != self.last_climb_direction) {
            self.last_climb_direction = direction;
        }
    }

    pub(crate) fn phys_climb_ladder(&mut self, dt: f32, mut iterations: u32, env: &mut Env<'_>) {
        if dt < MIN_TICK_TIME {
            return;
        }
        let probe = env.probe();
        let climb_speed = self.config.ladder.climb_speed;
        let mut remaining = dt;

        while self.can_substep(remaining, iterations) {
            iterations += 1;
            let tick = self.time_step(remaining, iterations);
            remaining -= tick;

            if can_climb_ladder(&self.state, &self.config, self.input_vector, probe).is_none() {
                self.set_mode(Mode::Falling, env);
                self.start_new_physics(remaining + tick, iterations - 1, env);
                return;
            }

            let direction = self.input_vector.dot(self.state.transform.forward());
            self.update_climb_direction(direction);

            self.state.velocity = Vec3::Y * (climb_speed * direction);

            let delta = self.state.velocity * tick;
            self.move_updated(delta, probe);
        }

        if can_climb_ladder(&self.state, &self.config, self.input_vector, probe).is_none() {
            self.set_mode(Mode::Falling, env);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::MovementInput;
    use crate::test_support::Rig;
    use engine_core::TagSet;

    /// Ladder-tagged wall whose face is at `z = -30`.
    fn ladder_rig() -> Rig {
        let mut rig = Rig::standing();
        rig.add_box(
            Vec3::new(0.0, 500.0, -40.0),
            Vec3::new(50.0, 500.0, 10.0),
            TagSet::from(SemanticTag::Ladder),
        );
        rig
    }

    #[test]
    fn climbs_with_forward_input() {
        let mut rig = ladder_rig();
        let up = MovementInput::moving(Vec3::NEG_Z);
        rig.tick(&up);
        assert!(rig.machine.is_climbing_ladder());

        let start_y = rig.machine.state().position().y;
        rig.run(60, &up);
        let climbed = rig.machine.state().position().y - start_y;
        assert!((climbed - 50.0).abs() < 2.0);
        assert!(rig.machine.is_climbing_ladder());
        assert!((rig.machine.climb_ladder_direction() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn climb_direction_survives_released_input() {
        let mut rig = ladder_rig();
        rig.run(10, &MovementInput::moving(Vec3::NEG_Z));
        rig.settle(5);
        assert!(rig.machine.is_climbing_ladder());
        assert!((rig.machine.climb_ladder_direction() - 1.0).abs() < 1e-4);
        assert!(rig.machine.state().velocity.y.abs() < 1e-4);
    }

    #[test]
    fn sideways_input_near_the_floor_is_refused() {
        let rig = ladder_rig();
        let probe = Probe::new(&rig.world, &rig.query);
        let state = rig.machine.state();
        let config = rig.machine.config();
        assert!(can_climb_ladder(state, config, Vec3::X, probe).is_none());
        assert!(can_climb_ladder(state, config, Vec3::NEG_Z, probe).is_some());
        assert!(can_climb_ladder(state, config, Vec3::ZERO, probe).is_some());
    }
}
