//! Wall sliding: a slowed slide down a wall while airborne.

use engine_core::{plane_project, safe_normal_2d, SemanticTag, Vec3};
use physics::ProbeResult;

use super::WALL_PROBE_RADII;
use crate::base::MIN_TICK_TIME;
use crate::config::WallSlideConfig;
use crate::env::{Env, Probe};
use crate::kinematic::KinematicState;
use crate::mode::{Mode, ModeTag};
use crate::movement::CharacterMovement;
use crate::transitions::Attempt;

fn wall_probe(state: &KinematicState, probe: Probe<'_>) -> ProbeResult {
    let start = state.position();
    let reach = state.capsule.radius * WALL_PROBE_RADII;
    probe.ray(start, start + state.transform.forward() * reach)
}

fn floor_is_near(state: &KinematicState, config: &WallSlideConfig, probe: Probe<'_>) -> bool {
    let start = state.position();
    let depth = state.capsule.radius + config.min_height_to_slide;
    probe.ray(start, start - Vec3::Y * depth).blocking
}

/// Wall the character may slide down, if any.
///
/// Requires clearance under the character, a wall straight ahead that is not
/// a ladder, and velocity heading into that wall.
pub fn can_wall_slide(
    state: &KinematicState,
    config: &WallSlideConfig,
    probe: Probe<'_>,
) -> Option<ProbeResult> {
    if floor_is_near(state, config, probe) {
        return None;
    }
    let wall = wall_probe(state, probe);
    if !wall.is_valid_blocking_hit() || wall.has_tag(SemanticTag::Ladder) {
        return None;
    }
    (state.velocity.dot(wall.normal) < 0.0).then_some(wall)
}

impl CharacterMovement {
    pub(crate) fn try_wall_slide(&mut self, env: &mut Env<'_>) -> Attempt {
        if !matches!(self.mode, Mode::Falling) {
            return Attempt::Declined;
        }
        let Some(wall) = can_wall_slide(&self.state, &self.config.wall_slide, env.probe()) else {
            return Attempt::Declined;
        };

        let max_up = self.config.wall_slide.max_vertical_wall_slide_speed;
        let mut velocity = plane_project(self.state.velocity, wall.normal);
        velocity.y = velocity.y.max(0.0).min(max_up.max(0.0));
        self.state.velocity = velocity;

        self.set_mode(Mode::WallSliding, env);
        Attempt::Committed(ModeTag::WallSliding)
    }

    /// Gravity scale from how hard the input pushes into the wall: 1 straight
    /// into it, -1 straight away from it.
    fn wall_gravity_scale(&self, input_accel: Vec3, wall_normal: Vec3) -> f32 {
        let Some(curve) = &self.config.wall_slide.gravity_curve else {
            return 1.0;
        };
        if self.state.velocity.y > 0.0 {
            return curve.sample(0.0);
        }
        let into_wall = -safe_normal_2d(input_accel).dot(safe_normal_2d(wall_normal));
        curve.sample(into_wall)
    }

    pub(crate) fn phys_wall_slide(&mut self, dt: f32, mut iterations: u32, env: &mut Env<'_>) {
        if dt < MIN_TICK_TIME {
            return;
        }
        let probe = env.probe();
        let input_accel = self.state.acceleration;
        let mut remaining = dt;

        while self.can_substep(remaining, iterations) {
            iterations += 1;
            let tick = self.time_step(remaining, iterations);
            remaining -= tick;

            let wall = wall_probe(&self.state, probe);
            if !wall.is_valid_blocking_hit() || floor_is_near(&self.state, &self.config.wall_slide, probe) {
                self.set_mode(Mode::Falling, env);
                self.start_new_physics(remaining + tick, iterations - 1, env);
                return;
            }

            let old_location = self.state.position();
            self.state.acceleration = Vec3::ZERO;
            self.calc_velocity(tick, 0.0, self.braking_deceleration());
            self.state.velocity = plane_project(self.state.velocity, wall.normal);

            let scale = self.wall_gravity_scale(input_accel, wall.normal);
            let gravity = self.config.base.gravity();
            let max_fall = self.config.wall_slide.max_wall_slide_fall_speed;
            self.state.velocity.y = (self.state.velocity.y + gravity * scale * tick).max(-max_fall);

            let delta = self.state.velocity * tick;
            let hit = self.move_updated(delta, probe);
            if hit.blocking {
                self.slide_along_surface(delta, 1.0 - hit.time, hit.normal, probe);
            }

            if self.state.position() == old_location {
                break;
            }
            self.state.velocity = (self.state.position() - old_location) / tick;
        }

        if floor_is_near(&self.state, &self.config.wall_slide, probe)
            || !wall_probe(&self.state, probe).is_valid_blocking_hit()
        {
            self.set_mode(Mode::Falling, env);
        }
    }
}
