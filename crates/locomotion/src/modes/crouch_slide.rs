//! Crouch sliding: a speed-boosted low slide along the floor.

use engine_core::{plane_project, rotation_from_forward_up, safe_normal_2d, Vec3};

use crate::base::{find_floor, FloorResult, MIN_TICK_TIME};
use crate::config::LocomotionConfig;
use crate::env::{Env, Probe};
use crate::kinematic::{Capsule, KinematicState};
use crate::mode::{Mode, ModeTag};
use crate::movement::CharacterMovement;
use crate::transitions::Attempt;

/// Strafe input is ignored unless it is at least this sideways.
const STRAFE_THRESHOLD: f32 = 0.5;

/// Floor to slide on, if the character is fast enough and on walkable ground.
pub fn can_crouch_slide(
    state: &KinematicState,
    config: &LocomotionConfig,
    probe: Probe<'_>,
) -> Option<FloorResult> {
    let min_speed = config.crouch_slide.min_speed_to_enter;
    if state.velocity.length_squared() <= min_speed * min_speed {
        return None;
    }
    let floor = find_floor(state, &config.base, probe);
    floor.walkable.then_some(floor)
}

impl CharacterMovement {
    pub(crate) fn try_crouch_slide(&mut self, env: &mut Env<'_>) -> Attempt {
        if !matches!(self.mode, Mode::Walking) || !self.wants.slide {
            return Attempt::Declined;
        }
        if can_crouch_slide(&self.state, &self.config, env.probe()).is_none() {
            return Attempt::Declined;
        }

        let impulse = self.config.crouch_slide.enter_impulse;
        self.state.velocity += safe_normal_2d(self.state.velocity) * impulse;
        let sliding = Capsule::new(self.state.capsule.radius, self.config.crouch_slide.half_height);
        self.state.resize_keep_base(sliding);
        self.crouched = false;

        self.set_mode(Mode::CrouchSliding { elapsed: 0.0 }, env);
        Attempt::Committed(ModeTag::CrouchSliding)
    }

    /// Leave the slide. Refused (returning `false`) while there is no room to stand.
    pub(crate) fn exit_crouch_slide(&mut self, env: &mut Env<'_>) -> bool {
        let standing = Capsule::from(&self.config.capsule);
        if !self.state.try_grow(standing, env.probe()) {
            log::warn!("no room to stand up, staying in the slide");
            return false;
        }
        self.state.transform.level();
        self.wants.slide = false;
        self.set_mode(Mode::Walking, env);
        true
    }

    /// Keep only the sideways part of the input, and only when it is mostly sideways.
    fn strafe_acceleration(&self) -> Vec3 {
        let right = self.state.transform.right();
        let accel = self.state.acceleration;
        if accel.normalize_or_zero().dot(right).abs() > STRAFE_THRESHOLD {
            right * accel.dot(right)
        } else {
            Vec3::ZERO
        }
    }

    pub(crate) fn phys_crouch_slide(&mut self, dt: f32, mut iterations: u32, env: &mut Env<'_>) {
        if dt < MIN_TICK_TIME {
            return;
        }
        let probe = env.probe();
        let max_seconds = self.config.crouch_slide.max_seconds;
        let mut remaining = dt;

        while self.can_substep(remaining, iterations) {
            iterations += 1;
            let tick = self.time_step(remaining, iterations);
            remaining -= tick;

            let Some(floor) = can_crouch_slide(&self.state, &self.config, probe) else {
                if self.exit_crouch_slide(env) {
                    self.start_new_physics(remaining + tick, iterations - 1, env);
                    return;
                }
                break;
            };

            let old_location = self.state.position();
            self.state.acceleration = self.strafe_acceleration();
            self.calc_velocity(tick, self.config.crouch_slide.friction, self.braking_deceleration());

            let normal = floor.normal();
            let delta = plane_project(self.state.velocity * tick, normal);
            if let Some(rotation) = rotation_from_forward_up(delta.normalize_or_zero(), normal) {
                self.state.transform.rotation = rotation;
            }

            let hit = self.move_updated(delta, probe);
            if hit.blocking {
                self.slide_along_surface(delta, 1.0 - hit.time, hit.normal, probe);
            }
            let floor = self.find_floor(probe);
            self.adjust_floor_height(&floor, probe);
            self.state.velocity = (self.state.position() - old_location) / tick;

            if let Mode::CrouchSliding { elapsed } = &mut self.mode {
                *elapsed += tick;
            }
        }

        let elapsed = match self.mode {
            Mode::CrouchSliding { elapsed } => elapsed,
            _ => return,
        };
        let timed_out = max_seconds > 0.0 && elapsed >= max_seconds;
        if timed_out || can_crouch_slide(&self.state, &self.config, probe).is_none() {
            self.exit_crouch_slide(env);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::MovementInput;
    use crate::test_support::Rig;
    use engine_core::TagSet;

    fn slide_press() -> MovementInput {
        MovementInput {
            slide_pressed: true,
            ..Default::default()
        }
    }

    #[test]
    fn fast_slide_enters_with_impulse() {
        let mut rig = Rig::standing();
        rig.machine.state_mut().velocity = Vec3::new(0.0, 0.0, -400.0);
        rig.tick(&slide_press());

        assert!(rig.machine.is_crouch_sliding());
        assert_eq!(rig.machine.state().capsule.half_height, 40.0);
        assert!(rig.machine.speed() > 800.0);
        assert!((rig.machine.state().base().y - 2.15).abs() < 0.3);
    }

    #[test]
    fn releasing_slide_does_not_exit() {
        let mut rig = Rig::standing();
        rig.machine.state_mut().velocity = Vec3::new(0.0, 0.0, -400.0);
        rig.tick(&slide_press());
        rig.tick(&MovementInput {
            slide_released: true,
            ..Default::default()
        });
        rig.settle(2);
        assert!(rig.machine.is_crouch_sliding());
    }

    #[test]
    fn slow_slide_is_refused() {
        let mut rig = Rig::standing();
        rig.machine.state_mut().velocity = Vec3::new(0.0, 0.0, -350.0);
        rig.tick(&slide_press());
        assert_eq!(rig.machine.mode_tag(), ModeTag::Walking);
        assert_eq!(rig.machine.state().capsule.half_height, 95.0);
    }

    #[test]
    fn slide_ends_and_restores_capsule() {
        let mut rig = Rig::standing();
        rig.machine.state_mut().velocity = Vec3::new(0.0, 0.0, -400.0);
        rig.tick(&slide_press());
        rig.tick(&MovementInput {
            slide_released: true,
            ..Default::default()
        });
        rig.settle(90);

        assert_eq!(rig.machine.mode_tag(), ModeTag::Walking);
        let state = rig.machine.state();
        assert_eq!(state.capsule.half_height, 95.0);
        assert!((state.base().y - 2.15).abs() < 0.3);
        assert!(state.transform.up().y > 0.999);
    }

    #[test]
    fn exit_waits_for_headroom() {
        let mut rig = Rig::standing();
        rig.machine.state_mut().velocity = Vec3::new(0.0, 0.0, -400.0);
        rig.tick(&slide_press());
        let z = rig.machine.state().position().z;
        rig.add_box(
            Vec3::new(0.0, 110.0, z),
            Vec3::new(2000.0, 10.0, 2000.0),
            TagSet::EMPTY,
        );

        let mut env = Env::new(&rig.world, &rig.query, &mut rig.anim);
        assert!(!rig.machine.exit_crouch_slide(&mut env));
        assert!(rig.machine.is_crouch_sliding());
        assert_eq!(rig.machine.state().capsule.half_height, 40.0);
    }
}
