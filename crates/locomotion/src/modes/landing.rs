//! Landing reactions: soft landings, hard landings and rolls.

use engine_core::{is_nearly_zero, Vec3};

use crate::anim::ClipId;
use crate::env::Env;
use crate::events::{LandingOutcome, MovementEvent};
use crate::mode::Mode;
use crate::movement::CharacterMovement;

impl CharacterMovement {
    /// React to touching down on a walkable surface after a fall.
    ///
    /// Fast landings either lock movement for the hard-landing clip (no input)
    /// or roll, which blocks jumping until the roll clip finishes.
    pub fn on_landed(&mut self, _normal: Vec3, env: &mut Env<'_>) {
        let speed = self.state.velocity.y.abs();
        let outcome = if speed < self.config.landing.hard_landing_speed {
            LandingOutcome::Soft
        } else if is_nearly_zero(self.input_vector) || is_nearly_zero(self.state.velocity) {
            if self.play_clip(ClipId::HardLanding, env) {
                self.set_mode(Mode::Disabled, env);
                LandingOutcome::HardLanding
            } else {
                LandingOutcome::Soft
            }
        } else if self.play_clip(ClipId::FallingToRoll, env) {
            self.saved_can_jump = Some(self.can_jump);
            self.can_jump = false;
            LandingOutcome::Roll
        } else {
            LandingOutcome::Soft
        };

        log::debug!("landed at {} ({:?})", speed, outcome);
        self.events.push(MovementEvent::Landed { speed, outcome });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Env;
    use crate::intent::MovementInput;
    use crate::mode::ModeTag;
    use crate::test_support::Rig;

    fn landings(rig: &mut Rig) -> Vec<(f32, LandingOutcome)> {
        rig.machine
            .take_events()
            .into_iter()
            .filter_map(|event| match event {
                MovementEvent::Landed { speed, outcome } => Some((speed, outcome)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn hard_landing_locks_movement_until_clip_ends() {
        let mut rig = Rig::falling_from(Vec3::new(0.0, 300.0, 0.0));
        rig.machine.state_mut().velocity = Vec3::new(0.0, -1800.0, 0.0);
        rig.settle(10);

        assert_eq!(rig.machine.mode_tag(), ModeTag::None);
        assert_eq!(rig.anim.history(), &[ClipId::HardLanding]);
        let landed = landings(&mut rig);
        assert_eq!(landed.len(), 1);
        assert_eq!(landed[0].1, LandingOutcome::HardLanding);
        assert!(landed[0].0 >= 1700.0);

        // Input is ignored while disabled.
        let position = rig.machine.state().position();
        rig.run(5, &MovementInput::moving(Vec3::X));
        assert_eq!(rig.machine.state().position(), position);

        rig.settle(30);
        assert_eq!(rig.machine.mode_tag(), ModeTag::Walking);
    }

    #[test]
    fn soft_landing_changes_nothing() {
        let mut rig = Rig::falling_from(Vec3::new(0.0, 300.0, 0.0));
        rig.machine.state_mut().velocity = Vec3::new(0.0, -100.0, 0.0);
        rig.settle(30);

        assert_eq!(rig.machine.mode_tag(), ModeTag::Walking);
        assert!(rig.anim.history().is_empty());
        let landed = landings(&mut rig);
        assert_eq!(landed.len(), 1);
        assert_eq!(landed[0].1, LandingOutcome::Soft);
        assert!(rig.machine.can_jump());
    }

    #[test]
    fn moving_hard_landing_rolls_and_blocks_jump() {
        let mut rig = Rig::falling_from(Vec3::new(0.0, 300.0, 0.0));
        rig.machine.state_mut().velocity = Vec3::new(0.0, -1800.0, 0.0);
        rig.run(10, &MovementInput::moving(Vec3::X));

        assert_eq!(rig.machine.mode_tag(), ModeTag::Walking);
        assert_eq!(rig.anim.history(), &[ClipId::FallingToRoll]);
        assert!(!rig.machine.can_jump());

        rig.run(5, &MovementInput {
            jump_pressed: true,
            ..Default::default()
        });
        assert_eq!(rig.machine.mode_tag(), ModeTag::Walking);

        rig.run(40, &MovementInput {
            jump_released: true,
            ..Default::default()
        });
        assert!(rig.machine.can_jump());
    }

    #[test]
    fn threshold_is_inclusive() {
        for (vy, expected) in [
            (-1699.0, LandingOutcome::Soft),
            (-1700.0, LandingOutcome::HardLanding),
        ] {
            let mut rig = Rig::falling_from(Vec3::new(0.0, 300.0, 0.0));
            rig.machine.take_events();
            rig.machine.state_mut().velocity = Vec3::new(0.0, vy, 0.0);
            let mut env = Env::new(&rig.world, &rig.query, &mut rig.anim);
            rig.machine.on_landed(Vec3::Y, &mut env);
            let landed = landings(&mut rig);
            assert_eq!(landed, vec![(-vy, expected)]);
        }
    }
}
