//! Rope walking: slow, careful walking on rope-tagged surfaces.

use engine_core::{SemanticTag, Vec3};

use crate::base::MIN_TICK_TIME;
use crate::config::RopeWalkConfig;
use crate::env::{Env, Probe};
use crate::kinematic::KinematicState;
use crate::mode::{Mode, ModeTag};
use crate::movement::CharacterMovement;
use crate::transitions::Attempt;

/// Whether the surface just under the capsule is a rope.
pub fn can_rope_walk(state: &KinematicState, config: &RopeWalkConfig, probe: Probe<'_>) -> bool {
    let start = state.position();
    let end = start - Vec3::Y * (state.capsule.half_height + config.probe_margin);
    let hit = probe.ray(start, end);
    hit.is_valid_blocking_hit() && hit.has_tag(SemanticTag::Rope)
}

impl CharacterMovement {
    pub(crate) fn try_rope_walk(&mut self, env: &mut Env<'_>) -> Attempt {
        if !matches!(self.mode, Mode::Walking | Mode::Falling) {
            return Attempt::Declined;
        }
        if !can_rope_walk(&self.state, &self.config.rope_walk, env.probe()) {
            return Attempt::Declined;
        }
        self.set_mode(Mode::RopeWalking, env);
        Attempt::Committed(ModeTag::RopeWalking)
    }

    pub(crate) fn phys_rope_walk(&mut self, dt: f32, iterations: u32, env: &mut Env<'_>) {
        if dt < MIN_TICK_TIME {
            return;
        }
        if !can_rope_walk(&self.state, &self.config.rope_walk, env.probe()) {
            self.set_mode(Mode::Walking, env);
            self.start_new_physics(dt, iterations, env);
            return;
        }
        self.phys_walking(dt, iterations, env);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::MovementInput;
    use crate::test_support::Rig;
    use engine_core::TagSet;

    /// A long rope-tagged beam whose top sits just above the floor.
    fn rope_rig() -> Rig {
        let mut rig = Rig::standing();
        rig.add_box(
            Vec3::new(0.0, -4.0, -500.0),
            Vec3::new(10.0, 5.0, 600.0),
            TagSet::from(SemanticTag::Rope),
        );
        rig
    }

    #[test]
    fn rope_caps_speed() {
        let mut rig = rope_rig();
        rig.tick(&MovementInput::moving(Vec3::NEG_Z));
        assert!(rig.machine.is_rope_walking());

        rig.run(60, &MovementInput::moving(Vec3::NEG_Z));
        assert!(rig.machine.is_rope_walking());
        assert!(rig.machine.speed() <= 30.0 + 1e-3);
        assert!(rig.machine.speed() > 25.0);
    }

    #[test]
    fn leaving_the_rope_returns_to_walking() {
        let mut rig = rope_rig();
        rig.tick(&MovementInput::moving(Vec3::NEG_Z));
        assert!(rig.machine.is_rope_walking());

        rig.machine.state_mut().transform.position.x = 300.0;
        rig.settle(1);
        assert_eq!(rig.machine.mode_tag(), ModeTag::Walking);
    }
}
