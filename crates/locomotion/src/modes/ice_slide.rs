//! Ice sliding: walking with low friction and sluggish acceleration on ice.

use engine_core::SemanticTag;

use crate::base::{find_floor, MIN_TICK_TIME};
use crate::config::BaseConfig;
use crate::env::{Env, Probe};
use crate::kinematic::KinematicState;
use crate::mode::{Mode, ModeTag};
use crate::movement::CharacterMovement;
use crate::snapshot::{ParameterSnapshot, Tunables};
use crate::transitions::Attempt;

/// Whether the character stands on an ice-tagged walkable floor.
pub fn can_ice_slide(state: &KinematicState, base: &BaseConfig, probe: Probe<'_>) -> bool {
    let floor = find_floor(state, base, probe);
    floor.walkable && floor.hit.has_tag(SemanticTag::Ice)
}

impl CharacterMovement {
    pub(crate) fn try_ice_slide(&mut self, env: &mut Env<'_>) -> Attempt {
        if !matches!(self.mode, Mode::Walking) || !can_ice_slide(&self.state, &self.config.base, env.probe()) {
            return Attempt::Declined;
        }
        let ice = &self.config.ice_slide;
        let overrides = Tunables {
            ground_friction: ice.friction,
            braking_friction_factor: ice.braking_friction_factor,
            max_acceleration: ice.max_acceleration,
        };
        let snapshot = ParameterSnapshot::apply(&mut self.tunables, overrides);
        // The rest of this tick runs on ice, so rescale the input acceleration now.
        self.state.acceleration = self.input_vector * self.tunables.max_acceleration;
        self.set_mode(Mode::IceSliding(snapshot), env);
        Attempt::Committed(ModeTag::IceSliding)
    }

    pub(crate) fn phys_ice_slide(&mut self, dt: f32, iterations: u32, env: &mut Env<'_>) {
        if dt < MIN_TICK_TIME {
            return;
        }
        if !can_ice_slide(&self.state, &self.config.base, env.probe()) {
            // Leaving the mode restores the snapshot.
            self.set_mode(Mode::Walking, env);
            self.state.acceleration = self.input_vector * self.tunables.max_acceleration;
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
    use engine_core::{TagSet, Vec3};
    use physics::ColliderHandle;

    /// Standing rig whose floor is the only collider, so it can be retagged.
    fn ice_rig() -> (Rig, ColliderHandle) {
        let mut world = physics::PhysicsWorld::new();
        let floor = world.add_static_cuboid(
            Vec3::new(0.0, -50.0, 0.0),
            0.0,
            Vec3::new(5000.0, 50.0, 5000.0),
        );
        world.update_query_pipeline();
        let rig = Rig::build(
            world,
            Rig::clips(),
            Default::default(),
            Vec3::new(0.0, Rig::STANDING_Y, 0.0),
        );
        (rig, floor)
    }

    #[test]
    fn ice_overrides_and_restores_tunables() {
        let (mut rig, floor) = ice_rig();
        let defaults = *rig.machine.tunables();

        rig.world.set_tags(floor, TagSet::from(SemanticTag::Ice));
        rig.settle(1);
        assert!(rig.machine.is_ice_sliding());
        assert_eq!(rig.machine.tunables().ground_friction, 0.1);
        assert_eq!(rig.machine.tunables().braking_friction_factor, 3.0);
        assert_eq!(rig.machine.tunables().max_acceleration, 150.0);

        rig.world.set_tags(floor, TagSet::EMPTY);
        rig.settle(1);
        assert_eq!(rig.machine.mode_tag(), ModeTag::Walking);
        assert_eq!(*rig.machine.tunables(), defaults);
    }

    #[test]
    fn ice_is_slippery() {
        let (mut rig, floor) = ice_rig();
        rig.world.set_tags(floor, TagSet::from(SemanticTag::Ice));
        rig.settle(1);
        rig.machine.state_mut().velocity = Vec3::new(300.0, 0.0, 0.0);
        rig.settle(30);
        // Half a second on ice barely slows the character down.
        assert!(rig.machine.speed() > 200.0);
        assert!(rig.machine.is_ice_sliding());
    }

    #[test]
    fn entering_ice_uses_ice_acceleration_at_once() {
        let (mut rig, floor) = ice_rig();
        rig.world.set_tags(floor, TagSet::from(SemanticTag::Ice));
        rig.tick(&MovementInput::moving(Vec3::X));
        assert!(rig.machine.is_ice_sliding());
        assert!(rig.machine.state().acceleration.length() <= 150.0 + 1e-3);
        // One tick of ice acceleration, not a walking burst.
        assert!(rig.machine.speed() <= 150.0 * Rig::DT + 1e-2);

        rig.world.set_tags(floor, TagSet::EMPTY);
        rig.tick(&MovementInput::moving(Vec3::X));
        assert_eq!(rig.machine.mode_tag(), ModeTag::Walking);
        assert!((rig.machine.state().acceleration.length() - 4096.0).abs() < 1e-2);
    }
}
