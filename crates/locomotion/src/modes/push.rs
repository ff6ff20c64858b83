//! Pushing: slow walking while leaning into a movable object.

use engine_core::SemanticTag;

use crate::base::{find_floor, MIN_TICK_TIME};
use crate::config::LocomotionConfig;
use crate::env::{Env, Probe};
use crate::kinematic::{Capsule, KinematicState};
use crate::mode::{Mode, ModeTag};
use crate::movement::CharacterMovement;
use crate::transitions::Attempt;

/// Whether the character stands on walkable ground facing a movable object in reach.
pub fn can_push(state: &KinematicState, config: &LocomotionConfig, probe: Probe<'_>) -> bool {
    if !find_floor(state, &config.base, probe).walkable {
        return false;
    }
    let start = state.position();
    let hit = probe.ray(start, start + state.transform.forward() * config.push.reach);
    hit.is_valid_blocking_hit() && hit.has_tag(SemanticTag::Movable)
}

impl CharacterMovement {
    pub(crate) fn try_push(&mut self, env: &mut Env<'_>) -> Attempt {
        if !matches!(self.mode, Mode::Walking) || !can_push(&self.state, &self.config, env.probe()) {
            return Attempt::Declined;
        }
        // Pushing stands the character up; exit restores the standing capsule.
        self.crouched = false;
        self.wants.crouch = false;
        // Thinner capsule so the character can lean into the object.
        self.state.capsule = Capsule::new(self.config.push.capsule_radius, self.state.capsule.half_height);
        self.set_mode(Mode::Pushing, env);
        Attempt::Committed(ModeTag::Pushing)
    }

    pub(crate) fn phys_push(&mut self, dt: f32, iterations: u32, env: &mut Env<'_>) {
        if dt < MIN_TICK_TIME {
            return;
        }
        if !can_push(&self.state, &self.config, env.probe()) {
            let standing = Capsule::from(&self.config.capsule);
            if self.state.try_grow(standing, env.probe()) {
                self.set_mode(Mode::Walking, env);
                self.start_new_physics(dt, iterations, env);
                return;
            }
            log::warn!("no room to restore the capsule, still pushing");
        }
        self.phys_walking(dt, iterations, env);
    }
}
