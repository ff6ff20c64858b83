//! Crawling: a low, clip-paced crawl toggled on and off.

use crate::anim::ClipId;
use crate::base::{find_floor, MIN_TICK_TIME};
use crate::config::BaseConfig;
use crate::env::{Env, Probe};
use crate::kinematic::{Capsule, KinematicState};
use crate::mode::{Mode, ModeTag};
use crate::movement::CharacterMovement;
use crate::transitions::Attempt;

pub fn can_crawl(state: &KinematicState, base: &BaseConfig, probe: Probe<'_>) -> bool {
    find_floor(state, base, probe).walkable
}

impl CharacterMovement {
    /// Handles both toggling into a crawl and toggling back out of it.
    pub(crate) fn try_crawl(&mut self, env: &mut Env<'_>) -> Attempt {
        match self.mode {
            Mode::Crawling { .. } if !self.wants.crawl => {
                if self.exit_crawl(env) {
                    Attempt::Committed(ModeTag::Walking)
                } else {
                    Attempt::Declined
                }
            }
            Mode::Walking if self.wants.crawl => {
                if !can_crawl(&self.state, &self.config.base, env.probe()) {
                    return Attempt::Declined;
                }
                let low = Capsule::new(self.state.capsule.radius, self.config.crouch_slide.half_height);
                self.state.resize_keep_base(low);
                self.crouched = false;
                self.set_mode(Mode::Crawling { clip_finished: true }, env);
                Attempt::Committed(ModeTag::Crawling)
            }
            _ => Attempt::Declined,
        }
    }

    /// Stand back up. Refused (returning `false`) while there is no room to stand.
    pub(crate) fn exit_crawl(&mut self, env: &mut Env<'_>) -> bool {
        let standing = Capsule::from(&self.config.capsule);
        if !self.state.try_grow(standing, env.probe()) {
            log::warn!("no room to stand up, still crawling");
            return false;
        }
        if let Mode::Crawling { clip_finished } = &mut self.mode {
            if !*clip_finished {
                env.anim.stop_clip();
                *clip_finished = true;
            }
        }
        self.state.transform.level();
        self.wants.crawl = false;
        self.set_mode(Mode::Walking, env);
        true
    }

    fn crawl_clip_finished(&self) -> bool {
        matches!(self.mode, Mode::Crawling { clip_finished: true })
    }

    pub(crate) fn phys_crawl(&mut self, dt: f32, iterations: u32, env: &mut Env<'_>) {
        if dt < MIN_TICK_TIME {
            return;
        }
        if !can_crawl(&self.state, &self.config.base, env.probe()) && self.exit_crawl(env) {
            self.start_new_physics(dt, iterations, env);
            return;
        }

        if self.wants.movement && self.crawl_clip_finished() && self.play_clip(ClipId::Crawl, env) {
            self.mode = Mode::Crawling {
                clip_finished: false,
            };
        }
        // A started crawl cycle carries on even after the input is released.
        if !self.wants.movement && !self.crawl_clip_finished() {
            self.state.acceleration =
                self.state.transform.forward_2d() * self.tunables.max_acceleration;
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

    fn toggle() -> MovementInput {
        MovementInput {
            crawl_toggle: true,
            ..Default::default()
        }
    }

    #[test]
    fn crawl_toggles_in_and_out() {
        let mut rig = Rig::standing();
        rig.tick(&toggle());
        assert!(rig.machine.is_crawling());
        assert_eq!(rig.machine.state().capsule.half_height, 40.0);

        rig.tick(&toggle());
        assert_eq!(rig.machine.mode_tag(), ModeTag::Walking);
        assert_eq!(rig.machine.state().capsule.half_height, 95.0);
    }

    #[test]
    fn crawl_cycle_plays_clip_and_caps_speed() {
        let mut rig = Rig::standing();
        rig.tick(&toggle());
        rig.run(20, &MovementInput::moving(Vec3::NEG_Z));
        assert_eq!(rig.anim.playing(), Some(ClipId::Crawl));
        assert!(rig.machine.speed() <= 50.0 + 1e-3);

        // Input released mid-cycle: the crawl keeps going until the clip ends.
        rig.settle(5);
        assert!(rig.machine.speed() > 40.0);
        rig.settle(60);
        assert!(rig.machine.speed() < 1.0);
        assert!(matches!(
            rig.machine.mode(),
            Mode::Crawling {
                clip_finished: true
            }
        ));
    }

    #[test]
    fn exit_refused_under_a_ceiling() {
        let mut rig = Rig::standing();
        rig.tick(&toggle());
        assert!(rig.machine.is_crawling());
        let ceiling = rig.add_box(
            Vec3::new(0.0, 110.0, 0.0),
            Vec3::new(500.0, 10.0, 500.0),
            TagSet::EMPTY,
        );

        rig.tick(&toggle());
        assert!(rig.machine.is_crawling());
        assert_eq!(rig.machine.state().capsule.half_height, 40.0);

        rig.remove_box(ceiling);
        rig.settle(1);
        assert_eq!(rig.machine.mode_tag(), ModeTag::Walking);
        assert_eq!(rig.machine.state().capsule.half_height, 95.0);
    }
}
