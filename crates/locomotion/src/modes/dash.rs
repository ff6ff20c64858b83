//! Dashing: a clip-timed displacement on the ground, an impulse in the air.

use engine_core::{is_nearly_zero, plane_project, safe_normal_2d, Vec3};

use crate::anim::{ClipId, DisplacementTrack};
use crate::env::Env;
use crate::events::MovementEvent;
use crate::mode::{Mode, ModeTag};
use crate::movement::{CharacterMovement, DashState};
use crate::transitions::Attempt;

/// Whether the cooldown allows a new dash at `now`.
pub fn can_dash(dash: &DashState, now: f64, cooldown: f32) -> bool {
    if dash.in_progress {
        return false;
    }
    match dash.last_start {
        Some(last) => now - last >= f64::from(cooldown),
        None => true,
    }
}

impl CharacterMovement {
    pub(crate) fn try_dash(&mut self, env: &mut Env<'_>) -> Attempt {
        if !self.wants.dash {
            return Attempt::Declined;
        }
        self.wants.dash = false;
        if !can_dash(&self.dash, self.clock, self.config.dash.cooldown) {
            log::trace!("dash on cooldown");
            return Attempt::Declined;
        }

        match self.mode {
            Mode::Walking => self.start_grounded_dash(env),
            Mode::Falling | Mode::WallSliding => self.airborne_dash(),
            _ => Attempt::Declined,
        }
    }

    fn start_grounded_dash(&mut self, env: &mut Env<'_>) -> Attempt {
        let Some(duration) = env.anim.clip_length(ClipId::GroundedDash) else {
            log::warn!("grounded dash clip is unset, dash declined");
            return Attempt::Declined;
        };

        let floor = self.find_floor(env.probe());
        let forward = self.state.transform.forward_2d();
        let direction = plane_project(forward, floor.normal()).normalize_or(forward);
        let start = self.state.position();
        let target = start + direction * self.config.dash.grounded_distance;

        self.dash.in_progress = true;
        self.dash.last_start = Some(self.clock);
        self.set_mode(Mode::Dashing(DisplacementTrack::new(start, target, duration)), env);
        self.play_clip(ClipId::GroundedDash, env);
        Attempt::Committed(ModeTag::Dashing)
    }

    fn airborne_dash(&mut self) -> Attempt {
        let before = self.state.velocity;
        if self.state.velocity.y < 0.0 || is_nearly_zero(self.input_vector) {
            self.state.velocity.y -= self.config.dash.falling_impulse;
        } else {
            self.state.velocity += safe_normal_2d(self.state.velocity) * self.config.dash.forward_impulse;
        }
        self.dash.last_start = Some(self.clock);

        let delta_v = self.state.velocity - before;
        self.events.push(MovementEvent::DashImpulse { delta_v });
        log::debug!("airborne dash {:?}", delta_v);
        Attempt::Applied
    }
}
