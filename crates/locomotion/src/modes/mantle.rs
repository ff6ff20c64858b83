//! Mantling: climbing onto a ledge in front of the character.
//!
//! The ledge is found in stages: a ray ahead finds a steep wall the
//! character is facing, a downward ray just behind the wall face finds a
//! walkable top within reach, and the capsule must fit on that top. The
//! climb itself is a displacement track timed by the mantle clip.

use engine_core::{Vec3, KINDA_SMALL_NUMBER};

use crate::anim::{ClipId, DisplacementTrack};
use crate::base::AVG_FLOOR_DIST;
use crate::config::LocomotionConfig;
use crate::env::{Env, Probe};
use crate::kinematic::KinematicState;
use crate::mode::{Mode, ModeTag};
use crate::movement::CharacterMovement;
use crate::transitions::Attempt;

/// The wall check always reaches at least this far past the capsule.
const MIN_FRONT_CHECK_MARGIN: f32 = 30.0;

/// Capsule centre on top of the ledge ahead, if the character can mantle onto it.
pub fn find_mantle_target(
    state: &KinematicState,
    config: &LocomotionConfig,
    probe: Probe<'_>,
) -> Option<Vec3> {
    let mantle = &config.mantle;
    let capsule = state.capsule;
    let forward = state.transform.forward_2d();
    if forward == Vec3::ZERO {
        return None;
    }

    let cos_wall_steepness = mantle.min_wall_steepness.to_radians().cos();
    let cos_surface = mantle.max_surface_angle.to_radians().cos();
    let cos_alignment = mantle.max_alignment.to_radians().cos();

    // Wall ahead: reach grows with forward speed, within bounds.
    let front_start = state.position() + Vec3::Y * mantle.up_offset;
    let check_distance = state
        .velocity
        .dot(forward)
        .max(capsule.radius + MIN_FRONT_CHECK_MARGIN)
        .min(mantle.max_front_check);
    let wall = probe.ray(front_start, front_start + forward * check_distance);
    if !wall.is_valid_blocking_hit() {
        return None;
    }
    if wall.normal.y.abs() > cos_wall_steepness || forward.dot(-wall.normal) < cos_alignment {
        return None;
    }

    // Top of the wall, probed downward from above the reach height.
    let wall_up = Vec3::Y - wall.normal * wall.normal.y;
    let wall_up = wall_up.normalize_or_zero();
    let sin_wall = (1.0 - wall.normal.y * wall.normal.y).sqrt();
    if sin_wall < KINDA_SMALL_NUMBER || wall_up == Vec3::ZERO {
        return None;
    }
    let surface_end = wall.impact_point + forward;
    let surface_start = surface_end + wall_up * (mantle.reach_height / sin_wall);
    let surface = probe
        .ray_all(surface_start, surface_end)
        .into_iter()
        .find(|hit| hit.is_valid_blocking_hit())?;
    if surface.normal.y < cos_surface {
        return None;
    }
    if surface.impact_point.y - front_start.y > mantle.reach_height {
        return None;
    }

    // The capsule must fit standing on the ledge.
    let sin_surface = (1.0 - surface.normal.y * surface.normal.y).max(0.0).sqrt();
    let target = surface.impact_point
        + forward * capsule.radius
        + Vec3::Y * (capsule.half_height + 2.0 * capsule.radius * sin_surface + AVG_FLOOR_DIST);
    if probe.overlap(capsule.shape(), target) {
        return None;
    }
    Some(target)
}

impl CharacterMovement {
    pub(crate) fn try_mantle(&mut self, env: &mut Env<'_>) -> Attempt {
        if !matches!(self.mode, Mode::Falling | Mode::WallSliding | Mode::ClimbLadder) {
            return Attempt::Declined;
        }
        let Some(target) = find_mantle_target(&self.state, &self.config, env.probe()) else {
            return Attempt::Declined;
        };
        let Some(duration) = env.anim.clip_length(ClipId::Mantle) else {
            log::warn!("mantle clip is unset, ledge at {:?} ignored", target);
            return Attempt::Declined;
        };

        let track = DisplacementTrack::new(self.state.position(), target, duration);
        self.state.acceleration = Vec3::ZERO;
        self.state.velocity = Vec3::ZERO;
        self.set_mode(Mode::Mantling(track), env);
        self.play_clip(ClipId::Mantle, env);
        log::debug!("mantling onto {:?} over {}s", target, duration);
        Attempt::Committed(ModeTag::Mantling)
    }
}
