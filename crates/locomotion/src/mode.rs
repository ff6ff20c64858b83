//! Movement modes.

use serde::{Deserialize, Serialize};

use crate::anim::DisplacementTrack;
use crate::snapshot::ParameterSnapshot;

/// The active mode together with the state only that mode needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Movement locked (hard landing). No integration, no transitions.
    Disabled,
    Walking,
    Falling,
    WallSliding,
    CrouchSliding {
        elapsed: f32,
    },
    RopeWalking,
    Pushing,
    Crawling {
        clip_finished: bool,
    },
    Mantling(DisplacementTrack),
    ClimbLadder,
    /// Grounded dash. Airborne dashes are impulses and never enter a mode.
    Dashing(DisplacementTrack),
    IceSliding(ParameterSnapshot),
}

/// Data-free mode label for queries, events and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeTag {
    None,
    Walking,
    Falling,
    Flying,
    WallSliding,
    CrouchSliding,
    RopeWalking,
    Pushing,
    Crawling,
    Mantling,
    ClimbLadder,
    Dashing,
    IceSliding,
}

/// Base simulation mode underneath a [`Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseMode {
    None,
    Walking,
    Falling,
    /// Position owned by a displacement track.
    Flying,
    Custom,
}

impl Mode {
    pub fn tag(&self) -> ModeTag {
        match self {
            Mode::Disabled => ModeTag::None,
            Mode::Walking => ModeTag::Walking,
            Mode::Falling => ModeTag::Falling,
            Mode::WallSliding => ModeTag::WallSliding,
            Mode::CrouchSliding { .. } => ModeTag::CrouchSliding,
            Mode::RopeWalking => ModeTag::RopeWalking,
            Mode::Pushing => ModeTag::Pushing,
            Mode::Crawling { .. } => ModeTag::Crawling,
            Mode::Mantling(_) => ModeTag::Mantling,
            Mode::ClimbLadder => ModeTag::ClimbLadder,
            Mode::Dashing(_) => ModeTag::Dashing,
            Mode::IceSliding(_) => ModeTag::IceSliding,
        }
    }

    pub fn base(&self) -> BaseMode {
        match self {
            Mode::Disabled => BaseMode::None,
            Mode::Walking => BaseMode::Walking,
            Mode::Falling => BaseMode::Falling,
            Mode::Mantling(_) | Mode::Dashing(_) => BaseMode::Flying,
            Mode::WallSliding
            | Mode::CrouchSliding { .. }
            | Mode::RopeWalking
            | Mode::Pushing
            | Mode::Crawling { .. }
            | Mode::ClimbLadder
            | Mode::IceSliding(_) => BaseMode::Custom,
        }
    }

    /// Active displacement track, if a track owns the position.
    pub fn track(&self) -> Option<&DisplacementTrack> {
        match self {
            Mode::Mantling(track) | Mode::Dashing(track) => Some(track),
            _ => None,
        }
    }

    pub fn track_mut(&mut self) -> Option<&mut DisplacementTrack> {
        match self {
            Mode::Mantling(track) | Mode::Dashing(track) => Some(track),
            _ => None,
        }
    }

    /// Modes that run with a shrunk capsule.
    pub fn uses_reduced_capsule(&self) -> bool {
        matches!(
            self,
            Mode::CrouchSliding { .. } | Mode::Crawling { .. } | Mode::Pushing
        )
    }

    /// Modes whose yaw follows the acceleration.
    pub fn orients_to_movement(&self) -> bool {
        matches!(
            self,
            Mode::Walking
                | Mode::Falling
                | Mode::RopeWalking
                | Mode::Pushing
                | Mode::Crawling { .. }
                | Mode::IceSliding(_)
        )
    }

    pub fn is_grounded(&self) -> bool {
        self.base() == BaseMode::Walking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Vec3;

    #[test]
    fn displacement_modes_fly() {
        let track = DisplacementTrack::new(Vec3::ZERO, Vec3::Y, 1.0);
        assert_eq!(Mode::Mantling(track).base(), BaseMode::Flying);
        assert_eq!(Mode::Dashing(track).base(), BaseMode::Flying);
        assert!(Mode::Dashing(track).track().is_some());
        assert!(Mode::Walking.track().is_none());
    }

    #[test]
    fn special_modes_are_custom() {
        assert_eq!(Mode::ClimbLadder.base(), BaseMode::Custom);
        assert_eq!(Mode::Crawling { clip_finished: true }.tag(), ModeTag::Crawling);
        assert_eq!(Mode::Disabled.tag(), ModeTag::None);
        assert!(Mode::Pushing.uses_reduced_capsule());
        assert!(!Mode::RopeWalking.uses_reduced_capsule());
    }
}
