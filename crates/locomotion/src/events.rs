//! Events produced during a tick, drained by the host.

use engine_core::Vec3;

use crate::anim::ClipId;
use crate::mode::ModeTag;

/// How a landing was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingOutcome {
    Soft,
    /// Movement disabled until the hard-landing clip finishes.
    HardLanding,
    /// Rolling recovery; jumping is blocked until the clip finishes.
    Roll,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementEvent {
    ModeChanged { from: ModeTag, to: ModeTag },
    Landed { speed: f32, outcome: LandingOutcome },
    Jumped { off_wall: bool },
    /// Airborne dash applied as a velocity change.
    DashImpulse { delta_v: Vec3 },
    ClipRequested(ClipId),
}
