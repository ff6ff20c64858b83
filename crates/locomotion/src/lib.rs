//! Character locomotion state machine for the Aria workspace.
//!
//! A base walk/fall simulation with special modes layered on top:
//! - Wall slide, crouch slide, rope walk, push, crawl
//! - Mantle and grounded dash, driven by displacement tracks
//! - Ladder climb, airborne dash, ice slide
//!
//! The machine reaches the world only through [`physics::SpatialProbe`] and
//! drives animation only through [`AnimationDriver`], both borrowed per tick
//! in an [`Env`].

pub mod anim;
pub mod base;
pub mod config;
pub mod env;
pub mod error;
pub mod events;
pub mod intent;
pub mod kinematic;
pub mod mode;
pub mod modes;
pub mod movement;
pub mod snapshot;
pub mod transitions;

#[cfg(test)]
pub(crate) mod test_support;

pub use anim::{AnimationDriver, ClipId, ClipPlayer, DisplacementTrack};
pub use base::FloorResult;
pub use config::*;
pub use env::{Env, Probe};
pub use error::{ConfigError, LocomotionError};
pub use events::{LandingOutcome, MovementEvent};
pub use intent::MovementInput;
pub use kinematic::{Capsule, KinematicState};
pub use mode::{BaseMode, Mode, ModeTag};
pub use movement::{CharacterMovement, DashState};
pub use snapshot::{ParameterSnapshot, Tunables};
pub use transitions::{dispatch, Attempt, Rule};
