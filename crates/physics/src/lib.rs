//! Collision world and spatial probes backed by Rapier3D.
//!
//! The locomotion state machine only ever talks to the world through the
//! [`SpatialProbe`] trait; [`PhysicsWorld`] is the production implementation.

pub mod collision;
pub mod physics_world;
pub mod probe;
pub mod raycast;

pub use collision::*;
pub use physics_world::*;
pub use probe::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};
