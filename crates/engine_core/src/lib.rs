//! Core engine types and utilities for the Aria locomotion workspace.
//!
//! This crate provides the foundational types shared by the physics, locomotion
//! and sandbox crates:
//! - Transform with forward/right/up and yaw helpers
//! - Deterministic simulation clock
//! - Semantic tags carried by world entities
//! - Small vector helpers used by movement code

pub mod math;
pub mod tags;
pub mod time;
pub mod transform;

pub use math::*;
pub use tags::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat3, Quat, Vec2, Vec3};
