//! Error types for configuration and tick invariants.

use thiserror::Error;

/// Rejected [`LocomotionConfig`](crate::LocomotionConfig) values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("capsule {field} must be positive, got {value}")]
    NonPositiveCapsule { field: &'static str, value: f32 },
    #[error("capsule half-height {half_height} is smaller than its radius {radius}")]
    HalfHeightBelowRadius { radius: f32, half_height: f32 },
    #[error("max simulation iterations must be at least 1")]
    ZeroIterations,
    #[error("max simulation time step must be positive, got {0}")]
    NonPositiveTimeStep(f32),
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must lie within [0, 90] degrees, got {value}")]
    AngleOutOfRange { field: &'static str, value: f32 },
    #[error("curve {0} has no keys")]
    EmptyCurve(&'static str),
    #[error("curve {0} keys are not sorted by time")]
    UnsortedCurve(&'static str),
}

/// Invariant violations detected at the end of a tick.
///
/// These indicate a defect in an integrator, never a runtime condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocomotionError {
    #[error("kinematic state became non-finite in {mode:?}")]
    NonFiniteState { mode: crate::ModeTag },
    #[error("tick delta {0} is not a finite non-negative number")]
    NonFiniteDelta(f32),
}
