//! Overridable movement tunables and the snapshot used to restore them.

use crate::config::BaseConfig;

/// Global movement constants that a mode may temporarily override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunables {
    pub ground_friction: f32,
    pub braking_friction_factor: f32,
    pub max_acceleration: f32,
}

impl From<&BaseConfig> for Tunables {
    fn from(base: &BaseConfig) -> Self {
        Self {
            ground_friction: base.ground_friction,
            braking_friction_factor: base.braking_friction_factor,
            max_acceleration: base.max_acceleration,
        }
    }
}

/// Values captured when a mode overrides [`Tunables`].
///
/// The snapshot lives inside the mode that took it, so each override has
/// exactly one owner and restoring consumes it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use = "a snapshot must be restored when the overriding mode exits"]
pub struct ParameterSnapshot {
    saved: Tunables,
}

impl ParameterSnapshot {
    /// Capture `tunables`, then replace them with `overrides`.
    pub fn apply(tunables: &mut Tunables, overrides: Tunables) -> Self {
        let snapshot = Self { saved: *tunables };
        *tunables = overrides;
        snapshot
    }

    pub fn saved(&self) -> &Tunables {
        &self.saved
    }

    pub fn restore(self, tunables: &mut Tunables) {
        *tunables = self.saved;
    }
}
