//! Kinematic state of the character and capsule resizing.

use engine_core::{Transform, Vec3};
use physics::ProbeShape;

use crate::config::CapsuleConfig;
use crate::env::Probe;

/// Growth tests use a capsule this much smaller so resting contacts don't count.
const GROW_TEST_INFLATION: f32 = 1.0e-3;

/// Collision capsule dimensions. `half_height` includes the hemispherical cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub radius: f32,
    pub half_height: f32,
}

impl Capsule {
    pub fn new(radius: f32, half_height: f32) -> Self {
        Self {
            radius,
            half_height: half_height.max(radius),
        }
    }

    pub fn shape(&self) -> ProbeShape {
        ProbeShape::capsule(self.radius, self.half_height)
    }
}

impl From<&CapsuleConfig> for Capsule {
    fn from(config: &CapsuleConfig) -> Self {
        Capsule::new(config.radius, config.half_height)
    }
}

/// Everything the integrators move: pose, velocity, acceleration and capsule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicState {
    pub transform: Transform,
    pub velocity: Vec3,
    /// Acceleration requested for this tick, in world units per second squared.
    pub acceleration: Vec3,
    pub capsule: Capsule,
}

impl KinematicState {
    pub fn new(transform: Transform, capsule: Capsule) -> Self {
        Self {
            transform,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            capsule,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Lowest point of the capsule.
    pub fn base(&self) -> Vec3 {
        self.transform.position - Vec3::Y * self.capsule.half_height
    }

    pub fn is_finite(&self) -> bool {
        self.transform.position.is_finite()
            && self.transform.rotation.is_finite()
            && self.velocity.is_finite()
            && self.acceleration.is_finite()
    }

    /// Shrink (or otherwise resize) the capsule while keeping its base where it is.
    ///
    /// Shrinking never fails. Use [`try_grow`](Self::try_grow) to enlarge.
    pub fn resize_keep_base(&mut self, target: Capsule) {
        let adjust = self.capsule.half_height - target.half_height;
        self.transform.position.y -= adjust;
        self.capsule = target;
        log::trace!("capsule resized to r={} hh={}", target.radius, target.half_height);
    }

    /// Grow the capsule back to `target` if the larger shape fits.
    ///
    /// The base is kept if possible, otherwise the capsule expands in place.
    /// Returns `false` (and changes nothing) when both placements are encroached.
    pub fn try_grow(&mut self, target: Capsule, probe: Probe<'_>) -> bool {
        if self.capsule == target {
            return true;
        }

        let adjust = target.half_height - self.capsule.half_height;
        let test_shape = target.shape().inflated(-GROW_TEST_INFLATION);
        let position = self.transform.position;
        let candidates = [position + Vec3::Y * adjust, position];

        for candidate in candidates {
            if !probe.overlap(test_shape, candidate) {
                self.transform.position = candidate;
                self.capsule = target;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::EmptyWorld;
    use physics::QueryParams;

    #[test]
    fn shrink_keeps_base() {
        let mut state = KinematicState::new(
            Transform::from_position(Vec3::new(0.0, 97.15, 0.0)),
            Capsule::new(20.0, 95.0),
        );
        let base = state.base();
        state.resize_keep_base(Capsule::new(20.0, 40.0));
        assert!((state.base() - base).length() < 1e-4);
        assert!((state.position().y - 42.15).abs() < 1e-4);
    }

    #[test]
    fn resize_round_trip_restores_dimensions() {
        let world = EmptyWorld;
        let query = QueryParams::default();
        let probe = Probe::new(&world, &query);
        let standing = Capsule::new(20.0, 95.0);
        let mut state =
            KinematicState::new(Transform::from_position(Vec3::new(5.0, 97.15, -3.0)), standing);

        state.resize_keep_base(Capsule::new(20.0, 40.0));
        assert!(state.try_grow(standing, probe));
        assert_eq!(state.capsule, standing);
        assert_eq!(state.capsule.radius, 20.0);
        assert_eq!(state.capsule.half_height, 95.0);
        assert!((state.position() - Vec3::new(5.0, 97.15, -3.0)).length() < 1e-4);
    }

    #[test]
    fn half_height_never_below_radius() {
        let capsule = Capsule::new(30.0, 10.0);
        assert_eq!(capsule.half_height, 30.0);
    }
}
