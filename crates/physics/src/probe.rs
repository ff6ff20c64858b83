//! Spatial probe interface: ray casts, shape sweeps and overlap tests.
//!
//! A probe that hits nothing is a normal outcome and is reported as a
//! non-blocking [`ProbeResult`], never as an error.

use engine_core::{SemanticTag, TagSet, Vec3};
use rapier3d::prelude::ColliderHandle;

use crate::collision::CollisionProfile;

/// Result of a single probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    /// Whether something blocking was hit.
    pub blocking: bool,
    /// Fraction of the probe travelled before the hit (1.0 on a miss).
    pub time: f32,
    /// Distance travelled before the hit.
    pub distance: f32,
    /// Probe origin (ray) or shape centre (sweep) at the time of the hit.
    pub location: Vec3,
    /// Contact point on the hit surface.
    pub impact_point: Vec3,
    /// Surface normal at the contact, pointing away from the hit collider.
    pub normal: Vec3,
    /// The probe started inside the hit collider.
    pub start_penetrating: bool,
    /// Collider that was hit.
    pub collider: Option<ColliderHandle>,
    /// Semantic tags of the entity that was hit.
    pub tags: TagSet,
}

impl ProbeResult {
    /// A probe from `start` to `end` that hit nothing.
    pub fn miss(start: Vec3, end: Vec3) -> Self {
        Self {
            blocking: false,
            time: 1.0,
            distance: (end - start).length(),
            location: end,
            impact_point: end,
            normal: Vec3::ZERO,
            start_penetrating: false,
            collider: None,
            tags: TagSet::EMPTY,
        }
    }

    /// Blocking hit that did not start inside geometry.
    pub fn is_valid_blocking_hit(&self) -> bool {
        self.blocking && !self.start_penetrating
    }

    pub fn has_tag(&self, tag: SemanticTag) -> bool {
        self.blocking && self.tags.contains(tag)
    }
}

/// Shape swept or overlapped by a probe. Both shapes are symmetric around Y,
/// so probes take a position rather than a full pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeShape {
    Sphere { radius: f32 },
    /// Upright capsule. `half_height` includes the hemispherical cap.
    Capsule { radius: f32, half_height: f32 },
}

impl ProbeShape {
    pub fn capsule(radius: f32, half_height: f32) -> Self {
        ProbeShape::Capsule {
            radius,
            half_height,
        }
    }

    /// Same shape with every dimension grown by `amount` (negative shrinks).
    pub fn inflated(self, amount: f32) -> Self {
        match self {
            ProbeShape::Sphere { radius } => ProbeShape::Sphere {
                radius: (radius + amount).max(0.0),
            },
            ProbeShape::Capsule {
                radius,
                half_height,
            } => ProbeShape::Capsule {
                radius: (radius + amount).max(0.0),
                half_height: (half_height + amount).max(0.0),
            },
        }
    }
}

/// Per-query parameters: which profile to use and which colliders to skip.
///
/// The character's own capsule and anything attached to it belong in `ignored`.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pub profile: CollisionProfile,
    pub ignored: Vec<ColliderHandle>,
}

impl QueryParams {
    pub fn new(profile: CollisionProfile) -> Self {
        Self {
            profile,
            ignored: Vec::new(),
        }
    }

    pub fn ignoring(mut self, collider: ColliderHandle) -> Self {
        self.add_ignored(collider);
        self
    }

    pub fn add_ignored(&mut self, collider: ColliderHandle) {
        if !self.ignored.contains(&collider) {
            self.ignored.push(collider);
        }
    }

    pub fn is_ignored(&self, collider: ColliderHandle) -> bool {
        self.ignored.contains(&collider)
    }
}

/// Synchronous spatial queries against world geometry.
pub trait SpatialProbe {
    /// Cast a ray from `start` to `end`, returning the first blocking hit.
    fn raycast(&self, start: Vec3, end: Vec3, params: &QueryParams) -> ProbeResult;

    /// Cast a ray from `start` to `end`, returning every hit ordered by hit time.
    fn raycast_all(&self, start: Vec3, end: Vec3, params: &QueryParams) -> Vec<ProbeResult>;

    /// Sweep `shape` from `start` to `end`, returning the first blocking hit.
    fn sweep(&self, shape: ProbeShape, start: Vec3, end: Vec3, params: &QueryParams)
        -> ProbeResult;

    /// Check whether `shape` placed at `position` overlaps any blocking geometry.
    fn overlap_test(&self, shape: ProbeShape, position: Vec3, params: &QueryParams) -> bool;
}
