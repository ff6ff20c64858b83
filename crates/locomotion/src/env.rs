//! The collaborators a tick talks to: world probes and the animation driver.

use engine_core::Vec3;
use physics::{ProbeResult, ProbeShape, QueryParams, SpatialProbe};

use crate::anim::AnimationDriver;

/// Borrowed collaborators for one tick.
pub struct Env<'a> {
    pub world: &'a dyn SpatialProbe,
    /// Collision profile and the colliders that belong to the character.
    pub query: &'a QueryParams,
    pub anim: &'a mut dyn AnimationDriver,
}

impl<'a> Env<'a> {
    pub fn new(
        world: &'a dyn SpatialProbe,
        query: &'a QueryParams,
        anim: &'a mut dyn AnimationDriver,
    ) -> Self {
        Self { world, query, anim }
    }

    /// Probe view that does not hold a borrow of the `Env` itself.
    pub fn probe(&self) -> Probe<'a> {
        Probe::new(self.world, self.query)
    }
}

/// World queries with the character's own colliders already filtered out.
#[derive(Clone, Copy)]
pub struct Probe<'a> {
    world: &'a dyn SpatialProbe,
    query: &'a QueryParams,
}

impl<'a> Probe<'a> {
    pub fn new(world: &'a dyn SpatialProbe, query: &'a QueryParams) -> Self {
        Self { world, query }
    }

    pub fn ray(&self, start: Vec3, end: Vec3) -> ProbeResult {
        let hit = self.world.raycast(start, end, self.query);
        log::trace!("ray {:?} -> {:?} blocking={}", start, end, hit.blocking);
        hit
    }

    pub fn ray_all(&self, start: Vec3, end: Vec3) -> Vec<ProbeResult> {
        self.world.raycast_all(start, end, self.query)
    }

    pub fn sweep(&self, shape: ProbeShape, start: Vec3, end: Vec3) -> ProbeResult {
        self.world.sweep(shape, start, end, self.query)
    }

    pub fn overlap(&self, shape: ProbeShape, position: Vec3) -> bool {
        self.world.overlap_test(shape, position, self.query)
    }
}
