//! Shared fixtures for the state machine tests.

use engine_core::{TagSet, Transform, Vec3};
use physics::{ColliderHandle, PhysicsWorld, ProbeResult, ProbeShape, QueryParams, SpatialProbe};

use crate::anim::{ClipId, ClipPlayer};
use crate::config::LocomotionConfig;
use crate::env::{Env, Probe};
use crate::intent::MovementInput;
use crate::movement::CharacterMovement;

/// A world with nothing in it.
pub(crate) struct EmptyWorld;

impl SpatialProbe for EmptyWorld {
    fn raycast(&self, start: Vec3, end: Vec3, _: &QueryParams) -> ProbeResult {
        ProbeResult::miss(start, end)
    }

    fn raycast_all(&self, _: Vec3, _: Vec3, _: &QueryParams) -> Vec<ProbeResult> {
        Vec::new()
    }

    fn sweep(&self, _: ProbeShape, start: Vec3, end: Vec3, _: &QueryParams) -> ProbeResult {
        ProbeResult::miss(start, end)
    }

    fn overlap_test(&self, _: ProbeShape, _: Vec3, _: &QueryParams) -> bool {
        false
    }
}

/// A character on a large floor whose top is at `y = 0`.
pub(crate) struct Rig {
    pub world: PhysicsWorld,
    pub query: QueryParams,
    pub anim: ClipPlayer,
    pub machine: CharacterMovement,
}

impl Rig {
    pub const DT: f32 = 1.0 / 60.0;
    /// Capsule centre of a default character standing on the floor.
    pub const STANDING_Y: f32 = 97.15;

    pub fn clips() -> ClipPlayer {
        ClipPlayer::new()
            .with_clip(ClipId::HardLanding, 0.5)
            .with_clip(ClipId::FallingToRoll, 0.6)
            .with_clip(ClipId::Crawl, 0.8)
            .with_clip(ClipId::Mantle, 0.5)
            .with_clip(ClipId::GroundedDash, 0.4)
    }

    pub fn floor_world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.add_static_cuboid(Vec3::new(0.0, -50.0, 0.0), 0.0, Vec3::new(5000.0, 50.0, 5000.0));
        world.update_query_pipeline();
        world
    }

    pub fn build(world: PhysicsWorld, anim: ClipPlayer, config: LocomotionConfig, spawn: Vec3) -> Self {
        let machine = CharacterMovement::new(config, Transform::from_position(spawn))
            .expect("test config is valid");
        let mut rig = Self {
            world,
            query: QueryParams::default(),
            anim,
            machine,
        };
        let mut env = Env::new(&rig.world, &rig.query, &mut rig.anim);
        rig.machine.initialize(&mut env);
        rig
    }

    pub fn standing() -> Self {
        Self::standing_with(LocomotionConfig::default())
    }

    pub fn standing_with(config: LocomotionConfig) -> Self {
        Self::build(
            Self::floor_world(),
            Self::clips(),
            config,
            Vec3::new(0.0, Self::STANDING_Y, 0.0),
        )
    }

    pub fn falling_from(position: Vec3) -> Self {
        Self::build(Self::floor_world(), Self::clips(), LocomotionConfig::default(), position)
    }

    /// Static box given by centre and half extents.
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, tags: TagSet) -> ColliderHandle {
        let handle = self.world.add_tagged_cuboid(center, 0.0, half_extents, tags);
        self.world.update_query_pipeline();
        handle
    }

    pub fn remove_box(&mut self, handle: ColliderHandle) {
        self.world.remove_collider(handle);
        self.world.update_query_pipeline();
    }

    pub fn probe(&self) -> Probe<'_> {
        Probe::new(&self.world, &self.query)
    }

    pub fn tick_with(&mut self, dt: f32, input: &MovementInput) {
        if dt.is_finite() && dt > 0.0 {
            self.anim.advance(dt);
        }
        let mut env = Env::new(&self.world, &self.query, &mut self.anim);
        self.machine.tick(dt, input, &mut env);
    }

    pub fn tick(&mut self, input: &MovementInput) {
        self.tick_with(Self::DT, input);
    }

    pub fn run(&mut self, ticks: usize, input: &MovementInput) {
        for _ in 0..ticks {
            self.tick(input);
        }
    }

    pub fn settle(&mut self, ticks: usize) {
        self.run(ticks, &MovementInput::default());
    }
}
