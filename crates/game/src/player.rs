//! Player controller: the locomotion machine bound to a capsule in the world.

use anyhow::{Context, Result};
use engine_core::{Transform, Vec3};
use locomotion::{
    Capsule, CharacterMovement, ClipPlayer, Env, ModeTag, MovementEvent, MovementInput,
};
use physics::{ColliderHandle, CollisionProfile, PhysicsWorld, QueryParams, RigidBodyHandle};

use crate::config::SandboxConfig;

pub struct PlayerController {
    pub movement: CharacterMovement,
    pub anim: ClipPlayer,
    query: QueryParams,
    body: RigidBodyHandle,
    collider: ColliderHandle,
    synced_capsule: Capsule,
}

impl PlayerController {
    /// Create the player's body and capsule and settle the machine into the world.
    pub fn spawn(world: &mut PhysicsWorld, config: &SandboxConfig) -> Result<Self> {
        let movement =
            CharacterMovement::new(config.locomotion.clone(), Transform::from_position(config.spawn))
                .context("creating character movement")?;
        let capsule = movement.state().capsule;
        let body = world.add_kinematic_body(config.spawn);
        let collider = world.add_capsule_collider(body, capsule.half_height, capsule.radius);
        world.update_query_pipeline();

        let mut player = Self {
            movement,
            anim: config.clips.player(),
            query: QueryParams::new(CollisionProfile::PlayerSolid).ignoring(collider),
            body,
            collider,
            synced_capsule: capsule,
        };
        let mut env = Env::new(&*world, &player.query, &mut player.anim);
        player.movement.initialize(&mut env);
        player.sync(world);
        Ok(player)
    }

    /// Advance clips and the machine by one tick, then move the body to match.
    pub fn update(
        &mut self,
        world: &mut PhysicsWorld,
        dt: f32,
        input: &MovementInput,
    ) -> Vec<MovementEvent> {
        self.anim.advance(dt);
        let mut env = Env::new(&*world, &self.query, &mut self.anim);
        self.movement.tick(dt, input, &mut env);
        self.sync(world);
        self.movement.take_events()
    }

    fn sync(&mut self, world: &mut PhysicsWorld) {
        let state = self.movement.state();
        if state.capsule != self.synced_capsule {
            world.set_capsule_size(self.collider, state.capsule.half_height, state.capsule.radius);
            self.synced_capsule = state.capsule;
        }
        world.set_kinematic_position(self.body, state.position());
        world.update_query_pipeline();
    }

    pub fn position(&self) -> Vec3 {
        self.movement.state().position()
    }

    pub fn mode(&self) -> ModeTag {
        self.movement.mode_tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{build_course, default_blocks};

    #[test]
    fn spawns_and_walks_the_course() {
        let mut world = build_course(&default_blocks()).unwrap();
        let config = SandboxConfig::default();
        let mut player = PlayerController::spawn(&mut world, &config).unwrap();

        let dt = config.tick_seconds();
        for _ in 0..60 {
            player.update(&mut world, dt, &MovementInput::default());
        }
        assert_eq!(player.mode(), ModeTag::Walking);
        let start = player.position();

        for _ in 0..60 {
            player.update(&mut world, dt, &MovementInput::moving(Vec3::NEG_Z));
        }
        assert!(player.position().z < start.z - 100.0);
    }
}
