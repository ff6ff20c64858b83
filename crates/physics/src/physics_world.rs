//! Physics world management with Rapier3D.

use std::collections::HashMap;

use crate::collision::CollisionGroup;
use engine_core::{TagSet, Vec3};
use rapier3d::na::{Isometry3, Vector3};
use rapier3d::prelude::*;

/// Environment collision groups so static geometry collides with the player and props.
fn env_collision_groups() -> InteractionGroups {
    CollisionGroup::interaction_groups(CollisionGroup::environment())
}

/// Main physics world: collider storage, the query pipeline used by probes,
/// and the semantic tags attached to each collider. Nothing is simulated;
/// bodies move only when placed kinematically.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub island_manager: IslandManager,
    pub query_pipeline: QueryPipeline,
    tags: HashMap<ColliderHandle, TagSet>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
            tags: HashMap::new(),
        }
    }

    /// Update query pipeline for probes. Call after adding, removing, moving
    /// or resizing colliders.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a kinematic rigid body (for the player capsule).
    pub fn add_kinematic_body(&mut self, position: Vec3) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::kinematic_position_based()
            .translation(vector![position.x, position.y, position.z])
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a capsule collider (good for characters). `half_height` includes the caps.
    pub fn add_capsule_collider(
        &mut self,
        body_handle: RigidBodyHandle,
        half_height: f32,
        radius: f32,
    ) -> ColliderHandle {
        let segment_half = (half_height - radius).max(0.0);
        let collider = ColliderBuilder::capsule_y(segment_half, radius)
            .collision_groups(CollisionGroup::interaction_groups(CollisionGroup::player()))
            .build();
        self.collider_set.insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Resize a capsule collider in place (crouch, slide, crawl).
    pub fn set_capsule_size(&mut self, handle: ColliderHandle, half_height: f32, radius: f32) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            let segment_half = (half_height - radius).max(0.0);
            collider.set_shape(SharedShape::capsule_y(segment_half, radius));
        }
    }

    /// Add a static cuboid collider with no parent body.
    /// `translation`: world position of center. `rotation_y_rad`: rotation around Y axis in radians.
    /// `half_extents`: half sizes in local X, Y, Z (after rotation).
    pub fn add_static_cuboid(
        &mut self,
        translation: Vec3,
        rotation_y_rad: f32,
        half_extents: Vec3,
    ) -> ColliderHandle {
        self.add_tagged_cuboid(translation, rotation_y_rad, half_extents, TagSet::EMPTY)
    }

    /// Add a static cuboid carrying semantic tags (rope, ladder, movable, ice).
    pub fn add_tagged_cuboid(
        &mut self,
        translation: Vec3,
        rotation_y_rad: f32,
        half_extents: Vec3,
        tags: TagSet,
    ) -> ColliderHandle {
        let tra = vector![translation.x, translation.y, translation.z];
        let axisangle = Vector3::y_axis().into_inner() * (rotation_y_rad as Real);
        let position = Isometry3::new(tra, axisangle);
        let collider = ColliderBuilder::cuboid(
            half_extents.x as Real,
            half_extents.y as Real,
            half_extents.z as Real,
        )
        .position(position)
        .collision_groups(env_collision_groups())
        .build();
        let handle = self.collider_set.insert(collider);
        if !tags.is_empty() {
            self.tags.insert(handle, tags);
        }
        log::trace!("added cuboid {:?} at {:?} tags={:?}", handle, translation, tags);
        handle
    }

    /// Semantic tags attached to a collider.
    pub fn tags_of(&self, handle: ColliderHandle) -> TagSet {
        self.tags.get(&handle).copied().unwrap_or_default()
    }

    /// Replace the tags of an existing collider.
    pub fn set_tags(&mut self, handle: ColliderHandle, tags: TagSet) {
        if tags.is_empty() {
            self.tags.remove(&handle);
        } else {
            self.tags.insert(handle, tags);
        }
    }

    /// Remove a collider by its handle.
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.tags.remove(&handle);
        self.collider_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true,
        );
    }

    /// Place a kinematic body and carry its colliders along. Probes see the
    /// new pose after `update_query_pipeline`.
    pub fn set_kinematic_position(&mut self, handle: RigidBodyHandle, position: Vec3) {
        let Some(body) = self.rigid_body_set.get_mut(handle) else {
            return;
        };
        body.set_translation(vector![position.x, position.y, position.z], true);
        let pose = *body.position();
        for &attached in body.colliders() {
            if let Some(collider) = self.collider_set.get_mut(attached) {
                let local = collider
                    .position_wrt_parent()
                    .copied()
                    .unwrap_or_else(Isometry3::identity);
                collider.set_position(pose * local);
            }
        }
    }
}
