//! Test course: floor tiles plus one obstacle per movement mode.

use anyhow::{bail, Result};
use engine_core::{SemanticTag, TagSet, Vec3};
use physics::PhysicsWorld;
use serde::{Deserialize, Serialize};

/// Static box in the course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    pub center: Vec3,
    pub half_extents: Vec3,
    #[serde(default)]
    pub yaw_degrees: f32,
    #[serde(default)]
    pub tags: Vec<SemanticTag>,
}

impl Block {
    fn new(name: &str, center: Vec3, half_extents: Vec3, tags: &[SemanticTag]) -> Self {
        Self {
            name: name.to_string(),
            center,
            half_extents,
            yaw_degrees: 0.0,
            tags: tags.to_vec(),
        }
    }
}

/// The built-in course, laid out along -Z from the spawn.
pub fn default_blocks() -> Vec<Block> {
    use SemanticTag::*;
    vec![
        Block::new("start floor", Vec3::new(0.0, -50.0, -500.0), Vec3::new(800.0, 50.0, 700.0), &[]),
        Block::new("ice rink", Vec3::new(0.0, -50.0, -1500.0), Vec3::new(800.0, 50.0, 300.0), &[Ice]),
        Block::new("far floor", Vec3::new(0.0, -50.0, -3300.0), Vec3::new(800.0, 50.0, 1500.0), &[]),
        Block::new("rope", Vec3::new(-400.0, -4.0, -600.0), Vec3::new(8.0, 5.0, 500.0), &[Rope]),
        Block::new("crate", Vec3::new(400.0, 50.0, -900.0), Vec3::new(60.0, 50.0, 60.0), &[Movable]),
        Block::new("ledge", Vec3::new(0.0, 90.0, -2500.0), Vec3::new(300.0, 90.0, 200.0), &[]),
        Block::new("ladder", Vec3::new(-500.0, 400.0, -3000.0), Vec3::new(60.0, 400.0, 10.0), &[Ladder]),
        Block::new("tower", Vec3::new(0.0, 1000.0, -4300.0), Vec3::new(800.0, 1000.0, 200.0), &[]),
    ]
}

/// Add `blocks` to a new world. Degenerate boxes are rejected.
pub fn build_course(blocks: &[Block]) -> Result<PhysicsWorld> {
    let mut world = PhysicsWorld::new();
    for block in blocks {
        let e = block.half_extents;
        if !(e.x > 0.0 && e.y > 0.0 && e.z > 0.0) || !block.center.is_finite() {
            bail!("block {:?} has invalid extents {:?} at {:?}", block.name, e, block.center);
        }
        let tags: TagSet = block.tags.iter().copied().collect();
        world.add_tagged_cuboid(block.center, block.yaw_degrees.to_radians(), e, tags);
        log::debug!("course block {:?} tags {:?}", block.name, block.tags);
    }
    world.update_query_pipeline();
    log::info!("course built with {} blocks", blocks.len());
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use physics::{QueryParams, SpatialProbe};

    #[test]
    fn course_has_tagged_surfaces() {
        let world = build_course(&default_blocks()).unwrap();
        let query = QueryParams::default();

        let ice = world.raycast(
            Vec3::new(0.0, 100.0, -1500.0),
            Vec3::new(0.0, -10.0, -1500.0),
            &query,
        );
        assert!(ice.has_tag(SemanticTag::Ice));

        let rope = world.raycast(
            Vec3::new(-400.0, 100.0, -600.0),
            Vec3::new(-400.0, -10.0, -600.0),
            &query,
        );
        assert!(rope.has_tag(SemanticTag::Rope));
    }

    #[test]
    fn rejects_flat_blocks() {
        let blocks = vec![Block::new("sheet", Vec3::ZERO, Vec3::new(10.0, 0.0, 10.0), &[])];
        assert!(build_course(&blocks).is_err());
    }
}
