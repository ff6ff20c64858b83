//! Collision groups and query profiles.

use rapier3d::prelude::*;

/// Collision groups for different entity types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment (floors, walls, ledges, ladders, ropes)
    Environment = 1 << 0,
    /// Player character capsule
    Player = 1 << 1,
    /// Movable props
    Prop = 1 << 2,
    /// Triggers and sensors
    Trigger = 1 << 3,
}

impl CollisionGroup {
    /// Create a collision group for environment.
    pub fn environment() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Environment as u32);
        let filter = Group::ALL;
        (membership, filter)
    }

    /// Create a collision group for the player.
    pub fn player() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Player as u32);
        let filter = Group::from_bits_retain(Self::Environment as u32 | Self::Prop as u32);
        (membership, filter)
    }

    /// Create a collision group for triggers.
    pub fn trigger() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Trigger as u32);
        let filter = Group::from_bits_retain(Self::Player as u32);
        (membership, filter)
    }

    pub fn interaction_groups(pair: (Group, Group)) -> InteractionGroups {
        InteractionGroups::new(pair.0, pair.1)
    }
}

/// Named query profile, selecting which colliders a probe can hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionProfile {
    /// Hit every collider, including triggers.
    BlockAll,
    /// Hit what the player capsule would collide with.
    #[default]
    PlayerSolid,
}

impl CollisionProfile {
    /// Interaction groups used as the query filter for this profile.
    pub fn query_groups(self) -> InteractionGroups {
        match self {
            CollisionProfile::BlockAll => InteractionGroups::all(),
            CollisionProfile::PlayerSolid => {
                CollisionGroup::interaction_groups(CollisionGroup::player())
            }
        }
    }
}
