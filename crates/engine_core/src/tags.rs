//! Semantic tags carried by world entities.
//!
//! Probes report the tags of whatever they hit so movement code can classify
//! surfaces (ropes, ladders, movable props, ice) without knowing about the
//! entity behind the collider.

use serde::{Deserialize, Serialize};

/// A label on a world entity.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticTag {
    /// Thin walkable rope; slows the character to a balance walk.
    Rope = 1 << 0,
    /// Climbable ladder surface.
    Ladder = 1 << 1,
    /// Prop that can be pushed.
    Movable = 1 << 2,
    /// Low-friction floor.
    Ice = 1 << 3,
}

/// Small set of [`SemanticTag`]s stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagSet(u8);

impl TagSet {
    pub const EMPTY: TagSet = TagSet(0);

    pub fn new() -> Self {
        Self::EMPTY
    }

    pub fn with(mut self, tag: SemanticTag) -> Self {
        self.insert(tag);
        self
    }

    pub fn insert(&mut self, tag: SemanticTag) {
        self.0 |= tag as u8;
    }

    pub fn remove(&mut self, tag: SemanticTag) {
        self.0 &= !(tag as u8);
    }

    pub fn contains(&self, tag: SemanticTag) -> bool {
        self.0 & tag as u8 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl From<SemanticTag> for TagSet {
    fn from(tag: SemanticTag) -> Self {
        TagSet::EMPTY.with(tag)
    }
}

impl FromIterator<SemanticTag> for TagSet {
    fn from_iter<I: IntoIterator<Item = SemanticTag>>(iter: I) -> Self {
        iter.into_iter().fold(TagSet::EMPTY, TagSet::with)
    }
}
