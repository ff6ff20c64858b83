//! Animation bridge: clip requests, completion events and displacement tracks.

use std::collections::{HashMap, VecDeque};

use engine_core::Vec3;
use serde::{Deserialize, Serialize};

/// Clips the state machine requests and waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipId {
    HardLanding,
    FallingToRoll,
    Crawl,
    Mantle,
    GroundedDash,
}

impl ClipId {
    pub const ALL: [ClipId; 5] = [
        ClipId::HardLanding,
        ClipId::FallingToRoll,
        ClipId::Crawl,
        ClipId::Mantle,
        ClipId::GroundedDash,
    ];
}

/// The animation collaborator.
///
/// `poll_finished` reports each clip that played to its end exactly once.
/// Interrupted or stopped clips never report.
pub trait AnimationDriver {
    /// Length in seconds of a bound clip, `None` if the clip is unset.
    fn clip_length(&self, clip: ClipId) -> Option<f32>;

    /// Start a clip, interrupting any clip already playing.
    /// Returns `false` if the clip is unset.
    fn play_clip(&mut self, clip: ClipId) -> bool;

    /// Stop the playing clip without a finished event.
    fn stop_clip(&mut self);

    /// Next finished clip, if any.
    fn poll_finished(&mut self) -> Option<ClipId>;
}

/// Reference [`AnimationDriver`]: one clip at a time, advanced by the host.
#[derive(Debug, Clone, Default)]
pub struct ClipPlayer {
    library: HashMap<ClipId, f32>,
    playing: Option<(ClipId, f32)>,
    finished: VecDeque<ClipId>,
    history: Vec<ClipId>,
}

impl ClipPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clip(mut self, clip: ClipId, length: f32) -> Self {
        self.bind(clip, length);
        self
    }

    pub fn bind(&mut self, clip: ClipId, length: f32) {
        self.library.insert(clip, length.max(0.0));
    }

    /// Advance the playing clip; queues a finished event when it runs out.
    pub fn advance(&mut self, dt: f32) {
        let Some((clip, elapsed)) = self.playing.as_mut() else {
            return;
        };
        *elapsed += dt;
        let length = self.library.get(clip).copied().unwrap_or(0.0);
        if *elapsed >= length {
            let clip = *clip;
            self.playing = None;
            self.finished.push_back(clip);
        }
    }

    pub fn playing(&self) -> Option<ClipId> {
        self.playing.map(|(clip, _)| clip)
    }

    /// Every clip started so far, in order.
    pub fn history(&self) -> &[ClipId] {
        &self.history
    }
}

impl AnimationDriver for ClipPlayer {
    fn clip_length(&self, clip: ClipId) -> Option<f32> {
        self.library.get(&clip).copied()
    }

    fn play_clip(&mut self, clip: ClipId) -> bool {
        if !self.library.contains_key(&clip) {
            return false;
        }
        if let Some((current, _)) = self.playing {
            log::trace!("{:?} interrupted by {:?}", current, clip);
        }
        self.playing = Some((clip, 0.0));
        self.history.push(clip);
        true
    }

    fn stop_clip(&mut self) {
        self.playing = None;
    }

    fn poll_finished(&mut self) -> Option<ClipId> {
        self.finished.pop_front()
    }
}

/// Animation-driven displacement: linear from `start` to `target` over `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacementTrack {
    pub start: Vec3,
    pub target: Vec3,
    pub duration: f32,
    elapsed: f32,
}

impl DisplacementTrack {
    pub fn new(start: Vec3, target: Vec3, duration: f32) -> Self {
        Self {
            start,
            target,
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    pub fn alpha(&self) -> f32 {
        if self.duration <= f32::EPSILON {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Position the track wants right now.
    pub fn sample(&self) -> Vec3 {
        if self.is_finished() {
            return self.target;
        }
        self.start.lerp(self.target, self.alpha())
    }

    pub fn is_finished(&self) -> bool {
        self.alpha() >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_finishes_once_after_its_length() {
        let mut player = ClipPlayer::new().with_clip(ClipId::Mantle, 0.5);
        assert!(player.play_clip(ClipId::Mantle));
        player.advance(0.3);
        assert_eq!(player.poll_finished(), None);
        player.advance(0.3);
        assert_eq!(player.poll_finished(), Some(ClipId::Mantle));
        assert_eq!(player.poll_finished(), None);
        assert_eq!(player.playing(), None);
    }

    #[test]
    fn interrupted_clip_never_finishes() {
        let mut player = ClipPlayer::new()
            .with_clip(ClipId::Crawl, 0.5)
            .with_clip(ClipId::HardLanding, 1.0);
        player.play_clip(ClipId::Crawl);
        player.advance(0.4);
        player.play_clip(ClipId::HardLanding);
        player.advance(0.4);
        assert_eq!(player.poll_finished(), None);
        assert_eq!(player.history(), &[ClipId::Crawl, ClipId::HardLanding]);
    }

    #[test]
    fn unbound_clip_is_refused() {
        let mut player = ClipPlayer::new();
        assert!(!player.play_clip(ClipId::GroundedDash));
        assert!(player.history().is_empty());
    }

    #[test]
    fn track_interpolates_to_target() {
        let mut track = DisplacementTrack::new(Vec3::ZERO, Vec3::new(0.0, 10.0, -20.0), 0.5);
        track.advance(0.25);
        assert!((track.sample() - Vec3::new(0.0, 5.0, -10.0)).length() < 1e-5);
        assert!(!track.is_finished());
        track.advance(1.0);
        assert!(track.is_finished());
        assert_eq!(track.sample(), Vec3::new(0.0, 10.0, -20.0));
    }
}
