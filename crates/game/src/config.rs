//! Sandbox configuration. Loaded from `sandbox.ron` in the working directory,
//! or from the path given as the first command-line argument.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use engine_core::Vec3;
use locomotion::{ClipId, ClipPlayer, LocomotionConfig};
use serde::{Deserialize, Serialize};

use crate::scenario::TimelineEntry;

/// Clip lengths in seconds. `None` leaves the clip unset, which disables
/// whatever depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipLengths {
    pub hard_landing: Option<f32>,
    pub falling_to_roll: Option<f32>,
    pub crawl: Option<f32>,
    pub mantle: Option<f32>,
    pub grounded_dash: Option<f32>,
}

impl Default for ClipLengths {
    fn default() -> Self {
        Self {
            hard_landing: Some(0.8),
            falling_to_roll: Some(0.6),
            crawl: Some(0.9),
            mantle: Some(0.7),
            grounded_dash: Some(0.35),
        }
    }
}

impl ClipLengths {
    /// A clip player with every set clip bound.
    pub fn player(&self) -> ClipPlayer {
        let mut player = ClipPlayer::new();
        for (clip, length) in [
            (ClipId::HardLanding, self.hard_landing),
            (ClipId::FallingToRoll, self.falling_to_roll),
            (ClipId::Crawl, self.crawl),
            (ClipId::Mantle, self.mantle),
            (ClipId::GroundedDash, self.grounded_dash),
        ] {
            if let Some(length) = length {
                player.bind(clip, length);
            }
        }
        player
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Simulation rate in Hz.
    pub tick_rate: f32,
    /// Host frame times vary by up to this fraction of a tick.
    pub frame_jitter: f32,
    /// Consume frame time in fixed steps instead of ticking with the raw frame time.
    pub fixed_step: bool,
    /// Seed for the frame-time jitter.
    pub seed: u64,
    /// Seconds of simulated time to run.
    pub duration: f32,
    pub spawn: Vec3,
    pub clips: ClipLengths,
    pub locomotion: LocomotionConfig,
    /// Scripted inputs. Empty uses the built-in course run.
    pub timeline: Vec<TimelineEntry>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            frame_jitter: 0.0,
            fixed_step: true,
            seed: 7,
            duration: 20.0,
            spawn: Vec3::new(0.0, 120.0, 0.0),
            clips: ClipLengths::default(),
            locomotion: LocomotionConfig::default(),
            timeline: Vec::new(),
        }
    }
}

impl SandboxConfig {
    /// Load and validate the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No sandbox config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        let config: Self =
            ron::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tick_rate > 0.0 && self.tick_rate.is_finite()) {
            anyhow::bail!("tick_rate must be positive, got {}", self.tick_rate);
        }
        if !(0.0..1.0).contains(&self.frame_jitter) {
            anyhow::bail!("frame_jitter must lie within [0, 1), got {}", self.frame_jitter);
        }
        self.locomotion
            .validate()
            .context("invalid locomotion config")?;
        Ok(())
    }

    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate
    }
}

/// Config path from the command line, falling back to `sandbox.ron`.
pub fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("sandbox.ron")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let config = SandboxConfig::load(Path::new("/nonexistent/sandbox.ron")).unwrap();
        assert_eq!(config.tick_rate, 60.0);
        assert!(config.timeline.is_empty());
    }

    #[test]
    fn partial_config_parses() {
        let config: SandboxConfig = ron::from_str(
            "(tick_rate: 120.0, clips: (mantle: None), locomotion: (dash: (cooldown: 0.5)))",
        )
        .unwrap();
        assert!(config.validate().is_ok());
        assert!((config.tick_seconds() - 1.0 / 120.0).abs() < 1e-6);
        assert_eq!(config.locomotion.dash.cooldown, 0.5);
        let player = config.clips.player();
        use locomotion::AnimationDriver;
        assert_eq!(player.clip_length(ClipId::Mantle), None);
        assert_eq!(player.clip_length(ClipId::Crawl), Some(0.9));
    }

    #[test]
    fn shipped_sample_is_valid() {
        let config: SandboxConfig = ron::from_str(include_str!("../../../sandbox.ron")).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.locomotion.wall_slide.gravity_curve.is_some());
    }

    #[test]
    fn rejects_bad_rates() {
        let config = SandboxConfig {
            tick_rate: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
