//! Movement tunables, one section per concern.
//!
//! Every section has `#[serde(default)]`, so a RON file only needs the values
//! it changes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Piecewise-linear curve over a single input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatCurve {
    /// `(time, value)` pairs sorted by time.
    pub keys: Vec<(f32, f32)>,
}

impl FloatCurve {
    pub fn new(keys: Vec<(f32, f32)>) -> Self {
        Self { keys }
    }

    /// Sample the curve. Inputs outside the key range clamp to the end values.
    pub fn sample(&self, t: f32) -> f32 {
        let Some(&(first_t, first_v)) = self.keys.first() else {
            return 0.0;
        };
        if t <= first_t {
            return first_v;
        }
        for pair in self.keys.windows(2) {
            let (t0, v0) = pair[0];
            let (t1, v1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                if span <= f32::EPSILON {
                    return v1;
                }
                return v0 + (v1 - v0) * ((t - t0) / span);
            }
        }
        self.keys.last().map(|&(_, v)| v).unwrap_or(first_v)
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.keys.is_empty() {
            return Err(ConfigError::EmptyCurve(name));
        }
        if self.keys.windows(2).any(|w| w[1].0 < w[0].0) {
            return Err(ConfigError::UnsortedCurve(name));
        }
        Ok(())
    }
}

/// Base walk/fall model shared by every mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub ground_friction: f32,
    pub braking_friction_factor: f32,
    pub max_acceleration: f32,
    pub braking_deceleration_walking: f32,
    pub braking_deceleration_falling: f32,
    pub braking_deceleration_flying: f32,
    pub braking_deceleration_custom: f32,
    pub max_walk_speed: f32,
    pub max_walk_speed_crouched: f32,
    pub max_custom_speed: f32,
    pub max_fly_speed: f32,
    /// World gravity along Y before `gravity_scale`.
    pub gravity_z: f32,
    pub gravity_scale: f32,
    pub jump_z_velocity: f32,
    pub air_control: f32,
    pub terminal_velocity: f32,
    pub max_step_height: f32,
    /// Minimum Y component of a walkable floor normal.
    pub walkable_floor_y: f32,
    /// Yaw rate toward the acceleration, degrees per second.
    pub rotation_rate: f32,
    pub max_simulation_time_step: f32,
    pub max_simulation_iterations: u32,
    pub crouched_half_height: f32,
    /// Optional plane constraint normal (side-scroller style movement).
    pub plane_constraint: Option<Vec3>,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            ground_friction: 8.0,
            braking_friction_factor: 2.0,
            max_acceleration: 4096.0,
            braking_deceleration_walking: 2048.0,
            braking_deceleration_falling: 0.0,
            braking_deceleration_flying: 0.0,
            braking_deceleration_custom: 0.0,
            max_walk_speed: 700.0,
            max_walk_speed_crouched: 200.0,
            max_custom_speed: 600.0,
            max_fly_speed: 600.0,
            gravity_z: -980.0,
            gravity_scale: 3.0,
            jump_z_velocity: 1450.0,
            air_control: 1.0,
            terminal_velocity: 4000.0,
            max_step_height: 45.0,
            walkable_floor_y: 0.71,
            rotation_rate: 3072.0,
            max_simulation_time_step: 0.05,
            max_simulation_iterations: 8,
            crouched_half_height: 60.0,
            plane_constraint: None,
        }
    }
}

impl BaseConfig {
    pub fn gravity(&self) -> f32 {
        self.gravity_z * self.gravity_scale
    }
}

/// Default (standing) capsule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapsuleConfig {
    pub radius: f32,
    /// Includes the hemispherical cap.
    pub half_height: f32,
}

impl Default for CapsuleConfig {
    fn default() -> Self {
        Self {
            radius: 20.0,
            half_height: 95.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallSlideConfig {
    pub min_height_to_slide: f32,
    pub wall_jump_off_force: f32,
    /// Upper bound for vertical speed when a slide starts.
    pub max_vertical_wall_slide_speed: f32,
    pub max_wall_slide_fall_speed: f32,
    /// Gravity scale keyed by how much the input pushes along the slide.
    /// `None` applies gravity unscaled.
    pub gravity_curve: Option<FloatCurve>,
}

impl Default for WallSlideConfig {
    fn default() -> Self {
        Self {
            min_height_to_slide: 200.0,
            wall_jump_off_force: 400.0,
            max_vertical_wall_slide_speed: 0.0,
            max_wall_slide_fall_speed: 400.0,
            gravity_curve: Some(FloatCurve::new(vec![(-1.0, 0.1), (0.0, 0.35), (1.0, 1.0)])),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrouchSlideConfig {
    /// Entry requires strictly more than this speed.
    pub min_speed_to_enter: f32,
    pub enter_impulse: f32,
    pub friction: f32,
    /// Zero disables the time limit.
    pub max_seconds: f32,
    pub half_height: f32,
}

impl Default for CrouchSlideConfig {
    fn default() -> Self {
        Self {
            min_speed_to_enter: 350.0,
            enter_impulse: 500.0,
            friction: 1.3,
            max_seconds: 1.0,
            half_height: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RopeWalkConfig {
    pub max_speed: f32,
    /// How far below the capsule bottom the rope probe reaches.
    pub probe_margin: f32,
}

impl Default for RopeWalkConfig {
    fn default() -> Self {
        Self {
            max_speed: 30.0,
            probe_margin: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingConfig {
    /// Vertical impact speed at or above which a landing is hard.
    pub hard_landing_speed: f32,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            hard_landing_speed: 1700.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub max_speed: f32,
    pub reach: f32,
    pub capsule_radius: f32,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            max_speed: 50.0,
            reach: 85.0,
            capsule_radius: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub max_speed: f32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self { max_speed: 50.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MantleConfig {
    pub max_front_check: f32,
    pub up_offset: f32,
    pub reach_height: f32,
    /// Degrees. Walls flatter than this are not mantled.
    pub min_wall_steepness: f32,
    /// Degrees. Ledges steeper than this are not mantled onto.
    pub max_surface_angle: f32,
    /// Degrees between facing and the wall normal.
    pub max_alignment: f32,
}

impl Default for MantleConfig {
    fn default() -> Self {
        Self {
            max_front_check: 50.0,
            up_offset: 30.0,
            reach_height: 50.0,
            min_wall_steepness: 75.0,
            max_surface_angle: 40.0,
            max_alignment: 55.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    pub min_floor_height: f32,
    pub reach: f32,
    pub climb_speed: f32,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            min_floor_height: 200.0,
            reach: 40.0,
            climb_speed: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub cooldown: f32,
    pub forward_impulse: f32,
    pub falling_impulse: f32,
    pub grounded_distance: f32,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            cooldown: 1.0,
            forward_impulse: 1000.0,
            falling_impulse: 1500.0,
            grounded_distance: 300.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IceSlideConfig {
    pub friction: f32,
    pub braking_friction_factor: f32,
    pub max_acceleration: f32,
    pub max_speed: f32,
}

impl Default for IceSlideConfig {
    fn default() -> Self {
        Self {
            friction: 0.1,
            braking_friction_factor: 3.0,
            max_acceleration: 150.0,
            max_speed: 400.0,
        }
    }
}

/// All locomotion tunables. Read-only during simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub base: BaseConfig,
    pub capsule: CapsuleConfig,
    pub wall_slide: WallSlideConfig,
    pub crouch_slide: CrouchSlideConfig,
    pub rope_walk: RopeWalkConfig,
    pub landing: LandingConfig,
    pub push: PushConfig,
    pub crawl: CrawlConfig,
    pub mantle: MantleConfig,
    pub ladder: LadderConfig,
    pub dash: DashConfig,
    pub ice_slide: IceSlideConfig,
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value < 0.0 || !value.is_finite() {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(ConfigError::NonPositiveCapsule { field, value });
    }
    Ok(())
}

fn angle(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=90.0).contains(&value) {
        return Err(ConfigError::AngleOutOfRange { field, value });
    }
    Ok(())
}

impl LocomotionConfig {
    /// Check the values a simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("radius", self.capsule.radius)?;
        positive("half_height", self.capsule.half_height)?;
        if self.capsule.half_height < self.capsule.radius {
            return Err(ConfigError::HalfHeightBelowRadius {
                radius: self.capsule.radius,
                half_height: self.capsule.half_height,
            });
        }
        positive("push capsule radius", self.push.capsule_radius)?;
        positive("crouched half_height", self.base.crouched_half_height)?;
        positive("slide half_height", self.crouch_slide.half_height)?;

        if self.base.max_simulation_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.base.max_simulation_time_step <= 0.0 || !self.base.max_simulation_time_step.is_finite()
        {
            return Err(ConfigError::NonPositiveTimeStep(self.base.max_simulation_time_step));
        }

        let b = &self.base;
        for (field, value) in [
            ("ground_friction", b.ground_friction),
            ("braking_friction_factor", b.braking_friction_factor),
            ("max_acceleration", b.max_acceleration),
            ("max_walk_speed", b.max_walk_speed),
            ("max_walk_speed_crouched", b.max_walk_speed_crouched),
            ("max_custom_speed", b.max_custom_speed),
            ("max_fly_speed", b.max_fly_speed),
            ("jump_z_velocity", b.jump_z_velocity),
            ("terminal_velocity", b.terminal_velocity),
            ("max_step_height", b.max_step_height),
            ("rotation_rate", b.rotation_rate),
            ("min_height_to_slide", self.wall_slide.min_height_to_slide),
            ("wall_jump_off_force", self.wall_slide.wall_jump_off_force),
            ("max_wall_slide_fall_speed", self.wall_slide.max_wall_slide_fall_speed),
            ("min_speed_to_enter_slide", self.crouch_slide.min_speed_to_enter),
            ("enter_slide_impulse", self.crouch_slide.enter_impulse),
            ("slide_friction", self.crouch_slide.friction),
            ("max_sliding_seconds", self.crouch_slide.max_seconds),
            ("max_rope_walking_speed", self.rope_walk.max_speed),
            ("hard_landing_speed", self.landing.hard_landing_speed),
            ("max_pushing_speed", self.push.max_speed),
            ("push_reach", self.push.reach),
            ("max_crawling_speed", self.crawl.max_speed),
            ("max_front_mantle_check", self.mantle.max_front_check),
            ("mantle_reach_height", self.mantle.reach_height),
            ("ladder_reach", self.ladder.reach),
            ("climb_ladder_speed", self.ladder.climb_speed),
            ("min_height_to_climb_ladder", self.ladder.min_floor_height),
            ("dash_cooldown", self.dash.cooldown),
            ("forward_dash_impulse", self.dash.forward_impulse),
            ("falling_dash_impulse", self.dash.falling_impulse),
            ("grounded_dash_distance", self.dash.grounded_distance),
            ("ice_friction", self.ice_slide.friction),
            ("ice_braking_friction_factor", self.ice_slide.braking_friction_factor),
            ("ice_max_acceleration", self.ice_slide.max_acceleration),
            ("max_ice_sliding_speed", self.ice_slide.max_speed),
        ] {
            non_negative(field, value)?;
        }

        angle("min_wall_steepness", self.mantle.min_wall_steepness)?;
        angle("max_surface_angle", self.mantle.max_surface_angle)?;
        angle("max_alignment", self.mantle.max_alignment)?;
        if !(0.0..=1.0).contains(&b.walkable_floor_y) {
            return Err(ConfigError::Negative {
                field: "walkable_floor_y",
                value: b.walkable_floor_y,
            });
        }

        if let Some(curve) = &self.wall_slide.gravity_curve {
            curve.validate("wall_slide.gravity_curve")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(LocomotionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn curve_interpolates_and_clamps() {
        let curve = FloatCurve::new(vec![(-1.0, 0.0), (0.0, 0.5), (1.0, 1.0)]);
        assert!((curve.sample(-0.5) - 0.25).abs() < 1e-6);
        assert!((curve.sample(0.5) - 0.75).abs() < 1e-6);
        assert_eq!(curve.sample(-3.0), 0.0);
        assert_eq!(curve.sample(3.0), 1.0);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = LocomotionConfig::default();
        config.capsule.half_height = 10.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::HalfHeightBelowRadius { .. })
        ));

        let mut config = LocomotionConfig::default();
        config.base.max_simulation_iterations = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroIterations));

        let mut config = LocomotionConfig::default();
        config.dash.cooldown = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Negative { .. })));

        let mut config = LocomotionConfig::default();
        config.wall_slide.gravity_curve = Some(FloatCurve::new(vec![(1.0, 0.0), (0.0, 1.0)]));
        assert!(matches!(config.validate(), Err(ConfigError::UnsortedCurve(_))));
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config: LocomotionConfig =
            ron::from_str("(dash: (cooldown: 2.5), capsule: (radius: 25.0))").unwrap();
        assert_eq!(config.dash.cooldown, 2.5);
        assert_eq!(config.dash.falling_impulse, 1500.0);
        assert_eq!(config.capsule.radius, 25.0);
        assert_eq!(config.capsule.half_height, 95.0);
        assert!(config.wall_slide.gravity_curve.is_some());
    }
}
