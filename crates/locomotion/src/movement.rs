//! The character movement state machine.

use std::f32::consts::{PI, TAU};

use engine_core::{horizontal, is_nearly_zero, yaw_toward, Transform, Vec3};

use crate::anim::ClipId;
use crate::config::LocomotionConfig;
use crate::env::{Env, Probe};
use crate::error::{ConfigError, LocomotionError};
use crate::events::MovementEvent;
use crate::intent::{MovementInput, Wants};
use crate::kinematic::{Capsule, KinematicState};
use crate::mode::{BaseMode, Mode, ModeTag};
use crate::modes::transition_rules;
use crate::snapshot::Tunables;
use crate::transitions::dispatch;

/// Dash bookkeeping shared by the grounded and airborne variants.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashState {
    /// Clock time of the last accepted dash.
    pub last_start: Option<f64>,
    /// A grounded dash track is running.
    pub in_progress: bool,
}

/// One character's locomotion: a base walk/fall simulation plus the special
/// modes layered on top of it.
///
/// Drive it with [`tick`](Self::tick) once per frame. All world access goes
/// through the [`Env`] passed in, so the machine itself holds no handles.
pub struct CharacterMovement {
    pub(crate) config: LocomotionConfig,
    pub(crate) state: KinematicState,
    pub(crate) mode: Mode,
    pub(crate) tunables: Tunables,
    pub(crate) wants: Wants,
    pub(crate) dash: DashState,
    pub(crate) can_jump: bool,
    /// `can_jump` saved while a roll blocks jumping.
    pub(crate) saved_can_jump: Option<bool>,
    pub(crate) crouched: bool,
    /// Clamped, plane-constrained move input of this tick.
    pub(crate) input_vector: Vec3,
    pub(crate) last_climb_direction: f32,
    pub(crate) pending_capsule_restore: bool,
    pub(crate) clock: f64,
    pub(crate) events: Vec<MovementEvent>,
    subscribed: Vec<ClipId>,
    last_finite: KinematicState,
}

impl CharacterMovement {
    /// Create a falling character at `spawn`. Call [`initialize`](Self::initialize)
    /// once the world is available.
    pub fn new(config: LocomotionConfig, spawn: Transform) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = KinematicState::new(spawn, Capsule::from(&config.capsule));
        let tunables = Tunables::from(&config.base);
        Ok(Self {
            config,
            state,
            mode: Mode::Falling,
            tunables,
            wants: Wants::default(),
            dash: DashState::default(),
            can_jump: true,
            saved_can_jump: None,
            crouched: false,
            input_vector: Vec3::ZERO,
            last_climb_direction: 0.0,
            pending_capsule_restore: false,
            clock: 0.0,
            events: Vec::new(),
            subscribed: Vec::new(),
            last_finite: state,
        })
    }

    /// Subscribe to the bound clips and settle onto the floor if one is under the spawn.
    pub fn initialize(&mut self, env: &mut Env<'_>) {
        self.subscribed = ClipId::ALL
            .into_iter()
            .filter(|clip| env.anim.clip_length(*clip).is_some())
            .collect();
        for clip in ClipId::ALL {
            if !self.subscribed.contains(&clip) {
                log::warn!("clip {:?} is unset, dependent transitions are disabled", clip);
            }
        }
        if self.config.wall_slide.gravity_curve.is_none() {
            log::warn!("no wall slide gravity curve, sliding uses full gravity");
        }

        let probe = env.probe();
        let floor = self.find_floor(probe);
        if floor.walkable {
            self.set_mode(Mode::Walking, env);
            self.adjust_floor_height(&floor, probe);
        }
        self.last_finite = self.state;
        log::info!(
            "character initialized at {:?} in {:?}",
            self.state.position(),
            self.mode.tag()
        );
    }

    /// Advance the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32, input: &MovementInput, env: &mut Env<'_>) {
        if !dt.is_finite() || dt < 0.0 {
            log::error!("{}", LocomotionError::NonFiniteDelta(dt));
            return;
        }
        self.clock += f64::from(dt);
        self.last_finite = self.state;

        self.wants.apply(input);
        self.input_vector = self
            .constrain_to_plane(horizontal(input.move_axis))
            .clamp_length_max(1.0);
        self.state.acceleration = self.input_vector * self.tunables.max_acceleration;

        self.poll_clips(env);
        self.retry_capsule_restore(env.probe());

        if self.wants.jump {
            self.try_jump(env);
        }
        self.evaluate_transitions(env);
        self.update_crouch(env.probe());

        self.start_new_physics(dt, 0, env);
        self.physics_rotation(dt);
        self.check_finite();
    }

    fn poll_clips(&mut self, env: &mut Env<'_>) {
        while let Some(clip) = env.anim.poll_finished() {
            if self.subscribed.contains(&clip) {
                self.on_clip_finished(clip, env);
            }
        }
    }

    /// React to a clip that played to its end.
    pub fn on_clip_finished(&mut self, clip: ClipId, env: &mut Env<'_>) {
        log::debug!("clip {:?} finished", clip);
        match clip {
            ClipId::HardLanding => {
                if matches!(self.mode, Mode::Disabled) {
                    self.set_mode(Mode::Walking, env);
                }
            }
            ClipId::FallingToRoll => {
                if let Some(can_jump) = self.saved_can_jump.take() {
                    self.can_jump = can_jump;
                }
            }
            ClipId::Crawl => {
                if let Mode::Crawling { clip_finished } = &mut self.mode {
                    *clip_finished = true;
                }
            }
            ClipId::Mantle => {
                if matches!(self.mode, Mode::Mantling(_)) {
                    self.finish_displacement(env);
                }
            }
            ClipId::GroundedDash => {
                if matches!(self.mode, Mode::Dashing(_)) {
                    self.finish_displacement(env);
                }
                self.dash.in_progress = false;
            }
        }
    }

    pub(crate) fn play_clip(&mut self, clip: ClipId, env: &mut Env<'_>) -> bool {
        if env.anim.play_clip(clip) {
            self.events.push(MovementEvent::ClipRequested(clip));
            true
        } else {
            log::warn!("clip {:?} is unset, skipping", clip);
            false
        }
    }

    fn retry_capsule_restore(&mut self, probe: Probe<'_>) {
        if !self.pending_capsule_restore || self.mode.uses_reduced_capsule() || self.crouched {
            return;
        }
        let standing = Capsule::from(&self.config.capsule);
        if self.state.try_grow(standing, probe) {
            log::debug!("capsule restored");
            self.pending_capsule_restore = false;
        }
    }

    fn can_attempt_jump(&self) -> bool {
        match self.mode {
            Mode::Walking => self.can_jump && !self.crouched,
            Mode::WallSliding => true,
            _ => false,
        }
    }

    fn try_jump(&mut self, env: &mut Env<'_>) {
        if !self.can_attempt_jump() {
            return;
        }
        let off_wall = matches!(self.mode, Mode::WallSliding);
        self.state.velocity.y = self.state.velocity.y.max(self.config.base.jump_z_velocity);

        if off_wall {
            let start = self.state.position();
            let reach = self.state.capsule.radius * crate::modes::WALL_PROBE_RADII;
            let wall = env.probe().ray(start, start + self.state.transform.forward() * reach);
            if wall.blocking {
                self.state.velocity += wall.normal * self.config.wall_slide.wall_jump_off_force;
            }
        }

        self.set_mode(Mode::Falling, env);
        self.wants.jump = false;
        self.events.push(MovementEvent::Jumped { off_wall });
        log::debug!("jump (off wall: {})", off_wall);
    }

    fn evaluate_transitions(&mut self, env: &mut Env<'_>) {
        if matches!(self.mode, Mode::Disabled) || self.mode.track().is_some() {
            return;
        }
        let rules = transition_rules();
        if let Some(tag) = dispatch(&rules, self, env) {
            log::trace!("transition committed to {:?}", tag);
        }
    }

    fn update_crouch(&mut self, probe: Probe<'_>) {
        if self.wants.crouch && !self.crouched {
            if !matches!(self.mode, Mode::Walking) {
                return;
            }
            let crouched = Capsule::new(self.state.capsule.radius, self.config.base.crouched_half_height);
            self.state.resize_keep_base(crouched);
            self.crouched = true;
        } else if !self.wants.crouch && self.crouched {
            let standing = Capsule::from(&self.config.capsule);
            if self.state.try_grow(standing, probe) {
                self.crouched = false;
            } else {
                log::warn!("no room to stand up, staying crouched");
            }
        }
    }

    /// Switch modes, running the exit work of the mode being left.
    pub(crate) fn set_mode(&mut self, new: Mode, env: &mut Env<'_>) {
        let from = self.mode.tag();
        let old = std::mem::replace(&mut self.mode, new);

        match &old {
            Mode::IceSliding(snapshot) => snapshot.restore(&mut self.tunables),
            Mode::Crawling {
                clip_finished: false,
            } => env.anim.stop_clip(),
            _ => {}
        }

        if old.uses_reduced_capsule() && !self.mode.uses_reduced_capsule() {
            let standing = Capsule::from(&self.config.capsule);
            if !self.state.try_grow(standing, env.probe()) {
                log::warn!("capsule blocked after leaving {:?}, retrying next tick", from);
                self.pending_capsule_restore = true;
            }
        }

        match self.mode {
            Mode::Disabled => {
                self.state.velocity = Vec3::ZERO;
                self.state.acceleration = Vec3::ZERO;
            }
            Mode::Walking => self.state.velocity.y = 0.0,
            _ => {}
        }

        let to = self.mode.tag();
        if from != to {
            log::debug!("mode {:?} -> {:?}", from, to);
            self.events.push(MovementEvent::ModeChanged { from, to });
        }
    }

    fn physics_rotation(&mut self, dt: f32) {
        if !self.mode.orients_to_movement() {
            return;
        }
        let Some(target) = yaw_toward(self.state.acceleration) else {
            return;
        };
        let current = self.state.transform.yaw();
        let diff = (target - current + PI).rem_euclid(TAU) - PI;
        let max_step = self.config.base.rotation_rate.to_radians() * dt;
        self.state.transform.set_yaw(current + diff.clamp(-max_step, max_step));
    }

    fn check_finite(&mut self) {
        if self.state.is_finite() {
            return;
        }
        let err = LocomotionError::NonFiniteState {
            mode: self.mode.tag(),
        };
        log::error!("{}, restoring the last finite state", err);
        self.state = self.last_finite;
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    /// Direct access for hosts that teleport or launch the character.
    pub fn state_mut(&mut self) -> &mut KinematicState {
        &mut self.state
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn mode_tag(&self) -> ModeTag {
        self.mode.tag()
    }

    pub fn base_mode(&self) -> BaseMode {
        self.mode.base()
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub fn speed(&self) -> f32 {
        self.state.speed()
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Walking and actually moving, not crouched.
    pub fn is_walk(&self) -> bool {
        matches!(self.mode, Mode::Walking) && !self.crouched && !is_nearly_zero(self.state.velocity)
    }

    pub fn is_falling(&self) -> bool {
        matches!(self.mode, Mode::Falling)
    }

    pub fn is_wall_sliding(&self) -> bool {
        matches!(self.mode, Mode::WallSliding)
    }

    pub fn is_crouch_sliding(&self) -> bool {
        matches!(self.mode, Mode::CrouchSliding { .. })
    }

    pub fn is_rope_walking(&self) -> bool {
        matches!(self.mode, Mode::RopeWalking)
    }

    pub fn is_pushing(&self) -> bool {
        matches!(self.mode, Mode::Pushing)
    }

    pub fn is_crawling(&self) -> bool {
        matches!(self.mode, Mode::Crawling { .. })
    }

    pub fn is_mantling(&self) -> bool {
        matches!(self.mode, Mode::Mantling(_))
    }

    pub fn is_climbing_ladder(&self) -> bool {
        matches!(self.mode, Mode::ClimbLadder)
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.mode, Mode::Dashing(_))
    }

    pub fn is_ice_sliding(&self) -> bool {
        matches!(self.mode, Mode::IceSliding(_))
    }

    pub fn is_crouched(&self) -> bool {
        self.crouched
    }

    pub fn can_jump(&self) -> bool {
        self.can_jump
    }

    pub fn dash_state(&self) -> DashState {
        self.dash
    }

    /// Last non-zero ladder climb input (positive is up).
    pub fn climb_ladder_direction(&self) -> f32 {
        self.last_climb_direction
    }

    pub fn pending_capsule_restore(&self) -> bool {
        self.pending_capsule_restore
    }

    /// Drain the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<MovementEvent> {
        std::mem::take(&mut self.events)
    }
}
