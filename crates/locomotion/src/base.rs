//! Base walk/fall simulation: velocity model, substeps, floor finding and
//! sweep-and-slide movement. Special modes build on these.

use engine_core::{horizontal, is_nearly_zero, plane_project, Vec3, KINDA_SMALL_NUMBER};
use physics::{ProbeResult, ProbeShape};

use crate::config::BaseConfig;
use crate::env::{Env, Probe};
use crate::kinematic::KinematicState;
use crate::mode::{BaseMode, Mode};
use crate::movement::CharacterMovement;

/// Shortest time slice worth simulating.
pub const MIN_TICK_TIME: f32 = 1.0e-6;
/// Gap kept between the capsule base and the floor.
pub const MIN_FLOOR_DIST: f32 = 1.9;
pub const MAX_FLOOR_DIST: f32 = 2.4;
pub const AVG_FLOOR_DIST: f32 = (MIN_FLOOR_DIST + MAX_FLOOR_DIST) * 0.5;
/// Below this speed braking snaps velocity to zero.
pub const BRAKE_TO_STOP_VELOCITY: f32 = 10.0;
/// Moves stop this far short of a blocking hit.
pub const SWEEP_SKIN: f32 = 0.1;

const BRAKING_SUBSTEP_TIME: f32 = 1.0 / 33.0;
const FLOOR_SWEEP_RADIUS_SCALE: f32 = 0.95;
const PENETRATION_PUSH_OUT: f32 = 1.0;
/// Exceeding the max speed by less than this factor is not braked.
const MAX_SPEED_TOLERANCE: f32 = 1.01;

/// Inputs to [`calc_velocity`].
#[derive(Debug, Clone, Copy)]
pub struct VelocityParams {
    pub friction: f32,
    pub braking_friction_factor: f32,
    pub braking_deceleration: f32,
    pub max_speed: f32,
    pub max_acceleration: f32,
}

/// Decelerate `velocity` by friction and a constant braking deceleration.
///
/// Integrated in substeps so high friction cannot overshoot; velocity that
/// reverses direction or drops under [`BRAKE_TO_STOP_VELOCITY`] stops dead.
pub fn apply_velocity_braking(velocity: Vec3, dt: f32, friction: f32, braking_deceleration: f32) -> Vec3 {
    if velocity == Vec3::ZERO || dt < MIN_TICK_TIME {
        return velocity;
    }

    let friction = friction.max(0.0);
    let braking_deceleration = braking_deceleration.max(0.0);
    let zero_friction = friction == 0.0;
    let zero_braking = braking_deceleration == 0.0;
    if zero_friction && zero_braking {
        return velocity;
    }

    let old = velocity;
    let rev_accel = if zero_braking {
        Vec3::ZERO
    } else {
        -braking_deceleration * velocity.normalize_or_zero()
    };
    let max_step = BRAKING_SUBSTEP_TIME.clamp(1.0 / 75.0, 1.0 / 20.0);

    let mut v = velocity;
    let mut remaining = dt;
    while remaining >= MIN_TICK_TIME {
        let step = if remaining > max_step && !zero_friction {
            max_step.min(remaining * 0.5)
        } else {
            remaining
        };
        remaining -= step;
        v += (-friction * v + rev_accel) * step;
        if v.dot(old) <= 0.0 {
            return Vec3::ZERO;
        }
    }

    let speed_sq = v.length_squared();
    if speed_sq <= KINDA_SMALL_NUMBER
        || (!zero_braking && speed_sq <= BRAKE_TO_STOP_VELOCITY * BRAKE_TO_STOP_VELOCITY)
    {
        return Vec3::ZERO;
    }
    v
}

/// New velocity after one step of acceleration, friction and braking.
pub fn calc_velocity(velocity: Vec3, acceleration: Vec3, dt: f32, params: &VelocityParams) -> Vec3 {
    if dt < MIN_TICK_TIME {
        return velocity;
    }

    let friction = params.friction.max(0.0);
    let analog = if params.max_acceleration > 0.0 {
        (acceleration.length() / params.max_acceleration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let max_speed = params.max_speed * analog;
    let exceeds = |v: Vec3, limit: f32| {
        let limit = limit * MAX_SPEED_TOLERANCE;
        v.length_squared() > limit * limit
    };
    let zero_acceleration = is_nearly_zero(acceleration);
    let over_max = exceeds(velocity, max_speed);

    let mut v = velocity;
    if zero_acceleration || over_max {
        let old = v;
        v = apply_velocity_braking(
            v,
            dt,
            friction * params.braking_friction_factor.max(0.0),
            params.braking_deceleration,
        );
        // Braking never takes us under the max speed while still accelerating forward.
        if over_max && v.length_squared() < max_speed * max_speed && acceleration.dot(old) > 0.0 {
            v = old.normalize_or_zero() * max_speed;
        }
    } else {
        let accel_dir = acceleration.normalize_or_zero();
        let speed = v.length();
        v -= (v - accel_dir * speed) * (dt * friction).min(1.0);
    }

    if !zero_acceleration {
        let max_input_speed = if exceeds(v, max_speed) { v.length() } else { max_speed };
        v += acceleration * dt;
        v = v.clamp_length_max(max_input_speed);
    }
    v
}

/// Substep duration for the next iteration. `iterations` already counts it.
pub fn time_step(remaining: f32, iterations: u32, base: &BaseConfig) -> f32 {
    let mut step = remaining;
    if remaining > base.max_simulation_time_step && iterations < base.max_simulation_iterations {
        step = base.max_simulation_time_step.min(remaining * 0.5);
    }
    step.max(MIN_TICK_TIME)
}

pub fn can_substep(remaining: f32, iterations: u32, base: &BaseConfig) -> bool {
    remaining >= MIN_TICK_TIME && iterations < base.max_simulation_iterations
}

/// Floor under the capsule.
#[derive(Debug, Clone, Copy)]
pub struct FloorResult {
    pub hit: ProbeResult,
    pub walkable: bool,
    /// Gap between the capsule base and the floor.
    pub distance: f32,
}

impl FloorResult {
    fn none(hit: ProbeResult) -> Self {
        Self {
            hit,
            walkable: false,
            distance: 0.0,
        }
    }

    pub fn normal(&self) -> Vec3 {
        if self.hit.blocking {
            self.hit.normal
        } else {
            Vec3::Y
        }
    }
}

pub fn is_walkable(normal: Vec3, base: &BaseConfig) -> bool {
    normal.y >= base.walkable_floor_y
}

/// Sweep a slightly thinner capsule down to find the floor within step range.
pub fn find_floor(state: &KinematicState, base: &BaseConfig, probe: Probe<'_>) -> FloorResult {
    let capsule = state.capsule;
    let shrink = capsule.radius * (1.0 - FLOOR_SWEEP_RADIUS_SCALE);
    let shape = ProbeShape::capsule(capsule.radius - shrink, capsule.half_height - shrink);
    let trace = base.max_step_height + MAX_FLOOR_DIST + shrink;
    let start = state.position();

    let hit = probe.sweep(shape, start, start - Vec3::Y * trace);
    if hit.is_valid_blocking_hit() {
        let walkable = is_walkable(hit.normal, base);
        let mut distance = hit.distance - shrink;
        if walkable {
            // Sweep distances are only approximate; a line down the axis is exact
            // whenever it reaches the same walkable floor.
            let reach = capsule.half_height + distance + MAX_FLOOR_DIST;
            let line = probe.ray(start, start - Vec3::Y * reach);
            if line.is_valid_blocking_hit() && is_walkable(line.normal, base) {
                distance = line.distance - capsule.half_height;
            }
        }
        return FloorResult {
            hit,
            walkable,
            distance,
        };
    }

    // The sweep started inside something; fall back to a line down the axis.
    let line = probe.ray(start, start - Vec3::Y * (capsule.half_height + trace));
    if line.is_valid_blocking_hit() {
        return FloorResult {
            hit: line,
            walkable: is_walkable(line.normal, base),
            distance: line.distance - capsule.half_height,
        };
    }
    FloorResult::none(hit)
}

/// Sweep the capsule by `delta`, stopping [`SWEEP_SKIN`] short of the first blocking hit.
///
/// A capsule that starts inside geometry is pushed out along the hit normal first.
/// The returned hit's `time` is the fraction of `delta` actually travelled.
pub fn safe_move(state: &mut KinematicState, delta: Vec3, probe: Probe<'_>) -> ProbeResult {
    let start = state.position();
    let length = delta.length();
    if length < KINDA_SMALL_NUMBER {
        return ProbeResult::miss(start, start);
    }

    let shape = state.capsule.shape();
    let mut hit = probe.sweep(shape, start, start + delta);
    if hit.start_penetrating {
        let pushed = start + hit.normal * PENETRATION_PUSH_OUT;
        log::trace!("start penetrating, pushing out to {:?}", pushed);
        state.transform.position = pushed;
        hit = probe.sweep(shape, pushed, pushed + delta);
        if hit.start_penetrating {
            hit.time = 0.0;
            return hit;
        }
    }

    let from = state.position();
    if !hit.blocking {
        state.transform.position = from + delta;
        return hit;
    }

    let travel = (hit.distance - SWEEP_SKIN).max(0.0);
    state.transform.position = from + delta / length * travel;
    hit.time = travel / length;
    hit.location = state.position();
    hit
}

/// Redirect `delta` after hitting a second surface while sliding along `old_normal`.
pub fn two_wall_adjust(delta: Vec3, hit: &ProbeResult, old_normal: Vec3) -> Vec3 {
    let normal = hit.normal;
    let remaining = 1.0 - hit.time;
    if old_normal.dot(normal) <= 0.0 {
        // Crease between the two walls.
        let crease = normal.cross(old_normal).normalize_or_zero();
        crease * delta.dot(crease) * remaining
    } else {
        let adjusted = plane_project(delta, normal) * remaining;
        if adjusted.dot(delta) <= 0.0 {
            Vec3::ZERO
        } else {
            adjusted
        }
    }
}

/// Move along a walkable ramp, keeping the horizontal part of `delta`.
fn ground_movement_delta(delta: Vec3, floor_normal: Vec3) -> Vec3 {
    if floor_normal.y > KINDA_SMALL_NUMBER && floor_normal.y < 1.0 - KINDA_SMALL_NUMBER {
        let floor_dot = floor_normal.x * delta.x + floor_normal.z * delta.z;
        return Vec3::new(delta.x, -floor_dot / floor_normal.y, delta.z);
    }
    delta
}

impl CharacterMovement {
    pub(crate) fn time_step(&self, remaining: f32, iterations: u32) -> f32 {
        time_step(remaining, iterations, &self.config.base)
    }

    pub(crate) fn can_substep(&self, remaining: f32, iterations: u32) -> bool {
        can_substep(remaining, iterations, &self.config.base)
    }

    /// Speed cap of the current mode.
    pub fn max_speed(&self) -> f32 {
        let base = &self.config.base;
        match self.mode {
            Mode::Disabled => 0.0,
            Mode::Walking if self.crouched => base.max_walk_speed_crouched,
            Mode::Walking | Mode::Falling => base.max_walk_speed,
            Mode::RopeWalking => self.config.rope_walk.max_speed,
            Mode::Pushing => self.config.push.max_speed,
            Mode::Crawling { .. } => self.config.crawl.max_speed,
            Mode::IceSliding(_) => self.config.ice_slide.max_speed,
            Mode::WallSliding | Mode::CrouchSliding { .. } | Mode::ClimbLadder => {
                base.max_custom_speed
            }
            Mode::Mantling(_) | Mode::Dashing(_) => base.max_fly_speed,
        }
    }

    pub(crate) fn braking_deceleration(&self) -> f32 {
        let base = &self.config.base;
        match self.mode.base() {
            BaseMode::Walking => base.braking_deceleration_walking,
            BaseMode::Falling => base.braking_deceleration_falling,
            BaseMode::Flying => base.braking_deceleration_flying,
            BaseMode::Custom => base.braking_deceleration_custom,
            BaseMode::None => 0.0,
        }
    }

    /// Update the velocity from the current acceleration.
    pub(crate) fn calc_velocity(&mut self, dt: f32, friction: f32, braking_deceleration: f32) {
        let params = VelocityParams {
            friction,
            braking_friction_factor: self.tunables.braking_friction_factor,
            braking_deceleration,
            max_speed: self.max_speed(),
            max_acceleration: self.tunables.max_acceleration,
        };
        self.state.velocity =
            calc_velocity(self.state.velocity, self.state.acceleration, dt, &params);
    }

    pub(crate) fn constrain_to_plane(&self, v: Vec3) -> Vec3 {
        match self.config.base.plane_constraint {
            Some(normal) => plane_project(v, normal.normalize_or_zero()),
            None => v,
        }
    }

    pub(crate) fn move_updated(&mut self, delta: Vec3, probe: Probe<'_>) -> ProbeResult {
        let delta = self.constrain_to_plane(delta);
        safe_move(&mut self.state, delta, probe)
    }

    pub(crate) fn find_floor(&self, probe: Probe<'_>) -> FloorResult {
        find_floor(&self.state, &self.config.base, probe)
    }

    /// Slide the remaining `time` fraction of `delta` along `normal`.
    /// Returns the fraction applied and the last blocking hit.
    pub(crate) fn slide_along_surface(
        &mut self,
        delta: Vec3,
        time: f32,
        normal: Vec3,
        probe: Probe<'_>,
    ) -> (f32, Option<ProbeResult>) {
        let mut normal = normal;
        if self.mode.is_grounded() {
            // Don't climb walls or push down into the floor while walking.
            let walkable = is_walkable(normal, &self.config.base);
            if (normal.y > 0.0 && !walkable) || normal.y < -KINDA_SMALL_NUMBER {
                let flat = horizontal(normal).normalize_or_zero();
                if flat != Vec3::ZERO {
                    normal = flat;
                }
            }
        }

        let slide = plane_project(delta, normal) * time;
        if slide.dot(delta) <= 0.0 {
            return (0.0, None);
        }

        let first = self.move_updated(slide, probe);
        let mut percent = first.time;
        if !first.blocking {
            return (percent, None);
        }

        let mut last = first;
        let second = two_wall_adjust(slide, &first, normal);
        if !is_nearly_zero(second) && second.dot(delta) > 0.0 {
            let hit = self.move_updated(second, probe);
            percent += hit.time * (1.0 - percent);
            if hit.blocking {
                last = hit;
            }
        }
        (percent.clamp(0.0, 1.0), Some(last))
    }

    /// Keep the capsule base between [`MIN_FLOOR_DIST`] and [`MAX_FLOOR_DIST`] above the floor.
    pub(crate) fn adjust_floor_height(&mut self, floor: &FloorResult, probe: Probe<'_>) {
        if !floor.walkable {
            return;
        }
        if floor.distance < MIN_FLOOR_DIST || floor.distance > MAX_FLOOR_DIST {
            let offset = AVG_FLOOR_DIST - floor.distance;
            safe_move(&mut self.state, Vec3::Y * offset, probe);
        }
    }

    fn step_up(&mut self, delta: Vec3, hit: &ProbeResult, probe: Probe<'_>) -> bool {
        let base = &self.config.base;
        let max_step = base.max_step_height;
        let start_base = self.state.base().y;
        if hit.impact_point.y - start_base > max_step {
            return false;
        }

        let saved = self.state;
        let up = max_step + MAX_FLOOR_DIST;
        let up_hit = safe_move(&mut self.state, Vec3::Y * up, probe);
        if up_hit.start_penetrating {
            self.state = saved;
            return false;
        }

        let forward_hit = self.move_updated(delta, probe);
        if forward_hit.start_penetrating || (forward_hit.blocking && forward_hit.time <= 0.0) {
            self.state = saved;
            return false;
        }
        if forward_hit.blocking {
            self.slide_along_surface(delta, 1.0 - forward_hit.time, forward_hit.normal, probe);
        }

        let risen = self.state.position().y - saved.position().y;
        let down_hit = safe_move(&mut self.state, -Vec3::Y * (risen + MAX_FLOOR_DIST), probe);
        if down_hit.start_penetrating {
            self.state = saved;
            return false;
        }
        if down_hit.blocking {
            let step_height = down_hit.impact_point.y - start_base;
            let walkable = is_walkable(down_hit.normal, &self.config.base);
            if step_height > max_step || (!walkable && delta.dot(down_hit.normal) < 0.0) {
                self.state = saved;
                return false;
            }
        }
        log::trace!("stepped up onto {:?}", down_hit.impact_point);
        true
    }

    fn move_along_floor(&mut self, delta: Vec3, floor: &FloorResult, probe: Probe<'_>) {
        let ramp = ground_movement_delta(delta, floor.normal());
        let mut hit = self.move_updated(ramp, probe);
        if hit.start_penetrating {
            self.slide_along_surface(delta, 1.0, hit.normal, probe);
            return;
        }
        if !hit.blocking {
            return;
        }

        let mut applied = hit.time;
        if hit.time > 0.0 && hit.normal.y > KINDA_SMALL_NUMBER && is_walkable(hit.normal, &self.config.base) {
            // Onto another walkable ramp.
            let rest = ground_movement_delta(delta * (1.0 - applied), hit.normal);
            hit = self.move_updated(rest, probe);
            applied += hit.time * (1.0 - applied);
        }
        if hit.blocking && !self.step_up(delta * (1.0 - applied), &hit, probe) {
            self.slide_along_surface(delta, 1.0 - applied, hit.normal, probe);
        }
    }

    /// Walking integrator. Custom ground modes delegate to it.
    pub(crate) fn phys_walking(&mut self, dt: f32, mut iterations: u32, env: &mut Env<'_>) {
        if dt < MIN_TICK_TIME {
            return;
        }
        let probe = env.probe();
        let mut remaining = dt;

        while self.can_substep(remaining, iterations) {
            iterations += 1;
            let tick = self.time_step(remaining, iterations);
            remaining -= tick;

            let old_location = self.state.position();
            let floor = self.find_floor(probe);

            self.state.acceleration.y = 0.0;
            self.state.velocity.y = 0.0;
            self.calc_velocity(tick, self.tunables.ground_friction, self.braking_deceleration());

            let delta = self.state.velocity * tick;
            if floor.walkable {
                self.move_along_floor(delta, &floor, probe);
            } else {
                let hit = self.move_updated(delta, probe);
                if hit.blocking {
                    self.slide_along_surface(delta, 1.0 - hit.time, hit.normal, probe);
                }
            }

            let new_floor = self.find_floor(probe);
            if !new_floor.walkable {
                log::debug!("walked off a ledge at {:?}", self.state.position());
                self.state.velocity.y = 0.0;
                self.set_mode(Mode::Falling, env);
                self.start_new_physics(remaining, iterations, env);
                return;
            }
            self.adjust_floor_height(&new_floor, probe);

            if self.state.position() == old_location {
                break;
            }
            self.state.velocity = horizontal((self.state.position() - old_location) / tick);
        }
    }

    fn is_valid_landing_spot(&self, hit: &ProbeResult) -> bool {
        if !hit.is_valid_blocking_hit() || !is_walkable(hit.normal, &self.config.base) {
            return false;
        }
        // Only the lower hemisphere can land.
        let lower_cap_top = self.state.base().y + self.state.capsule.radius;
        hit.impact_point.y <= lower_cap_top + KINDA_SMALL_NUMBER && self.state.velocity.y <= 0.0
    }

    /// Falling integrator with air control, gravity and landing detection.
    pub(crate) fn phys_falling(&mut self, dt: f32, mut iterations: u32, env: &mut Env<'_>) {
        if dt < MIN_TICK_TIME {
            return;
        }
        let probe = env.probe();
        let base = self.config.base.clone();
        let mut remaining = dt;

        while self.can_substep(remaining, iterations) {
            iterations += 1;
            let tick = self.time_step(remaining, iterations);
            remaining -= tick;

            let old_velocity = self.state.velocity;
            let lateral_accel = horizontal(self.state.acceleration) * base.air_control;
            let params = VelocityParams {
                friction: 0.0,
                braking_friction_factor: self.tunables.braking_friction_factor,
                braking_deceleration: self.braking_deceleration(),
                max_speed: self.max_speed(),
                max_acceleration: self.tunables.max_acceleration,
            };
            let lateral = calc_velocity(horizontal(old_velocity), lateral_accel, tick, &params);
            self.state.velocity = Vec3::new(lateral.x, old_velocity.y, lateral.z);

            self.state.velocity.y += base.gravity() * tick;
            self.state.velocity.y = self.state.velocity.y.max(-base.terminal_velocity);

            let delta = (old_velocity + self.state.velocity) * 0.5 * tick;
            let hit = self.move_updated(delta, probe);
            if !hit.blocking {
                continue;
            }

            if self.is_valid_landing_spot(&hit) {
                remaining += tick * (1.0 - hit.time);
                self.process_landed(&hit, remaining, iterations, env);
                return;
            }

            self.state.velocity = plane_project(self.state.velocity, hit.normal);
            let (_, slide_hit) = self.slide_along_surface(delta, 1.0 - hit.time, hit.normal, probe);
            if let Some(slide_hit) = slide_hit {
                if self.is_valid_landing_spot(&slide_hit) {
                    self.process_landed(&slide_hit, remaining, iterations, env);
                    return;
                }
                self.state.velocity = plane_project(self.state.velocity, slide_hit.normal);
            }
        }
    }

    fn process_landed(&mut self, hit: &ProbeResult, remaining: f32, iterations: u32, env: &mut Env<'_>) {
        self.on_landed(hit.normal, env);
        if matches!(self.mode, Mode::Falling) {
            self.set_mode(Mode::Walking, env);
            let floor = self.find_floor(env.probe());
            self.adjust_floor_height(&floor, env.probe());
        }
        self.start_new_physics(remaining, iterations, env);
    }

    /// Flying base mode: the displacement track owns the position.
    pub(crate) fn phys_displacement(&mut self, dt: f32, env: &mut Env<'_>) {
        if dt < MIN_TICK_TIME {
            return;
        }
        let Some(track) = self.mode.track_mut() else {
            return;
        };
        track.advance(dt);
        let target = track.sample();
        let finished = track.is_finished();

        let probe = env.probe();
        let delta = target - self.state.position();
        self.state.velocity = delta / dt;
        let hit = self.move_updated(delta, probe);
        if hit.blocking {
            self.slide_along_surface(delta, 1.0 - hit.time, hit.normal, probe);
        }

        if finished {
            self.finish_displacement(env);
        }
    }

    /// End the active displacement track, placing the character on its target if it fits.
    pub(crate) fn finish_displacement(&mut self, env: &mut Env<'_>) {
        let Some(track) = self.mode.track().copied() else {
            return;
        };
        let probe = env.probe();
        if !probe.overlap(self.state.capsule.shape(), track.target) {
            self.state.transform.position = track.target;
        }
        self.state.velocity = match self.mode {
            Mode::Dashing(_) => {
                self.dash.in_progress = false;
                horizontal(self.state.velocity)
            }
            _ => Vec3::ZERO,
        };
        self.set_mode(Mode::Walking, env);
    }

    /// Run the integrator of the current mode for `dt`.
    pub(crate) fn start_new_physics(&mut self, dt: f32, iterations: u32, env: &mut Env<'_>) {
        if dt < MIN_TICK_TIME || iterations >= self.config.base.max_simulation_iterations {
            return;
        }
        match self.mode {
            Mode::Disabled => {}
            Mode::Walking => self.phys_walking(dt, iterations, env),
            Mode::Falling => self.phys_falling(dt, iterations, env),
            Mode::WallSliding => self.phys_wall_slide(dt, iterations, env),
            Mode::CrouchSliding { .. } => self.phys_crouch_slide(dt, iterations, env),
            Mode::RopeWalking => self.phys_rope_walk(dt, iterations, env),
            Mode::Pushing => self.phys_push(dt, iterations, env),
            Mode::Crawling { .. } => self.phys_crawl(dt, iterations, env),
            Mode::Mantling(_) | Mode::Dashing(_) => self.phys_displacement(dt, env),
            Mode::ClimbLadder => self.phys_climb_ladder(dt, iterations, env),
            Mode::IceSliding(_) => self.phys_ice_slide(dt, iterations, env),
        }
    }
}
