//! Simulation clock for the fixed-tick loop.
//!
//! Unlike a wall clock this is advanced explicitly by the host, so replays and
//! tests observe identical timestamps.

/// Accumulates host frame time and hands out fixed simulation steps.
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Total simulated time in seconds.
    elapsed: f64,
    /// Duration of the last advance.
    delta: f32,
    /// Number of fixed steps consumed since start.
    step_count: u64,
    /// Fixed timestep for simulation (default 60 Hz).
    fixed_timestep: f32,
    /// Accumulated time not yet consumed by fixed steps.
    accumulator: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    /// Create a new clock ticking at 60 Hz.
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            step_count: 0,
            fixed_timestep: 1.0 / 60.0,
            accumulator: 0.0,
        }
    }

    /// Create a clock with the given fixed rate in Hz.
    pub fn with_rate(hz: f32) -> Self {
        let mut clock = Self::new();
        clock.set_fixed_rate(hz);
        clock
    }

    /// Feed host frame time into the accumulator.
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.delta = dt;
        self.accumulator += dt;
    }

    /// Check if a fixed step should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            self.elapsed += f64::from(self.fixed_timestep);
            self.step_count += 1;
            true
        } else {
            false
        }
    }

    /// Get the duration of the last advance in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    /// Get total simulated time in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    /// Get the number of fixed steps consumed.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Set the fixed timestep rate in Hz.
    pub fn set_fixed_rate(&mut self, hz: f32) {
        self.fixed_timestep = 1.0 / hz.max(1.0);
    }
}
