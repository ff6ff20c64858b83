//! Aria sandbox: runs the locomotion machine headless over a test course,
//! driven by a scripted input timeline.

mod config;
mod level;
mod player;
mod scenario;

use std::collections::BTreeMap;

use anyhow::Result;
use engine_core::SimClock;
use locomotion::{ModeTag, MovementEvent, MovementInput};
use physics::PhysicsWorld;

use config::SandboxConfig;
use player::PlayerController;
use scenario::Scenario;

/// Per-run tallies printed at the end.
#[derive(Default)]
struct Summary {
    ticks: u64,
    mode_ticks: BTreeMap<String, u64>,
    transitions: u32,
    landings: u32,
    jumps: u32,
}

impl Summary {
    fn record(&mut self, mode: ModeTag, events: &[MovementEvent], time: f64) {
        self.ticks += 1;
        *self.mode_ticks.entry(format!("{:?}", mode)).or_default() += 1;
        for event in events {
            match event {
                MovementEvent::ModeChanged { from, to } => {
                    self.transitions += 1;
                    log::info!("[{:7.3}s] {:?} -> {:?}", time, from, to);
                }
                MovementEvent::Landed { speed, outcome } => {
                    self.landings += 1;
                    log::info!("[{:7.3}s] landed at {:.0} ({:?})", time, speed, outcome);
                }
                MovementEvent::Jumped { off_wall } => {
                    self.jumps += 1;
                    log::debug!("[{:7.3}s] jumped (off wall: {})", time, off_wall);
                }
                other => log::debug!("[{:7.3}s] {:?}", time, other),
            }
        }
    }
}

fn step(
    player: &mut PlayerController,
    world: &mut PhysicsWorld,
    scenario: &mut Scenario,
    summary: &mut Summary,
    dt: f32,
    time: f64,
) {
    let input: MovementInput = scenario.input_at(time as f32);
    let events = player.update(world, dt, &input);
    summary.record(player.mode(), &events, time);
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = config::config_path();
    let config = SandboxConfig::load(&path)?;
    log::info!("Starting Aria sandbox with {}", path.display());

    let blocks = level::default_blocks();
    let mut world = level::build_course(&blocks)?;
    let mut player = PlayerController::spawn(&mut world, &config)?;

    let timeline = if config.timeline.is_empty() {
        scenario::course_run()
    } else {
        config.timeline.clone()
    };
    let tick = config.tick_seconds();
    let mut scenario = Scenario::new(timeline, tick, config.frame_jitter, config.seed);
    let mut summary = Summary::default();

    let mut clock = SimClock::with_rate(config.tick_rate);
    let mut elapsed = 0.0_f64;
    let duration = f64::from(config.duration);
    while elapsed < duration {
        let frame = scenario.frame_time();
        if config.fixed_step {
            clock.advance(frame);
            while clock.should_fixed_update() {
                let time = clock.elapsed_seconds();
                step(&mut player, &mut world, &mut scenario, &mut summary, tick, time);
            }
        } else {
            step(&mut player, &mut world, &mut scenario, &mut summary, frame, elapsed);
        }
        elapsed += f64::from(frame);
    }

    let position = player.position();
    println!("simulated {:.2}s in {} ticks", elapsed, summary.ticks);
    println!(
        "final position ({:.1}, {:.1}, {:.1}) in {:?}",
        position.x,
        position.y,
        position.z,
        player.mode()
    );
    println!(
        "{} mode changes, {} landings, {} jumps",
        summary.transitions, summary.landings, summary.jumps
    );
    for (mode, ticks) in &summary.mode_ticks {
        println!("  {:<14} {:>6} ticks", mode, ticks);
    }
    if !scenario.is_finished() {
        log::warn!("run ended before the timeline finished");
    }
    Ok(())
}
