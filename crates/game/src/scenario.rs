//! Scripted input timeline that drives the sandbox character.

use engine_core::Vec3;
use locomotion::MovementInput;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Input applied from `at` seconds on. The move axis is held until the next
/// entry; presses and toggles fire once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub at: f32,
    #[serde(default)]
    pub input: MovementInput,
}

impl TimelineEntry {
    fn new(at: f32, input: MovementInput) -> Self {
        Self { at, input }
    }
}

pub struct Scenario {
    entries: Vec<TimelineEntry>,
    cursor: usize,
    held_axis: Vec3,
    tick: f32,
    jitter: f32,
    rng: StdRng,
}

impl Scenario {
    pub fn new(mut entries: Vec<TimelineEntry>, tick: f32, jitter: f32, seed: u64) -> Self {
        entries.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self {
            entries,
            cursor: 0,
            held_axis: Vec3::ZERO,
            tick,
            jitter,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Input for a tick starting at `time`. Every entry that came due since the
    /// last call contributes its edges exactly once.
    pub fn input_at(&mut self, time: f32) -> MovementInput {
        let mut input = MovementInput::default();
        while let Some(entry) = self.entries.get(self.cursor) {
            if entry.at > time {
                break;
            }
            let e = entry.input;
            self.held_axis = e.move_axis;
            input.jump_pressed |= e.jump_pressed;
            input.jump_released |= e.jump_released;
            input.crouch_toggle |= e.crouch_toggle;
            input.slide_pressed |= e.slide_pressed;
            input.slide_released |= e.slide_released;
            input.crawl_toggle |= e.crawl_toggle;
            input.dash_pressed |= e.dash_pressed;
            self.cursor += 1;
        }
        input.move_axis = self.held_axis;
        input
    }

    /// Host frame time: one tick, varied by the configured jitter.
    pub fn frame_time(&mut self) -> f32 {
        if self.jitter <= 0.0 {
            return self.tick;
        }
        self.tick * (1.0 + self.rng.gen_range(-self.jitter..=self.jitter))
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.entries.len()
    }
}

/// Run down the built-in course: ice, jump, slide, dash, then climb the ledge.
pub fn course_run() -> Vec<TimelineEntry> {
    let forward = Vec3::NEG_Z;
    let hold = |axis: Vec3| MovementInput::moving(axis);
    vec![
        TimelineEntry::new(0.5, hold(forward)),
        TimelineEntry::new(2.0, MovementInput {
            jump_pressed: true,
            ..hold(forward)
        }),
        TimelineEntry::new(2.3, MovementInput {
            jump_released: true,
            ..hold(forward)
        }),
        TimelineEntry::new(4.0, MovementInput {
            slide_pressed: true,
            ..hold(forward)
        }),
        TimelineEntry::new(4.6, MovementInput {
            slide_released: true,
            ..hold(forward)
        }),
        TimelineEntry::new(6.0, MovementInput {
            dash_pressed: true,
            ..hold(forward)
        }),
        TimelineEntry::new(8.0, MovementInput {
            crawl_toggle: true,
            ..hold(forward)
        }),
        TimelineEntry::new(9.5, MovementInput {
            crawl_toggle: true,
            ..hold(forward)
        }),
        TimelineEntry::new(12.0, MovementInput {
            jump_pressed: true,
            ..hold(forward)
        }),
        TimelineEntry::new(12.2, MovementInput {
            jump_released: true,
            ..hold(forward)
        }),
        TimelineEntry::new(16.0, hold(Vec3::ZERO)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_fire_once_and_axis_is_held() {
        let mut scenario = Scenario::new(course_run(), 1.0 / 60.0, 0.0, 1);
        assert_eq!(scenario.input_at(0.0), MovementInput::default());

        let first = scenario.input_at(2.0);
        assert!(first.jump_pressed);
        assert_eq!(first.move_axis, Vec3::NEG_Z);

        let next = scenario.input_at(2.01);
        assert!(!next.jump_pressed);
        assert_eq!(next.move_axis, Vec3::NEG_Z);
    }

    #[test]
    fn late_poll_merges_every_due_entry() {
        let entries = vec![
            TimelineEntry::new(1.0, MovementInput {
                slide_pressed: true,
                ..Default::default()
            }),
            TimelineEntry::new(0.5, MovementInput {
                dash_pressed: true,
                ..MovementInput::moving(Vec3::X)
            }),
        ];
        let mut scenario = Scenario::new(entries, 1.0 / 60.0, 0.0, 1);
        let input = scenario.input_at(5.0);
        assert!(input.slide_pressed && input.dash_pressed);
        // The later entry's axis wins.
        assert_eq!(input.move_axis, Vec3::ZERO);
        assert!(scenario.is_finished());
    }

    #[test]
    fn jitter_stays_in_range_and_is_seeded() {
        let tick = 1.0 / 60.0;
        let mut a = Scenario::new(Vec::new(), tick, 0.25, 42);
        let mut b = Scenario::new(Vec::new(), tick, 0.25, 42);
        for _ in 0..100 {
            let dt = a.frame_time();
            assert_eq!(dt, b.frame_time());
            assert!(dt >= tick * 0.75 && dt <= tick * 1.25);
        }
    }
}
