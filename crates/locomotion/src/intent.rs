//! Player intents fed into each tick.

use engine_core::Vec3;
use serde::{Deserialize, Serialize};

/// Intents for one tick. Toggles and presses are edges, not held states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementInput {
    /// World-space move direction. Longer than 1 is clamped; Y is ignored.
    pub move_axis: Vec3,
    pub jump_pressed: bool,
    pub jump_released: bool,
    pub crouch_toggle: bool,
    pub slide_pressed: bool,
    pub slide_released: bool,
    pub crawl_toggle: bool,
    pub dash_pressed: bool,
}

impl MovementInput {
    pub fn moving(axis: Vec3) -> Self {
        Self {
            move_axis: axis,
            ..Default::default()
        }
    }
}

/// Latched wants derived from the intents.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Wants {
    pub slide: bool,
    pub crawl: bool,
    pub crouch: bool,
    pub dash: bool,
    pub jump: bool,
    pub movement: bool,
}

impl Wants {
    pub fn apply(&mut self, input: &MovementInput) {
        if input.slide_pressed {
            self.slide = true;
        }
        if input.slide_released {
            self.slide = false;
        }
        if input.crawl_toggle {
            self.crawl = !self.crawl;
        }
        if input.crouch_toggle {
            self.crouch = !self.crouch;
        }
        if input.jump_pressed {
            self.jump = true;
        }
        if input.jump_released {
            self.jump = false;
        }
        self.dash = input.dash_pressed;
        self.movement = input.move_axis.x != 0.0 || input.move_axis.z != 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_flip_and_dash_is_an_edge() {
        let mut wants = Wants::default();
        wants.apply(&MovementInput {
            crawl_toggle: true,
            dash_pressed: true,
            ..Default::default()
        });
        assert!(wants.crawl);
        assert!(wants.dash);

        wants.apply(&MovementInput::default());
        assert!(wants.crawl);
        assert!(!wants.dash);

        wants.apply(&MovementInput {
            crawl_toggle: true,
            ..Default::default()
        });
        assert!(!wants.crawl);
    }

    #[test]
    fn slide_release_clears_want() {
        let mut wants = Wants::default();
        wants.apply(&MovementInput {
            slide_pressed: true,
            ..Default::default()
        });
        assert!(wants.slide);
        wants.apply(&MovementInput {
            slide_released: true,
            ..Default::default()
        });
        assert!(!wants.slide);
    }
}
