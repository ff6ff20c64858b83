//! Special movement modes layered on the base walk/fall simulation.
//!
//! Each mode contributes an entry predicate, a `try_*` transition and a
//! `phys_*` integrator. The transitions are evaluated once per tick in the
//! order of [`transition_rules`].

mod crawl;
mod crouch_slide;
mod dash;
mod ice_slide;
mod ladder;
mod landing;
mod mantle;
mod push;
mod rope_walk;
mod wall_slide;

pub use crawl::can_crawl;
pub use crouch_slide::can_crouch_slide;
pub use dash::can_dash;
pub use ice_slide::can_ice_slide;
pub use ladder::can_climb_ladder;
pub use mantle::find_mantle_target;
pub use push::can_push;
pub use rope_walk::can_rope_walk;
pub use wall_slide::can_wall_slide;

use crate::env::Env;
use crate::mode::ModeTag;
use crate::movement::CharacterMovement;
use crate::transitions::Rule;

/// Wall probes reach this many capsule radii forward from the centre.
pub const WALL_PROBE_RADII: f32 = 2.2;

/// Transition rules in evaluation order.
pub(crate) fn transition_rules<'a>() -> [Rule<CharacterMovement, Env<'a>>; 9] {
    [
        Rule {
            tag: ModeTag::WallSliding,
            attempt: CharacterMovement::try_wall_slide,
        },
        Rule {
            tag: ModeTag::CrouchSliding,
            attempt: CharacterMovement::try_crouch_slide,
        },
        Rule {
            tag: ModeTag::RopeWalking,
            attempt: CharacterMovement::try_rope_walk,
        },
        Rule {
            tag: ModeTag::Pushing,
            attempt: CharacterMovement::try_push,
        },
        Rule {
            tag: ModeTag::Crawling,
            attempt: CharacterMovement::try_crawl,
        },
        Rule {
            tag: ModeTag::Mantling,
            attempt: CharacterMovement::try_mantle,
        },
        Rule {
            tag: ModeTag::ClimbLadder,
            attempt: CharacterMovement::try_climb_ladder,
        },
        Rule {
            tag: ModeTag::Dashing,
            attempt: CharacterMovement::try_dash,
        },
        Rule {
            tag: ModeTag::IceSliding,
            attempt: CharacterMovement::try_ice_slide,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_run_in_priority_order() {
        let tags: Vec<ModeTag> = transition_rules().iter().map(|rule| rule.tag).collect();
        assert_eq!(
            tags,
            vec![
                ModeTag::WallSliding,
                ModeTag::CrouchSliding,
                ModeTag::RopeWalking,
                ModeTag::Pushing,
                ModeTag::Crawling,
                ModeTag::Mantling,
                ModeTag::ClimbLadder,
                ModeTag::Dashing,
                ModeTag::IceSliding,
            ]
        );
    }
}
