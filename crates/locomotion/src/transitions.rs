//! Ordered transition rules and the dispatcher that evaluates them.

use crate::mode::ModeTag;

/// Outcome of one transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// Predicate failed or the rule does not apply in the current mode.
    Declined,
    /// A mode change was committed; later rules are skipped this tick.
    Committed(ModeTag),
    /// Side effects were applied without a mode change (airborne dash).
    Applied,
}

/// One `(predicate, transition)` pair. `tag` names the mode the rule targets.
pub struct Rule<S, C> {
    pub tag: ModeTag,
    pub attempt: fn(&mut S, &mut C) -> Attempt,
}

impl<S, C> Clone for Rule<S, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, C> Copy for Rule<S, C> {}

/// Evaluate `rules` in order, stopping at the first committed transition.
pub fn dispatch<S, C>(rules: &[Rule<S, C>], subject: &mut S, context: &mut C) -> Option<ModeTag> {
    for rule in rules {
        match (rule.attempt)(subject, context) {
            Attempt::Committed(tag) => {
                log::trace!("rule {:?} committed {:?}", rule.tag, tag);
                return Some(tag);
            }
            Attempt::Applied => log::trace!("rule {:?} applied", rule.tag),
            Attempt::Declined => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Toy {
        visited: Vec<ModeTag>,
        impulses: u32,
    }

    fn decline(toy: &mut Toy, _: &mut ()) -> Attempt {
        toy.visited.push(ModeTag::WallSliding);
        Attempt::Declined
    }

    fn impulse(toy: &mut Toy, _: &mut ()) -> Attempt {
        toy.visited.push(ModeTag::Dashing);
        toy.impulses += 1;
        Attempt::Applied
    }

    fn commit(toy: &mut Toy, _: &mut ()) -> Attempt {
        toy.visited.push(ModeTag::RopeWalking);
        Attempt::Committed(ModeTag::RopeWalking)
    }

    fn never(toy: &mut Toy, _: &mut ()) -> Attempt {
        toy.visited.push(ModeTag::IceSliding);
        Attempt::Committed(ModeTag::IceSliding)
    }

    #[test]
    fn stops_at_first_commit() {
        let rules: [Rule<Toy, ()>; 4] = [
            Rule { tag: ModeTag::WallSliding, attempt: decline },
            Rule { tag: ModeTag::Dashing, attempt: impulse },
            Rule { tag: ModeTag::RopeWalking, attempt: commit },
            Rule { tag: ModeTag::IceSliding, attempt: never },
        ];
        let mut toy = Toy::default();
        assert_eq!(dispatch(&rules, &mut toy, &mut ()), Some(ModeTag::RopeWalking));
        assert_eq!(
            toy.visited,
            vec![ModeTag::WallSliding, ModeTag::Dashing, ModeTag::RopeWalking]
        );
        assert_eq!(toy.impulses, 1);
    }

    #[test]
    fn applied_does_not_short_circuit() {
        let rules: [Rule<Toy, ()>; 2] = [
            Rule { tag: ModeTag::Dashing, attempt: impulse },
            Rule { tag: ModeTag::WallSliding, attempt: decline },
        ];
        let mut toy = Toy::default();
        assert_eq!(dispatch(&rules, &mut toy, &mut ()), None);
        assert_eq!(toy.visited.len(), 2);
    }
}
