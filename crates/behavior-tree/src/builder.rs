//! Builder utilities for ergonomic behavior tree construction.
//!
//! Instead of writing verbose `Box::new(Sequence::new(vec![...]))`, callers
//! can use shorter functions like `sequence(vec![...])`.

use crate::{Behavior, PrioritySelector, Sequence};

/// Creates a sequence node.
///
/// Shorthand for `Box::new(Sequence::new(children))`.
#[inline]
pub fn sequence<C: 'static>(children: Vec<Box<dyn Behavior<C>>>) -> Box<dyn Behavior<C>> {
    Box::new(Sequence::new(children))
}

/// Creates a sequence from any iterator of nodes.
///
/// Useful when the children come from a typed list, e.g. mapping an enum of
/// conditions into boxed nodes.
pub fn all_of<C, B, I>(children: I) -> Box<dyn Behavior<C>>
where
    C: 'static,
    B: Behavior<C> + 'static,
    I: IntoIterator<Item = B>,
{
    let children = children
        .into_iter()
        .map(|child| Box::new(child) as Box<dyn Behavior<C>>)
        .collect();
    Box::new(Sequence::new(children))
}

/// Creates a priority selector from `(priority, guard)` pairs, registered in
/// iteration order.
pub fn priority<C>(entries: Vec<(i32, Box<dyn Behavior<C>>)>) -> PrioritySelector<C> {
    let mut selector = PrioritySelector::new();
    for (priority, guard) in entries {
        selector.push(priority, guard);
    }
    selector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    #[derive(Clone, Copy)]
    struct Flag(bool);
    impl Behavior<()> for Flag {
        fn tick(&self, _: &mut ()) -> Status {
            Status::from_bool(self.0)
        }
    }

    #[test]
    fn all_of_requires_every_child() {
        assert!(all_of([Flag(true), Flag(true)]).tick(&mut ()).is_success());
        assert!(all_of([Flag(true), Flag(false)]).tick(&mut ()).is_failure());
    }

    #[test]
    fn priority_registers_in_order() {
        let selector = priority(vec![
            (4, sequence(vec![Box::new(Flag(true))])),
            (4, all_of([Flag(true)])),
        ]);
        assert_eq!(selector.len(), 2);
        assert_eq!(selector.select(&mut ()), Some(0));
    }
}
