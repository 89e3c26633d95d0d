//! Composite behavior nodes.
//!
//! Composite nodes control the evaluation of multiple child behaviors.
//! [`Sequence`] combines guards with AND logic, and [`PrioritySelector`]
//! ranks guarded entries by an integer priority.

use crate::{Behavior, Status};

/// Executes child behaviors in sequence until one fails.
///
/// # Semantics
///
/// A `Sequence` node evaluates its children from left to right:
/// - If a child returns `Failure`, the sequence **stops immediately** and returns `Failure`
/// - If a child returns `Success`, the sequence **continues** to the next child
/// - If all children return `Success`, the sequence returns `Success`
///
/// This is a short-circuited logical AND. A sequence without children
/// succeeds, the same way an empty conjunction is true.
pub struct Sequence<C> {
    children: Vec<Box<dyn Behavior<C>>>,
}

impl<C> Sequence<C> {
    /// Creates a new sequence with the given child behaviors.
    pub fn new(children: Vec<Box<dyn Behavior<C>>>) -> Self {
        Self { children }
    }

    /// Number of children in this sequence.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if the sequence has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<C> Behavior<C> for Sequence<C> {
    fn tick(&self, ctx: &mut C) -> Status {
        for child in &self.children {
            match child.tick(ctx) {
                Status::Success => continue,
                Status::Failure => return Status::Failure,
            }
        }
        Status::Success
    }
}

/// One guarded entry of a [`PrioritySelector`].
struct PriorityEntry<C> {
    priority: i32,
    guard: Box<dyn Behavior<C>>,
}

/// Picks the highest-priority entry whose guard holds.
///
/// # Semantics
///
/// Unlike a plain selector, which tries children in a fixed order and stops
/// at the first success, a `PrioritySelector` ticks **every** guard and then
/// picks among the ones that succeeded:
/// - The entry with the strictly highest priority wins
/// - Entries with equal priority are resolved in favour of the one
///   registered first
/// - If no guard succeeds, nothing is selected
///
/// The selector only judges guards. What the winning entry *does* is up to
/// the caller, which receives the entry's registration index.
///
/// # Example
///
/// ```rust
/// use behavior_tree::{Behavior, PrioritySelector, Status};
///
/// struct Holds(bool);
/// impl Behavior<()> for Holds {
///     fn tick(&self, _: &mut ()) -> Status {
///         Status::from_bool(self.0)
///     }
/// }
///
/// let mut selector = PrioritySelector::new();
/// selector.push(1, Box::new(Holds(true)));
/// selector.push(5, Box::new(Holds(true)));
/// selector.push(9, Box::new(Holds(false)));
///
/// assert_eq!(selector.select(&mut ()), Some(1));
/// ```
pub struct PrioritySelector<C> {
    entries: Vec<PriorityEntry<C>>,
}

impl<C> PrioritySelector<C> {
    /// Creates an empty selector.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a guarded entry and returns its registration index.
    pub fn push(&mut self, priority: i32, guard: Box<dyn Behavior<C>>) -> usize {
        self.entries.push(PriorityEntry { priority, guard });
        self.entries.len() - 1
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Priority of the entry at `index`.
    pub fn priority(&self, index: usize) -> Option<i32> {
        self.entries.get(index).map(|entry| entry.priority)
    }

    /// Evaluates every guard and returns the index of the winning entry.
    pub fn select(&self, ctx: &mut C) -> Option<usize> {
        let mut best: Option<(usize, i32)> = None;

        for (index, entry) in self.entries.iter().enumerate() {
            if entry.guard.tick(ctx).is_failure() {
                continue;
            }
            // Strictly greater: an equal priority never displaces an earlier entry.
            match best {
                Some((_, priority)) if entry.priority <= priority => {}
                _ => best = Some((index, entry.priority)),
            }
        }

        best.map(|(index, _)| index)
    }
}

impl<C> Default for PrioritySelector<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Behavior<C> for PrioritySelector<C> {
    fn tick(&self, ctx: &mut C) -> Status {
        Status::from_bool(self.select(ctx).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestContext {
        value: i32,
        ticks: u32,
    }

    struct AtLeast(i32);
    impl Behavior<TestContext> for AtLeast {
        fn tick(&self, ctx: &mut TestContext) -> Status {
            ctx.ticks += 1;
            Status::from_bool(ctx.value >= self.0)
        }
    }

    struct FailAlways;
    impl Behavior<TestContext> for FailAlways {
        fn tick(&self, ctx: &mut TestContext) -> Status {
            ctx.ticks += 1;
            Status::Failure
        }
    }

    fn ctx(value: i32) -> TestContext {
        TestContext { value, ticks: 0 }
    }

    #[test]
    fn sequence_all_success() {
        let seq = Sequence::new(vec![Box::new(AtLeast(1)), Box::new(AtLeast(2))]);

        let mut ctx = ctx(5);
        assert_eq!(seq.tick(&mut ctx), Status::Success);
        assert_eq!(ctx.ticks, 2);
    }

    #[test]
    fn sequence_stops_on_first_failure() {
        let seq = Sequence::new(vec![
            Box::new(AtLeast(1)),
            Box::new(FailAlways),
            Box::new(AtLeast(1)), // Should not be ticked
        ]);

        let mut ctx = ctx(5);
        assert_eq!(seq.tick(&mut ctx), Status::Failure);
        assert_eq!(ctx.ticks, 2);
    }

    #[test]
    fn empty_sequence_succeeds() {
        let seq: Sequence<TestContext> = Sequence::new(Vec::new());
        assert!(seq.is_empty());
        assert_eq!(seq.tick(&mut ctx(0)), Status::Success);
    }

    #[test]
    fn selector_prefers_higher_priority_regardless_of_order() {
        let mut low_first = PrioritySelector::new();
        low_first.push(1, Box::new(AtLeast(0)));
        low_first.push(7, Box::new(AtLeast(0)));

        let mut high_first = PrioritySelector::new();
        high_first.push(7, Box::new(AtLeast(0)));
        high_first.push(1, Box::new(AtLeast(0)));

        assert_eq!(low_first.select(&mut ctx(0)), Some(1));
        assert_eq!(high_first.select(&mut ctx(0)), Some(0));
    }

    #[test]
    fn selector_breaks_ties_by_registration_order() {
        let mut selector = PrioritySelector::new();
        selector.push(3, Box::new(FailAlways));
        selector.push(8, Box::new(AtLeast(0)));
        selector.push(8, Box::new(AtLeast(0)));

        assert_eq!(selector.select(&mut ctx(0)), Some(1));
    }

    #[test]
    fn selector_skips_failing_guards_and_ticks_all() {
        let mut selector = PrioritySelector::new();
        selector.push(10, Box::new(AtLeast(100)));
        selector.push(2, Box::new(AtLeast(1)));

        let mut ctx = ctx(5);
        assert_eq!(selector.select(&mut ctx), Some(1));
        assert_eq!(ctx.ticks, 2);
        assert_eq!(selector.priority(1), Some(2));
    }

    #[test]
    fn selector_fails_when_nothing_holds() {
        let mut selector = PrioritySelector::new();
        selector.push(1, Box::new(FailAlways));

        assert_eq!(selector.select(&mut ctx(0)), None);
        assert_eq!(selector.tick(&mut ctx(0)), Status::Failure);
    }
}
