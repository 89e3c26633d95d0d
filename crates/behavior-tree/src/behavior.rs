//! The node trait.
//!
//! Every node, leaf or composite, is a [`Behavior`] over some context `C`.
//! Selection guards run over read-only snapshots; actions run over a mutable
//! blackboard. Both use the same trait.

use crate::Status;

/// A node evaluated once per tick against a context.
pub trait Behavior<C>: Send + Sync {
    /// Guard nodes only read `ctx`; action-like nodes may write to it.
    fn tick(&self, ctx: &mut C) -> Status;
}

/// Lets `Box<dyn Behavior<C>>` sit in composites next to concrete nodes.
impl<C> Behavior<C> for Box<dyn Behavior<C>> {
    #[inline]
    fn tick(&self, ctx: &mut C) -> Status {
        (**self).tick(ctx)
    }
}
