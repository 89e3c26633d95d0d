//! Behavior definitions and priority-based selection.
//!
//! A behavior is a named bundle of conditions (all must hold) and actions
//! (all run, in order, once the behavior is chosen). Conditions and actions
//! are closed enums; content refers to them by name and unknown names are
//! rejected when the registry is built.

pub mod action;
pub mod condition;
pub mod registry;

pub use action::ActionKind;
pub use condition::{Condition, ConditionSnapshot};
pub use registry::{BehaviorDefinition, BehaviorId, BehaviorRegistry, BehaviorSpec, Selection};

/// Canonical form used to compare content names against enum variants:
/// lowercase with `_`, `-` and spaces removed, so `patrolMove`,
/// `patrol_move` and `patrol-move` all match.
pub(crate) fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::normalize_name;

    #[test]
    fn spellings_normalize_alike() {
        assert_eq!(normalize_name("patrolMove"), "patrolmove");
        assert_eq!(normalize_name("patrol_move"), "patrolmove");
        assert_eq!(normalize_name("Patrol-Move"), "patrolmove");
    }
}
