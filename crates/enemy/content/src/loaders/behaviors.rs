//! Behavior definition loader.

use std::path::Path;

use enemy_core::{BehaviorRegistry, BehaviorSpec};

use crate::loaders::{LoadResult, read_file};

/// Loader for behavior definitions from RON files.
pub struct BehaviorLoader;

impl BehaviorLoader {
    /// Load behavior definitions from a RON file and build a registry.
    ///
    /// RON format: `[(name: "patrol", priority: 1, conditions: [..], actions: [..]), ..]`
    ///
    /// Definitions are registered in file order, which breaks priority ties.
    /// Unknown condition or action names fail the whole load.
    pub fn load(path: &Path) -> LoadResult<BehaviorRegistry> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<BehaviorRegistry> {
        let specs: Vec<BehaviorSpec> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse behaviors RON: {}", e))?;

        let registry = BehaviorRegistry::from_specs(specs)
            .map_err(|e| anyhow::anyhow!("Invalid behavior set: {}", e))?;
        tracing::debug!("Loaded {} behaviors", registry.len());
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use enemy_core::{ActionKind, Condition};

    use super::*;

    #[test]
    fn resolves_names_in_any_spelling() {
        let registry = BehaviorLoader::parse(
            r#"[
                (name: "patrol", priority: 1, conditions: ["notInCombat"], actions: ["look-around"]),
                (name: "charge", priority: 4, conditions: ["player_detected"], actions: ["moveTowardTarget"]),
            ]"#,
        )
        .unwrap();

        let charge = registry.by_name("charge").unwrap();
        assert_eq!(charge.conditions, vec![Condition::PlayerDetected]);
        assert_eq!(charge.actions, vec![ActionKind::MoveTowardTarget]);
    }

    #[test]
    fn unknown_action_fails_the_load() {
        let err = BehaviorLoader::parse(
            r#"[(name: "patrol", priority: 1, conditions: [], actions: ["teleport"])]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn missing_patrol_fails_the_load() {
        let err = BehaviorLoader::parse(r#"[(name: "hunt", priority: 5)]"#).unwrap_err();
        assert!(err.to_string().contains("patrol"));
    }
}
