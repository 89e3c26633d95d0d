//! Enemy roster loader.

use std::collections::HashSet;
use std::path::Path;

use enemy_core::EnemySpec;

use crate::loaders::{LoadResult, read_file};

/// Loader for enemy rosters from RON files.
pub struct EnemyLoader;

impl EnemyLoader {
    /// Load an enemy roster from a RON file.
    ///
    /// RON format: `[("goblin_1", (personality: "aggressive", position: (0.0, 0.0, 0.0), ..)), ..]`
    ///
    /// Every spec field has a default. Returns `(enemy_id, spec)` pairs in
    /// file order.
    pub fn load(path: &Path) -> LoadResult<Vec<(String, EnemySpec)>> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<Vec<(String, EnemySpec)>> {
        let roster: Vec<(String, EnemySpec)> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse enemy roster RON: {}", e))?;

        let mut seen = HashSet::new();
        for (id, spec) in &roster {
            if !seen.insert(id.as_str()) {
                anyhow::bail!("Enemy '{}' is listed more than once", id);
            }
            spec.validate()
                .map_err(|e| anyhow::anyhow!("Invalid spec for enemy '{}': {}", id, e))?;
        }

        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use enemy_core::Vec3;

    use super::*;

    #[test]
    fn omitted_fields_use_defaults() {
        let roster = EnemyLoader::parse(
            r#"[
                ("archer", (
                    personality: "tactical",
                    position: (4.0, 0.0, -2.0),
                    has_ranged_weapon: true,
                    abilities: [(id: "volley", cooldown_ms: 4000, counter_for: Some("shield_wall"))],
                )),
                ("grunt", ()),
            ]"#,
        )
        .unwrap();

        let (id, archer) = &roster[0];
        assert_eq!(id, "archer");
        assert_eq!(archer.position, Vec3::new(4.0, 0.0, -2.0));
        assert_eq!(archer.abilities[0].id.as_str(), "volley");
        assert_eq!(
            archer.abilities[0].counter_for.as_ref().map(|s| s.as_str()),
            Some("shield_wall")
        );
        assert_eq!(archer.aggro_range, EnemySpec::DEFAULT_AGGRO_RANGE);

        let (_, grunt) = &roster[1];
        assert_eq!(grunt, &EnemySpec::default());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = EnemyLoader::parse(r#"[("a", ()), ("a", ())]"#).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn invalid_specs_are_rejected() {
        let err = EnemyLoader::parse(r#"[("a", (max_health: 0.0))]"#).unwrap_err();
        assert!(err.to_string().contains("'a'"));
    }
}
