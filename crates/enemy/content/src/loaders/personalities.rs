//! Personality table loader.

use std::collections::BTreeMap;
use std::path::Path;

use enemy_core::{PersonalityProfile, PersonalityTable};

use crate::loaders::{LoadResult, read_file};

/// Loader for personality profiles from RON files.
pub struct PersonalityLoader;

impl PersonalityLoader {
    /// Load a personality table from a RON file.
    ///
    /// RON format: `{ "tag": (attack_chance: .., retreat_threshold: .., use_skill_chance: ..) }`
    pub fn load(path: &Path) -> LoadResult<PersonalityTable> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<PersonalityTable> {
        let profiles: BTreeMap<String, PersonalityProfile> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse personalities RON: {}", e))?;

        let table = PersonalityTable::from_profiles(profiles)
            .map_err(|e| anyhow::anyhow!("Invalid personality table: {}", e))?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profiles() {
        let table = PersonalityLoader::parse(
            r#"{
                "skittish": (attack_chance: 0.2, retreat_threshold: 0.9, use_skill_chance: 0.1),
            }"#,
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("skittish").unwrap().retreat_threshold, 0.9);
    }

    #[test]
    fn rejects_out_of_range_and_empty_tables() {
        let err = PersonalityLoader::parse(
            r#"{ "odd": (attack_chance: 1.5, retreat_threshold: 0.1, use_skill_chance: 0.1) }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid personality table"));

        assert!(PersonalityLoader::parse("{}").is_err());
    }
}
