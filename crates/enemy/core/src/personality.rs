//! Shared personality profiles.
//!
//! A personality is looked up by tag and shared by every enemy carrying that
//! tag. The table is read-only once the engine is built.

use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Behavioral tuning shared by all enemies with the same personality tag.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersonalityProfile {
    /// Probability hint that the agent commits to an attack.
    pub attack_chance: f32,
    /// Health fraction below which fleeing becomes viable.
    pub retreat_threshold: f32,
    /// Probability hint that the agent reaches for a skill.
    pub use_skill_chance: f32,
}

impl PersonalityProfile {
    pub const fn new(attack_chance: f32, retreat_threshold: f32, use_skill_chance: f32) -> Self {
        Self {
            attack_chance,
            retreat_threshold,
            use_skill_chance,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let in_unit_range = |v: f32| (0.0..=1.0).contains(&v);
        if !in_unit_range(self.attack_chance) {
            return Err(ConfigError::invalid("attack_chance", "must be within 0..=1"));
        }
        if !in_unit_range(self.retreat_threshold) {
            return Err(ConfigError::invalid(
                "retreat_threshold",
                "must be within 0..=1",
            ));
        }
        if !in_unit_range(self.use_skill_chance) {
            return Err(ConfigError::invalid("use_skill_chance", "must be within 0..=1"));
        }
        Ok(())
    }
}

/// Lookup table from personality tag to profile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersonalityTable {
    profiles: BTreeMap<String, PersonalityProfile>,
}

impl PersonalityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reference personalities: aggressive, defensive, tactical, berserker.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.profiles.insert("aggressive".into(), PersonalityProfile::new(0.8, 0.1, 0.3));
        table.profiles.insert("defensive".into(), PersonalityProfile::new(0.4, 0.5, 0.5));
        table.profiles.insert("tactical".into(), PersonalityProfile::new(0.6, 0.3, 0.7));
        table.profiles.insert("berserker".into(), PersonalityProfile::new(0.95, 0.0, 0.2));
        table
    }

    /// Builds a validated table from `(tag, profile)` pairs.
    pub fn from_profiles<I>(profiles: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, PersonalityProfile)>,
    {
        let mut table = Self::new();
        for (tag, profile) in profiles {
            table.insert(tag, profile)?;
        }
        if table.is_empty() {
            return Err(ConfigError::EmptyPersonalityTable);
        }
        Ok(table)
    }

    /// Adds or replaces a profile.
    pub fn insert(
        &mut self,
        tag: impl Into<String>,
        profile: PersonalityProfile,
    ) -> Result<(), ConfigError> {
        profile.validate()?;
        self.profiles.insert(tag.into(), profile);
        Ok(())
    }

    pub fn get(&self, tag: &str) -> Option<&PersonalityProfile> {
        self.profiles.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.profiles.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PersonalityProfile)> {
        self.profiles.iter().map(|(tag, profile)| (tag.as_str(), profile))
    }
}
