//! Engine-wide tunables and their validation.

use crate::error::ConfigError;
use crate::pack::Formation;

/// Engine-wide tunables.
///
/// Every field has a default, so a content file only needs to list what it
/// overrides.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Units per second while following a patrol route.
    pub patrol_speed: f32,
    /// Units per second while closing in on a target.
    pub chase_speed: f32,
    /// Units per second while retreating.
    pub flee_speed: f32,
    /// A waypoint counts as reached below this distance.
    pub waypoint_arrival_distance: f32,

    pub cover_search_radius: f32,
    pub ambush_search_radius: f32,
    pub ally_search_radius: f32,
    /// `playerNearby` holds below `aggro_range * player_nearby_factor`.
    pub player_nearby_factor: f32,

    /// Assumed projectile speed used for ranged lead time (units per second).
    pub projectile_speed: f32,
    /// Damage multiplier applied to ranged attacks.
    pub ranged_damage_factor: f32,

    /// Delay between pack formation and the first coordinated attack.
    pub pack_attack_delay_ms: u64,
    /// Packs not refreshed for this long are reaped.
    pub pack_stale_after_ms: u64,
    pub default_formation: Formation,

    /// `outmatched` holds when more than this many hostiles engage the agent.
    pub outmatched_threshold: u32,
    /// Maximum number of distinct opponent skills tracked per agent.
    pub skill_usage_capacity: usize,
}

impl EngineConfig {
    pub const DEFAULT_PATROL_SPEED: f32 = 2.0;
    pub const DEFAULT_CHASE_SPEED: f32 = 5.0;
    pub const DEFAULT_FLEE_SPEED: f32 = 7.0;
    pub const DEFAULT_COVER_RADIUS: f32 = 20.0;
    pub const DEFAULT_AMBUSH_RADIUS: f32 = 15.0;
    pub const DEFAULT_ALLY_RADIUS: f32 = 25.0;
    pub const DEFAULT_PACK_ATTACK_DELAY_MS: u64 = 3_000;
    pub const DEFAULT_PACK_STALE_AFTER_MS: u64 = 10_000;
    pub const DEFAULT_SKILL_USAGE_CAPACITY: usize = 32;

    pub fn new() -> Self {
        Self {
            patrol_speed: Self::DEFAULT_PATROL_SPEED,
            chase_speed: Self::DEFAULT_CHASE_SPEED,
            flee_speed: Self::DEFAULT_FLEE_SPEED,
            waypoint_arrival_distance: 1.0,
            cover_search_radius: Self::DEFAULT_COVER_RADIUS,
            ambush_search_radius: Self::DEFAULT_AMBUSH_RADIUS,
            ally_search_radius: Self::DEFAULT_ALLY_RADIUS,
            player_nearby_factor: 1.5,
            projectile_speed: 20.0,
            ranged_damage_factor: 0.8,
            pack_attack_delay_ms: Self::DEFAULT_PACK_ATTACK_DELAY_MS,
            pack_stale_after_ms: Self::DEFAULT_PACK_STALE_AFTER_MS,
            default_formation: Formation::default(),
            outmatched_threshold: 2,
            skill_usage_capacity: Self::DEFAULT_SKILL_USAGE_CAPACITY,
        }
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let speeds = [self.patrol_speed, self.chase_speed, self.flee_speed];
        if speeds.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ConfigError::invalid("speed", "must be positive"));
        }
        if !(self.flee_speed > self.chase_speed && self.chase_speed > self.patrol_speed) {
            return Err(ConfigError::invalid(
                "speed",
                "flee speed must exceed chase speed, which must exceed patrol speed",
            ));
        }

        let radii = [
            self.cover_search_radius,
            self.ambush_search_radius,
            self.ally_search_radius,
            self.waypoint_arrival_distance,
        ];
        if radii.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return Err(ConfigError::invalid("radius", "must be positive"));
        }
        if self.player_nearby_factor < 1.0 {
            return Err(ConfigError::invalid("player_nearby_factor", "must be at least 1"));
        }
        if self.projectile_speed <= 0.0 {
            return Err(ConfigError::invalid("projectile_speed", "must be positive"));
        }
        if self.skill_usage_capacity == 0 {
            return Err(ConfigError::invalid("skill_usage_capacity", "must be non-zero"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn speed_ordering_is_enforced() {
        let config = EngineConfig {
            chase_speed: 8.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "speed", .. })
        ));
    }

    #[test]
    fn zero_radius_is_rejected() {
        let config = EngineConfig {
            ally_search_radius: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
