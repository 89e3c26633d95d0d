//! Condition predicates.
//!
//! Conditions are pure functions of a [`ConditionSnapshot`], an owned copy of
//! everything the predicates read about an agent and its surroundings at the
//! start of its turn in the tick.

use std::str::FromStr;

use behavior_tree::{Behavior, Status};
use glam::Vec3;
use strum::IntoEnumIterator;

use super::normalize_name;
use crate::agent::EnemyAgent;
use crate::config::EngineConfig;
use crate::personality::PersonalityProfile;
use crate::types::Timestamp;

/// A named predicate a behavior can require.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Condition {
    /// The agent is not aggroed.
    NotInCombat,
    /// The agent has at least one patrol waypoint.
    HasPatrolRoute,
    /// The opponent is inside aggro range. Also accepted as `within_aggro_range`.
    PlayerDetected,
    /// The opponent is inside an extended aggro range.
    PlayerNearby,
    /// An ambush point was found this tick.
    HasHidingSpot,
    /// Health fraction is below the personality's retreat threshold.
    LowHealth,
    /// More hostiles engage the agent than it can handle.
    Outmatched,
    InMeleeRange,
    /// The attack cooldown has elapsed.
    CanAttack,
    /// Beyond melee range but inside ranged range.
    InRangedRange,
    HasRangedWeapon,
    /// At least one ability is off cooldown.
    SkillReady,
    /// Healthy with allies around, or cover nearby.
    TacticalAdvantage,
    HasAllies,
    /// Some nearby ally is already aggroed.
    TargetShared,
}

impl Condition {
    /// Evaluates the predicate against a snapshot.
    pub fn holds(self, s: &ConditionSnapshot) -> bool {
        match self {
            Condition::NotInCombat => !s.is_aggro,
            Condition::HasPatrolRoute => s.has_patrol_route,
            Condition::PlayerDetected => s.distance < s.aggro_range,
            Condition::PlayerNearby => s.distance < s.aggro_range * s.nearby_factor,
            Condition::HasHidingSpot => s.has_hiding_spot,
            Condition::LowHealth => s.health_fraction < s.retreat_threshold,
            Condition::Outmatched => s.threat_count > s.outmatched_threshold,
            Condition::InMeleeRange => s.distance < s.melee_range,
            Condition::CanAttack => s
                .last_attack
                .is_none_or(|last| s.now.since(last) > s.attack_cooldown_ms),
            Condition::InRangedRange => s.melee_range < s.distance && s.distance < s.ranged_range,
            Condition::HasRangedWeapon => s.has_ranged_weapon,
            Condition::SkillReady => s.skill_ready,
            Condition::TacticalAdvantage => {
                (s.health_fraction > 0.5 && s.ally_count > 0) || s.has_cover
            }
            Condition::HasAllies => s.ally_count > 0,
            Condition::TargetShared => s.ally_aggro,
        }
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_name(name);
        if wanted == "withinaggrorange" {
            return Ok(Condition::PlayerDetected);
        }
        Condition::iter()
            .find(|condition| normalize_name(condition.as_ref()) == wanted)
            .ok_or_else(|| name.to_string())
    }
}

impl Behavior<ConditionSnapshot> for Condition {
    #[inline]
    fn tick(&self, ctx: &mut ConditionSnapshot) -> Status {
        Status::from_bool(self.holds(ctx))
    }
}

/// Everything the condition predicates read, copied out of the agent and its
/// surroundings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConditionSnapshot {
    pub now: Timestamp,
    pub distance: f32,
    pub health_fraction: f32,

    pub is_aggro: bool,
    pub has_patrol_route: bool,
    pub has_ranged_weapon: bool,
    pub skill_ready: bool,

    pub aggro_range: f32,
    pub melee_range: f32,
    pub ranged_range: f32,
    pub nearby_factor: f32,

    pub retreat_threshold: f32,
    pub last_attack: Option<Timestamp>,
    pub attack_cooldown_ms: u64,

    pub threat_count: u32,
    pub outmatched_threshold: u32,

    pub has_cover: bool,
    pub has_hiding_spot: bool,
    pub ally_count: usize,
    pub ally_aggro: bool,
}

impl ConditionSnapshot {
    /// Captures a snapshot for `agent` facing an opponent at `opponent`.
    pub fn capture(
        agent: &EnemyAgent,
        personality: &PersonalityProfile,
        opponent: Vec3,
        threat_count: u32,
        now: Timestamp,
        config: &EngineConfig,
    ) -> Self {
        Self {
            now,
            distance: agent.distance_to(opponent),
            health_fraction: agent.health_fraction(),
            is_aggro: agent.is_aggro(),
            has_patrol_route: !agent.patrol.is_empty(),
            has_ranged_weapon: agent.has_ranged_weapon,
            skill_ready: agent.any_ability_ready(now),
            aggro_range: agent.ranges.aggro,
            melee_range: agent.ranges.melee,
            ranged_range: agent.ranges.ranged,
            nearby_factor: config.player_nearby_factor,
            retreat_threshold: personality.retreat_threshold,
            last_attack: agent.last_attack,
            attack_cooldown_ms: agent.attack_cooldown_ms,
            threat_count,
            outmatched_threshold: config.outmatched_threshold,
            has_cover: agent.awareness.nearest_cover.is_some(),
            has_hiding_spot: agent.awareness.nearest_ambush.is_some(),
            ally_count: agent.awareness.allies.len(),
            ally_aggro: agent.awareness.any_ally_aggro(),
        }
    }
}

impl Default for ConditionSnapshot {
    fn default() -> Self {
        Self {
            now: Timestamp::ZERO,
            distance: f32::INFINITY,
            health_fraction: 1.0,
            is_aggro: false,
            has_patrol_route: false,
            has_ranged_weapon: false,
            skill_ready: false,
            aggro_range: 15.0,
            melee_range: 2.0,
            ranged_range: 10.0,
            nearby_factor: 1.5,
            retreat_threshold: 0.0,
            last_attack: None,
            attack_cooldown_ms: 1_000,
            threat_count: 0,
            outmatched_threshold: 2,
            has_cover: false,
            has_hiding_spot: false,
            ally_count: 0,
            ally_aggro: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_distance(distance: f32) -> ConditionSnapshot {
        ConditionSnapshot {
            distance,
            ..ConditionSnapshot::default()
        }
    }

    #[test]
    fn range_predicates_use_strict_bounds() {
        assert!(Condition::PlayerDetected.holds(&at_distance(14.9)));
        assert!(!Condition::PlayerDetected.holds(&at_distance(15.0)));
        assert!(Condition::PlayerNearby.holds(&at_distance(22.0)));
        assert!(!Condition::PlayerNearby.holds(&at_distance(22.5)));
        assert!(Condition::InMeleeRange.holds(&at_distance(1.0)));
        assert!(!Condition::InRangedRange.holds(&at_distance(2.0)));
        assert!(Condition::InRangedRange.holds(&at_distance(6.0)));
        assert!(!Condition::InRangedRange.holds(&at_distance(10.0)));
    }

    #[test]
    fn low_health_compares_against_retreat_threshold() {
        let s = ConditionSnapshot {
            health_fraction: 0.1,
            retreat_threshold: 0.5,
            ..ConditionSnapshot::default()
        };
        assert!(Condition::LowHealth.holds(&s));
        assert!(!Condition::LowHealth.holds(&ConditionSnapshot {
            health_fraction: 0.5,
            ..s
        }));
    }

    #[test]
    fn outmatched_needs_more_than_threshold() {
        let s = ConditionSnapshot {
            threat_count: 2,
            ..ConditionSnapshot::default()
        };
        assert!(!Condition::Outmatched.holds(&s));
        assert!(Condition::Outmatched.holds(&ConditionSnapshot {
            threat_count: 3,
            ..s
        }));
    }

    #[test]
    fn can_attack_requires_cooldown_to_pass_strictly() {
        let s = ConditionSnapshot {
            now: Timestamp(2_000),
            last_attack: Some(Timestamp(1_000)),
            ..ConditionSnapshot::default()
        };
        assert!(!Condition::CanAttack.holds(&s));
        assert!(Condition::CanAttack.holds(&ConditionSnapshot {
            now: Timestamp(2_001),
            ..s
        }));
        assert!(Condition::CanAttack.holds(&ConditionSnapshot::default()));
    }

    #[test]
    fn tactical_advantage_from_allies_or_cover() {
        let healthy_with_ally = ConditionSnapshot {
            health_fraction: 0.8,
            ally_count: 1,
            ..ConditionSnapshot::default()
        };
        assert!(Condition::TacticalAdvantage.holds(&healthy_with_ally));

        let hurt_with_ally = ConditionSnapshot {
            health_fraction: 0.4,
            ..healthy_with_ally
        };
        assert!(!Condition::TacticalAdvantage.holds(&hurt_with_ally));

        let hurt_in_cover = ConditionSnapshot {
            has_cover: true,
            ..hurt_with_ally
        };
        assert!(Condition::TacticalAdvantage.holds(&hurt_in_cover));
    }

    #[test]
    fn ally_predicates() {
        let s = ConditionSnapshot {
            ally_count: 2,
            ..ConditionSnapshot::default()
        };
        assert!(Condition::HasAllies.holds(&s));
        assert!(!Condition::TargetShared.holds(&s));
        assert!(Condition::TargetShared.holds(&ConditionSnapshot {
            ally_aggro: true,
            ..s
        }));
    }

    #[test]
    fn flag_predicates() {
        let s = ConditionSnapshot::default();
        assert!(Condition::NotInCombat.holds(&s));
        assert!(!Condition::HasPatrolRoute.holds(&s));
        assert!(!Condition::HasHidingSpot.holds(&s));
        assert!(!Condition::HasRangedWeapon.holds(&s));
        assert!(!Condition::SkillReady.holds(&s));

        let busy = ConditionSnapshot {
            is_aggro: true,
            has_patrol_route: true,
            has_hiding_spot: true,
            has_ranged_weapon: true,
            skill_ready: true,
            ..s
        };
        assert!(!Condition::NotInCombat.holds(&busy));
        assert!(Condition::HasPatrolRoute.holds(&busy));
        assert!(Condition::HasHidingSpot.holds(&busy));
        assert!(Condition::HasRangedWeapon.holds(&busy));
        assert!(Condition::SkillReady.holds(&busy));
    }

    #[test]
    fn names_parse_in_any_spelling() {
        assert_eq!("notInCombat".parse(), Ok(Condition::NotInCombat));
        assert_eq!("in_melee_range".parse(), Ok(Condition::InMeleeRange));
        assert_eq!("withinAggroRange".parse(), Ok(Condition::PlayerDetected));
        assert_eq!(
            "isDancing".parse::<Condition>(),
            Err("isDancing".to_string())
        );
    }

    #[test]
    fn condition_ticks_as_behavior_node() {
        let mut s = at_distance(1.0);
        assert_eq!(Condition::InMeleeRange.tick(&mut s), Status::Success);
        assert_eq!(Condition::HasAllies.tick(&mut s), Status::Failure);
    }
}
