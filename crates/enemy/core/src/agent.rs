//! Enemy agent state.

use std::sync::Arc;

use glam::Vec3;

use crate::awareness::Awareness;
use crate::error::ConfigError;
use crate::learning::LearningProfile;
use crate::pack::PackKey;
use crate::types::{EnemyId, SkillId, Timestamp};

bitflags::bitflags! {
    /// Transient per-agent flags toggled by actions.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AgentFlags: u16 {
        const AGGRO = 1 << 0;
        const FLEEING = 1 << 1;
        const HIDING = 1 << 2;
        const LOOKING_AROUND = 1 << 3;
        const PREPARING_ATTACK = 1 << 4;
        const IN_AMBUSH = 1 << 5;
        const CALLING_FOR_HELP = 1 << 6;
        const IN_FORMATION = 1 << 7;

        /// Everything but AGGRO; reset before each behavior runs.
        const TRANSIENT = Self::FLEEING.bits()
            | Self::HIDING.bits()
            | Self::LOOKING_AROUND.bits()
            | Self::PREPARING_ATTACK.bits()
            | Self::IN_AMBUSH.bits()
            | Self::CALLING_FOR_HELP.bits()
            | Self::IN_FORMATION.bits();
    }
}

/// Ability definition as supplied by content.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySpec {
    pub id: SkillId,
    pub cooldown_ms: u64,
    /// Opponent skill this ability counters, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub counter_for: Option<SkillId>,
}

impl AbilitySpec {
    pub fn new(id: impl Into<SkillId>, cooldown_ms: u64) -> Self {
        Self {
            id: id.into(),
            cooldown_ms,
            counter_for: None,
        }
    }

    pub fn countering(mut self, skill: impl Into<SkillId>) -> Self {
        self.counter_for = Some(skill.into());
        self
    }
}

/// An ability owned by an agent, with its cooldown stamp.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ability {
    pub id: SkillId,
    pub cooldown_ms: u64,
    pub counter_for: Option<SkillId>,
    pub last_used: Option<Timestamp>,
}

impl Ability {
    /// An ability is ready once its full cooldown has elapsed since last use.
    pub fn is_ready(&self, now: Timestamp) -> bool {
        self.last_used
            .is_none_or(|used| now.since(used) >= self.cooldown_ms)
    }
}

impl From<AbilitySpec> for Ability {
    fn from(spec: AbilitySpec) -> Self {
        Self {
            id: spec.id,
            cooldown_ms: spec.cooldown_ms,
            counter_for: spec.counter_for,
            last_used: None,
        }
    }
}

/// Distance thresholds that drive engagement.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngagementRanges {
    pub aggro: f32,
    pub melee: f32,
    pub ranged: f32,
}

/// Ordered patrol waypoints and the one currently headed for.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatrolRoute {
    pub points: Vec<Vec3>,
    pub index: usize,
}

impl PatrolRoute {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points, index: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn current(&self) -> Option<Vec3> {
        self.points.get(self.index).copied()
    }

    /// Moves to the next waypoint, wrapping to the start of the route.
    pub fn advance(&mut self) {
        if !self.points.is_empty() {
            self.index = (self.index + 1) % self.points.len();
        }
    }
}

/// The pack an agent last synchronized with.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackMembership {
    pub pack: PackKey,
    pub is_leader: bool,
}

/// Construction parameters for an enemy (the `config` of `create_enemy`).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnemySpec {
    pub position: Vec3,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub personality: String,
    pub aggro_range: f32,
    pub melee_range: f32,
    pub ranged_range: f32,
    pub has_ranged_weapon: bool,
    pub abilities: Vec<AbilitySpec>,
    pub patrol_route: Vec<Vec3>,
    pub attack_cooldown_ms: u64,
    /// Base attack damage; `10 × level` when absent.
    pub damage: Option<f32>,
}

impl EnemySpec {
    pub const DEFAULT_AGGRO_RANGE: f32 = 15.0;
    pub const DEFAULT_MELEE_RANGE: f32 = 2.0;
    pub const DEFAULT_RANGED_RANGE: f32 = 10.0;
    pub const DEFAULT_ATTACK_COOLDOWN_MS: u64 = 1_000;

    pub fn new(personality: impl Into<String>) -> Self {
        Self {
            personality: personality.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_health(mut self, health: f32, max_health: f32) -> Self {
        self.health = health;
        self.max_health = max_health;
        self
    }

    pub fn with_ranges(mut self, aggro: f32, melee: f32, ranged: f32) -> Self {
        self.aggro_range = aggro;
        self.melee_range = melee;
        self.ranged_range = ranged;
        self
    }

    pub fn with_ranged_weapon(mut self) -> Self {
        self.has_ranged_weapon = true;
        self
    }

    pub fn with_ability(mut self, ability: AbilitySpec) -> Self {
        self.abilities.push(ability);
        self
    }

    pub fn with_patrol_route(mut self, points: Vec<Vec3>) -> Self {
        self.patrol_route = points;
        self
    }

    pub fn with_attack_cooldown(mut self, cooldown_ms: u64) -> Self {
        self.attack_cooldown_ms = cooldown_ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_health > 0.0) {
            return Err(ConfigError::invalid("max_health", "must be positive"));
        }
        if self.health < 0.0 {
            return Err(ConfigError::invalid("health", "must not be negative"));
        }
        let ranges = [self.aggro_range, self.melee_range, self.ranged_range];
        if ranges.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(ConfigError::invalid("range", "must be finite and non-negative"));
        }
        if self.melee_range > self.ranged_range {
            return Err(ConfigError::invalid(
                "melee_range",
                "must not exceed ranged_range",
            ));
        }
        Ok(())
    }
}

impl Default for EnemySpec {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            health: 100.0,
            max_health: 100.0,
            level: 1,
            personality: String::from("aggressive"),
            aggro_range: Self::DEFAULT_AGGRO_RANGE,
            melee_range: Self::DEFAULT_MELEE_RANGE,
            ranged_range: Self::DEFAULT_RANGED_RANGE,
            has_ranged_weapon: false,
            abilities: Vec::new(),
            patrol_route: Vec::new(),
            attack_cooldown_ms: Self::DEFAULT_ATTACK_COOLDOWN_MS,
            damage: None,
        }
    }
}

/// A hostile agent owned by the engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyAgent {
    pub id: EnemyId,
    pub position: Vec3,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub personality: String,
    pub ranges: EngagementRanges,
    pub has_ranged_weapon: bool,
    pub abilities: Vec<Ability>,
    /// Index into `abilities` chosen by the last skill selection.
    pub selected_ability: Option<usize>,
    pub current_behavior: Arc<str>,
    /// Last known target position.
    pub target: Option<Vec3>,
    pub patrol: PatrolRoute,
    pub last_attack: Option<Timestamp>,
    pub attack_cooldown_ms: u64,
    pub damage: f32,
    pub awareness: Awareness,
    pub learning: LearningProfile,
    pub flags: AgentFlags,
    pub pack: Option<PackMembership>,
}

impl EnemyAgent {
    pub(crate) fn new(
        id: EnemyId,
        spec: EnemySpec,
        initial_behavior: Arc<str>,
        skill_capacity: usize,
    ) -> Self {
        let damage = spec.damage.unwrap_or(10.0 * spec.level as f32);
        Self {
            id,
            position: spec.position,
            health: spec.health.min(spec.max_health),
            max_health: spec.max_health,
            level: spec.level,
            personality: spec.personality,
            ranges: EngagementRanges {
                aggro: spec.aggro_range,
                melee: spec.melee_range,
                ranged: spec.ranged_range,
            },
            has_ranged_weapon: spec.has_ranged_weapon,
            abilities: spec.abilities.into_iter().map(Ability::from).collect(),
            selected_ability: None,
            current_behavior: initial_behavior,
            target: None,
            patrol: PatrolRoute::new(spec.patrol_route),
            last_attack: None,
            attack_cooldown_ms: spec.attack_cooldown_ms,
            damage,
            awareness: Awareness::default(),
            learning: LearningProfile::new(skill_capacity),
            flags: AgentFlags::empty(),
            pack: None,
        }
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }

    /// Strictly more than the attack cooldown must have passed since the last
    /// attack. An agent that never attacked may attack.
    pub fn can_attack(&self, now: Timestamp) -> bool {
        self.last_attack
            .is_none_or(|last| now.since(last) > self.attack_cooldown_ms)
    }

    pub fn any_ability_ready(&self, now: Timestamp) -> bool {
        self.abilities.iter().any(|ability| ability.is_ready(now))
    }

    /// Indices of abilities whose cooldown has elapsed, in declaration order.
    pub fn ready_abilities(&self, now: Timestamp) -> impl Iterator<Item = usize> + '_ {
        self.abilities
            .iter()
            .enumerate()
            .filter(move |(_, ability)| ability.is_ready(now))
            .map(|(index, _)| index)
    }

    pub fn selected_ability(&self) -> Option<&Ability> {
        self.selected_ability.and_then(|i| self.abilities.get(i))
    }

    pub fn is_aggro(&self) -> bool {
        self.flags.contains(AgentFlags::AGGRO)
    }

    pub fn is_fleeing(&self) -> bool {
        self.flags.contains(AgentFlags::FLEEING)
    }

    pub fn is_hiding(&self) -> bool {
        self.flags.contains(AgentFlags::HIDING)
    }

    pub fn behavior(&self) -> &str {
        &self.current_behavior
    }
}
