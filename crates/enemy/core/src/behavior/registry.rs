//! Behavior registry and selection.

use std::collections::HashSet;
use std::sync::Arc;

use behavior_tree::{PrioritySelector, builder};

use super::{ActionKind, Condition, ConditionSnapshot};
use crate::error::ConfigError;

/// Name of the behavior used as initial state and fallback.
pub const FALLBACK_BEHAVIOR: &str = "patrol";

/// Behavior definition as written in content, with names not yet resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviorSpec {
    pub name: String,
    pub priority: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub conditions: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub actions: Vec<String>,
}

impl BehaviorSpec {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
            conditions: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn when(mut self, conditions: &[&str]) -> Self {
        self.conditions = conditions.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn then(mut self, actions: &[&str]) -> Self {
        self.actions = actions.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Resolves condition and action names into their typed forms.
    pub fn resolve(&self) -> Result<BehaviorDefinition, ConfigError> {
        let conditions = self
            .conditions
            .iter()
            .map(|name| {
                name.parse::<Condition>()
                    .map_err(|name| ConfigError::UnknownCondition {
                        behavior: self.name.clone(),
                        name,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let actions = self
            .actions
            .iter()
            .map(|name| {
                name.parse::<ActionKind>()
                    .map_err(|name| ConfigError::UnknownAction {
                        behavior: self.name.clone(),
                        name,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BehaviorDefinition {
            name: Arc::from(self.name.as_str()),
            priority: self.priority,
            conditions,
            actions,
        })
    }
}

/// Immutable, resolved behavior definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BehaviorDefinition {
    pub name: Arc<str>,
    /// Higher wins.
    pub priority: i32,
    /// All must hold.
    pub conditions: Vec<Condition>,
    /// Run in order, unconditionally, once chosen.
    pub actions: Vec<ActionKind>,
}

/// Index of a definition in its registry (registration order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BehaviorId(pub usize);

/// Outcome of selecting a behavior for one agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// A definition whose conditions all hold had the highest priority.
    Chosen(BehaviorId),
    /// Nothing held; the fallback is assigned but only looks around.
    Fallback(BehaviorId),
}

impl Selection {
    pub fn behavior(self) -> BehaviorId {
        match self {
            Selection::Chosen(id) | Selection::Fallback(id) => id,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Selection::Fallback(_))
    }
}

/// Process-wide set of behavior definitions.
pub struct BehaviorRegistry {
    definitions: Vec<BehaviorDefinition>,
    selector: PrioritySelector<ConditionSnapshot>,
    fallback: BehaviorId,
}

impl BehaviorRegistry {
    /// Resolves and validates content specs, in registration order.
    pub fn from_specs<I>(specs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = BehaviorSpec>,
    {
        let definitions = specs
            .into_iter()
            .map(|spec| spec.resolve())
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_definitions(definitions)
    }

    pub fn from_definitions(definitions: Vec<BehaviorDefinition>) -> Result<Self, ConfigError> {
        if definitions.is_empty() {
            return Err(ConfigError::EmptyBehaviorSet);
        }

        let mut seen = HashSet::new();
        for definition in &definitions {
            if !seen.insert(definition.name.clone()) {
                return Err(ConfigError::DuplicateBehavior(definition.name.to_string()));
            }
        }

        let fallback = definitions
            .iter()
            .position(|d| &*d.name == FALLBACK_BEHAVIOR)
            .map(BehaviorId)
            .ok_or(ConfigError::MissingFallback(FALLBACK_BEHAVIOR))?;

        let selector = builder::priority(
            definitions
                .iter()
                .map(|d| (d.priority, builder::all_of(d.conditions.iter().copied())))
                .collect(),
        );

        Ok(Self {
            definitions,
            selector,
            fallback,
        })
    }

    /// The reference behavior set.
    pub fn builtin() -> Self {
        // The builtin specs are known-good; resolving them cannot fail.
        match Self::from_specs(builtin_specs()) {
            Ok(registry) => registry,
            Err(err) => unreachable!("builtin behaviors are invalid: {err}"),
        }
    }

    /// Picks the behavior for one agent's snapshot.
    pub fn select(&self, snapshot: &ConditionSnapshot) -> Selection {
        let mut ctx = *snapshot;
        match self.selector.select(&mut ctx) {
            Some(index) => Selection::Chosen(BehaviorId(index)),
            None => Selection::Fallback(self.fallback),
        }
    }

    pub fn get(&self, id: BehaviorId) -> Option<&BehaviorDefinition> {
        self.definitions.get(id.0)
    }

    pub fn by_name(&self, name: &str) -> Option<&BehaviorDefinition> {
        self.definitions.iter().find(|d| &*d.name == name)
    }

    pub fn fallback(&self) -> &BehaviorDefinition {
        &self.definitions[self.fallback.0]
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BehaviorDefinition> {
        self.definitions.iter()
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorRegistry")
            .field("definitions", &self.definitions)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Specs of the reference behavior set.
pub fn builtin_specs() -> Vec<BehaviorSpec> {
    vec![
        BehaviorSpec::new("patrol", 1)
            .when(&["not_in_combat", "has_patrol_route"])
            .then(&["patrol_move", "look_around"]),
        BehaviorSpec::new("hunt", 5)
            .when(&["player_detected"])
            .then(&["move_toward_target", "prepare_attack"]),
        BehaviorSpec::new("ambush", 6)
            .when(&["player_nearby", "has_hiding_spot", "not_in_combat"])
            .then(&["move_to_hiding_spot", "wait_in_ambush"]),
        BehaviorSpec::new("attackRanged", 7)
            .when(&["in_ranged_range", "has_ranged_weapon", "can_attack"])
            .then(&["find_ranged_position", "ranged_attack"]),
        BehaviorSpec::new("attackMelee", 8)
            .when(&["in_melee_range", "can_attack"])
            .then(&["melee_attack"]),
        BehaviorSpec::new("coordinateAttack", 8)
            .when(&["has_allies", "target_shared", "player_detected"])
            .then(&["synchronize_with_allies", "formation_move", "combo_skill"]),
        BehaviorSpec::new("useSkill", 9)
            .when(&["skill_ready", "tactical_advantage", "player_detected"])
            .then(&["select_best_skill", "position_for_skill", "cast_skill"]),
        BehaviorSpec::new("flee", 10)
            .when(&["low_health", "outmatched"])
            .then(&["retreat", "call_for_help"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_of(registry: &BehaviorRegistry, selection: Selection) -> &str {
        &registry.get(selection.behavior()).unwrap().name
    }

    #[test]
    fn builtin_registers_reference_set() {
        let registry = BehaviorRegistry::builtin();
        assert_eq!(registry.len(), 8);
        assert_eq!(&*registry.fallback().name, "patrol");
        assert_eq!(
            registry.by_name("flee").unwrap().conditions,
            vec![Condition::LowHealth, Condition::Outmatched]
        );
    }

    #[test]
    fn unknown_names_fail_at_registration() {
        let specs = vec![
            BehaviorSpec::new("patrol", 1).then(&["look_around"]),
            BehaviorSpec::new("dance", 3).when(&["is_music_playing"]),
        ];
        assert_eq!(
            BehaviorRegistry::from_specs(specs).unwrap_err(),
            ConfigError::UnknownCondition {
                behavior: "dance".into(),
                name: "is_music_playing".into()
            }
        );

        let specs = vec![BehaviorSpec::new("patrol", 1).then(&["moonwalk"])];
        assert!(matches!(
            BehaviorRegistry::from_specs(specs),
            Err(ConfigError::UnknownAction { .. })
        ));
    }

    #[test]
    fn structural_problems_are_rejected() {
        assert_eq!(
            BehaviorRegistry::from_specs(Vec::new()).unwrap_err(),
            ConfigError::EmptyBehaviorSet
        );
        assert_eq!(
            BehaviorRegistry::from_specs(vec![BehaviorSpec::new("hunt", 1)]).unwrap_err(),
            ConfigError::MissingFallback("patrol")
        );
        assert_eq!(
            BehaviorRegistry::from_specs(vec![
                BehaviorSpec::new("patrol", 1),
                BehaviorSpec::new("patrol", 2),
            ])
            .unwrap_err(),
            ConfigError::DuplicateBehavior("patrol".into())
        );
    }

    #[test]
    fn higher_priority_wins_in_either_registration_order() {
        let a = BehaviorSpec::new("a", 9).when(&["has_allies"]);
        let b = BehaviorSpec::new("b", 4).when(&["has_allies"]);
        let patrol = BehaviorSpec::new("patrol", 1);
        let snapshot = ConditionSnapshot {
            ally_count: 1,
            ..ConditionSnapshot::default()
        };

        for specs in [
            vec![patrol.clone(), a.clone(), b.clone()],
            vec![b.clone(), patrol.clone(), a.clone()],
        ] {
            let registry = BehaviorRegistry::from_specs(specs).unwrap();
            assert_eq!(name_of(&registry, registry.select(&snapshot)), "a");
        }
    }

    #[test]
    fn equal_priority_goes_to_first_registered() {
        let registry = BehaviorRegistry::builtin();
        // Both attackMelee and coordinateAttack hold at priority 8.
        let snapshot = ConditionSnapshot {
            distance: 1.0,
            ally_count: 1,
            ally_aggro: true,
            ..ConditionSnapshot::default()
        };
        assert_eq!(name_of(&registry, registry.select(&snapshot)), "attackMelee");
    }

    #[test]
    fn nothing_holding_falls_back_to_patrol() {
        let registry = BehaviorRegistry::builtin();
        let selection = registry.select(&ConditionSnapshot::default());
        assert!(selection.is_fallback());
        assert_eq!(name_of(&registry, selection), "patrol");
    }

    #[test]
    fn patrol_holds_when_idle_with_route() {
        let registry = BehaviorRegistry::builtin();
        let selection = registry.select(&ConditionSnapshot {
            has_patrol_route: true,
            ..ConditionSnapshot::default()
        });
        assert_eq!(selection, Selection::Chosen(BehaviorId(0)));
    }
}
