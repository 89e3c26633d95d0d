//! The per-tick simulation driver.
//!
//! [`EnemyEngine`] owns every agent, the pack table and the emitted action
//! requests. A tick processes agents one at a time in id order:
//!
//! 1. refresh the agent's awareness of cover, ambush points and allies
//! 2. form or refresh its pack when allies are around
//! 3. feed the opponent snapshot into its learning profile
//! 4. select a behavior and run that behavior's actions
//!
//! Pack changes made while processing one agent are visible to the agents
//! processed after it in the same tick. Packs are reaped once all agents
//! have acted.

use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec3;

use crate::agent::{AgentFlags, EnemyAgent, EnemySpec};
use crate::awareness::{Awareness, NoMarkers, WorldQuery};
use crate::behavior::{ActionKind, BehaviorRegistry, ConditionSnapshot, Selection};
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::executor::{self, ActionContext, ActionRequest};
use crate::learning::OpponentSnapshot;
use crate::pack::PackCoordinator;
use crate::personality::PersonalityTable;
use crate::types::{EnemyId, Timestamp};

/// Adaptive enemy behavior engine.
pub struct EnemyEngine {
    config: EngineConfig,
    behaviors: BehaviorRegistry,
    personalities: PersonalityTable,
    world: Box<dyn WorldQuery>,
    agents: BTreeMap<EnemyId, EnemyAgent>,
    packs: PackCoordinator,
    requests: Vec<ActionRequest>,
    /// Exact time fed through `update`; `now` is derived from it.
    elapsed: Duration,
    now: Timestamp,
}

impl EnemyEngine {
    /// Engine with the builtin behaviors and personalities, default tunables
    /// and no tactical markers.
    pub fn new() -> Self {
        Self::from_parts(
            EngineConfig::default(),
            BehaviorRegistry::builtin(),
            PersonalityTable::builtin(),
            Box::new(NoMarkers),
        )
    }

    pub fn builder() -> EnemyEngineBuilder {
        EnemyEngineBuilder::default()
    }

    fn from_parts(
        config: EngineConfig,
        behaviors: BehaviorRegistry,
        personalities: PersonalityTable,
        world: Box<dyn WorldQuery>,
    ) -> Self {
        Self {
            config,
            behaviors,
            personalities,
            world,
            agents: BTreeMap::new(),
            packs: PackCoordinator::new(),
            requests: Vec::new(),
            elapsed: Duration::ZERO,
            now: Timestamp::ZERO,
        }
    }

    /// Registers a new enemy. It starts in the fallback behavior.
    pub fn create_enemy(
        &mut self,
        id: impl Into<EnemyId>,
        spec: EnemySpec,
    ) -> Result<&EnemyAgent, ConfigError> {
        let id = id.into();
        if self.agents.contains_key(&id) {
            return Err(ConfigError::DuplicateEnemy(id));
        }
        spec.validate()?;
        if !self.personalities.contains(&spec.personality) {
            return Err(ConfigError::MissingPersonality {
                enemy: id,
                personality: spec.personality,
            });
        }

        let agent = EnemyAgent::new(
            id.clone(),
            spec,
            self.behaviors.fallback().name.clone(),
            self.config.skill_usage_capacity,
        );
        tracing::info!(
            "Enemy {} created ({}, level {})",
            id,
            agent.personality,
            agent.level
        );
        let agent: &EnemyAgent = self.agents.entry(id).or_insert(agent);
        Ok(agent)
    }

    /// Removes an enemy and immediately reaps packs it leaves broken.
    pub fn remove_enemy(&mut self, id: &str) -> Option<EnemyAgent> {
        let removed = self.agents.remove(id)?;
        tracing::info!("Enemy {} removed", removed.id);
        self.reap_packs();
        Some(removed)
    }

    /// Advances every agent by one tick.
    pub fn update(
        &mut self,
        delta: Duration,
        player_position: Vec3,
        player_state: &OpponentSnapshot,
    ) {
        self.elapsed = self.elapsed.saturating_add(delta);
        self.now = Timestamp::from_elapsed(self.elapsed);
        let now = self.now;
        let delta_secs = delta.as_secs_f32();

        let ids: Vec<EnemyId> = self.agents.keys().cloned().collect();
        for id in &ids {
            let Some(awareness) = self.scan(id) else {
                continue;
            };
            let Some(agent) = self.agents.get_mut(id) else {
                continue;
            };
            agent.awareness = awareness;

            if agent.awareness.has_allies() {
                self.packs.observe(
                    &agent.id,
                    agent.awareness.allies.iter().map(|ally| &ally.id),
                    agent.target,
                    now,
                    &self.config,
                );
            }

            agent.learning.ingest(player_state, now);

            let Some(personality) = self.personalities.get(&agent.personality) else {
                tracing::warn!("Enemy {} has unknown personality {}", id, agent.personality);
                continue;
            };
            let snapshot = ConditionSnapshot::capture(
                agent,
                personality,
                player_position,
                player_state.threat_count,
                now,
                &self.config,
            );

            let selection = self.behaviors.select(&snapshot);
            let Some(definition) = self.behaviors.get(selection.behavior()) else {
                continue;
            };
            if agent.current_behavior != definition.name {
                tracing::debug!(
                    "Enemy {} behavior {} -> {}",
                    id,
                    agent.current_behavior,
                    definition.name
                );
                agent.current_behavior = definition.name.clone();
            }

            let actions: &[ActionKind] = match selection {
                Selection::Chosen(_) => definition.actions.as_slice(),
                Selection::Fallback(_) => &[ActionKind::LookAround],
            };

            agent.flags.remove(AgentFlags::TRANSIENT);
            let mut ctx = ActionContext {
                agent,
                opponent: player_position,
                now,
                delta_secs,
                config: &self.config,
                packs: &mut self.packs,
                requests: &mut self.requests,
            };
            executor::run(actions, &mut ctx);
        }

        self.reap_packs();
    }

    fn scan(&self, id: &EnemyId) -> Option<Awareness> {
        let agent = self.agents.get(id)?;
        let others = self
            .agents
            .values()
            .filter(|other| &other.id != id)
            .map(|other| (&other.id, other.position, other.is_aggro()));
        Some(Awareness::scan(
            agent.position,
            others,
            self.world.as_ref(),
            &self.config,
        ))
    }

    fn reap_packs(&mut self) {
        let agents = &self.agents;
        let reaped = self.packs.reap(self.now, self.config.pack_stale_after_ms, |id| {
            agents.contains_key(id)
        });
        if reaped == 0 {
            return;
        }
        for agent in self.agents.values_mut() {
            let gone = agent
                .pack
                .as_ref()
                .is_some_and(|membership| self.packs.get(&membership.pack).is_none());
            if gone {
                agent.pack = None;
            }
        }
    }

    /// Mirrors a health value decided by the host's combat resolver.
    ///
    /// Returns `false` for unknown ids.
    pub fn sync_health(&mut self, id: &str, health: f32) -> bool {
        match self.agents.get_mut(id) {
            Some(agent) => {
                agent.health = health.clamp(0.0, agent.max_health);
                true
            }
            None => false,
        }
    }

    /// Name of the behavior assigned to `id` by the last tick.
    pub fn enemy_behavior(&self, id: &str) -> Option<&str> {
        self.agents.get(id).map(EnemyAgent::behavior)
    }

    pub fn enemy_state(&self, id: &str) -> Option<&EnemyAgent> {
        self.agents.get(id)
    }

    /// Takes every request emitted since the last drain, in emission order.
    pub fn drain_requests(&mut self) -> Vec<ActionRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn pending_requests(&self) -> &[ActionRequest] {
        &self.requests
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn agents(&self) -> impl Iterator<Item = &EnemyAgent> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn packs(&self) -> &PackCoordinator {
        &self.packs
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn behaviors(&self) -> &BehaviorRegistry {
        &self.behaviors
    }

    pub fn personalities(&self) -> &PersonalityTable {
        &self.personalities
    }
}

impl std::fmt::Debug for EnemyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnemyEngine")
            .field("now", &self.now)
            .field("agents", &self.agents.len())
            .field("packs", &self.packs.len())
            .field("behaviors", &self.behaviors.len())
            .field("pending_requests", &self.requests.len())
            .finish_non_exhaustive()
    }
}

impl Default for EnemyEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembles an [`EnemyEngine`] from host-supplied content.
#[derive(Default)]
pub struct EnemyEngineBuilder {
    config: Option<EngineConfig>,
    behaviors: Option<BehaviorRegistry>,
    personalities: Option<PersonalityTable>,
    world: Option<Box<dyn WorldQuery>>,
}

impl EnemyEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn behaviors(mut self, behaviors: BehaviorRegistry) -> Self {
        self.behaviors = Some(behaviors);
        self
    }

    pub fn personalities(mut self, personalities: PersonalityTable) -> Self {
        self.personalities = Some(personalities);
        self
    }

    pub fn world(mut self, world: impl WorldQuery + 'static) -> Self {
        self.world = Some(Box::new(world));
        self
    }

    /// Validates the configuration and builds the engine. Anything not set
    /// falls back to the builtin content.
    pub fn build(self) -> Result<EnemyEngine, ConfigError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let personalities = self.personalities.unwrap_or_else(PersonalityTable::builtin);
        if personalities.is_empty() {
            return Err(ConfigError::EmptyPersonalityTable);
        }

        Ok(EnemyEngine::from_parts(
            config,
            self.behaviors.unwrap_or_else(BehaviorRegistry::builtin),
            personalities,
            self.world.unwrap_or_else(|| Box::new(NoMarkers)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(engine: &mut EnemyEngine, player: Vec3) {
        engine.update(Duration::from_millis(100), player, &OpponentSnapshot::idle());
    }

    #[test]
    fn new_enemy_starts_in_fallback() {
        let mut engine = EnemyEngine::new();
        let agent = engine.create_enemy("e1", EnemySpec::default()).unwrap();
        assert_eq!(agent.behavior(), "patrol");
        assert_eq!(engine.enemy_behavior("e1"), Some("patrol"));
        assert_eq!(engine.enemy_behavior("ghost"), None);
    }

    #[test]
    fn create_rejects_duplicates_and_unknown_personalities() {
        let mut engine = EnemyEngine::new();
        engine.create_enemy("e1", EnemySpec::default()).unwrap();

        assert_eq!(
            engine.create_enemy("e1", EnemySpec::default()).unwrap_err(),
            ConfigError::DuplicateEnemy(EnemyId::new("e1"))
        );
        assert!(matches!(
            engine.create_enemy("e2", EnemySpec::new("cowardly")),
            Err(ConfigError::MissingPersonality { .. })
        ));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn clock_advances_by_delta() {
        let mut engine = EnemyEngine::new();
        tick(&mut engine, Vec3::ZERO);
        tick(&mut engine, Vec3::ZERO);
        assert_eq!(engine.now(), Timestamp(200));
    }

    #[test]
    fn fractional_deltas_accumulate() {
        let mut engine = EnemyEngine::new();
        for _ in 0..4_000 {
            engine.update(Duration::from_micros(500), Vec3::ZERO, &OpponentSnapshot::idle());
        }
        assert_eq!(engine.now(), Timestamp(2_000));

        let mut engine = EnemyEngine::new();
        let frame = Duration::from_nanos(16_666_667);
        for _ in 0..600 {
            engine.update(frame, Vec3::ZERO, &OpponentSnapshot::idle());
        }
        assert_eq!(engine.now(), Timestamp(10_000));
    }

    #[test]
    fn debug_summarizes_state() {
        let mut engine = EnemyEngine::new();
        engine.create_enemy("e1", EnemySpec::default()).unwrap();
        let text = format!("{engine:?}");
        assert!(text.contains("EnemyEngine"));
        assert!(text.contains("agents: 1"));
    }

    #[test]
    fn idle_agent_without_route_only_looks_around() {
        let mut engine = EnemyEngine::new();
        engine.create_enemy("e1", EnemySpec::default()).unwrap();
        tick(&mut engine, Vec3::splat(100.0));

        let agent = engine.enemy_state("e1").unwrap();
        assert_eq!(agent.behavior(), "patrol");
        assert_eq!(agent.flags, AgentFlags::LOOKING_AROUND);
        assert_eq!(agent.position, Vec3::ZERO);
        assert!(engine.drain_requests().is_empty());
    }

    #[test]
    fn sync_health_clamps_to_range() {
        let mut engine = EnemyEngine::new();
        engine.create_enemy("e1", EnemySpec::default()).unwrap();

        assert!(engine.sync_health("e1", 250.0));
        assert_eq!(engine.enemy_state("e1").unwrap().health, 100.0);
        assert!(engine.sync_health("e1", -5.0));
        assert_eq!(engine.enemy_state("e1").unwrap().health, 0.0);
        assert!(!engine.sync_health("ghost", 1.0));
    }

    #[test]
    fn builder_validates_config() {
        let mut config = EngineConfig::default();
        config.flee_speed = 1.0;
        assert!(EnemyEngine::builder().config(config).build().is_err());
        assert!(EnemyEngine::builder().build().is_ok());
    }
}
