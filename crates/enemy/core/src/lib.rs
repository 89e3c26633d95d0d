//! Adaptive enemy behavior engine.
//!
//! Every simulation tick, [`EnemyEngine::update`] decides what each hostile
//! agent does. Behaviors are picked by priority from a registry of condition
//! sets, agents learn from the opponent's recent dodges and skills, and
//! agents that see each other form packs that share a target and strike
//! together.
//!
//! The engine never resolves combat. Attacks, skill casts, coordinated
//! strikes and movement are emitted as [`ActionRequest`]s that the host
//! drains and applies, mirroring results back with
//! [`EnemyEngine::sync_health`].
//!
//! ```rust
//! use std::time::Duration;
//!
//! use enemy_core::{EnemyEngine, EnemySpec, OpponentSnapshot, Vec3};
//!
//! let mut engine = EnemyEngine::new();
//! engine.create_enemy("goblin", EnemySpec::new("aggressive")).unwrap();
//!
//! let player = Vec3::new(5.0, 0.0, 0.0);
//! engine.update(Duration::from_millis(100), player, &OpponentSnapshot::idle());
//!
//! assert_eq!(engine.enemy_behavior("goblin"), Some("hunt"));
//! ```
pub mod agent;
pub mod awareness;
pub mod behavior;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod learning;
pub mod pack;
pub mod personality;
pub mod types;

pub use agent::{
    Ability, AbilitySpec, AgentFlags, EnemyAgent, EnemySpec, EngagementRanges, PackMembership,
    PatrolRoute,
};
pub use awareness::{AllyObservation, Awareness, MarkerGrid, NoMarkers, PointKind, WorldQuery};
pub use behavior::{
    ActionKind, BehaviorDefinition, BehaviorId, BehaviorRegistry, BehaviorSpec, Condition,
    ConditionSnapshot, Selection,
};
pub use config::EngineConfig;
pub use engine::{EnemyEngine, EnemyEngineBuilder};
pub use error::{ConfigError, EngineError, ErrorSeverity};
pub use executor::{
    ActionContext, ActionRequest, AttackRequest, AttackStyle, MoveRequest, SkillCastRequest,
};
pub use learning::{
    AttackEvent, AttackKind, DodgeDirection, DodgeEvent, HISTORY_CAPACITY, LearningProfile,
    OpponentSnapshot,
};
pub use pack::{CoordinatedAttackRequest, Formation, Pack, PackCoordinator, PackKey};
pub use personality::{PersonalityProfile, PersonalityTable};
pub use types::{EnemyId, SkillId, Timestamp};

pub use glam::Vec3;
