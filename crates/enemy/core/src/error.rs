//! Error infrastructure for the enemy engine.
//!
//! Only structural misconfiguration is an error here. Transient conditions
//! such as an active cooldown, an empty patrol route or a missing ally are
//! ordinary outcomes of a tick and degrade to no-ops, and lookups of unknown
//! enemies return `None`.

use crate::types::EnemyId;

/// Severity level of an error, used for categorization and reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// A single definition or request is invalid; the rest of the content
    /// may still be usable once it is fixed.
    ///
    /// Examples: unknown action name, duplicate enemy id
    Validation,

    /// The engine cannot be built at all from this content.
    ///
    /// Examples: no behaviors registered, no `patrol` fallback
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Common trait for engine errors.
///
/// Provides a uniform interface for classification so tooling can report
/// errors consistently.
pub trait EngineError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str;
}

/// Configuration errors raised while registering content or creating enemies.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("behavior set is empty")]
    EmptyBehaviorSet,

    #[error("behavior '{0}' is registered more than once")]
    DuplicateBehavior(String),

    #[error("no fallback behavior named '{0}' is registered")]
    MissingFallback(&'static str),

    #[error("behavior '{behavior}' references unknown condition '{name}'")]
    UnknownCondition { behavior: String, name: String },

    #[error("behavior '{behavior}' references unknown action '{name}'")]
    UnknownAction { behavior: String, name: String },

    #[error("personality table is empty")]
    EmptyPersonalityTable,

    #[error("enemy {enemy} uses unknown personality '{personality}'")]
    MissingPersonality { enemy: EnemyId, personality: String },

    #[error("enemy {0} already exists")]
    DuplicateEnemy(EnemyId),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidValue { field, reason }
    }
}

impl EngineError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptyBehaviorSet | Self::MissingFallback(_) | Self::EmptyPersonalityTable => {
                ErrorSeverity::Fatal
            }
            Self::DuplicateBehavior(_)
            | Self::UnknownCondition { .. }
            | Self::UnknownAction { .. }
            | Self::MissingPersonality { .. }
            | Self::DuplicateEnemy(_)
            | Self::InvalidValue { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyBehaviorSet => "empty_behavior_set",
            Self::DuplicateBehavior(_) => "duplicate_behavior",
            Self::MissingFallback(_) => "missing_fallback",
            Self::UnknownCondition { .. } => "unknown_condition",
            Self::UnknownAction { .. } => "unknown_action",
            Self::EmptyPersonalityTable => "empty_personality_table",
            Self::MissingPersonality { .. } => "missing_personality",
            Self::DuplicateEnemy(_) => "duplicate_enemy",
            Self::InvalidValue { .. } => "invalid_value",
        }
    }
}
