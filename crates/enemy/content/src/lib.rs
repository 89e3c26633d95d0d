//! Data-driven content for the enemy behavior engine.
//!
//! Engine tunables, personality profiles, behavior definitions, enemy
//! rosters and tactical markers live in RON/TOML files under a data
//! directory. The loaders here turn them into `enemy-core` types and
//! [`ContentFactory`] assembles a ready-to-run engine from them.
//!
//! All loaders deserialize `enemy-core` types directly through serde and
//! report failures as `anyhow` errors naming the offending file.

pub mod loaders;

pub use loaders::{
    BehaviorLoader, ConfigLoader, ContentFactory, EnemyLoader, LoadResult, MarkerLoader,
    MarkerSpec, PersonalityLoader,
};
