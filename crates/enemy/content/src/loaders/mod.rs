//! Content loaders for reading engine data from files.

pub mod behaviors;
pub mod config;
pub mod enemies;
pub mod factory;
pub mod markers;
pub mod personalities;

pub use behaviors::BehaviorLoader;
pub use config::ConfigLoader;
pub use enemies::EnemyLoader;
pub use factory::ContentFactory;
pub use markers::{MarkerLoader, MarkerSpec};
pub use personalities::PersonalityLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
