//! Content factory for building engines from data files.

use std::path::{Path, PathBuf};

use enemy_core::{BehaviorRegistry, EnemyEngine, EnemySpec, EngineConfig, MarkerGrid, PersonalityTable};

use crate::loaders::{
    BehaviorLoader, ConfigLoader, EnemyLoader, LoadResult, MarkerLoader, PersonalityLoader,
};

/// Content factory that loads all engine content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── personalities.ron
/// ├── behaviors.ron
/// ├── enemies.ron
/// └── markers.ron      (optional)
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine tunables from `config.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load personality profiles from `personalities.ron`.
    pub fn load_personalities(&self) -> LoadResult<PersonalityTable> {
        PersonalityLoader::load(&self.data_dir.join("personalities.ron"))
    }

    /// Load behavior definitions from `behaviors.ron`.
    pub fn load_behaviors(&self) -> LoadResult<BehaviorRegistry> {
        BehaviorLoader::load(&self.data_dir.join("behaviors.ron"))
    }

    /// Load the enemy roster from `enemies.ron`.
    pub fn load_enemies(&self) -> LoadResult<Vec<(String, EnemySpec)>> {
        EnemyLoader::load(&self.data_dir.join("enemies.ron"))
    }

    /// Load tactical markers from `markers.ron`.
    ///
    /// Returns `None` when the file does not exist.
    pub fn load_markers(&self) -> LoadResult<Option<MarkerGrid>> {
        let path = self.data_dir.join("markers.ron");
        if !path.exists() {
            return Ok(None);
        }
        MarkerLoader::load(&path).map(Some)
    }

    /// Loads every content file and returns an engine with the roster
    /// already spawned.
    pub fn build_engine(&self) -> LoadResult<EnemyEngine> {
        let mut builder = EnemyEngine::builder()
            .config(self.load_config()?)
            .personalities(self.load_personalities()?)
            .behaviors(self.load_behaviors()?);
        if let Some(markers) = self.load_markers()? {
            tracing::debug!("Loaded {} tactical markers", markers.len());
            builder = builder.world(markers);
        }

        let mut engine = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build engine: {}", e))?;

        for (id, spec) in self.load_enemies()? {
            engine
                .create_enemy(id.as_str(), spec)
                .map_err(|e| anyhow::anyhow!("Failed to spawn enemy '{}': {}", id, e))?;
        }

        tracing::info!(
            "Engine built from {} ({} enemies, {} behaviors)",
            self.data_dir.display(),
            engine.len(),
            engine.behaviors().len()
        );
        Ok(engine)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_markers_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert!(factory.load_markers().unwrap().is_none());
    }

    #[test]
    fn malformed_file_fails_the_build() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();
        std::fs::write(
            dir.path().join("personalities.ron"),
            r#"{ "aggressive": (attack_chance: 0.8, retreat_threshold: 0.2, use_skill_chance: 0.3) }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("behaviors.ron"), "[(name: \"patrol\"").unwrap();
        std::fs::write(dir.path().join("enemies.ron"), "[]").unwrap();

        let err = ContentFactory::new(dir.path()).build_engine().unwrap_err();
        assert!(err.to_string().contains("behaviors.ron"));
    }

    #[test]
    fn unknown_personality_in_roster_fails_the_build() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();
        std::fs::write(
            dir.path().join("personalities.ron"),
            r#"{ "aggressive": (attack_chance: 0.8, retreat_threshold: 0.2, use_skill_chance: 0.3) }"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("behaviors.ron"),
            r#"[(name: "patrol", priority: 1)]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("enemies.ron"),
            r#"[("ghost", (personality: "timid"))]"#,
        )
        .unwrap();

        let err = ContentFactory::new(dir.path()).build_engine().unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
