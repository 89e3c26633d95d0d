//! Engine configuration loader.

use std::path::Path;

use enemy_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for engine tunables from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate an [`EngineConfig`] from a TOML file.
    ///
    /// Keys missing from the file keep their defaults.
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        let config = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))?;
        Ok(config)
    }

    pub fn parse(content: &str) -> LoadResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid engine config: {}", e))?;
        Ok(config)
    }
}
