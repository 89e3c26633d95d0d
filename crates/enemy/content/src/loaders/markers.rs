//! Tactical marker loader.

use std::path::Path;

use enemy_core::{MarkerGrid, PointKind, Vec3};

use crate::loaders::{LoadResult, read_file};

/// A cover or ambush point placed in the world.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
pub struct MarkerSpec {
    pub kind: PointKind,
    pub position: Vec3,
}

/// Loader for cover and ambush markers from RON files.
pub struct MarkerLoader;

impl MarkerLoader {
    /// Load markers from a RON file into a spatial grid.
    ///
    /// RON format: `[(kind: cover, position: (x, y, z)), ..]`
    pub fn load(path: &Path) -> LoadResult<MarkerGrid> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<MarkerGrid> {
        let markers: Vec<MarkerSpec> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse markers RON: {}", e))?;

        let mut grid = MarkerGrid::new(MarkerGrid::DEFAULT_CELL_SIZE);
        for marker in markers {
            if !marker.position.is_finite() {
                anyhow::bail!("Marker position {} is not finite", marker.position);
            }
            grid.insert(marker.kind, marker.position);
        }
        Ok(grid)
    }
}
