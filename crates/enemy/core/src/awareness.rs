//! Environmental awareness.
//!
//! Every tick each agent rebuilds a small snapshot of its surroundings: the
//! nearest cover point, the nearest ambush point, and the allies close
//! enough to coordinate with. Nothing here mutates the world.

use std::collections::HashMap;

use glam::Vec3;

use crate::config::EngineConfig;
use crate::types::EnemyId;

/// Kind of tactical marker a world query can return.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PointKind {
    Cover,
    Ambush,
}

/// Spatial collaborator answering "which markers are near this position?".
///
/// Implementations may return points in any order and may return an empty
/// list; callers pick the nearest themselves.
pub trait WorldQuery: Send + Sync {
    fn find_nearby_points(&self, position: Vec3, kind: PointKind, radius: f32) -> Vec<Vec3>;
}

/// Placeholder world with no tactical markers.
///
/// Hosts that have not authored cover or ambush points use this; every
/// query comes back empty, so `hasHidingSpot` never holds.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMarkers;

impl WorldQuery for NoMarkers {
    fn find_nearby_points(&self, _position: Vec3, _kind: PointKind, _radius: f32) -> Vec<Vec3> {
        Vec::new()
    }
}

type CellKey = (i32, i32, i32);

/// Uniform-grid spatial hash over cover and ambush markers.
///
/// Markers are bucketed by cell; a query visits only the cells overlapped by
/// the search sphere's bounding box.
#[derive(Clone, Debug)]
pub struct MarkerGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<(PointKind, Vec3)>>,
    len: usize,
}

impl MarkerGrid {
    pub const DEFAULT_CELL_SIZE: f32 = 8.0;

    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            Self::DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, kind: PointKind, point: Vec3) {
        self.cells
            .entry(self.cell_of(point))
            .or_default()
            .push((kind, point));
        self.len += 1;
    }

    pub fn with_marker(mut self, kind: PointKind, point: Vec3) -> Self {
        self.insert(kind, point);
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn cell_of(&self, point: Vec3) -> CellKey {
        let cell = (point / self.cell_size).floor();
        (cell.x as i32, cell.y as i32, cell.z as i32)
    }
}

impl Default for MarkerGrid {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CELL_SIZE)
    }
}

impl WorldQuery for MarkerGrid {
    fn find_nearby_points(&self, position: Vec3, kind: PointKind, radius: f32) -> Vec<Vec3> {
        if radius <= 0.0 || self.is_empty() {
            return Vec::new();
        }

        let (min_x, min_y, min_z) = self.cell_of(position - Vec3::splat(radius));
        let (max_x, max_y, max_z) = self.cell_of(position + Vec3::splat(radius));
        let mut found = Vec::new();

        for x in min_x..=max_x {
            for y in min_y..=max_y {
                for z in min_z..=max_z {
                    let Some(markers) = self.cells.get(&(x, y, z)) else {
                        continue;
                    };
                    found.extend(
                        markers
                            .iter()
                            .filter(|(k, p)| *k == kind && p.distance(position) <= radius)
                            .map(|(_, p)| *p),
                    );
                }
            }
        }

        found.sort_by(|a, b| a.distance(position).total_cmp(&b.distance(position)));
        found
    }
}

/// Another agent within coordination range.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllyObservation {
    pub id: EnemyId,
    pub distance: f32,
    pub is_aggro: bool,
}

/// One tick's view of an agent's surroundings.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Awareness {
    pub nearest_cover: Option<Vec3>,
    pub nearest_ambush: Option<Vec3>,
    /// Allies within the search radius, nearest first.
    pub allies: Vec<AllyObservation>,
}

impl Awareness {
    /// Rebuilds the snapshot for an agent at `position`.
    ///
    /// `others` yields every other agent as `(id, position, is_aggro)`; the
    /// ones outside the ally radius are dropped.
    pub fn scan<'a, I>(
        position: Vec3,
        others: I,
        world: &dyn WorldQuery,
        config: &EngineConfig,
    ) -> Self
    where
        I: IntoIterator<Item = (&'a EnemyId, Vec3, bool)>,
    {
        let mut allies: Vec<AllyObservation> = others
            .into_iter()
            .filter_map(|(id, other, is_aggro)| {
                let distance = other.distance(position);
                (distance <= config.ally_search_radius).then(|| AllyObservation {
                    id: id.clone(),
                    distance,
                    is_aggro,
                })
            })
            .collect();
        allies.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        Self {
            nearest_cover: nearest(world, position, PointKind::Cover, config.cover_search_radius),
            nearest_ambush: nearest(
                world,
                position,
                PointKind::Ambush,
                config.ambush_search_radius,
            ),
            allies,
        }
    }

    pub fn has_allies(&self) -> bool {
        !self.allies.is_empty()
    }

    pub fn any_ally_aggro(&self) -> bool {
        self.allies.iter().any(|ally| ally.is_aggro)
    }
}

fn nearest(world: &dyn WorldQuery, position: Vec3, kind: PointKind, radius: f32) -> Option<Vec3> {
    world
        .find_nearby_points(position, kind, radius)
        .into_iter()
        .filter(|p| p.distance(position) <= radius)
        .min_by(|a, b| a.distance(position).total_cmp(&b.distance(position)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_world_finds_nothing() {
        let awareness = Awareness::scan(
            Vec3::ZERO,
            std::iter::empty(),
            &NoMarkers,
            &EngineConfig::default(),
        );
        assert_eq!(awareness, Awareness::default());
    }

    #[test]
    fn grid_returns_markers_of_kind_within_radius_nearest_first() {
        let grid = MarkerGrid::new(4.0)
            .with_marker(PointKind::Cover, Vec3::new(10.0, 0.0, 0.0))
            .with_marker(PointKind::Cover, Vec3::new(3.0, 0.0, 0.0))
            .with_marker(PointKind::Ambush, Vec3::new(1.0, 0.0, 0.0))
            .with_marker(PointKind::Cover, Vec3::new(-30.0, 0.0, 0.0));

        let cover = grid.find_nearby_points(Vec3::ZERO, PointKind::Cover, 20.0);
        assert_eq!(
            cover,
            vec![Vec3::new(3.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0)]
        );
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn scan_uses_fixed_radii() {
        let grid = MarkerGrid::default()
            .with_marker(PointKind::Cover, Vec3::new(0.0, 0.0, 19.0))
            .with_marker(PointKind::Ambush, Vec3::new(0.0, 0.0, 16.0));

        let awareness = Awareness::scan(
            Vec3::ZERO,
            std::iter::empty(),
            &grid,
            &EngineConfig::default(),
        );
        assert_eq!(awareness.nearest_cover, Some(Vec3::new(0.0, 0.0, 19.0)));
        // Ambush radius is 15.
        assert_eq!(awareness.nearest_ambush, None);
    }

    #[test]
    fn allies_outside_radius_are_ignored() {
        let near = EnemyId::new("near");
        let far = EnemyId::new("far");
        let others = [
            (&far, Vec3::new(30.0, 0.0, 0.0), false),
            (&near, Vec3::new(5.0, 0.0, 0.0), true),
        ];

        let awareness = Awareness::scan(Vec3::ZERO, others, &NoMarkers, &EngineConfig::default());
        assert_eq!(awareness.allies.len(), 1);
        assert_eq!(awareness.allies[0].id, near);
        assert!(awareness.any_ally_aggro());
    }
}
