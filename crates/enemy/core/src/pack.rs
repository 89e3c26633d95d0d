//! Pack coordination.
//!
//! Packs are ephemeral groups of agents that see each other as allies. A
//! pack's identity is a pure function of its membership: the key is the
//! sorted, de-duplicated member ids, so the same set always maps to the same
//! pack no matter which member discovers it first.

use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::fmt;

use glam::Vec3;

use crate::config::EngineConfig;
use crate::types::{EnemyId, Timestamp};

/// Distance between neighbouring formation slots.
pub const FORMATION_SPACING: f32 = 3.0;

/// Identity of a pack, derived from its members.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PackKey(Vec<EnemyId>);

impl PackKey {
    /// Builds the key for a membership set given in any order, duplicates
    /// included.
    pub fn from_members<'a, I>(members: I) -> Self
    where
        I: IntoIterator<Item = &'a EnemyId>,
    {
        let mut ids: Vec<EnemyId> = members.into_iter().cloned().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    /// Sorted, unique member ids.
    pub fn members(&self) -> &[EnemyId] {
        &self.0
    }
}

impl fmt::Display for PackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            f.write_str(id.as_str())?;
        }
        Ok(())
    }
}

/// Arrangement pack members take around the shared target.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Formation {
    /// Evenly spaced on a ring around the target.
    #[default]
    Surround,
    /// A V opening toward the target, leader slot at the tip.
    Wedge,
    /// A single rank in front of the target.
    Line,
}

impl Formation {
    /// Slot offset from the shared target for member `index` of `count`.
    pub fn slot_offset(self, index: usize, count: usize) -> Vec3 {
        let count = count.max(1);
        match self {
            Formation::Surround => {
                let angle = TAU * index as f32 / count as f32;
                Vec3::new(angle.cos(), 0.0, angle.sin()) * FORMATION_SPACING
            }
            Formation::Wedge => {
                let row = index.div_ceil(2) as f32;
                let side = if index % 2 == 1 { -1.0 } else { 1.0 };
                Vec3::new(side * row, 0.0, -(row + 1.0)) * FORMATION_SPACING
            }
            Formation::Line => {
                let centered = index as f32 - (count as f32 - 1.0) / 2.0;
                Vec3::new(centered, 0.0, -1.0) * FORMATION_SPACING
            }
        }
    }
}

/// A coordinated strike issued by a pack's combo.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordinatedAttackRequest {
    pub pack: PackKey,
    pub leader: EnemyId,
    pub target: Option<Vec3>,
    pub members: Vec<EnemyId>,
}

/// A group of agents sharing a target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pack {
    pub key: PackKey,
    /// Sorted, unique.
    pub members: Vec<EnemyId>,
    /// The member that most recently formed or refreshed the pack.
    pub leader: EnemyId,
    pub shared_target: Option<Vec3>,
    pub formation: Formation,
    pub next_coordinated_attack: Timestamp,
    pub last_updated: Timestamp,
}

impl Pack {
    pub fn contains(&self, id: &EnemyId) -> bool {
        self.members.binary_search(id).is_ok()
    }

    pub fn is_leader(&self, id: &EnemyId) -> bool {
        &self.leader == id
    }

    /// Where `id` should stand, or `None` if it is not a member or the pack
    /// has no target yet.
    pub fn formation_slot(&self, id: &EnemyId) -> Option<Vec3> {
        let index = self.members.binary_search(id).ok()?;
        let target = self.shared_target?;
        Some(target + self.formation.slot_offset(index, self.members.len()))
    }
}

/// Engine-owned table of live packs, in key order.
#[derive(Clone, Debug, Default)]
pub struct PackCoordinator {
    packs: BTreeMap<PackKey, Pack>,
}

impl PackCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `trigger` sees `allies` while chasing `target`.
    ///
    /// Creates the pack for this membership if it does not exist yet,
    /// otherwise refreshes its leader and, when `trigger` has one, its shared
    /// target. Returns the key.
    pub fn observe<'a, I>(
        &mut self,
        trigger: &EnemyId,
        allies: I,
        target: Option<Vec3>,
        now: Timestamp,
        config: &EngineConfig,
    ) -> PackKey
    where
        I: IntoIterator<Item = &'a EnemyId>,
    {
        let mut members: Vec<EnemyId> = allies.into_iter().cloned().collect();
        members.push(trigger.clone());
        members.sort();
        members.dedup();
        let key = PackKey::from_members(&members);

        match self.packs.get_mut(&key) {
            Some(pack) => {
                if target.is_some() {
                    pack.shared_target = target;
                }
                pack.leader = trigger.clone();
                pack.last_updated = now;
            }
            None => {
                tracing::debug!("Pack {} formed by {}", key, trigger);
                self.packs.insert(
                    key.clone(),
                    Pack {
                        key: key.clone(),
                        members,
                        leader: trigger.clone(),
                        shared_target: target,
                        formation: config.default_formation,
                        next_coordinated_attack: now + config.pack_attack_delay_ms,
                        last_updated: now,
                    },
                );
            }
        }
        key
    }

    /// First pack in key order that lists `id` as a member.
    pub fn find_pack_of(&self, id: &EnemyId) -> Option<&Pack> {
        self.packs.values().find(|pack| pack.contains(id))
    }

    /// Fires the pack combo for `id`'s pack if its scheduled time has come,
    /// rescheduling the next one `delay_ms` later.
    pub fn trigger_combo(
        &mut self,
        id: &EnemyId,
        now: Timestamp,
        delay_ms: u64,
    ) -> Option<CoordinatedAttackRequest> {
        let pack = self.packs.values_mut().find(|pack| pack.contains(id))?;
        if now < pack.next_coordinated_attack {
            return None;
        }
        pack.next_coordinated_attack = now + delay_ms;
        Some(CoordinatedAttackRequest {
            pack: pack.key.clone(),
            leader: pack.leader.clone(),
            target: pack.shared_target,
            members: pack.members.clone(),
        })
    }

    /// Drops packs with fewer than two live members or that went stale.
    ///
    /// Returns the number of packs removed.
    pub fn reap<F>(&mut self, now: Timestamp, stale_after_ms: u64, is_live: F) -> usize
    where
        F: Fn(&EnemyId) -> bool,
    {
        let before = self.packs.len();
        self.packs.retain(|key, pack| {
            let live = pack.members.iter().filter(|id| is_live(id)).count();
            let stale = now.since(pack.last_updated) > stale_after_ms;
            let keep = live >= 2 && !stale;
            if !keep {
                tracing::debug!("Pack {} reaped (live members: {}, stale: {})", key, live, stale);
            }
            keep
        });
        before - self.packs.len()
    }

    pub fn get(&self, key: &PackKey) -> Option<&Pack> {
        self.packs.get(key)
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pack> {
        self.packs.values()
    }
}
