//! Opponent learning profile.
//!
//! Each agent keeps a short, bounded memory of what the opponent has been
//! doing. The memory feeds two predictions: which way the opponent is likely
//! to dodge next, and which skill the opponent favours.

use arrayvec::ArrayVec;

use crate::types::{SkillId, Timestamp};

/// Number of dodge and attack events retained per agent.
pub const HISTORY_CAPACITY: usize = 10;

/// Number of most recent dodges inspected by [`LearningProfile::predict_dodge`].
const PREDICTION_WINDOW: usize = 3;

/// Direction of an opponent dodge, relative to the opponent.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DodgeDirection {
    Left,
    Right,
    Forward,
    Back,
}

/// Kind of attack the opponent just performed.
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum AttackKind {
    Light,
    Heavy,
    Ranged,
    Magic,
}

/// What the opponent did since the previous tick.
///
/// The snapshot is immutable for the duration of a tick and is ingested by
/// every agent's learning profile.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OpponentSnapshot {
    pub just_dodged: Option<DodgeDirection>,
    pub just_attacked: Option<AttackKind>,
    pub skill_used: Option<SkillId>,
    /// Hostile combatants currently engaging the agents, as counted by the host.
    pub threat_count: u32,
}

impl OpponentSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn dodged(direction: DodgeDirection) -> Self {
        Self {
            just_dodged: Some(direction),
            ..Self::default()
        }
    }

    pub fn attacked(kind: AttackKind) -> Self {
        Self {
            just_attacked: Some(kind),
            ..Self::default()
        }
    }

    pub fn used_skill(skill: impl Into<SkillId>) -> Self {
        Self {
            skill_used: Some(skill.into()),
            ..Self::default()
        }
    }

    pub fn with_threat_count(mut self, threat_count: u32) -> Self {
        self.threat_count = threat_count;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DodgeEvent {
    pub direction: DodgeDirection,
    pub at: Timestamp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackEvent {
    pub kind: AttackKind,
    pub at: Timestamp,
}

/// Per-agent memory of opponent behavior.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LearningProfile {
    dodges: ArrayVec<DodgeEvent, HISTORY_CAPACITY>,
    attacks: ArrayVec<AttackEvent, HISTORY_CAPACITY>,
    /// Usage counts in first-seen order; the order is the tie-break for
    /// [`LearningProfile::favorite_skill`].
    skill_usage: Vec<(SkillId, u32)>,
    skill_capacity: usize,
    /// Counters cast against the opponent's favorite skill, most recent last.
    successful_counters: ArrayVec<SkillId, HISTORY_CAPACITY>,
}

impl LearningProfile {
    pub fn new(skill_capacity: usize) -> Self {
        Self {
            dodges: ArrayVec::new(),
            attacks: ArrayVec::new(),
            skill_usage: Vec::new(),
            skill_capacity: skill_capacity.max(1),
            successful_counters: ArrayVec::new(),
        }
    }

    /// Records whatever the opponent did this tick.
    pub fn ingest(&mut self, snapshot: &OpponentSnapshot, now: Timestamp) {
        if let Some(direction) = snapshot.just_dodged {
            push_bounded(&mut self.dodges, DodgeEvent { direction, at: now });
        }
        if let Some(kind) = snapshot.just_attacked {
            push_bounded(&mut self.attacks, AttackEvent { kind, at: now });
        }
        if let Some(skill) = &snapshot.skill_used {
            self.record_skill(skill);
        }
    }

    fn record_skill(&mut self, skill: &SkillId) {
        if let Some((_, count)) = self.skill_usage.iter_mut().find(|(id, _)| id == skill) {
            *count = count.saturating_add(1);
            return;
        }

        if self.skill_usage.len() >= self.skill_capacity {
            // Evict the least used entry; the earliest one wins ties.
            let mut victim = 0;
            for (index, (_, count)) in self.skill_usage.iter().enumerate() {
                if *count < self.skill_usage[victim].1 {
                    victim = index;
                }
            }
            tracing::trace!(
                "skill usage table full, evicting {}",
                self.skill_usage[victim].0
            );
            self.skill_usage.remove(victim);
        }
        self.skill_usage.push((skill.clone(), 1));
    }

    /// Predicts the opponent's next dodge direction.
    ///
    /// Returns a direction only when at least two of the last three recorded
    /// dodges agree. Fewer than three recorded dodges never yield a
    /// prediction.
    pub fn predict_dodge(&self) -> Option<DodgeDirection> {
        if self.dodges.len() < PREDICTION_WINDOW {
            return None;
        }

        let recent = &self.dodges[self.dodges.len() - PREDICTION_WINDOW..];
        recent.iter().map(|event| event.direction).find(|direction| {
            recent
                .iter()
                .filter(|event| event.direction == *direction)
                .count()
                >= 2
        })
    }

    /// The opponent skill with the strictly highest usage count.
    ///
    /// On equal counts the skill seen first wins.
    pub fn favorite_skill(&self) -> Option<&SkillId> {
        let mut best: Option<&(SkillId, u32)> = None;
        for entry in &self.skill_usage {
            match best {
                Some((_, count)) if entry.1 <= *count => {}
                _ => best = Some(entry),
            }
        }
        best.map(|(skill, _)| skill)
    }

    pub fn record_successful_counter(&mut self, skill: SkillId) {
        push_bounded(&mut self.successful_counters, skill);
    }

    pub fn dodges(&self) -> &[DodgeEvent] {
        &self.dodges
    }

    pub fn attacks(&self) -> &[AttackEvent] {
        &self.attacks
    }

    pub fn skill_usage(&self, skill: &SkillId) -> u32 {
        self.skill_usage
            .iter()
            .find(|(id, _)| id == skill)
            .map_or(0, |(_, count)| *count)
    }

    pub fn tracked_skills(&self) -> usize {
        self.skill_usage.len()
    }

    pub fn successful_counters(&self) -> &[SkillId] {
        &self.successful_counters
    }
}

impl Default for LearningProfile {
    fn default() -> Self {
        Self::new(crate::EngineConfig::DEFAULT_SKILL_USAGE_CAPACITY)
    }
}

/// Appends to a full-capacity ring, dropping the oldest entry first.
fn push_bounded<T, const N: usize>(history: &mut ArrayVec<T, N>, item: T) {
    if history.is_full() {
        history.remove(0);
    }
    history.push(item);
}

#[cfg(test)]
mod tests {
    use super::*;
    use DodgeDirection::*;

    fn with_dodges(directions: &[DodgeDirection]) -> LearningProfile {
        let mut profile = LearningProfile::default();
        for (i, direction) in directions.iter().enumerate() {
            profile.ingest(&OpponentSnapshot::dodged(*direction), Timestamp(i as u64));
        }
        profile
    }

    #[test]
    fn histories_never_exceed_capacity() {
        let mut profile = LearningProfile::default();
        for tick in 0..1_000u64 {
            let snapshot = OpponentSnapshot {
                just_dodged: Some(if tick % 2 == 0 { Left } else { Right }),
                just_attacked: Some(AttackKind::Light),
                ..OpponentSnapshot::default()
            };
            profile.ingest(&snapshot, Timestamp(tick));
            assert!(profile.dodges().len() <= HISTORY_CAPACITY);
            assert!(profile.attacks().len() <= HISTORY_CAPACITY);
        }
        assert_eq!(profile.dodges().len(), HISTORY_CAPACITY);
        // Oldest entries were evicted.
        assert_eq!(profile.dodges()[0].at, Timestamp(990));
    }

    #[test]
    fn no_prediction_below_three_dodges() {
        assert_eq!(with_dodges(&[]).predict_dodge(), None);
        assert_eq!(with_dodges(&[Left]).predict_dodge(), None);
        assert_eq!(with_dodges(&[Left, Left]).predict_dodge(), None);
    }

    #[test]
    fn majority_of_last_three_is_predicted() {
        assert_eq!(with_dodges(&[Left, Left, Right]).predict_dodge(), Some(Left));
        assert_eq!(with_dodges(&[Right, Back, Right]).predict_dodge(), Some(Right));
        // Only the last three count.
        assert_eq!(
            with_dodges(&[Left, Left, Forward, Back, Forward]).predict_dodge(),
            Some(Forward)
        );
    }

    #[test]
    fn all_different_yields_nothing() {
        assert_eq!(with_dodges(&[Left, Right, Back]).predict_dodge(), None);
    }

    #[test]
    fn favorite_skill_prefers_highest_then_first_seen() {
        let mut profile = LearningProfile::default();
        assert_eq!(profile.favorite_skill(), None);

        for skill in ["fireball", "frost", "frost", "fireball"] {
            profile.ingest(&OpponentSnapshot::used_skill(skill), Timestamp::ZERO);
        }
        assert_eq!(profile.favorite_skill(), Some(&SkillId::new("fireball")));

        profile.ingest(&OpponentSnapshot::used_skill("frost"), Timestamp::ZERO);
        assert_eq!(profile.favorite_skill(), Some(&SkillId::new("frost")));
        assert_eq!(profile.skill_usage(&SkillId::new("frost")), 3);
    }

    #[test]
    fn skill_table_evicts_least_used_when_full() {
        let mut profile = LearningProfile::new(2);
        for skill in ["a", "a", "b", "c"] {
            profile.ingest(&OpponentSnapshot::used_skill(skill), Timestamp::ZERO);
        }
        assert_eq!(profile.tracked_skills(), 2);
        assert_eq!(profile.skill_usage(&SkillId::new("a")), 2);
        assert_eq!(profile.skill_usage(&SkillId::new("b")), 0);
        assert_eq!(profile.skill_usage(&SkillId::new("c")), 1);
    }
}
