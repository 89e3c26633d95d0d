//! Action names.
//!
//! The executor in [`crate::executor`] gives each action its effect; this
//! module only names them and parses content spellings.

use std::str::FromStr;

use strum::IntoEnumIterator;

use super::normalize_name;

/// A named step of a behavior.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    PatrolMove,
    LookAround,
    MoveTowardTarget,
    PrepareAttack,
    MoveToHidingSpot,
    WaitInAmbush,
    Retreat,
    CallForHelp,
    MeleeAttack,
    FindRangedPosition,
    RangedAttack,
    SelectBestSkill,
    PositionForSkill,
    CastSkill,
    SynchronizeWithAllies,
    FormationMove,
    ComboSkill,
}

impl ActionKind {
    /// Whether the action belongs to pack coordination.
    pub fn is_pack_action(self) -> bool {
        matches!(
            self,
            ActionKind::SynchronizeWithAllies | ActionKind::FormationMove | ActionKind::ComboSkill
        )
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_name(name);
        match wanted.as_str() {
            "movetowardstarget" | "movetowardplayer" | "movetowardsplayer" => {
                return Ok(ActionKind::MoveTowardTarget);
            }
            "flee" => return Ok(ActionKind::Retreat),
            _ => {}
        }
        ActionKind::iter()
            .find(|action| normalize_name(action.as_ref()) == wanted)
            .ok_or_else(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_round_trips_through_its_name() {
        for action in ActionKind::iter() {
            assert_eq!(action.to_string().parse(), Ok(action));
        }
    }

    #[test]
    fn kebab_and_camel_case_are_accepted() {
        assert_eq!("patrol-move".parse(), Ok(ActionKind::PatrolMove));
        assert_eq!("synchronizeWithAllies".parse(), Ok(ActionKind::SynchronizeWithAllies));
        assert_eq!("moveTowardsPlayer".parse(), Ok(ActionKind::MoveTowardTarget));
        assert!("teleport".parse::<ActionKind>().is_err());
    }

    #[test]
    fn pack_actions_are_flagged() {
        assert!(ActionKind::ComboSkill.is_pack_action());
        assert!(!ActionKind::MeleeAttack.is_pack_action());
    }
}
