use serde::{Deserialize, Serialize};
use std::fmt;

use crate::battle::AttackType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    Attack,
    Raid,
    Conquest,
    Siege,
    Scout,
    Reinforce,
    Return,
}

impl MissionKind {
    /// Blocked against villages under beginner protection.
    pub fn is_protection_restricted(&self) -> bool {
        matches!(
            self,
            MissionKind::Attack | MissionKind::Raid | MissionKind::Conquest | MissionKind::Siege
        )
    }

    /// Order of resolution for movements landing at the same instant: lower first.
    pub fn resolution_priority(&self) -> u8 {
        match self {
            MissionKind::Return => 0,
            MissionKind::Reinforce => 1,
            MissionKind::Scout => 2,
            MissionKind::Raid => 3,
            MissionKind::Attack => 4,
            MissionKind::Siege => 5,
            MissionKind::Conquest => 6,
        }
    }

    /// How the arrival fights, `None` for peaceful arrivals.
    pub fn attack_type(&self) -> Option<AttackType> {
        match self {
            MissionKind::Raid => Some(AttackType::Raid),
            MissionKind::Attack | MissionKind::Siege | MissionKind::Conquest => {
                Some(AttackType::Normal)
            }
            MissionKind::Scout => Some(AttackType::Scout),
            MissionKind::Reinforce | MissionKind::Return => None,
        }
    }
}

impl fmt::Display for MissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissionKind::Attack => "attack",
            MissionKind::Raid => "raid",
            MissionKind::Conquest => "conquest",
            MissionKind::Siege => "siege",
            MissionKind::Scout => "scout",
            MissionKind::Reinforce => "reinforce",
            MissionKind::Return => "return",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStatus {
    EnRoute,
    Resolved,
    Cancelled,
}

impl fmt::Display for MovementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MovementStatus::EnRoute => "en_route",
            MovementStatus::Resolved => "resolved",
            MovementStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reinforcements_resolve_before_attacks() {
        let hostile = [
            MissionKind::Attack,
            MissionKind::Raid,
            MissionKind::Conquest,
            MissionKind::Siege,
            MissionKind::Scout,
        ];
        for kind in hostile {
            assert!(kind.attack_type().is_some());
            assert!(
                MissionKind::Reinforce.resolution_priority() < kind.resolution_priority(),
                "reinforce should precede {kind}"
            );
            assert!(MissionKind::Return.resolution_priority() < kind.resolution_priority());
        }
    }

    #[test]
    fn test_scout_fights_but_is_not_protection_restricted() {
        assert_eq!(MissionKind::Scout.attack_type(), Some(AttackType::Scout));
        assert!(!MissionKind::Scout.is_protection_restricted());
        assert!(!MissionKind::Reinforce.is_protection_restricted());
        assert!(MissionKind::Siege.is_protection_restricted());
    }

    #[test]
    fn test_attack_type_mapping() {
        assert_eq!(MissionKind::Raid.attack_type(), Some(AttackType::Raid));
        assert_eq!(MissionKind::Siege.attack_type(), Some(AttackType::Normal));
        assert_eq!(MissionKind::Reinforce.attack_type(), None);
    }
}
