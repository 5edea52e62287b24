use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{army::TroopSet, common::ResourceGroup, tribe::WallKind};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Deserialize, Serialize)]
pub enum AttackType {
    Raid,   // Raid
    Normal, // Attack / Siege / Conquer
    Scout,
}

/// A building aimed at by catapults (e.g. `"warehouse"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatapultTarget(String);

impl CatapultTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatapultTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Deserialize, Serialize)]
pub enum BattleWinner {
    Attacker,
    Defender,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattlePartyReport {
    pub units_before: TroopSet,
    pub survivors: TroopSet,
    pub losses: TroopSet,
    pub loss_percentage: f64,
}

impl BattlePartyReport {
    pub fn total_before(&self) -> u32 {
        self.units_before.values().fold(0u32, |acc, n| acc.saturating_add(*n))
    }

    pub fn total_survivors(&self) -> u32 {
        self.survivors.values().fold(0u32, |acc, n| acc.saturating_add(*n))
    }

    pub fn total_losses(&self) -> u32 {
        self.losses.values().fold(0u32, |acc, n| acc.saturating_add(*n))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenderPartyReport {
    pub account_id: Uuid,
    pub party: BattlePartyReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallDamageReport {
    pub kind: WallKind,
    pub level_before: u8,
    pub level_after: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingDamageReport {
    pub target: CatapultTarget,
    pub level_before: u8,
    pub level_after: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyReport {
    pub before: u16,
    pub after: u16,
}

impl LoyaltyReport {
    pub fn conquered(&self) -> bool {
        self.after == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutingReport {
    pub was_detected: bool,
    /// Only filled when at least one scout made it through.
    pub resources: Option<ResourceGroup>,
    pub wall_level: Option<u8>,
    pub defending_units: Option<TroopSet>,
}

/// Outcome of a combat resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub attack_type: AttackType,
    pub winner: BattleWinner,
    pub attacker: BattlePartyReport,
    pub defenders: Vec<DefenderPartyReport>,
    pub bounty: ResourceGroup,
    pub wall: Option<WallDamageReport>,
    pub buildings: Vec<BuildingDamageReport>,
    pub loyalty: Option<LoyaltyReport>,
    pub scouting: Option<ScoutingReport>,
    pub night_defense_multiplier: f64,
}

impl BattleReport {
    /// Sum of all units standing in the defense before the fight.
    pub fn total_defenders_before(&self) -> u32 {
        self.defenders
            .iter()
            .fold(0u32, |acc, d| acc.saturating_add(d.party.total_before()))
    }

    pub fn defender_party(&self, account_id: Uuid) -> Option<&BattlePartyReport> {
        self.defenders
            .iter()
            .find(|d| d.account_id == account_id)
            .map(|d| &d.party)
    }
}
