use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Unit quantities keyed by unit type, iterated in a stable order.
pub type TroopSet = BTreeMap<UnitTypeId, u32>;

/// Identifier of a unit type in the catalog (e.g. `"maceman"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitTypeId(String);

impl UnitTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitTypeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitRole {
    Infantry,
    Cavalry,
    Scout,
    Ram,
    Catapult,
    Chief,
    Settler,
}

impl UnitRole {
    pub fn is_siege(&self) -> bool {
        matches!(self, UnitRole::Ram | UnitRole::Catapult)
    }

    /// Settlers and chiefs don't take part in combat point totals.
    pub fn is_combatant(&self) -> bool {
        !matches!(self, UnitRole::Settler | UnitRole::Chief)
    }
}

/// Static data of a unit type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    pub role: UnitRole,
    pub attack: u32,
    pub defense_infantry: u32,
    pub defense_cavalry: u32,
    /// Tiles per hour.
    pub speed: u8,
    pub capacity: u32,
    pub upkeep: u32,
}

impl UnitStats {
    /// Returns a combat value improved by the given smithy level.
    pub fn apply_smithy_upgrade(&self, smithy_level: u8, combat_value: u32) -> f64 {
        combat_value as f64
            + ((combat_value + 300 * self.upkeep) as f64 / 7.0)
                * ((1.007f64).powi(smithy_level as i32) - 1.0)
    }
}

/// Smithy attack/defense levels of one unit type for one account.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechLevels {
    pub attack: u8,
    pub defense: u8,
}

impl TechLevels {
    pub const MAX_LEVEL: u8 = 20;

    pub fn new(attack: u8, defense: u8) -> Self {
        Self { attack, defense }
    }
}
