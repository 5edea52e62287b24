use std::collections::HashMap;

use rallypoint_types::{
    army::{UnitRole, UnitStats, UnitTypeId},
    tribe::Tribe,
};

/// Read-only lookup of static unit data.
pub trait UnitCatalog: Send + Sync {
    fn lookup(&self, unit: &UnitTypeId) -> Option<&UnitStats>;

    /// Tribe fielding the unit, when known.
    fn tribe_of(&self, unit: &UnitTypeId) -> Option<Tribe>;
}

/// Catalog with the Roman, Teuton and Gaul tables.
///
/// Ids are the snake_case unit names. Names shared between tribes carry the
/// tribe as prefix (`teuton_ram`, `gaul_settler`...).
#[derive(Debug, Clone)]
pub struct StandardUnitCatalog {
    units: HashMap<UnitTypeId, (Tribe, UnitStats)>,
}

const fn unit(
    role: UnitRole,
    attack: u32,
    defense_infantry: u32,
    defense_cavalry: u32,
    speed: u8,
    capacity: u32,
    upkeep: u32,
) -> UnitStats {
    UnitStats {
        role,
        attack,
        defense_infantry,
        defense_cavalry,
        speed,
        capacity,
        upkeep,
    }
}

const ROMAN_UNITS: [(&str, UnitStats); 10] = [
    ("legionnaire", unit(UnitRole::Infantry, 40, 35, 50, 12, 50, 1)),
    ("praetorian", unit(UnitRole::Infantry, 30, 65, 35, 10, 20, 1)),
    ("imperian", unit(UnitRole::Infantry, 70, 40, 25, 14, 50, 1)),
    ("equites_legati", unit(UnitRole::Scout, 0, 20, 10, 32, 0, 2)),
    ("equites_imperatoris", unit(UnitRole::Cavalry, 120, 65, 50, 28, 100, 3)),
    ("equites_caesaris", unit(UnitRole::Cavalry, 180, 80, 105, 20, 70, 4)),
    ("battering_ram", unit(UnitRole::Ram, 60, 30, 75, 8, 0, 3)),
    ("fire_catapult", unit(UnitRole::Catapult, 75, 60, 10, 6, 0, 6)),
    ("senator", unit(UnitRole::Chief, 50, 40, 30, 8, 0, 5)),
    ("roman_settler", unit(UnitRole::Settler, 0, 80, 80, 10, 3000, 1)),
];

const TEUTON_UNITS: [(&str, UnitStats); 10] = [
    ("maceman", unit(UnitRole::Infantry, 40, 20, 5, 14, 60, 1)),
    ("spearman", unit(UnitRole::Infantry, 10, 35, 60, 14, 40, 1)),
    ("axeman", unit(UnitRole::Infantry, 60, 30, 30, 12, 50, 1)),
    ("scout", unit(UnitRole::Scout, 0, 10, 5, 18, 0, 1)),
    ("paladin", unit(UnitRole::Cavalry, 55, 100, 40, 20, 110, 2)),
    ("teutonic_knight", unit(UnitRole::Cavalry, 150, 50, 75, 18, 80, 3)),
    ("teuton_ram", unit(UnitRole::Ram, 65, 30, 80, 8, 0, 3)),
    ("catapult", unit(UnitRole::Catapult, 50, 60, 10, 6, 0, 6)),
    ("chief", unit(UnitRole::Chief, 40, 60, 40, 8, 0, 4)),
    ("teuton_settler", unit(UnitRole::Settler, 10, 80, 80, 10, 3000, 1)),
];

const GAUL_UNITS: [(&str, UnitStats); 10] = [
    ("phalanx", unit(UnitRole::Infantry, 15, 40, 50, 14, 35, 1)),
    ("swordsman", unit(UnitRole::Infantry, 65, 35, 20, 12, 45, 1)),
    ("pathfinder", unit(UnitRole::Scout, 0, 20, 10, 34, 0, 2)),
    ("theutates_thunder", unit(UnitRole::Cavalry, 100, 25, 40, 38, 75, 2)),
    ("druidrider", unit(UnitRole::Cavalry, 45, 115, 55, 32, 35, 2)),
    ("haeduan", unit(UnitRole::Cavalry, 140, 60, 165, 26, 65, 3)),
    ("gaul_ram", unit(UnitRole::Ram, 50, 30, 105, 8, 0, 3)),
    ("trebuchet", unit(UnitRole::Catapult, 70, 45, 10, 6, 0, 6)),
    ("chieftain", unit(UnitRole::Chief, 40, 50, 50, 10, 0, 4)),
    ("gaul_settler", unit(UnitRole::Settler, 0, 80, 80, 10, 3000, 1)),
];

impl StandardUnitCatalog {
    pub fn new() -> Self {
        let mut units = HashMap::new();
        let tables = [
            (Tribe::Roman, &ROMAN_UNITS),
            (Tribe::Teuton, &TEUTON_UNITS),
            (Tribe::Gaul, &GAUL_UNITS),
        ];
        for (tribe, table) in tables {
            for (name, stats) in table.iter() {
                units.insert(UnitTypeId::new(*name), (tribe, stats.clone()));
            }
        }
        Self { units }
    }

    /// Adds or replaces a unit, e.g. for custom servers.
    pub fn with_unit(mut self, id: UnitTypeId, tribe: Tribe, stats: UnitStats) -> Self {
        self.units.insert(id, (tribe, stats));
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Default for StandardUnitCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitCatalog for StandardUnitCatalog {
    fn lookup(&self, unit: &UnitTypeId) -> Option<&UnitStats> {
        self.units.get(unit).map(|(_, stats)| stats)
    }

    fn tribe_of(&self, unit: &UnitTypeId) -> Option<Tribe> {
        self.units.get(unit).map(|(tribe, _)| *tribe)
    }
}
