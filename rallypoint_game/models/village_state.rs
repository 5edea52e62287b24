use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use rallypoint_types::{battle::CatapultTarget, common::ResourceGroup};

/// Building and storage state of a village as seen by combat.
///
/// Maintained by the building and economy subsystems; combat only reads it
/// and writes back siege damage, loot and loyalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillageState {
    pub village_id: u32,
    pub wall_level: u8,
    pub cranny_capacity: u32,
    pub resources: ResourceGroup,
    pub buildings: BTreeMap<CatapultTarget, u8>,
    /// Stonemason and artifact multiplier on building durability.
    pub building_durability: f64,
    pub loyalty: u16,
}

impl VillageState {
    pub const FULL_LOYALTY: u16 = 100;

    pub fn new(village_id: u32) -> Self {
        Self {
            village_id,
            wall_level: 0,
            cranny_capacity: 0,
            resources: ResourceGroup::default(),
            buildings: BTreeMap::new(),
            building_durability: 1.0,
            loyalty: Self::FULL_LOYALTY,
        }
    }

    pub fn building_level(&self, target: &CatapultTarget) -> Option<u8> {
        self.buildings.get(target).copied()
    }
}
