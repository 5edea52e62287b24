use std::collections::HashMap;
use uuid::Uuid;

use rallypoint_game::models::{
    garrison::GarrisonStack, idempotency::IdempotencyRecord, movement::Movement,
    rally_point::RallyPoint, village::Village, village_state::VillageState,
};
use rallypoint_types::army::UnitTypeId;

/// Key of a garrison stack: village, owning account, unit type.
pub type GarrisonKey = (u32, Uuid, UnitTypeId);

/// Everything the engine persists.
#[derive(Debug, Default, Clone)]
pub struct WorldState {
    pub villages: HashMap<u32, Village>,
    pub rally_points: HashMap<u32, RallyPoint>,
    pub garrisons: HashMap<GarrisonKey, GarrisonStack>,
    pub movements: HashMap<Uuid, Movement>,
    pub idempotency: HashMap<String, IdempotencyRecord>,
    pub village_states: HashMap<u32, VillageState>,
}
