use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use rallypoint_types::{
    army::{TechLevels, TroopSet, UnitTypeId},
    map::Position,
    mission::MissionKind,
    tribe::Tribe,
};

use crate::models::{
    garrison::GarrisonStack,
    movement::{Destination, Movement, MovementPayload},
    rally_point::RallyPoint,
    village::Village,
    village_state::VillageState,
};

#[derive(Default, Clone)]
pub struct VillageFactoryOptions {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub account_id: Option<Uuid>,
    pub position: Option<Position>,
    pub tribe: Option<Tribe>,
    pub beginner_protection: Option<bool>,
}

#[derive(Default, Clone)]
pub struct RallyPointFactoryOptions {
    pub village_id: Option<u32>,
    pub level: Option<u8>,
    pub wave_window_ms: Option<u32>,
}

#[derive(Default, Clone)]
pub struct GarrisonFactoryOptions {
    pub village_id: Option<u32>,
    pub account_id: Option<Uuid>,
    pub unit: Option<UnitTypeId>,
    pub count: Option<u32>,
    pub tech: Option<TechLevels>,
}

#[derive(Default, Clone)]
pub struct MovementFactoryOptions {
    pub kind: Option<MissionKind>,
    pub account_id: Option<Uuid>,
    pub source_village_id: Option<u32>,
    pub destination: Option<Destination>,
    pub units: Option<TroopSet>,
    pub depart_at: Option<DateTime<Utc>>,
    pub travel_time: Option<Duration>,
    pub created_at: Option<DateTime<Utc>>,
}

pub fn village_factory(options: VillageFactoryOptions) -> Village {
    let id = options
        .id
        .unwrap_or_else(|| rand::thread_rng().gen_range(1..1_000_000));
    Village::new(
        id,
        options.name.unwrap_or(format!("Village {id}")),
        options.account_id.unwrap_or_else(Uuid::new_v4),
        options.position.unwrap_or(Position::new(0, 0)),
        options.tribe.unwrap_or(Tribe::Teuton),
        options.beginner_protection.unwrap_or(false),
    )
}

pub fn rally_point_factory(options: RallyPointFactoryOptions) -> RallyPoint {
    RallyPoint::new(options.village_id.unwrap_or(1), options.level.unwrap_or(1))
        .with_wave_window(
            options
                .wave_window_ms
                .unwrap_or(RallyPoint::DEFAULT_WAVE_WINDOW_MS),
        )
}

pub fn garrison_factory(options: GarrisonFactoryOptions) -> GarrisonStack {
    GarrisonStack::new(
        options.village_id.unwrap_or(1),
        options.account_id.unwrap_or_else(Uuid::new_v4),
        options.unit.unwrap_or_else(|| UnitTypeId::new("maceman")),
        options.count.unwrap_or(100),
        options.tech,
    )
}

pub fn village_state_factory(village_id: u32) -> VillageState {
    VillageState::new(village_id)
}

pub fn movement_factory(options: MovementFactoryOptions) -> Movement {
    let depart_at = options.depart_at.unwrap_or_else(Utc::now);
    let units = options
        .units
        .unwrap_or_else(|| [(UnitTypeId::new("maceman"), 10)].into_iter().collect());

    Movement::new(
        options.kind.unwrap_or(MissionKind::Attack),
        options.account_id.unwrap_or_else(Uuid::new_v4),
        options.source_village_id.unwrap_or(1),
        Position::new(0, 0),
        options.destination.unwrap_or(Destination {
            village_id: Some(2),
            position: Position::new(3, 4),
        }),
        depart_at,
        options.travel_time.unwrap_or(Duration::seconds(60)),
        MovementPayload {
            units,
            ..Default::default()
        },
        options.created_at.unwrap_or(depart_at),
        Uuid::new_v4().to_string(),
    )
}

/// Builds a troop set from `(unit, count)` pairs.
pub fn troops(units: &[(&str, u32)]) -> TroopSet {
    units
        .iter()
        .map(|(unit, count)| (UnitTypeId::new(*unit), *count))
        .collect()
}
