use thiserror::Error;

use crate::{army::UnitTypeId, mission::MissionKind};

/// Errors for mission requests that break game rules.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No units selected to deploy")]
    NoUnitsSelected,

    #[error("Unit {0} not found in catalog")]
    UnknownUnit(UnitTypeId),

    #[error("Quantity of {0} must be greater than zero")]
    ZeroQuantity(UnitTypeId),

    #[error("Not enough {unit} available: requested {requested}, available {available}")]
    InsufficientTroops {
        unit: UnitTypeId,
        requested: u32,
        available: u32,
    },

    #[error("siege missions require rams or catapults")]
    SiegeUnitsRequired,

    #[error("conquest missions require at least one chief")]
    ChiefRequired,

    #[error("Only scout units can be used for a scout mission")]
    OnlyScoutUnitsAllowed,

    #[error("{0} missions can't be sent directly")]
    InvalidMissionKind(MissionKind),

    #[error("Malformed target: {0}")]
    MalformedTarget(String),

    #[error("Village {village_id} not owned by account {account_id}")]
    VillageNotOwned {
        village_id: u32,
        account_id: uuid::Uuid,
    },

    #[error("Too many catapult targets: {requested} (max {max})")]
    TooManyCatapultTargets { requested: usize, max: usize },

    #[error("Units with zero speed can't travel")]
    ZeroSpeed,

    #[error("Wave member {index} can't land within the wave window: it needs {travel_millis} ms")]
    WaveArrivalUnreachable { index: usize, travel_millis: i64 },

    #[error("Wave group has no members")]
    EmptyWave,
}
