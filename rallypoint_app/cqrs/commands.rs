use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rallypoint_game::models::{
    idempotency::{IdempotentOutcome, MissionDispatch},
    movement::Movement,
};
use rallypoint_types::{
    army::TroopSet, battle::CatapultTarget, map::Position, mission::MissionKind,
};

use crate::cqrs::Command;

/// Where a mission is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionTarget {
    Village(u32),
    Tile(Position),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMission {
    pub idempotency_key: String,
    pub account_id: Uuid,
    pub source_village_id: u32,
    pub kind: MissionKind,
    pub target: MissionTarget,
    pub units: TroopSet,
    pub catapult_targets: Vec<CatapultTarget>,
    pub preferred_arrival: Option<DateTime<Utc>>,
}

impl Command for SendMission {
    type Output = MissionDispatch;
    const OPERATION: &'static str = "send_mission";

    fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    fn to_outcome(output: &Self::Output) -> IdempotentOutcome {
        IdempotentOutcome::Dispatched(output.clone())
    }

    fn from_outcome(outcome: IdempotentOutcome) -> Option<Self::Output> {
        match outcome {
            IdempotentOutcome::Dispatched(dispatch) => Some(dispatch),
            _ => None,
        }
    }
}

/// One mission of a wave. All members belong to the wave's account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveMember {
    pub source_village_id: u32,
    pub kind: MissionKind,
    pub target: MissionTarget,
    pub units: TroopSet,
    pub catapult_targets: Vec<CatapultTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendWaveGroup {
    pub idempotency_key: String,
    pub account_id: Uuid,
    pub tag: String,
    pub arrive_at: DateTime<Utc>,
    pub members: Vec<WaveMember>,
}

impl Command for SendWaveGroup {
    type Output = Vec<MissionDispatch>;
    const OPERATION: &'static str = "send_wave_group";

    fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    fn to_outcome(output: &Self::Output) -> IdempotentOutcome {
        IdempotentOutcome::WaveDispatched(output.clone())
    }

    fn from_outcome(outcome: IdempotentOutcome) -> Option<Self::Output> {
        match outcome {
            IdempotentOutcome::WaveDispatched(dispatches) => Some(dispatches),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelMovement {
    pub idempotency_key: String,
    pub movement_id: Uuid,
    pub account_id: Uuid,
}

impl Command for CancelMovement {
    type Output = bool;
    const OPERATION: &'static str = "cancel_movement";

    fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    fn to_outcome(output: &Self::Output) -> IdempotentOutcome {
        IdempotentOutcome::Cancelled(*output)
    }

    fn from_outcome(outcome: IdempotentOutcome) -> Option<Self::Output> {
        match outcome {
            IdempotentOutcome::Cancelled(cancelled) => Some(cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallReinforcements {
    pub idempotency_key: String,
    pub account_id: Uuid,
    /// Village where the reinforcements are stationed.
    pub host_village_id: u32,
    pub home_village_id: u32,
    pub units: TroopSet,
}

impl Command for RecallReinforcements {
    type Output = Movement;
    const OPERATION: &'static str = "recall_reinforcements";

    fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    fn to_outcome(output: &Self::Output) -> IdempotentOutcome {
        IdempotentOutcome::Recalled(output.clone())
    }

    fn from_outcome(outcome: IdempotentOutcome) -> Option<Self::Output> {
        match outcome {
            IdempotentOutcome::Recalled(movement) => Some(movement),
            _ => None,
        }
    }
}
