use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeMap, fmt};
use uuid::Uuid;

use rallypoint_types::{
    army::{TechLevels, TroopSet, UnitTypeId},
    battle::{BattleReport, CatapultTarget},
    common::ResourceGroup,
    errors::StateError,
    map::Position,
    mission::{MissionKind, MovementStatus},
};

/// Where a movement is headed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub village_id: Option<u32>,
    pub position: Position,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementPayload {
    pub units: TroopSet,
    pub catapult_targets: Vec<CatapultTarget>,
    /// Smithy levels frozen at departure.
    pub tech: BTreeMap<UnitTypeId, TechLevels>,
    /// Resources carried home by returning troops.
    pub resources: ResourceGroup,
}

impl MovementPayload {
    pub fn total_units(&self) -> u32 {
        self.units.values().fold(0u32, |acc, n| acc.saturating_add(*n))
    }

    pub fn tech_for(&self, unit: &UnitTypeId) -> TechLevels {
        self.tech.get(unit).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveMembership {
    pub tag: String,
    pub index: u32,
}

/// Non-fatal notices attached to a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionWarning {
    CatapultTargetingLocked { required_level: u8 },
    PreferredArrivalUnreachable { earliest_arrival: DateTime<Utc> },
}

impl fmt::Display for MissionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionWarning::CatapultTargetingLocked { required_level } => write!(
                f,
                "Catapult targeting locked until Rally Point level {required_level}"
            ),
            MissionWarning::PreferredArrivalUnreachable { earliest_arrival } => write!(
                f,
                "Preferred arrival can't be reached, arriving at {earliest_arrival}"
            ),
        }
    }
}

/// A mission in transit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: Uuid,
    pub kind: MissionKind,
    pub account_id: Uuid,
    pub source_village_id: u32,
    pub source_position: Position,
    pub destination: Destination,
    pub depart_at: DateTime<Utc>,
    pub arrive_at: DateTime<Utc>,
    pub payload: MovementPayload,
    status: MovementStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub idempotency_key: String,
    pub wave: Option<WaveMembership>,
    pub report: Option<BattleReport>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Movement {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: MissionKind,
        account_id: Uuid,
        source_village_id: u32,
        source_position: Position,
        destination: Destination,
        depart_at: DateTime<Utc>,
        travel_time: Duration,
        payload: MovementPayload,
        created_at: DateTime<Utc>,
        idempotency_key: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            account_id,
            source_village_id,
            source_position,
            destination,
            depart_at,
            arrive_at: depart_at + travel_time,
            payload,
            status: MovementStatus::EnRoute,
            created_by: account_id,
            created_at,
            idempotency_key,
            wave: None,
            report: None,
            finished_at: None,
        }
    }

    pub fn status(&self) -> MovementStatus {
        self.status
    }

    pub fn is_en_route(&self) -> bool {
        self.status == MovementStatus::EnRoute
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_en_route() && self.arrive_at <= now
    }

    pub fn travel_time(&self) -> Duration {
        self.arrive_at - self.depart_at
    }

    /// Terminal transition after arrival processing.
    pub fn resolve(
        &mut self,
        report: Option<BattleReport>,
        at: DateTime<Utc>,
    ) -> Result<(), StateError> {
        self.transition(MovementStatus::Resolved, at)?;
        self.report = report;
        Ok(())
    }

    /// Terminal transition for a recalled dispatch.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> Result<(), StateError> {
        if self.kind == MissionKind::Return {
            return Err(StateError::NotCancellable {
                id: self.id,
                kind: self.kind,
            });
        }
        self.transition(MovementStatus::Cancelled, at)
    }

    /// Whether the owner may still call the troops back at `now`.
    pub fn can_be_cancelled_by(&self, account_id: Uuid, now: DateTime<Utc>, grace: Duration) -> bool {
        self.is_en_route()
            && self.account_id == account_id
            && now - self.created_at <= grace
            && now < self.arrive_at
    }

    fn transition(&mut self, to: MovementStatus, at: DateTime<Utc>) -> Result<(), StateError> {
        if self.status != MovementStatus::EnRoute {
            return Err(StateError::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.finished_at = Some(at);
        Ok(())
    }
}

/// Total order used when resolving due movements.
///
/// Earlier arrivals first; at the same instant returns and reinforcements land
/// before any hostile movement, then wave position, creation time and id.
pub fn resolution_order(a: &Movement, b: &Movement) -> Ordering {
    a.arrive_at
        .cmp(&b.arrive_at)
        .then_with(|| {
            a.kind
                .resolution_priority()
                .cmp(&b.kind.resolution_priority())
        })
        .then_with(|| {
            let a_idx = a.wave.as_ref().map(|w| w.index).unwrap_or(0);
            let b_idx = b.wave.as_ref().map(|w| w.index).unwrap_or(0);
            a_idx.cmp(&b_idx)
        })
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
