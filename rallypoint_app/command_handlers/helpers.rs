use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::warn;
use uuid::Uuid;

use rallypoint_game::{
    catalog::UnitCatalog,
    models::{
        movement::{Destination, MissionWarning, Movement, MovementPayload, WaveMembership},
        rally_point::RallyPoint,
        village::Village,
    },
};
use rallypoint_types::{
    army::{TechLevels, TroopSet, UnitRole, UnitTypeId},
    battle::CatapultTarget,
    errors::{ApplicationError, NotFoundError, PolicyError, ValidationError},
    map::Position,
    mission::MissionKind,
};

use crate::{config::Config, cqrs::CommandContext, cqrs::commands::MissionTarget, uow::UnitOfWork};

/// A mission request, as shared by single missions and wave members.
pub struct MissionOrder<'r> {
    pub account_id: Uuid,
    pub source_village_id: u32,
    pub kind: MissionKind,
    pub target: &'r MissionTarget,
    pub units: &'r TroopSet,
    pub catapult_targets: &'r [CatapultTarget],
}

/// A validated mission, ready to be reserved.
pub struct PreparedMission {
    pub kind: MissionKind,
    pub account_id: Uuid,
    pub source: Village,
    pub rally_point: RallyPoint,
    pub destination: Destination,
    pub payload: MovementPayload,
    pub travel_time: Duration,
    pub warnings: Vec<MissionWarning>,
}

/// Checks that a unit mapping is non-empty, has no zero entries and only
/// known unit types.
pub fn validate_units(catalog: &dyn UnitCatalog, units: &TroopSet) -> Result<(), ValidationError> {
    if units.is_empty() {
        return Err(ValidationError::NoUnitsSelected);
    }
    for (unit, quantity) in units.iter() {
        if *quantity == 0 {
            return Err(ValidationError::ZeroQuantity(unit.clone()));
        }
        if catalog.lookup(unit).is_none() {
            return Err(ValidationError::UnknownUnit(unit.clone()));
        }
    }
    Ok(())
}

/// Speed of the slowest unit type with a non-zero quantity.
pub fn slowest_speed(catalog: &dyn UnitCatalog, units: &TroopSet) -> Result<u8, ValidationError> {
    let mut slowest: Option<u8> = None;
    for (unit, quantity) in units.iter() {
        if *quantity == 0 {
            continue;
        }
        let stats = catalog
            .lookup(unit)
            .ok_or_else(|| ValidationError::UnknownUnit(unit.clone()))?;
        slowest = Some(slowest.map_or(stats.speed, |s| s.min(stats.speed)));
    }
    match slowest {
        None => Err(ValidationError::NoUnitsSelected),
        Some(0) => Err(ValidationError::ZeroSpeed),
        Some(speed) => Ok(speed),
    }
}

pub fn travel_time(config: &Config, from: &Position, to: &Position, speed: u8) -> Duration {
    let millis = from.calculate_travel_time_millis(
        to,
        speed,
        config.world_size as i32,
        config.speed.max(1) as u8,
    );
    Duration::milliseconds(millis)
}

fn units_with_role(catalog: &dyn UnitCatalog, units: &TroopSet, role: UnitRole) -> u32 {
    units
        .iter()
        .filter(|(unit, _)| catalog.lookup(unit).map(|s| s.role) == Some(role))
        .map(|(_, quantity)| *quantity)
        .sum()
}

fn check_mission_kind(
    catalog: &dyn UnitCatalog,
    kind: MissionKind,
    units: &TroopSet,
) -> Result<(), ValidationError> {
    match kind {
        MissionKind::Return => Err(ValidationError::InvalidMissionKind(kind)),
        MissionKind::Siege => {
            let siege_units = units_with_role(catalog, units, UnitRole::Ram)
                + units_with_role(catalog, units, UnitRole::Catapult);
            if siege_units == 0 {
                return Err(ValidationError::SiegeUnitsRequired);
            }
            Ok(())
        }
        MissionKind::Conquest => {
            if units_with_role(catalog, units, UnitRole::Chief) == 0 {
                return Err(ValidationError::ChiefRequired);
            }
            Ok(())
        }
        MissionKind::Scout => {
            let only_scouts = units
                .keys()
                .all(|unit| catalog.lookup(unit).map(|s| s.role) == Some(UnitRole::Scout));
            if !only_scouts {
                return Err(ValidationError::OnlyScoutUnitsAllowed);
            }
            Ok(())
        }
        MissionKind::Attack | MissionKind::Raid | MissionKind::Reinforce => Ok(()),
    }
}

/// Resolves the target to a destination, returning the village standing there if any.
async fn resolve_target(
    uow: &Box<dyn UnitOfWork<'_> + '_>,
    target: &MissionTarget,
) -> Result<(Destination, Option<Village>), ApplicationError> {
    let village = match target {
        MissionTarget::Village(village_id) => Some(uow.villages().get_by_id(*village_id).await?),
        MissionTarget::Tile(position) => uow.villages().get_by_position(*position).await?,
    };
    let destination = match (&village, target) {
        (Some(village), _) => Destination {
            village_id: Some(village.id),
            position: village.position,
        },
        (None, MissionTarget::Tile(position)) => Destination {
            village_id: None,
            position: *position,
        },
        (None, MissionTarget::Village(village_id)) => {
            return Err(NotFoundError::Village(*village_id).into());
        }
    };
    Ok((destination, village))
}

/// Runs the validation pipeline of a mission, without touching any state.
pub async fn prepare_mission(
    uow: &Box<dyn UnitOfWork<'_> + '_>,
    ctx: &CommandContext,
    order: MissionOrder<'_>,
) -> Result<PreparedMission, ApplicationError> {
    let catalog = ctx.catalog.as_ref();
    validate_units(catalog, order.units)?;

    let source = uow.villages().get_by_id(order.source_village_id).await?;
    if !source.is_owned_by(order.account_id) {
        return Err(ValidationError::VillageNotOwned {
            village_id: source.id,
            account_id: order.account_id,
        }
        .into());
    }

    // Unit availability, and tech levels to snapshot
    let garrisons = uow.garrisons();
    let mut tech: BTreeMap<UnitTypeId, TechLevels> = BTreeMap::new();
    for (unit, requested) in order.units.iter() {
        let stack = garrisons.get(source.id, order.account_id, unit).await?;
        let available = stack.as_ref().map(|s| s.count()).unwrap_or(0);
        if *requested > available {
            return Err(ValidationError::InsufficientTroops {
                unit: unit.clone(),
                requested: *requested,
                available,
            }
            .into());
        }
        let levels = stack.map(|s| s.tech_levels()).unwrap_or_default();
        tech.insert(unit.clone(), levels);
    }

    check_mission_kind(catalog, order.kind, order.units)?;

    let (destination, target_village) = resolve_target(uow, order.target).await?;
    if destination.village_id == Some(source.id) || destination.position == source.position {
        return Err(ValidationError::MalformedTarget(format!(
            "village {} can't target itself",
            source.id
        ))
        .into());
    }
    if order.kind == MissionKind::Reinforce && target_village.is_none() {
        return Err(ValidationError::MalformedTarget(format!(
            "no village to reinforce at {}",
            destination.position
        ))
        .into());
    }
    if let Some(target_village) = &target_village {
        if order.kind.is_protection_restricted() && target_village.is_protected() {
            return Err(PolicyError::TargetUnderBeginnerProtection {
                village_id: target_village.id,
            }
            .into());
        }
    }

    // Catapult targeting: a locked rally point drops the targets before any count check
    let rally_point = uow.rally_points().get_by_village_id(source.id).await?;
    let mut warnings = vec![];
    let mut catapult_targets = order.catapult_targets.to_vec();
    let unlock_level = ctx.config.catapult_targeting_level;
    if !catapult_targets.is_empty() && !rally_point.allows_catapult_targeting(unlock_level) {
        warn!(
            village_id = source.id,
            rally_point_level = rally_point.level,
            "Catapult targets cleared, rally point level too low."
        );
        catapult_targets.clear();
        warnings.push(MissionWarning::CatapultTargetingLocked {
            required_level: unlock_level,
        });
    }
    let max_targets = ctx.config.max_catapult_targets;
    if catapult_targets.len() > max_targets {
        return Err(ValidationError::TooManyCatapultTargets {
            requested: catapult_targets.len(),
            max: max_targets,
        }
        .into());
    }

    let speed = slowest_speed(catalog, order.units)?;
    let travel_time = travel_time(&ctx.config, &source.position, &destination.position, speed);

    Ok(PreparedMission {
        kind: order.kind,
        account_id: order.account_id,
        source,
        rally_point,
        destination,
        payload: MovementPayload {
            units: order.units.clone(),
            catapult_targets,
            tech,
            ..Default::default()
        },
        travel_time,
        warnings,
    })
}

/// Debits the source garrison and stores the movement, inside the caller's transaction.
pub async fn reserve_mission(
    uow: &Box<dyn UnitOfWork<'_> + '_>,
    prepared: &PreparedMission,
    depart_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    idempotency_key: String,
    wave: Option<WaveMembership>,
) -> Result<Movement, ApplicationError> {
    let garrisons = uow.garrisons();
    for (unit, quantity) in prepared.payload.units.iter() {
        garrisons
            .withdraw(prepared.source.id, prepared.account_id, unit, *quantity)
            .await?;
    }

    let mut movement = Movement::new(
        prepared.kind,
        prepared.account_id,
        prepared.source.id,
        prepared.source.position,
        prepared.destination.clone(),
        depart_at,
        prepared.travel_time,
        prepared.payload.clone(),
        created_at,
        idempotency_key,
    );
    movement.wave = wave;
    uow.movements().add(&movement).await?;

    Ok(movement)
}
