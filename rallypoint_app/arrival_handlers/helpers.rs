use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use rallypoint_game::{
    battle::{DefendingContingent, ForceStacks},
    catalog::UnitCatalog,
    models::{
        movement::{Destination, Movement, MovementPayload},
        village::Village,
    },
};
use rallypoint_types::{
    army::TroopSet,
    battle::BattleReport,
    common::ResourceGroup,
    errors::ApplicationError,
    mission::MissionKind,
    tribe::Tribe,
};

use crate::{
    arrivals::handler::ArrivalContext, command_handlers::helpers::slowest_speed,
    command_handlers::helpers::travel_time, uow::UnitOfWork,
};

/// Village standing at the destination, if any. A village removed while
/// troops were on their way counts as an empty tile.
pub async fn find_destination_village(
    uow: &Box<dyn UnitOfWork<'_> + '_>,
    destination: &Destination,
) -> Result<Option<Village>, ApplicationError> {
    let Some(village_id) = destination.village_id else {
        return uow.villages().get_by_position(destination.position).await;
    };
    match uow.villages().get_by_id(village_id).await {
        Ok(village) => Ok(Some(village)),
        Err(ApplicationError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Every account's troops stationed at a village, the owner first.
pub async fn load_defenders(
    uow: &Box<dyn UnitOfWork<'_> + '_>,
    village: &Village,
) -> Result<Vec<DefendingContingent>, ApplicationError> {
    let mut by_account: BTreeMap<Uuid, ForceStacks> = BTreeMap::new();
    for stack in uow.garrisons().list_by_village(village.id).await? {
        if stack.count() == 0 {
            continue;
        }
        let force = by_account.entry(stack.account_id).or_default();
        force.units.insert(stack.unit.clone(), stack.count());
        force.tech.insert(stack.unit.clone(), stack.tech_levels());
    }

    let mut defenders = Vec::with_capacity(by_account.len());
    if let Some(force) = by_account.remove(&village.account_id) {
        defenders.push(DefendingContingent {
            account_id: village.account_id,
            force,
        });
    }
    defenders.extend(
        by_account
            .into_iter()
            .map(|(account_id, force)| DefendingContingent { account_id, force }),
    );
    Ok(defenders)
}

pub fn attacker_force(movement: &Movement) -> ForceStacks {
    ForceStacks::new(movement.payload.units.clone(), movement.payload.tech.clone())
}

/// Tribe of the sending account, guessed from the units it sent.
pub fn attacker_tribe(catalog: &dyn UnitCatalog, movement: &Movement) -> Tribe {
    movement
        .payload
        .units
        .keys()
        .find_map(|unit| catalog.tribe_of(unit))
        .unwrap_or(Tribe::Nature)
}

/// Folds a movement id into a resolver seed.
pub fn battle_seed(movement_id: Uuid) -> u64 {
    let bits = movement_id.as_u128();
    ((bits >> 64) as u64) ^ (bits as u64)
}

/// Removes the defenders' dead from the garrisons of the village.
pub async fn apply_defender_losses(
    uow: &Box<dyn UnitOfWork<'_> + '_>,
    village_id: u32,
    report: &BattleReport,
) -> Result<(), ApplicationError> {
    let garrisons = uow.garrisons();
    for defender in report.defenders.iter() {
        for (unit, losses) in defender.party.losses.iter() {
            if *losses == 0 {
                continue;
            }
            garrisons
                .withdraw(village_id, defender.account_id, unit, *losses)
                .await?;
        }
    }
    Ok(())
}

/// Schedules the trip home of whatever survived, carrying `resources`.
///
/// Nothing is scheduled when no unit survived.
pub async fn send_survivors_home(
    ctx: &ArrivalContext<'_>,
    movement: &Movement,
    survivors: &TroopSet,
    resources: ResourceGroup,
) -> Result<Option<Movement>, ApplicationError> {
    let survivors: TroopSet = survivors
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(unit, count)| (unit.clone(), *count))
        .collect();
    if survivors.is_empty() {
        info!(movement_id = %movement.id, "No survivors, nothing returns.");
        return Ok(None);
    }

    let speed = slowest_speed(ctx.catalog.as_ref(), &survivors)?;
    let travel_time = travel_time(
        &ctx.config,
        &movement.destination.position,
        &movement.source_position,
        speed,
    );
    let tech = survivors
        .keys()
        .map(|unit| (unit.clone(), movement.payload.tech_for(unit)))
        .collect();

    let return_movement = Movement::new(
        MissionKind::Return,
        movement.account_id,
        movement
            .destination
            .village_id
            .unwrap_or(movement.source_village_id),
        movement.destination.position,
        Destination {
            village_id: Some(movement.source_village_id),
            position: movement.source_position,
        },
        movement.arrive_at,
        travel_time,
        MovementPayload {
            units: survivors,
            catapult_targets: vec![],
            tech,
            resources,
        },
        movement.arrive_at,
        format!("{}#return", movement.id),
    );
    ctx.uow.movements().add(&return_movement).await?;

    info!(
        return_movement_id = %return_movement.id,
        arrive_at = %return_movement.arrive_at,
        "Army return planned."
    );
    Ok(Some(return_movement))
}
