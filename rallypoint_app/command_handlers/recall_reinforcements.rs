use std::collections::BTreeMap;
use tracing::{info, instrument};

use rallypoint_game::models::movement::{Destination, Movement, MovementPayload};
use rallypoint_types::{
    errors::{ApplicationError, ValidationError},
    mission::MissionKind,
};

use crate::{
    command_handlers::helpers::{slowest_speed, travel_time, validate_units},
    cqrs::{CommandContext, CommandHandler, commands::RecallReinforcements},
    uow::UnitOfWork,
};

pub struct RecallReinforcementsCommandHandler {}

impl Default for RecallReinforcementsCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl RecallReinforcementsCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<RecallReinforcements> for RecallReinforcementsCommandHandler {
    #[instrument(skip_all, fields(
        account_id = %command.account_id,
        host_village_id = command.host_village_id,
        home_village_id = command.home_village_id,
    ))]
    async fn handle(
        &self,
        command: RecallReinforcements,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &CommandContext,
    ) -> Result<Movement, ApplicationError> {
        let catalog = ctx.catalog.as_ref();
        validate_units(catalog, &command.units)?;

        let village_repo = uow.villages();
        let home = village_repo.get_by_id(command.home_village_id).await?;
        if !home.is_owned_by(command.account_id) {
            return Err(ValidationError::VillageNotOwned {
                village_id: home.id,
                account_id: command.account_id,
            }
            .into());
        }
        let host = village_repo.get_by_id(command.host_village_id).await?;
        if host.id == home.id {
            return Err(ValidationError::MalformedTarget(
                "troops at home can't be recalled".to_string(),
            )
            .into());
        }

        // Partial recalls leave the rest of each stack stationed
        let garrisons = uow.garrisons();
        let mut tech = BTreeMap::new();
        for (unit, quantity) in command.units.iter() {
            let stack = garrisons
                .withdraw(host.id, command.account_id, unit, *quantity)
                .await?;
            tech.insert(unit.clone(), stack.tech_levels());
        }

        let speed = slowest_speed(catalog, &command.units)?;
        let travel_time = travel_time(&ctx.config, &host.position, &home.position, speed);

        let movement = Movement::new(
            MissionKind::Return,
            command.account_id,
            host.id,
            host.position,
            Destination {
                village_id: Some(home.id),
                position: home.position,
            },
            ctx.now,
            travel_time,
            MovementPayload {
                units: command.units.clone(),
                tech,
                ..Default::default()
            },
            ctx.now,
            command.idempotency_key.clone(),
        );
        uow.movements().add(&movement).await?;

        info!(
            movement_id = %movement.id,
            units = movement.payload.total_units(),
            arrive_at = %movement.arrive_at,
            "Reinforcements recalled."
        );
        Ok(movement)
    }
}
