use async_trait::async_trait;
use tracing::{info, instrument, warn};

use rallypoint_game::models::movement::Movement;
use rallypoint_types::{battle::BattleReport, common::ResourceGroup, errors::ApplicationError};

use crate::{
    arrival_handlers::helpers::{find_destination_village, send_survivors_home},
    arrivals::handler::{ArrivalContext, ArrivalHandler},
};

pub struct ReinforcementArrivalHandler {}

impl Default for ReinforcementArrivalHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ReinforcementArrivalHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl ArrivalHandler for ReinforcementArrivalHandler {
    #[instrument(skip_all, fields(
        movement_id = %movement.id,
        account_id = %movement.account_id,
        village_id = ?movement.destination.village_id,
    ))]
    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx ArrivalContext<'a>,
        movement: &'ctx Movement,
    ) -> Result<Option<BattleReport>, ApplicationError> {
        let Some(village) = find_destination_village(&ctx.uow, &movement.destination).await?
        else {
            warn!("No village left at destination, reinforcements turn back.");
            send_survivors_home(ctx, movement, &movement.payload.units, ResourceGroup::default())
                .await?;
            return Ok(None);
        };

        // Stationed under the sender's account
        let garrisons = ctx.uow.garrisons();
        for (unit, quantity) in movement.payload.units.iter() {
            garrisons
                .deposit(
                    village.id,
                    movement.account_id,
                    unit,
                    *quantity,
                    Some(movement.payload.tech_for(unit)),
                )
                .await?;
        }

        info!(
            units = movement.payload.total_units(),
            "Reinforcements arrived."
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{arrival_handlers::tests::arrival_context, test_utils::tests::MockUnitOfWork};
    use rallypoint_game::test_utils::{
        MovementFactoryOptions, VillageFactoryOptions, movement_factory, troops, village_factory,
    };
    use rallypoint_types::{
        army::{TechLevels, UnitTypeId},
        map::Position,
        mission::MissionKind,
    };

    #[tokio::test]
    async fn test_reinforcements_are_stationed_under_sender() {
        let mock = MockUnitOfWork::new();
        let ctx = arrival_context(&mock);
        let village = village_factory(VillageFactoryOptions {
            id: Some(2),
            position: Some(Position::new(3, 4)),
            ..Default::default()
        });
        ctx.uow.villages().save(&village).await.unwrap();

        let mut movement = movement_factory(MovementFactoryOptions {
            kind: Some(MissionKind::Reinforce),
            units: Some(troops(&[("maceman", 25)])),
            ..Default::default()
        });
        movement
            .payload
            .tech
            .insert(UnitTypeId::new("maceman"), TechLevels::new(0, 5));

        let report = ReinforcementArrivalHandler::new()
            .handle(&ctx, &movement)
            .await
            .unwrap();
        assert!(report.is_none());

        let stack = ctx
            .uow
            .garrisons()
            .get(village.id, movement.account_id, &UnitTypeId::new("maceman"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stack.count(), 25);
        assert_eq!(stack.tech_levels(), TechLevels::new(0, 5));
        assert!(
            ctx.uow
                .garrisons()
                .get(village.id, village.account_id, &UnitTypeId::new("maceman"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
