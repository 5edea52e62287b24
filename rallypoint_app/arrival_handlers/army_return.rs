use async_trait::async_trait;
use tracing::{info, instrument};

use rallypoint_game::models::movement::Movement;
use rallypoint_types::{battle::BattleReport, errors::ApplicationError};

use crate::arrivals::handler::{ArrivalContext, ArrivalHandler};

pub struct ArmyReturnArrivalHandler {}

impl Default for ArmyReturnArrivalHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ArmyReturnArrivalHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl ArrivalHandler for ArmyReturnArrivalHandler {
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
        let home_id = movement
            .destination
            .village_id
            .unwrap_or(movement.source_village_id);
        let home = ctx.uow.villages().get_by_id(home_id).await?;

        let garrisons = ctx.uow.garrisons();
        for (unit, quantity) in movement.payload.units.iter() {
            garrisons
                .deposit(
                    home.id,
                    movement.account_id,
                    unit,
                    *quantity,
                    Some(movement.payload.tech_for(unit)),
                )
                .await?;
        }

        if movement.payload.resources.total() > 0 {
            let state_repo = ctx.uow.village_states();
            let mut state = state_repo.get_or_default(home.id).await?;
            state.resources = state.resources.clone() + movement.payload.resources.clone();
            state_repo.save(&state).await?;
        }

        info!(
            units = movement.payload.total_units(),
            resources = movement.payload.resources.total(),
            "Army back home."
        );
        Ok(None)
    }
}
