use chrono::Duration;
use tracing::{info, instrument};

use rallypoint_types::errors::{ApplicationError, StateError};
use rallypoint_types::mission::MissionKind;

use crate::{
    cqrs::{CommandContext, CommandHandler, commands::CancelMovement},
    uow::UnitOfWork,
};

pub struct CancelMovementCommandHandler {}

impl Default for CancelMovementCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelMovementCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<CancelMovement> for CancelMovementCommandHandler {
    #[instrument(skip_all, fields(
        movement_id = %command.movement_id,
        account_id = %command.account_id,
    ))]
    async fn handle(
        &self,
        command: CancelMovement,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &CommandContext,
    ) -> Result<bool, ApplicationError> {
        let movement_repo = uow.movements();
        let mut movement = movement_repo.get_by_id(command.movement_id).await?;

        if movement.account_id != command.account_id {
            info!("Cancellation refused, movement owned by another account.");
            return Ok(false);
        }
        if movement.kind == MissionKind::Return {
            return Err(StateError::NotCancellable {
                id: movement.id,
                kind: movement.kind,
            }
            .into());
        }

        let grace = Duration::seconds(ctx.config.cancel_grace_secs);
        if !movement.can_be_cancelled_by(command.account_id, ctx.now, grace) {
            info!(status = %movement.status(), "Cancellation refused, grace period over or not en route.");
            return Ok(false);
        }

        movement.cancel(ctx.now)?;
        movement_repo.save(&movement).await?;

        let garrisons = uow.garrisons();
        for (unit, quantity) in movement.payload.units.iter() {
            garrisons
                .deposit(
                    movement.source_village_id,
                    movement.account_id,
                    unit,
                    *quantity,
                    Some(movement.payload.tech_for(unit)),
                )
                .await?;
        }

        info!(
            source_village_id = movement.source_village_id,
            units = movement.payload.total_units(),
            "Movement cancelled, troops back home."
        );
        Ok(true)
    }
}
