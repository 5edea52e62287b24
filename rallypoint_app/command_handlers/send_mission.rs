use tracing::{info, instrument, warn};

use rallypoint_game::models::{idempotency::MissionDispatch, movement::MissionWarning};
use rallypoint_types::errors::ApplicationError;

use crate::{
    command_handlers::helpers::{MissionOrder, prepare_mission, reserve_mission},
    cqrs::{CommandContext, CommandHandler, commands::SendMission},
    uow::UnitOfWork,
};

pub struct SendMissionCommandHandler {}

impl Default for SendMissionCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SendMissionCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<SendMission> for SendMissionCommandHandler {
    #[instrument(skip_all, fields(
        kind = %command.kind,
        account_id = %command.account_id,
        source_village_id = command.source_village_id,
    ))]
    async fn handle(
        &self,
        command: SendMission,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &CommandContext,
    ) -> Result<MissionDispatch, ApplicationError> {
        let mut prepared = prepare_mission(
            uow,
            ctx,
            MissionOrder {
                account_id: command.account_id,
                source_village_id: command.source_village_id,
                kind: command.kind,
                target: &command.target,
                units: &command.units,
                catapult_targets: &command.catapult_targets,
            },
        )
        .await?;

        let earliest_arrival = ctx.now + prepared.travel_time;
        let depart_at = match command.preferred_arrival {
            Some(preferred) if preferred > earliest_arrival => preferred - prepared.travel_time,
            Some(preferred) if preferred < earliest_arrival => {
                warn!(%preferred, %earliest_arrival, "Preferred arrival can't be reached.");
                prepared
                    .warnings
                    .push(MissionWarning::PreferredArrivalUnreachable { earliest_arrival });
                ctx.now
            }
            _ => ctx.now,
        };

        let movement = reserve_mission(
            uow,
            &prepared,
            depart_at,
            ctx.now,
            command.idempotency_key.clone(),
            None,
        )
        .await?;

        info!(
            movement_id = %movement.id,
            depart_at = %movement.depart_at,
            arrive_at = %movement.arrive_at,
            "Mission planned."
        );

        Ok(MissionDispatch {
            movement,
            warnings: prepared.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        command_handlers::tests::{TestWorld, send_mission_command},
        cqrs::commands::MissionTarget,
    };
    use chrono::Duration;
    use rallypoint_game::{models::rally_point::RallyPoint, test_utils::troops};
    use rallypoint_types::{
        battle::CatapultTarget,
        errors::{PolicyError, ValidationError},
        mission::MissionKind,
    };
    use uuid::Uuid;

    #[tokio::test]
    async fn test_send_mission_debits_garrison_and_plans_movement() {
        let world = TestWorld::new().await;
        let cmd = send_mission_command(&world, MissionKind::Attack, troops(&[("maceman", 40)]));

        let dispatch = SendMissionCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await
            .unwrap();

        assert!(dispatch.warnings.is_empty());
        assert_eq!(dispatch.movement.kind, MissionKind::Attack);
        assert_eq!(dispatch.movement.depart_at, world.ctx.now);
        assert!(dispatch.movement.arrive_at > world.ctx.now);
        assert_eq!(world.count(world.source.id, "maceman").await, 60);
        assert_eq!(world.mock.movements.all().len(), 1);
    }

    #[tokio::test]
    async fn test_siege_without_rams_or_catapults_is_rejected() {
        let world = TestWorld::new().await;
        let cmd = send_mission_command(&world, MissionKind::Siege, troops(&[("maceman", 10)]));

        let err = SendMissionCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Validation(ValidationError::SiegeUnitsRequired)
        ));
        assert_eq!(err.to_string(), "siege missions require rams or catapults");
        assert!(world.mock.movements.all().is_empty());
        assert_eq!(world.count(world.source.id, "maceman").await, 100);
    }

    #[tokio::test]
    async fn test_protected_target_rejects_hostile_missions_only() {
        let world = TestWorld::new().await;
        world.protect_target().await;

        let cmd = send_mission_command(&world, MissionKind::Raid, troops(&[("maceman", 10)]));
        let err = SendMissionCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Policy(PolicyError::TargetUnderBeginnerProtection { .. })
        ));
        assert_eq!(world.count(world.source.id, "maceman").await, 100);

        let cmd = send_mission_command(&world, MissionKind::Reinforce, troops(&[("maceman", 10)]));
        assert!(
            SendMissionCommandHandler::new()
                .handle(cmd, &world.uow(), &world.ctx)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_catapult_targets_cleared_below_unlock_level() {
        let world = TestWorld::new().await;
        let mut cmd = send_mission_command(
            &world,
            MissionKind::Attack,
            troops(&[("maceman", 10), ("catapult", 5)]),
        );
        cmd.catapult_targets = vec![CatapultTarget::new("warehouse")];

        let dispatch = SendMissionCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await
            .unwrap();

        assert!(dispatch.movement.payload.catapult_targets.is_empty());
        assert_eq!(
            dispatch.warnings,
            vec![MissionWarning::CatapultTargetingLocked { required_level: 10 }]
        );
    }

    #[tokio::test]
    async fn test_preferred_arrival_delays_departure() {
        let world = TestWorld::new().await;
        let mut cmd = send_mission_command(&world, MissionKind::Attack, troops(&[("maceman", 10)]));
        let preferred = world.ctx.now + Duration::hours(10);
        cmd.preferred_arrival = Some(preferred);

        let dispatch = SendMissionCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await
            .unwrap();

        assert_eq!(dispatch.movement.arrive_at, preferred);
        assert!(dispatch.movement.depart_at > world.ctx.now);
        assert!(dispatch.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_preferred_arrival_warns() {
        let world = TestWorld::new().await;
        let mut cmd = send_mission_command(&world, MissionKind::Attack, troops(&[("maceman", 10)]));
        cmd.preferred_arrival = Some(world.ctx.now + Duration::seconds(1));

        let dispatch = SendMissionCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await
            .unwrap();

        assert_eq!(dispatch.movement.depart_at, world.ctx.now);
        assert!(matches!(
            dispatch.warnings.as_slice(),
            [MissionWarning::PreferredArrivalUnreachable { .. }]
        ));
    }

    #[tokio::test]
    async fn test_insufficient_troops_and_bad_requests() {
        let world = TestWorld::new().await;
        let handler = SendMissionCommandHandler::new();

        let cmd = send_mission_command(&world, MissionKind::Attack, troops(&[("maceman", 101)]));
        let err = handler.handle(cmd, &world.uow(), &world.ctx).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Validation(ValidationError::InsufficientTroops {
                requested: 101,
                available: 100,
                ..
            })
        ));

        let cmd = send_mission_command(&world, MissionKind::Return, troops(&[("maceman", 1)]));
        let err = handler.handle(cmd, &world.uow(), &world.ctx).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Validation(ValidationError::InvalidMissionKind(MissionKind::Return))
        ));

        let cmd = send_mission_command(&world, MissionKind::Scout, troops(&[("maceman", 1)]));
        let err = handler.handle(cmd, &world.uow(), &world.ctx).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Validation(ValidationError::OnlyScoutUnitsAllowed)
        ));

        let mut cmd = send_mission_command(&world, MissionKind::Attack, troops(&[("maceman", 1)]));
        cmd.target = MissionTarget::Village(world.source.id);
        let err = handler.handle(cmd, &world.uow(), &world.ctx).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Validation(ValidationError::MalformedTarget(_))
        ));

        let cmd = send_mission_command(&world, MissionKind::Conquest, troops(&[("maceman", 10)]));
        let err = handler.handle(cmd, &world.uow(), &world.ctx).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Validation(ValidationError::ChiefRequired)
        ));

        let mut cmd = send_mission_command(&world, MissionKind::Attack, troops(&[("maceman", 10)]));
        let stranger = Uuid::new_v4();
        cmd.account_id = stranger;
        let err = handler.handle(cmd, &world.uow(), &world.ctx).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Validation(ValidationError::VillageNotOwned { village_id: 1, account_id })
                if account_id == stranger
        ));

        assert!(world.mock.movements.all().is_empty());
        assert_eq!(world.count(world.source.id, "maceman").await, 100);
        assert_eq!(world.count(world.source.id, "chief").await, 2);
    }

    #[tokio::test]
    async fn test_locked_targeting_ignores_target_count() {
        let world = TestWorld::new().await;
        let mut cmd = send_mission_command(
            &world,
            MissionKind::Siege,
            troops(&[("maceman", 10), ("catapult", 5)]),
        );
        cmd.catapult_targets = vec![
            CatapultTarget::new("warehouse"),
            CatapultTarget::new("granary"),
            CatapultTarget::new("barracks"),
        ];

        let dispatch = SendMissionCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await
            .unwrap();

        assert!(dispatch.movement.payload.catapult_targets.is_empty());
        assert_eq!(
            dispatch.warnings,
            vec![MissionWarning::CatapultTargetingLocked { required_level: 10 }]
        );
        assert_eq!(world.count(world.source.id, "catapult").await, 15);
    }

    #[tokio::test]
    async fn test_unlocked_targeting_caps_target_count() {
        let world = TestWorld::new().await;
        world
            .uow()
            .rally_points()
            .save(&RallyPoint::new(world.source.id, 10))
            .await
            .unwrap();
        let mut cmd = send_mission_command(
            &world,
            MissionKind::Siege,
            troops(&[("maceman", 10), ("catapult", 5)]),
        );
        cmd.catapult_targets = vec![
            CatapultTarget::new("warehouse"),
            CatapultTarget::new("granary"),
            CatapultTarget::new("barracks"),
        ];

        let err = SendMissionCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Validation(ValidationError::TooManyCatapultTargets {
                requested: 3,
                max: 2
            })
        ));
        assert!(world.mock.movements.all().is_empty());
        assert_eq!(world.count(world.source.id, "catapult").await, 20);
    }
}
