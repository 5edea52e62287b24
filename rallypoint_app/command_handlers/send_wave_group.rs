use chrono::Duration;
use tracing::{info, instrument};

use rallypoint_game::models::{
    idempotency::{IdempotencyRecord, IdempotentOutcome, MissionDispatch},
    movement::WaveMembership,
};
use rallypoint_types::errors::{ApplicationError, ConflictError, ValidationError};

use crate::{
    command_handlers::helpers::{MissionOrder, prepare_mission, reserve_mission},
    cqrs::{CommandContext, CommandHandler, commands::SendWaveGroup},
    uow::UnitOfWork,
};

const WAVE_MEMBER_OPERATION: &str = "send_wave_member";

fn member_key(wave_key: &str, index: usize) -> String {
    format!("{}#{}", wave_key, index)
}

pub struct SendWaveGroupCommandHandler {}

impl Default for SendWaveGroupCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SendWaveGroupCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<SendWaveGroup> for SendWaveGroupCommandHandler {
    #[instrument(skip_all, fields(
        tag = %command.tag,
        account_id = %command.account_id,
        members = command.members.len(),
        arrive_at = %command.arrive_at,
    ))]
    async fn handle(
        &self,
        command: SendWaveGroup,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &CommandContext,
    ) -> Result<Vec<MissionDispatch>, ApplicationError> {
        if command.members.is_empty() {
            return Err(ValidationError::EmptyWave.into());
        }

        let mut prepared_members = Vec::with_capacity(command.members.len());
        for member in command.members.iter() {
            let prepared = prepare_mission(
                uow,
                ctx,
                MissionOrder {
                    account_id: command.account_id,
                    source_village_id: member.source_village_id,
                    kind: member.kind,
                    target: &member.target,
                    units: &member.units,
                    catapult_targets: &member.catapult_targets,
                },
            )
            .await?;
            prepared_members.push(prepared);
        }

        // Members land at the shared instant, or up to the tightest window
        // later when they can't leave early enough.
        let window_millis = prepared_members
            .iter()
            .map(|p| p.rally_point.wave_window_ms)
            .min()
            .unwrap_or(0);
        let tolerance = Duration::milliseconds(window_millis as i64);

        let mut departures = Vec::with_capacity(prepared_members.len());
        for (index, prepared) in prepared_members.iter().enumerate() {
            let depart_at = (command.arrive_at - prepared.travel_time).max(ctx.now);
            let delay = depart_at + prepared.travel_time - command.arrive_at;
            if delay > tolerance {
                return Err(ValidationError::WaveArrivalUnreachable {
                    index,
                    travel_millis: prepared.travel_time.num_milliseconds(),
                }
                .into());
            }
            departures.push(depart_at);
        }

        // Member keys share the ledger with every other command's key.
        let member_keys: Vec<String> = (0..prepared_members.len())
            .map(|index| member_key(&command.idempotency_key, index))
            .collect();
        for key in member_keys.iter() {
            if uow.idempotency().get(key).await?.is_some() {
                return Err(ConflictError::IdempotencyKeyReused {
                    key: key.clone(),
                    operation: WAVE_MEMBER_OPERATION.to_string(),
                }
                .into());
            }
        }

        let mut dispatches = Vec::with_capacity(prepared_members.len());
        for (index, ((prepared, depart_at), key)) in prepared_members
            .into_iter()
            .zip(departures)
            .zip(member_keys)
            .enumerate()
        {
            let movement = reserve_mission(
                uow,
                &prepared,
                depart_at,
                ctx.now,
                key.clone(),
                Some(WaveMembership {
                    tag: command.tag.clone(),
                    index: index as u32,
                }),
            )
            .await?;

            info!(
                movement_id = %movement.id,
                wave_index = index,
                depart_at = %movement.depart_at,
                "Wave member planned."
            );
            let dispatch = MissionDispatch {
                movement,
                warnings: prepared.warnings,
            };
            uow.idempotency()
                .save(&IdempotencyRecord::new(
                    key,
                    WAVE_MEMBER_OPERATION,
                    serde_json::to_string(&command.members[index])?,
                    IdempotentOutcome::Dispatched(dispatch.clone()),
                    ctx.now,
                ))
                .await?;
            dispatches.push(dispatch);
        }

        Ok(dispatches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        command_handlers::{helpers::travel_time, tests::TestWorld},
        cqrs::commands::{MissionTarget, WaveMember},
    };
    use rallypoint_game::models::rally_point::RallyPoint;
    use rallypoint_game::test_utils::troops;
    use rallypoint_types::mission::MissionKind;

    fn member(world: &TestWorld, units: &[(&str, u32)]) -> WaveMember {
        WaveMember {
            source_village_id: world.source.id,
            kind: MissionKind::Attack,
            target: MissionTarget::Village(world.target.id),
            units: troops(units),
            catapult_targets: vec![],
        }
    }

    fn wave(world: &TestWorld, members: Vec<WaveMember>) -> SendWaveGroup {
        SendWaveGroup {
            idempotency_key: "wave-1".to_string(),
            account_id: world.account_id,
            tag: "dawn".to_string(),
            arrive_at: world.ctx.now + Duration::hours(2),
            members,
        }
    }

    #[tokio::test]
    async fn test_wave_members_land_together() {
        let world = TestWorld::new().await;
        let cmd = wave(
            &world,
            vec![
                member(&world, &[("maceman", 40)]),
                member(&world, &[("maceman", 40), ("teuton_ram", 5)]),
            ],
        );
        let arrive_at = cmd.arrive_at;

        let dispatches = SendWaveGroupCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await
            .unwrap();

        assert_eq!(dispatches.len(), 2);
        let first = &dispatches[0].movement;
        let second = &dispatches[1].movement;
        assert_eq!(first.arrive_at, arrive_at);
        assert!((first.arrive_at - second.arrive_at).num_milliseconds().abs() <= 50);
        // Rams are slower, so the second member leaves earlier
        assert!(second.depart_at < first.depart_at);
        assert_eq!(first.idempotency_key, "wave-1#0");
        assert_eq!(second.wave.as_ref().map(|w| w.index), Some(1));
        assert_eq!(world.count(world.source.id, "maceman").await, 20);
    }

    #[tokio::test]
    async fn test_wave_is_all_or_nothing() {
        let world = TestWorld::new().await;
        let cmd = wave(
            &world,
            vec![member(&world, &[("maceman", 60)]), member(&world, &[("maceman", 60)])],
        );

        let err = SendWaveGroupCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await;
        assert!(matches!(
            err,
            Err(ApplicationError::Validation(ValidationError::InsufficientTroops { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_wave_instant_is_rejected() {
        let world = TestWorld::new().await;
        let mut cmd = wave(&world, vec![member(&world, &[("maceman", 10)])]);
        cmd.arrive_at = world.ctx.now + Duration::seconds(5);

        let err = SendWaveGroupCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await;
        assert!(matches!(
            err,
            Err(ApplicationError::Validation(ValidationError::WaveArrivalUnreachable { index: 0, .. }))
        ));
        assert!(world.mock.movements.all().is_empty());
    }

    #[tokio::test]
    async fn test_late_member_lands_within_window() {
        let world = TestWorld::new().await;
        let travel = travel_time(
            &world.ctx.config,
            &world.source.position,
            &world.target.position,
            14,
        );
        let mut cmd = wave(&world, vec![member(&world, &[("maceman", 10)])]);
        cmd.arrive_at = world.ctx.now + travel - Duration::milliseconds(400);
        let arrive_at = cmd.arrive_at;

        let dispatches = SendWaveGroupCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await
            .unwrap();

        let movement = &dispatches[0].movement;
        assert_eq!(movement.depart_at, world.ctx.now);
        assert_eq!(movement.arrive_at - arrive_at, Duration::milliseconds(400));
    }

    #[tokio::test]
    async fn test_late_member_beyond_window_is_rejected() {
        let world = TestWorld::new().await;
        world
            .uow()
            .rally_points()
            .save(&RallyPoint::new(world.source.id, 1).with_wave_window(50))
            .await
            .unwrap();
        let travel = travel_time(
            &world.ctx.config,
            &world.source.position,
            &world.target.position,
            14,
        );
        let mut cmd = wave(&world, vec![member(&world, &[("maceman", 10)])]);
        cmd.arrive_at = world.ctx.now + travel - Duration::milliseconds(400);

        let err = SendWaveGroupCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await;
        assert!(matches!(
            err,
            Err(ApplicationError::Validation(ValidationError::WaveArrivalUnreachable { index: 0, .. }))
        ));
        assert_eq!(world.count(world.source.id, "maceman").await, 100);
    }

    #[tokio::test]
    async fn test_member_keys_are_recorded_in_the_ledger() {
        let world = TestWorld::new().await;
        let cmd = wave(&world, vec![member(&world, &[("maceman", 10)])]);

        SendWaveGroupCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await
            .unwrap();

        let record = world.uow().idempotency().get("wave-1#0").await.unwrap().unwrap();
        assert_eq!(record.operation, WAVE_MEMBER_OPERATION);
        assert!(!record.matches("send_mission", &record.fingerprint));
    }

    #[tokio::test]
    async fn test_taken_member_key_rejects_the_wave() {
        let world = TestWorld::new().await;
        world
            .uow()
            .idempotency()
            .save(&IdempotencyRecord::new(
                "wave-1#1".to_string(),
                "send_mission",
                "{}".to_string(),
                IdempotentOutcome::Cancelled(false),
                world.ctx.now,
            ))
            .await
            .unwrap();
        let cmd = wave(
            &world,
            vec![member(&world, &[("maceman", 10)]), member(&world, &[("maceman", 10)])],
        );

        let err = SendWaveGroupCommandHandler::new()
            .handle(cmd, &world.uow(), &world.ctx)
            .await;
        assert!(matches!(
            err,
            Err(ApplicationError::Conflict(ConflictError::IdempotencyKeyReused { ref key, .. }))
                if key == "wave-1#1"
        ));
        assert!(world.mock.movements.all().is_empty());
        assert_eq!(world.count(world.source.id, "maceman").await, 100);
    }

    #[tokio::test]
    async fn test_empty_wave_is_rejected() {
        let world = TestWorld::new().await;
        let err = SendWaveGroupCommandHandler::new()
            .handle(wave(&world, vec![]), &world.uow(), &world.ctx)
            .await;
        assert!(matches!(
            err,
            Err(ApplicationError::Validation(ValidationError::EmptyWave))
        ));
    }
}
