use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use rallypoint_game::{
    battle::CombatResolver,
    catalog::UnitCatalog,
    models::{
        idempotency::{IdempotencyRecord, MissionDispatch},
        movement::{Movement, resolution_order},
    },
    night::NightPolicy,
};
use rallypoint_types::{
    battle::BattleReport,
    errors::{ApplicationError, ConflictError},
};

use crate::{
    arrival_registry::AppArrivalRegistry,
    arrivals::handler::{ArrivalContext, ArrivalRegistry},
    clock::Clock,
    command_handlers::{
        CancelMovementCommandHandler, RecallReinforcementsCommandHandler,
        SendMissionCommandHandler, SendWaveGroupCommandHandler,
    },
    config::Config,
    cqrs::{
        Command, CommandContext, CommandHandler,
        commands::{CancelMovement, RecallReinforcements, SendMission, SendWaveGroup},
    },
    uow::UnitOfWorkProvider,
};

/// A movement processed by `resolve_due_movements`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMovement {
    pub movement: Movement,
    pub report: Option<BattleReport>,
}

/// RallyPointEngine
/// This struct is the central entry point for troop movements.
/// Its primary roles are:
/// 1. Managing Unit of Work (transaction) lifecycles.
/// 2. Recording the idempotency ledger of every command.
/// 3. Dispatching commands and arrivals to their respective handlers.
pub struct RallyPointEngine {
    config: Arc<Config>,
    uow_provider: Arc<dyn UnitOfWorkProvider>,
    catalog: Arc<dyn UnitCatalog>,
    resolver: Arc<dyn CombatResolver>,
    night_policy: Arc<dyn NightPolicy>,
    clock: Arc<dyn Clock>,
    registry: Arc<dyn ArrivalRegistry>,
}

impl RallyPointEngine {
    pub fn new(
        config: Arc<Config>,
        uow_provider: Arc<dyn UnitOfWorkProvider>,
        catalog: Arc<dyn UnitCatalog>,
        resolver: Arc<dyn CombatResolver>,
        night_policy: Arc<dyn NightPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            uow_provider,
            catalog,
            resolver,
            night_policy,
            clock,
            registry: Arc::new(AppArrivalRegistry::new()),
        }
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub async fn send_mission(&self, cmd: SendMission) -> Result<MissionDispatch, ApplicationError> {
        self.execute(cmd, SendMissionCommandHandler::new()).await
    }

    pub async fn send_wave_group(
        &self,
        cmd: SendWaveGroup,
    ) -> Result<Vec<MissionDispatch>, ApplicationError> {
        self.execute(cmd, SendWaveGroupCommandHandler::new()).await
    }

    /// Returns whether the movement was cancelled. Late or foreign
    /// cancellations are refused with `false`.
    pub async fn cancel_movement(&self, cmd: CancelMovement) -> Result<bool, ApplicationError> {
        self.execute(cmd, CancelMovementCommandHandler::new()).await
    }

    pub async fn recall_reinforcements(
        &self,
        cmd: RecallReinforcements,
    ) -> Result<Movement, ApplicationError> {
        self.execute(cmd, RecallReinforcementsCommandHandler::new())
            .await
    }

    /// Executes a command.
    /// This method manages the transaction:
    /// - It begins a Unit of Work.
    /// - A replay of an already recorded request returns its recorded outcome.
    /// - It passes the UoW to the handler.
    /// - If the handler succeeds, it records the outcome and commits the UoW.
    /// - If the handler fails, it rolls back the UoW.
    pub async fn execute<C, H>(&self, cmd: C, handler: H) -> Result<C::Output, ApplicationError>
    where
        C: Command,
        H: CommandHandler<C>,
    {
        let key = cmd.idempotency_key().to_string();
        let fingerprint = serde_json::to_string(&cmd)?;
        let uow = self.uow_provider.tx().await?;

        let recorded = match uow.idempotency().get(&key).await {
            Ok(recorded) => recorded,
            Err(e) => {
                uow.rollback().await?;
                return Err(e);
            }
        };
        if let Some(record) = recorded {
            uow.rollback().await?;
            let reused = || ConflictError::IdempotencyKeyReused {
                key: key.clone(),
                operation: C::OPERATION.to_string(),
            };
            if !record.matches(C::OPERATION, &fingerprint) {
                return Err(reused().into());
            }
            debug!(key = %key, operation = C::OPERATION, "Replaying recorded outcome.");
            return C::from_outcome(record.outcome).ok_or_else(|| reused().into());
        }

        let ctx = CommandContext {
            config: self.config.clone(),
            catalog: self.catalog.clone(),
            now: self.clock.now(),
        };

        let output = match handler.handle(cmd, &uow, &ctx).await {
            Ok(output) => output,
            Err(e) => {
                uow.rollback().await?; // Rollback on failure
                return Err(e);
            }
        };

        let record = IdempotencyRecord::new(
            key,
            C::OPERATION,
            fingerprint,
            C::to_outcome(&output),
            ctx.now,
        );
        if let Err(e) = uow.idempotency().save(&record).await {
            uow.rollback().await?;
            return Err(e);
        }
        uow.commit().await?; // Commit on success
        Ok(output)
    }

    /// Lists the movements sent by an account. Read only.
    pub async fn movements_of(&self, account_id: Uuid) -> Result<Vec<Movement>, ApplicationError> {
        let uow = self.uow_provider.tx().await?;
        let result = uow.movements().list_by_account(account_id).await;
        // Always rollback a query, as it should never write data.
        uow.rollback().await?;
        result
    }

    /// Resolves every en-route movement arrived at or before `now` (the
    /// engine clock if omitted), one transaction per movement.
    ///
    /// Movements created during the pass (e.g. returning survivors) that are
    /// already due are resolved in the same pass. A movement that fails is
    /// rolled back, logged and left en route for the next call.
    #[instrument(skip_all)]
    pub async fn resolve_due_movements(
        &self,
        now: Option<DateTime<Utc>>,
    ) -> Result<Vec<ResolvedMovement>, ApplicationError> {
        let now = now.unwrap_or_else(|| self.clock.now());
        let mut attempted: HashSet<Uuid> = HashSet::new();
        let mut resolved = vec![];

        loop {
            let due = self.list_due(now).await?;
            let Some(next) = due
                .iter()
                .filter(|m| !attempted.contains(&m.id))
                .min_by(|a, b| resolution_order(a, b))
            else {
                break;
            };
            attempted.insert(next.id);

            match self.resolve_movement(next.id, now).await {
                Ok(Some(outcome)) => resolved.push(outcome),
                Ok(None) => debug!(movement_id = %next.id, "Movement no longer due, skipped."),
                Err(e) => warn!(
                    movement_id = %next.id,
                    error = %e,
                    "Movement resolution failed, will retry."
                ),
            }
        }

        if !resolved.is_empty() {
            info!(count = resolved.len(), %now, "Due movements resolved.");
        }
        Ok(resolved)
    }

    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Movement>, ApplicationError> {
        let uow = self.uow_provider.tx().await?;
        let due = uow.movements().list_due(now).await;
        uow.rollback().await?;
        due
    }

    async fn resolve_movement(
        &self,
        movement_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ResolvedMovement>, ApplicationError> {
        let ctx = ArrivalContext {
            uow: self.uow_provider.tx().await?,
            config: self.config.clone(),
            catalog: self.catalog.clone(),
            resolver: self.resolver.clone(),
            night_policy: self.night_policy.clone(),
        };

        let result = self.apply_arrival(&ctx, movement_id, now).await;
        match result {
            Ok(Some(outcome)) => {
                ctx.uow.commit().await?;
                Ok(Some(outcome))
            }
            Ok(None) => {
                ctx.uow.rollback().await?;
                Ok(None)
            }
            Err(e) => {
                ctx.uow.rollback().await?;
                Err(e)
            }
        }
    }

    async fn apply_arrival(
        &self,
        ctx: &ArrivalContext<'_>,
        movement_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ResolvedMovement>, ApplicationError> {
        // Re-read inside the transaction: it may have been resolved or cancelled meanwhile
        let mut movement = ctx.uow.movements().get_by_id(movement_id).await?;
        if !movement.is_due(now) {
            return Ok(None);
        }

        let handler = self.registry.get_handler(movement.kind);
        let report = handler.handle(ctx, &movement).await?;

        movement.resolve(report.clone(), movement.arrive_at)?;
        ctx.uow.movements().save(&movement).await?;

        info!(
            movement_id = %movement.id,
            kind = %movement.kind,
            arrive_at = %movement.arrive_at,
            "Movement resolved."
        );
        Ok(Some(ResolvedMovement { movement, report }))
    }
}
