use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use rallypoint_game::{catalog::UnitCatalog, models::idempotency::IdempotentOutcome};
use rallypoint_types::errors::ApplicationError;

use crate::{config::Config, uow::UnitOfWork};

/// Commands are operations that change the state of the system.
///
/// Every command carries an idempotency key: its outcome is recorded together
/// with a fingerprint of the request, and replays return that outcome.
pub trait Command: Serialize + Send + Sync {
    /// The data type returned to the caller.
    type Output: Send;

    /// Operation name stored in the idempotency ledger.
    const OPERATION: &'static str;

    fn idempotency_key(&self) -> &str;

    fn to_outcome(output: &Self::Output) -> IdempotentOutcome;

    /// Rebuilds the output of a replayed request, `None` if the record holds
    /// the outcome of another operation.
    fn from_outcome(outcome: IdempotentOutcome) -> Option<Self::Output>;
}

/// Dependencies and the frozen "now" shared by command handlers.
pub struct CommandContext {
    pub config: Arc<Config>,
    pub catalog: Arc<dyn UnitCatalog>,
    pub now: DateTime<Utc>,
}

/// A trait for handlers that execute Commands.
/// It receives the command and a Unit of Work (&Box<dyn UnitOfWork...>) to use.
/// It should NOT manage the transaction lifecycle (commit/rollback);
/// that is the job of the engine.
#[async_trait]
pub trait CommandHandler<C: Command> {
    async fn handle(
        &self,
        cmd: C,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        ctx: &CommandContext,
    ) -> Result<C::Output, ApplicationError>;
}
