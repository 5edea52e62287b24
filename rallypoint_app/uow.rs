use std::sync::Arc;

use rallypoint_types::errors::ApplicationError;

use crate::repository::*;

/// A Unit of Work (UoW) works as a provider for repositories
/// that all operate within a single transaction.
#[async_trait::async_trait]
pub trait UnitOfWork<'a>: Send + Sync {
    fn villages(&self) -> Arc<dyn VillageRepository + 'a>;
    fn rally_points(&self) -> Arc<dyn RallyPointRepository + 'a>;
    fn garrisons(&self) -> Arc<dyn GarrisonRepository + 'a>;
    fn movements(&self) -> Arc<dyn MovementRepository + 'a>;
    fn idempotency(&self) -> Arc<dyn IdempotencyRepository + 'a>;
    fn village_states(&self) -> Arc<dyn VillageStateRepository + 'a>;

    // Consume self to ensure the UoW is not used after commit/rollback
    async fn commit(self: Box<Self>) -> Result<(), ApplicationError>;
    async fn rollback(self: Box<Self>) -> Result<(), ApplicationError>;
}

/// A factory for creating Unit of Work instances.
#[async_trait::async_trait]
pub trait UnitOfWorkProvider: Send + Sync {
    /// Begin a new Unit of Work (transaction).
    async fn tx<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError>;
}
