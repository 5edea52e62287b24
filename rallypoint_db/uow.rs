use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use rallypoint_app::{
    repository::*,
    uow::{UnitOfWork, UnitOfWorkProvider},
};
use rallypoint_types::errors::ApplicationError;

use crate::{repository::*, world::WorldState};

/// Keeps the whole world in memory.
///
/// A transaction holds the world lock from `tx()` until commit, rollback or
/// drop, so transactions run one at a time. Writes go to a private copy that
/// replaces the world on commit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUnitOfWorkProvider {
    world: Arc<Mutex<WorldState>>,
}

impl InMemoryUnitOfWorkProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_world(world: WorldState) -> Self {
        Self {
            world: Arc::new(Mutex::new(world)),
        }
    }

    /// A copy of the committed world.
    pub async fn snapshot(&self) -> WorldState {
        self.world.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl UnitOfWorkProvider for InMemoryUnitOfWorkProvider {
    async fn tx<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
        let guard = self.world.clone().lock_owned().await;
        let working = Arc::new(Mutex::new((*guard).clone()));

        Ok(Box::new(InMemoryUnitOfWork { guard, working }))
    }
}

pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<WorldState>,
    working: Arc<Mutex<WorldState>>,
}

#[async_trait::async_trait]
impl<'a> UnitOfWork<'a> for InMemoryUnitOfWork {
    fn villages(&self) -> Arc<dyn VillageRepository + 'a> {
        Arc::new(InMemoryVillageRepository::new(self.working.clone()))
    }

    fn rally_points(&self) -> Arc<dyn RallyPointRepository + 'a> {
        Arc::new(InMemoryRallyPointRepository::new(self.working.clone()))
    }

    fn garrisons(&self) -> Arc<dyn GarrisonRepository + 'a> {
        Arc::new(InMemoryGarrisonRepository::new(self.working.clone()))
    }

    fn movements(&self) -> Arc<dyn MovementRepository + 'a> {
        Arc::new(InMemoryMovementRepository::new(self.working.clone()))
    }

    fn idempotency(&self) -> Arc<dyn IdempotencyRepository + 'a> {
        Arc::new(InMemoryIdempotencyRepository::new(self.working.clone()))
    }

    fn village_states(&self) -> Arc<dyn VillageStateRepository + 'a> {
        Arc::new(InMemoryVillageStateRepository::new(self.working.clone()))
    }

    async fn commit(self: Box<Self>) -> Result<(), ApplicationError> {
        let InMemoryUnitOfWork { mut guard, working } = *self;
        // Repositories handed out may still hold the working copy
        let committed = std::mem::take(&mut *working.lock().await);
        *guard = committed;
        debug!("Transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), ApplicationError> {
        // Dropping the guard releases the world untouched
        Ok(())
    }
}
