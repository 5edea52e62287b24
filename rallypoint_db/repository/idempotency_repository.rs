use std::sync::Arc;
use tokio::sync::Mutex;

use rallypoint_app::repository::IdempotencyRepository;
use rallypoint_game::models::idempotency::IdempotencyRecord;
use rallypoint_types::errors::ApplicationError;

use crate::world::WorldState;

#[derive(Clone)]
pub struct InMemoryIdempotencyRepository {
    world: Arc<Mutex<WorldState>>,
}

impl InMemoryIdempotencyRepository {
    pub fn new(world: Arc<Mutex<WorldState>>) -> Self {
        Self { world }
    }
}

#[async_trait::async_trait]
impl IdempotencyRepository for InMemoryIdempotencyRepository {
    async fn get(&self, key: &str) -> Result<Option<IdempotencyRecord>, ApplicationError> {
        let world = self.world.lock().await;
        Ok(world.idempotency.get(key).cloned())
    }

    async fn save(&self, record: &IdempotencyRecord) -> Result<(), ApplicationError> {
        let mut world = self.world.lock().await;
        world.idempotency.insert(record.key.clone(), record.clone());
        Ok(())
    }
}
