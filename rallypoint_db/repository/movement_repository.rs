use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use rallypoint_app::repository::MovementRepository;
use rallypoint_game::models::movement::{Movement, resolution_order};
use rallypoint_types::errors::{ApplicationError, NotFoundError};

use crate::world::WorldState;

#[derive(Clone)]
pub struct InMemoryMovementRepository {
    world: Arc<Mutex<WorldState>>,
}

impl InMemoryMovementRepository {
    pub fn new(world: Arc<Mutex<WorldState>>) -> Self {
        Self { world }
    }
}

#[async_trait::async_trait]
impl MovementRepository for InMemoryMovementRepository {
    async fn add(&self, movement: &Movement) -> Result<(), ApplicationError> {
        let mut world = self.world.lock().await;
        world.movements.insert(movement.id, movement.clone());
        Ok(())
    }

    async fn get_by_id(&self, movement_id: Uuid) -> Result<Movement, ApplicationError> {
        let world = self.world.lock().await;
        world
            .movements
            .get(&movement_id)
            .cloned()
            .ok_or_else(|| NotFoundError::Movement(movement_id).into())
    }

    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Movement>, ApplicationError> {
        let world = self.world.lock().await;
        let mut due: Vec<Movement> = world
            .movements
            .values()
            .filter(|m| m.is_due(now))
            .cloned()
            .collect();
        due.sort_by(resolution_order);
        Ok(due)
    }

    async fn list_by_account(&self, account_id: Uuid) -> Result<Vec<Movement>, ApplicationError> {
        let world = self.world.lock().await;
        let mut movements: Vec<Movement> = world
            .movements
            .values()
            .filter(|m| m.account_id == account_id)
            .cloned()
            .collect();
        movements.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(movements)
    }

    async fn save(&self, movement: &Movement) -> Result<(), ApplicationError> {
        let mut world = self.world.lock().await;
        world.movements.insert(movement.id, movement.clone());
        Ok(())
    }
}
