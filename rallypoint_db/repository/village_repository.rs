use std::sync::Arc;
use tokio::sync::Mutex;

use rallypoint_app::repository::VillageRepository;
use rallypoint_game::models::village::Village;
use rallypoint_types::{
    errors::{ApplicationError, NotFoundError},
    map::Position,
};

use crate::world::WorldState;

/// Implements VillageRepository over a transaction's working copy.
#[derive(Clone)]
pub struct InMemoryVillageRepository {
    world: Arc<Mutex<WorldState>>,
}

impl InMemoryVillageRepository {
    pub fn new(world: Arc<Mutex<WorldState>>) -> Self {
        Self { world }
    }
}

#[async_trait::async_trait]
impl VillageRepository for InMemoryVillageRepository {
    async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError> {
        let world = self.world.lock().await;
        world
            .villages
            .get(&village_id)
            .cloned()
            .ok_or_else(|| NotFoundError::Village(village_id).into())
    }

    async fn get_by_position(&self, position: Position) -> Result<Option<Village>, ApplicationError> {
        let world = self.world.lock().await;
        Ok(world
            .villages
            .values()
            .find(|v| v.position == position)
            .cloned())
    }

    async fn save(&self, village: &Village) -> Result<(), ApplicationError> {
        let mut world = self.world.lock().await;
        world.villages.insert(village.id, village.clone());
        Ok(())
    }
}
