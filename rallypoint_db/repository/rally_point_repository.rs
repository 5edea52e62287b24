use std::sync::Arc;
use tokio::sync::Mutex;

use rallypoint_app::repository::RallyPointRepository;
use rallypoint_game::models::rally_point::RallyPoint;
use rallypoint_types::errors::{ApplicationError, NotFoundError};

use crate::world::WorldState;

#[derive(Clone)]
pub struct InMemoryRallyPointRepository {
    world: Arc<Mutex<WorldState>>,
}

impl InMemoryRallyPointRepository {
    pub fn new(world: Arc<Mutex<WorldState>>) -> Self {
        Self { world }
    }
}

#[async_trait::async_trait]
impl RallyPointRepository for InMemoryRallyPointRepository {
    async fn get_by_village_id(&self, village_id: u32) -> Result<RallyPoint, ApplicationError> {
        let world = self.world.lock().await;
        world
            .rally_points
            .get(&village_id)
            .cloned()
            .ok_or_else(|| NotFoundError::RallyPoint(village_id).into())
    }

    async fn save(&self, rally_point: &RallyPoint) -> Result<(), ApplicationError> {
        let mut world = self.world.lock().await;
        world
            .rally_points
            .insert(rally_point.village_id, rally_point.clone());
        Ok(())
    }
}
