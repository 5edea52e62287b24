use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use rallypoint_app::repository::GarrisonRepository;
use rallypoint_game::models::garrison::GarrisonStack;
use rallypoint_types::{army::UnitTypeId, errors::ApplicationError};

use crate::world::WorldState;

/// Garrison stacks keyed by village, account and unit type.
#[derive(Clone)]
pub struct InMemoryGarrisonRepository {
    world: Arc<Mutex<WorldState>>,
}

impl InMemoryGarrisonRepository {
    pub fn new(world: Arc<Mutex<WorldState>>) -> Self {
        Self { world }
    }
}

#[async_trait::async_trait]
impl GarrisonRepository for InMemoryGarrisonRepository {
    async fn get(
        &self,
        village_id: u32,
        account_id: Uuid,
        unit: &UnitTypeId,
    ) -> Result<Option<GarrisonStack>, ApplicationError> {
        let world = self.world.lock().await;
        Ok(world
            .garrisons
            .get(&(village_id, account_id, unit.clone()))
            .cloned())
    }

    async fn list_by_village(&self, village_id: u32) -> Result<Vec<GarrisonStack>, ApplicationError> {
        let world = self.world.lock().await;
        let mut stacks: Vec<GarrisonStack> = world
            .garrisons
            .values()
            .filter(|s| s.village_id == village_id)
            .cloned()
            .collect();
        stacks.sort_by(|a, b| {
            a.account_id
                .cmp(&b.account_id)
                .then_with(|| a.unit.cmp(&b.unit))
        });
        Ok(stacks)
    }

    async fn save(&self, stack: &GarrisonStack) -> Result<(), ApplicationError> {
        let mut world = self.world.lock().await;
        world.garrisons.insert(
            (stack.village_id, stack.account_id, stack.unit.clone()),
            stack.clone(),
        );
        Ok(())
    }
}
