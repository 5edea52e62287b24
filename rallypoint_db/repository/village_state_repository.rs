use std::sync::Arc;
use tokio::sync::Mutex;

use rallypoint_app::repository::VillageStateRepository;
use rallypoint_game::models::village_state::VillageState;
use rallypoint_types::errors::ApplicationError;

use crate::world::WorldState;

#[derive(Clone)]
pub struct InMemoryVillageStateRepository {
    world: Arc<Mutex<WorldState>>,
}

impl InMemoryVillageStateRepository {
    pub fn new(world: Arc<Mutex<WorldState>>) -> Self {
        Self { world }
    }
}

#[async_trait::async_trait]
impl VillageStateRepository for InMemoryVillageStateRepository {
    async fn get_or_default(&self, village_id: u32) -> Result<VillageState, ApplicationError> {
        let world = self.world.lock().await;
        Ok(world
            .village_states
            .get(&village_id)
            .cloned()
            .unwrap_or_else(|| VillageState::new(village_id)))
    }

    async fn save(&self, state: &VillageState) -> Result<(), ApplicationError> {
        let mut world = self.world.lock().await;
        world.village_states.insert(state.village_id, state.clone());
        Ok(())
    }
}
