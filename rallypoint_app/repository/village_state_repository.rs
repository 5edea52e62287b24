use rallypoint_game::models::village_state::VillageState;
use rallypoint_types::errors::ApplicationError;

#[async_trait::async_trait]
pub trait VillageStateRepository: Send + Sync {
    /// Returns the stored state, or a blank one for villages never touched.
    async fn get_or_default(&self, village_id: u32) -> Result<VillageState, ApplicationError>;
    async fn save(&self, state: &VillageState) -> Result<(), ApplicationError>;
}
