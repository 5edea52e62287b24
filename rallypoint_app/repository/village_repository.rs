use rallypoint_game::models::village::Village;
use rallypoint_types::{errors::ApplicationError, map::Position};

#[async_trait::async_trait]
pub trait VillageRepository: Send + Sync {
    /// Returns the village or a not-found error.
    async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError>;

    /// Returns the village standing on a tile, if any.
    async fn get_by_position(&self, position: Position) -> Result<Option<Village>, ApplicationError>;

    async fn save(&self, village: &Village) -> Result<(), ApplicationError>;
}
