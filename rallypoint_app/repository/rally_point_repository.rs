use rallypoint_game::models::rally_point::RallyPoint;
use rallypoint_types::errors::ApplicationError;

#[async_trait::async_trait]
pub trait RallyPointRepository: Send + Sync {
    async fn get_by_village_id(&self, village_id: u32) -> Result<RallyPoint, ApplicationError>;
    async fn save(&self, rally_point: &RallyPoint) -> Result<(), ApplicationError>;
}
