use rallypoint_game::models::idempotency::IdempotencyRecord;
use rallypoint_types::errors::ApplicationError;

#[async_trait::async_trait]
pub trait IdempotencyRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<IdempotencyRecord>, ApplicationError>;
    async fn save(&self, record: &IdempotencyRecord) -> Result<(), ApplicationError>;
}
