use chrono::{DateTime, Utc};
use uuid::Uuid;

use rallypoint_game::models::movement::Movement;
use rallypoint_types::errors::ApplicationError;

#[async_trait::async_trait]
pub trait MovementRepository: Send + Sync {
    async fn add(&self, movement: &Movement) -> Result<(), ApplicationError>;

    async fn get_by_id(&self, movement_id: Uuid) -> Result<Movement, ApplicationError>;

    /// En-route movements arrived at or before `now`.
    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Movement>, ApplicationError>;

    async fn list_by_account(&self, account_id: Uuid) -> Result<Vec<Movement>, ApplicationError>;

    async fn save(&self, movement: &Movement) -> Result<(), ApplicationError>;
}
