use uuid::Uuid;

use rallypoint_game::models::garrison::GarrisonStack;
use rallypoint_types::{
    army::{TechLevels, UnitTypeId},
    errors::{ApplicationError, ValidationError},
};

#[async_trait::async_trait]
pub trait GarrisonRepository: Send + Sync {
    async fn get(
        &self,
        village_id: u32,
        account_id: Uuid,
        unit: &UnitTypeId,
    ) -> Result<Option<GarrisonStack>, ApplicationError>;

    /// All stacks at a village, whoever owns them.
    async fn list_by_village(&self, village_id: u32) -> Result<Vec<GarrisonStack>, ApplicationError>;

    async fn save(&self, stack: &GarrisonStack) -> Result<(), ApplicationError>;

    /// Debits a stack, failing without changes if it holds fewer units.
    async fn withdraw(
        &self,
        village_id: u32,
        account_id: Uuid,
        unit: &UnitTypeId,
        quantity: u32,
    ) -> Result<GarrisonStack, ApplicationError> {
        let Some(mut stack) = self.get(village_id, account_id, unit).await? else {
            return Err(ValidationError::InsufficientTroops {
                unit: unit.clone(),
                requested: quantity,
                available: 0,
            }
            .into());
        };
        stack.withdraw(quantity)?;
        self.save(&stack).await?;
        Ok(stack)
    }

    /// Credits a stack, creating it when missing.
    async fn deposit(
        &self,
        village_id: u32,
        account_id: Uuid,
        unit: &UnitTypeId,
        quantity: u32,
        tech: Option<TechLevels>,
    ) -> Result<GarrisonStack, ApplicationError> {
        let mut stack = match self.get(village_id, account_id, unit).await? {
            Some(stack) => stack,
            None => GarrisonStack::new(village_id, account_id, unit.clone(), 0, tech),
        };
        stack.deposit(quantity);
        self.save(&stack).await?;
        Ok(stack)
    }
}
