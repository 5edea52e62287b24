use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rallypoint_types::{
    army::{TechLevels, UnitTypeId},
    errors::ValidationError,
};

/// Units of one type held by one account at one village.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarrisonStack {
    pub village_id: u32,
    pub account_id: Uuid,
    pub unit: UnitTypeId,
    count: u32,
    pub tech: Option<TechLevels>,
}

impl GarrisonStack {
    pub fn new(
        village_id: u32,
        account_id: Uuid,
        unit: UnitTypeId,
        count: u32,
        tech: Option<TechLevels>,
    ) -> Self {
        Self {
            village_id,
            account_id,
            unit,
            count,
            tech,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn tech_levels(&self) -> TechLevels {
        self.tech.unwrap_or_default()
    }

    /// Removes units from the stack, failing if not enough are present.
    pub fn withdraw(&mut self, quantity: u32) -> Result<(), ValidationError> {
        if quantity > self.count {
            return Err(ValidationError::InsufficientTroops {
                unit: self.unit.clone(),
                requested: quantity,
                available: self.count,
            });
        }
        self.count -= quantity;
        Ok(())
    }

    pub fn deposit(&mut self, quantity: u32) {
        self.count += quantity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(count: u32) -> GarrisonStack {
        GarrisonStack::new(1, Uuid::new_v4(), UnitTypeId::new("maceman"), count, None)
    }

    #[test]
    fn test_withdraw_and_deposit() {
        let mut s = stack(10);
        s.withdraw(4).unwrap();
        assert_eq!(s.count(), 6);
        s.deposit(4);
        assert_eq!(s.count(), 10);
    }

    #[test]
    fn test_withdraw_more_than_available_leaves_stack_untouched() {
        let mut s = stack(3);
        let err = s.withdraw(5).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InsufficientTroops {
                requested: 5,
                available: 3,
                ..
            }
        ));
        assert_eq!(s.count(), 3);
    }
}
