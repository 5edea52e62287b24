use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup(pub u32, pub u32, pub u32, pub u32);

impl ResourceGroup {
    pub const fn new(lumber: u32, clay: u32, iron: u32, crop: u32) -> Self {
        Self(lumber, clay, iron, crop)
    }

    pub fn total(&self) -> u32 {
        self.0
            .saturating_add(self.1)
            .saturating_add(self.2)
            .saturating_add(self.3)
    }

    pub fn lumber(&self) -> u32 {
        self.0
    }
    pub fn clay(&self) -> u32 {
        self.1
    }
    pub fn iron(&self) -> u32 {
        self.2
    }
    pub fn crop(&self) -> u32 {
        self.3
    }

    /// Subtracts the same amount from every resource, flooring at zero.
    pub fn saturating_sub_each(&self, amount: u32) -> Self {
        Self(
            self.0.saturating_sub(amount),
            self.1.saturating_sub(amount),
            self.2.saturating_sub(amount),
            self.3.saturating_sub(amount),
        )
    }

    pub fn saturating_sub(&self, other: &ResourceGroup) -> Self {
        Self(
            self.0.saturating_sub(other.0),
            self.1.saturating_sub(other.1),
            self.2.saturating_sub(other.2),
            self.3.saturating_sub(other.3),
        )
    }
}

impl core::ops::Add for ResourceGroup {
    type Output = ResourceGroup;

    fn add(self, rhs: ResourceGroup) -> Self::Output {
        ResourceGroup(
            self.0 + rhs.0,
            self.1 + rhs.1,
            self.2 + rhs.2,
            self.3 + rhs.3,
        )
    }
}

impl core::ops::Mul<f64> for ResourceGroup {
    type Output = ResourceGroup;

    fn mul(self, rhs: f64) -> Self::Output {
        let wood = (self.0 as f64 * rhs).floor() as u32;
        let clay = (self.1 as f64 * rhs).floor() as u32;
        let iron = (self.2 as f64 * rhs).floor() as u32;
        let crop = (self.3 as f64 * rhs).floor() as u32;
        ResourceGroup(wood, clay, iron, crop)
    }
}
