use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rallypoint_types::{map::Position, tribe::Tribe};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Village {
    pub id: u32,
    pub name: String,
    pub account_id: Uuid,
    pub position: Position,
    pub tribe: Tribe,
    pub beginner_protection: bool,
}

impl Village {
    pub fn new(
        id: u32,
        name: String,
        account_id: Uuid,
        position: Position,
        tribe: Tribe,
        beginner_protection: bool,
    ) -> Self {
        Self {
            id,
            name,
            account_id,
            position,
            tribe,
            beginner_protection,
        }
    }

    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.account_id == account_id
    }

    pub fn is_protected(&self) -> bool {
        self.beginner_protection
    }
}
