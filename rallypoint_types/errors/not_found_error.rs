use thiserror::Error;
use uuid::Uuid;

use crate::map::Position;

#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("Village with ID {0} not found")]
    Village(u32),

    #[error("Village at {0} not found")]
    VillageAt(Position),

    #[error("Rally point of village {0} not found")]
    RallyPoint(u32),

    #[error("Movement with ID {0} not found")]
    Movement(Uuid),
}
