use thiserror::Error;
use uuid::Uuid;

use crate::mission::{MissionKind, MovementStatus};

/// Errors for lifecycle transitions that are not allowed.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Movement {id} can't go from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: MovementStatus,
        to: MovementStatus,
    },

    #[error("{kind} movement {id} can't be cancelled")]
    NotCancellable { id: Uuid, kind: MissionKind },
}
