use thiserror::Error;

pub mod conflict_error;
pub mod not_found_error;
pub mod policy_error;
pub mod state_error;
pub mod validation_error;

pub use conflict_error::ConflictError;
pub use not_found_error::NotFoundError;
pub use policy_error::PolicyError;
pub use state_error::StateError;
pub use validation_error::ValidationError;

pub type Result<T, E = ApplicationError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}
