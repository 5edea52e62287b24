use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConflictError {
    #[error("Idempotency key '{key}' was already used for a different {operation} request")]
    IdempotencyKeyReused { key: String, operation: String },
}
