use thiserror::Error;

/// Errors for missions blocked by world policies.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("target under beginner protection")]
    TargetUnderBeginnerProtection { village_id: u32 },
}
