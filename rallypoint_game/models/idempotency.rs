use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::movement::{MissionWarning, Movement};

/// A created movement together with the notices raised while planning it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionDispatch {
    pub movement: Movement,
    pub warnings: Vec<MissionWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IdempotentOutcome {
    Dispatched(MissionDispatch),
    WaveDispatched(Vec<MissionDispatch>),
    Cancelled(bool),
    Recalled(Movement),
}

/// Remembers the first outcome of a keyed request so retries replay it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub key: String,
    pub operation: String,
    /// Canonical JSON of the request body.
    pub fingerprint: String,
    pub outcome: IdempotentOutcome,
    pub created_at: DateTime<Utc>,
}

impl IdempotencyRecord {
    pub fn new(
        key: String,
        operation: &str,
        fingerprint: String,
        outcome: IdempotentOutcome,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            operation: operation.to_string(),
            fingerprint,
            outcome,
            created_at,
        }
    }

    /// Same operation with the same request body.
    pub fn matches(&self, operation: &str, fingerprint: &str) -> bool {
        self.operation == operation && self.fingerprint == fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_matches_only_same_operation_and_body() {
        let record = IdempotencyRecord::new(
            "k1".to_string(),
            "send_mission",
            r#"{"a":1}"#.to_string(),
            IdempotentOutcome::Cancelled(true),
            Utc::now(),
        );
        assert!(record.matches("send_mission", r#"{"a":1}"#));
        assert!(!record.matches("send_mission", r#"{"a":2}"#));
        assert!(!record.matches("cancel_movement", r#"{"a":1}"#));
    }
}
