pub mod garrison;
pub mod idempotency;
pub mod movement;
pub mod rally_point;
pub mod village;
pub mod village_state;
