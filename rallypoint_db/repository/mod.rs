mod garrison_repository;
mod idempotency_repository;
mod movement_repository;
mod rally_point_repository;
mod village_repository;
mod village_state_repository;

pub use garrison_repository::InMemoryGarrisonRepository;
pub use idempotency_repository::InMemoryIdempotencyRepository;
pub use movement_repository::InMemoryMovementRepository;
pub use rally_point_repository::InMemoryRallyPointRepository;
pub use village_repository::InMemoryVillageRepository;
pub use village_state_repository::InMemoryVillageStateRepository;
