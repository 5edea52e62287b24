mod garrison_repository;
mod idempotency_repository;
mod movement_repository;
mod rally_point_repository;
mod village_repository;
mod village_state_repository;

pub use garrison_repository::GarrisonRepository;
pub use idempotency_repository::IdempotencyRepository;
pub use movement_repository::MovementRepository;
pub use rally_point_repository::RallyPointRepository;
pub use village_repository::VillageRepository;
pub use village_state_repository::VillageStateRepository;
