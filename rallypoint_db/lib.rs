pub mod uow;

mod repository;
mod world;

pub use repository::*;
pub use world::WorldState;
