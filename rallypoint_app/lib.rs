pub mod app;
pub mod arrival_handlers;
pub mod arrival_registry;
pub mod arrivals;
pub mod clock;
pub mod command_handlers;
pub mod config;
pub mod cqrs;
pub mod repository;
pub mod uow;

pub mod test_utils;
