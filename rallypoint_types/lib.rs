pub mod army;
pub mod battle;
pub mod common;
pub mod errors;
pub mod map;
pub mod mission;
pub mod tribe;

pub use errors::Result;
