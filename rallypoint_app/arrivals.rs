pub mod handler;
pub mod worker;
