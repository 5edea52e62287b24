pub mod battle;
pub mod catalog;
pub mod models;
pub mod night;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
