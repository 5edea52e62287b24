pub mod army_return;
pub mod attack;
pub mod helpers;
pub mod reinforcement;
pub mod scout;
