pub mod cancel_movement;
pub mod helpers;
pub mod recall_reinforcements;
pub mod send_mission;
pub mod send_wave_group;

pub use cancel_movement::CancelMovementCommandHandler;
pub use recall_reinforcements::RecallReinforcementsCommandHandler;
pub use send_mission::SendMissionCommandHandler;
pub use send_wave_group::SendWaveGroupCommandHandler;
