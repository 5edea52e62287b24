use rallypoint_types::{battle::AttackType, mission::MissionKind};

use crate::{
    arrival_handlers::{
        army_return::ArmyReturnArrivalHandler, attack::AttackArrivalHandler,
        reinforcement::ReinforcementArrivalHandler, scout::ScoutArrivalHandler,
    },
    arrivals::handler::{ArrivalHandler, ArrivalRegistry},
};

/// Concrete implementation of the ArrivalRegistry trait.
/// It maps each mission kind to the handler applying its arrival.
#[derive(Default)]
pub struct AppArrivalRegistry;

impl AppArrivalRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl ArrivalRegistry for AppArrivalRegistry {
    fn get_handler(&self, kind: MissionKind) -> Box<dyn ArrivalHandler> {
        match kind.attack_type() {
            Some(AttackType::Scout) => Box::new(ScoutArrivalHandler::new()),
            Some(attack_type) => Box::new(AttackArrivalHandler::new(attack_type)),
            None if kind == MissionKind::Reinforce => Box::new(ReinforcementArrivalHandler::new()),
            None => Box::new(ArmyReturnArrivalHandler::new()),
        }
    }
}
