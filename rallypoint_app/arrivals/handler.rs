use async_trait::async_trait;
use std::sync::Arc;

use rallypoint_game::{
    battle::CombatResolver, catalog::UnitCatalog, models::movement::Movement, night::NightPolicy,
};
use rallypoint_types::{battle::BattleReport, errors::ApplicationError, mission::MissionKind};

use crate::{config::Config, uow::UnitOfWork};

/// Context which contains ArrivalHandler dependencies.
pub struct ArrivalContext<'a> {
    pub uow: Box<dyn UnitOfWork<'a> + 'a>,
    pub config: Arc<Config>,
    pub catalog: Arc<dyn UnitCatalog>,
    pub resolver: Arc<dyn CombatResolver>,
    pub night_policy: Arc<dyn NightPolicy>,
}

/// Applies the effects of a movement reaching its destination.
///
/// Handlers only touch world state through the context's unit of work. The
/// movement itself is marked resolved by the caller.
#[async_trait]
pub trait ArrivalHandler: Send + Sync {
    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx ArrivalContext<'a>,
        movement: &'ctx Movement,
    ) -> Result<Option<BattleReport>, ApplicationError>;
}

/// Maps a mission kind to the handler resolving it.
pub trait ArrivalRegistry: Send + Sync {
    fn get_handler(&self, kind: MissionKind) -> Box<dyn ArrivalHandler>;
}
