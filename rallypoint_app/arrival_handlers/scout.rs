use async_trait::async_trait;
use tracing::{info, instrument};

use rallypoint_game::{
    battle::{BattleModifiers, CombatInput, WallState},
    models::movement::Movement,
};
use rallypoint_types::{
    battle::{AttackType, BattleReport},
    common::ResourceGroup,
    errors::ApplicationError,
};

use crate::{
    arrival_handlers::helpers::{
        attacker_force, attacker_tribe, battle_seed, find_destination_village, load_defenders,
        send_survivors_home,
    },
    arrivals::handler::{ArrivalContext, ArrivalHandler},
};

pub struct ScoutArrivalHandler {}

impl Default for ScoutArrivalHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoutArrivalHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl ArrivalHandler for ScoutArrivalHandler {
    #[instrument(skip_all, fields(
        movement_id = %movement.id,
        account_id = %movement.account_id,
        target = %movement.destination.position,
    ))]
    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx ArrivalContext<'a>,
        movement: &'ctx Movement,
    ) -> Result<Option<BattleReport>, ApplicationError> {
        info!("Resolving scouting arrival");

        let night = ctx.night_policy.evaluate(movement.arrive_at);
        let mut modifiers = BattleModifiers {
            attacker_tribe: attacker_tribe(ctx.catalog.as_ref(), movement),
            night_defense_multiplier: night.effective_multiplier(),
            seed: battle_seed(movement.id),
            ..Default::default()
        };
        let mut defenders = vec![];

        if let Some(village) = find_destination_village(&ctx.uow, &movement.destination).await? {
            defenders = load_defenders(&ctx.uow, &village).await?;
            let state = ctx.uow.village_states().get_or_default(village.id).await?;
            modifiers.wall = (state.wall_level > 0).then_some(WallState {
                kind: village.tribe.wall_kind(),
                level: state.wall_level,
            });
            modifiers.defender_resources = state.resources;
            modifiers.defender_tribe = Some(village.tribe);
        }

        let report = ctx.resolver.resolve(&CombatInput {
            attack_type: AttackType::Scout,
            attacker: attacker_force(movement),
            defenders,
            modifiers,
        });

        // Scouting never changes the scouted village
        send_survivors_home(
            ctx,
            movement,
            &report.attacker.survivors,
            ResourceGroup::default(),
        )
        .await?;

        info!(
            detected = report.scouting.as_ref().map(|s| s.was_detected),
            scouts_lost = report.attacker.total_losses(),
            "Scouting resolved."
        );
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{arrival_handlers::tests::arrival_context, test_utils::tests::MockUnitOfWork};
    use rallypoint_game::{
        models::village_state::VillageState,
        test_utils::{
            MovementFactoryOptions, VillageFactoryOptions, movement_factory, troops,
            village_factory,
        },
    };
    use rallypoint_types::{army::UnitTypeId, map::Position, mission::MissionKind, tribe::Tribe};

    #[tokio::test]
    async fn test_undetected_scouts_report_and_return() {
        let mock = MockUnitOfWork::new();
        let ctx = arrival_context(&mock);
        let village = village_factory(VillageFactoryOptions {
            id: Some(2),
            position: Some(Position::new(3, 4)),
            tribe: Some(Tribe::Gaul),
            ..Default::default()
        });
        ctx.uow.villages().save(&village).await.unwrap();
        ctx.uow
            .garrisons()
            .deposit(village.id, village.account_id, &UnitTypeId::new("phalanx"), 40, None)
            .await
            .unwrap();
        let mut state = VillageState::new(village.id);
        state.resources = ResourceGroup::new(300, 200, 100, 50);
        state.wall_level = 4;
        ctx.uow.village_states().save(&state).await.unwrap();

        let movement = movement_factory(MovementFactoryOptions {
            kind: Some(MissionKind::Scout),
            units: Some(troops(&[("scout", 5)])),
            ..Default::default()
        });
        let report = ScoutArrivalHandler::new()
            .handle(&ctx, &movement)
            .await
            .unwrap()
            .unwrap();

        let scouting = report.scouting.unwrap();
        assert!(!scouting.was_detected);
        assert_eq!(scouting.resources, Some(ResourceGroup::new(300, 200, 100, 50)));
        assert_eq!(scouting.wall_level, Some(4));
        assert_eq!(scouting.defending_units, Some(troops(&[("phalanx", 40)])));
        assert_eq!(report.attacker.total_losses(), 0);

        // Nothing changed at the target
        let stored = ctx.uow.village_states().get_or_default(village.id).await.unwrap();
        assert_eq!(stored, state);
        let returns = mock.movements.all();
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].payload.units, troops(&[("scout", 5)]));
        assert_eq!(returns[0].payload.resources, ResourceGroup::default());
    }
}
