use async_trait::async_trait;
use tracing::{info, instrument};

use rallypoint_game::{
    battle::{BattleModifiers, CombatInput, SiegeTarget, WallState},
    models::movement::Movement,
};
use rallypoint_types::{
    battle::{AttackType, BattleReport},
    errors::ApplicationError,
    mission::MissionKind,
};

use crate::{
    arrival_handlers::helpers::{
        apply_defender_losses, attacker_force, attacker_tribe, battle_seed,
        find_destination_village, load_defenders, send_survivors_home,
    },
    arrivals::handler::{ArrivalContext, ArrivalHandler},
};

/// Resolves attacks, raids, sieges and conquests.
pub struct AttackArrivalHandler {
    attack_type: AttackType,
}

impl AttackArrivalHandler {
    pub fn new(attack_type: AttackType) -> Self {
        Self { attack_type }
    }
}

#[async_trait]
impl ArrivalHandler for AttackArrivalHandler {
    #[instrument(skip_all, fields(
        kind = %movement.kind,
        movement_id = %movement.id,
        account_id = %movement.account_id,
        target = %movement.destination.position,
    ))]
    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx ArrivalContext<'a>,
        movement: &'ctx Movement,
    ) -> Result<Option<BattleReport>, ApplicationError> {
        info!("Resolving hostile arrival");

        let village = find_destination_village(&ctx.uow, &movement.destination).await?;
        let night = ctx.night_policy.evaluate(movement.arrive_at);

        let mut modifiers = BattleModifiers {
            attacker_tribe: attacker_tribe(ctx.catalog.as_ref(), movement),
            night_defense_multiplier: night.effective_multiplier(),
            seed: battle_seed(movement.id),
            ..Default::default()
        };
        let mut defenders = vec![];
        let mut state = None;

        if let Some(village) = &village {
            defenders = load_defenders(&ctx.uow, village).await?;
            let village_state = ctx.uow.village_states().get_or_default(village.id).await?;

            modifiers.wall = (village_state.wall_level > 0).then_some(WallState {
                kind: village.tribe.wall_kind(),
                level: village_state.wall_level,
            });
            modifiers.cranny_capacity = village_state.cranny_capacity;
            modifiers.defender_resources = village_state.resources.clone();
            modifiers.defender_tribe = Some(village.tribe);
            modifiers.catapult_targets = movement
                .payload
                .catapult_targets
                .iter()
                .filter_map(|target| {
                    village_state
                        .building_level(target)
                        .map(|level| SiegeTarget {
                            target: target.clone(),
                            level,
                        })
                })
                .collect();
            modifiers.standing_buildings = village_state
                .buildings
                .iter()
                .filter(|(_, level)| **level > 0)
                .map(|(target, level)| SiegeTarget {
                    target: target.clone(),
                    level: *level,
                })
                .collect();
            modifiers.building_durability = village_state.building_durability;
            if movement.kind == MissionKind::Conquest {
                modifiers.loyalty = Some(village_state.loyalty);
            }
            state = Some(village_state);
        }

        let report = ctx.resolver.resolve(&CombatInput {
            attack_type: self.attack_type,
            attacker: attacker_force(movement),
            defenders,
            modifiers,
        });

        // Apply the outcome to the defended village
        if let (Some(village), Some(mut state)) = (&village, state) {
            apply_defender_losses(&ctx.uow, village.id, &report).await?;

            if let Some(wall) = &report.wall {
                state.wall_level = wall.level_after;
            }
            for building in report.buildings.iter() {
                state
                    .buildings
                    .insert(building.target.clone(), building.level_after);
            }
            if let Some(loyalty) = &report.loyalty {
                state.loyalty = loyalty.after;
            }
            state.resources = state.resources.saturating_sub(&report.bounty);
            ctx.uow.village_states().save(&state).await?;
        }

        send_survivors_home(
            ctx,
            movement,
            &report.attacker.survivors,
            report.bounty.clone(),
        )
        .await?;

        info!(
            winner = ?report.winner,
            attacker_losses = report.attacker.total_losses(),
            bounty = report.bounty.total(),
            "Battle resolved."
        );
        Ok(Some(report))
    }
}
