use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use uuid::Uuid;

use rallypoint_types::{
    army::{TechLevels, TroopSet, UnitRole, UnitStats, UnitTypeId},
    battle::{
        AttackType, BattlePartyReport, BattleReport, BattleWinner, BuildingDamageReport,
        CatapultTarget, DefenderPartyReport, LoyaltyReport, ScoutingReport, WallDamageReport,
    },
    common::ResourceGroup,
    tribe::{Tribe, WallKind},
};

use crate::catalog::UnitCatalog;

/// Units on one side of a fight, with the smithy levels they fight at.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceStacks {
    pub units: TroopSet,
    pub tech: BTreeMap<UnitTypeId, TechLevels>,
}

impl ForceStacks {
    pub fn new(units: TroopSet, tech: BTreeMap<UnitTypeId, TechLevels>) -> Self {
        Self { units, tech }
    }

    fn tech_for(&self, unit: &UnitTypeId) -> TechLevels {
        self.tech.get(unit).copied().unwrap_or_default()
    }
}

/// Troops of a single account standing in the defended village.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefendingContingent {
    pub account_id: Uuid,
    pub force: ForceStacks,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallState {
    pub kind: WallKind,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiegeTarget {
    pub target: CatapultTarget,
    pub level: u8,
}

/// Everything about the battlefield the resolver is allowed to see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleModifiers {
    pub wall: Option<WallState>,
    pub cranny_capacity: u32,
    pub defender_resources: ResourceGroup,
    pub attacker_tribe: Tribe,
    pub defender_tribe: Option<Tribe>,
    pub night_defense_multiplier: f64,
    /// Buildings chosen by the attacker.
    pub catapult_targets: Vec<SiegeTarget>,
    /// Buildings standing in the village, used for random catapult hits.
    pub standing_buildings: Vec<SiegeTarget>,
    pub building_durability: f64,
    /// Current loyalty, set only for conquest attempts.
    pub loyalty: Option<u16>,
    pub seed: u64,
}

impl Default for BattleModifiers {
    fn default() -> Self {
        Self {
            wall: None,
            cranny_capacity: 0,
            defender_resources: ResourceGroup::default(),
            attacker_tribe: Tribe::Nature,
            defender_tribe: None,
            night_defense_multiplier: 1.0,
            catapult_targets: vec![],
            standing_buildings: vec![],
            building_durability: 1.0,
            loyalty: None,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatInput {
    pub attack_type: AttackType,
    pub attacker: ForceStacks,
    pub defenders: Vec<DefendingContingent>,
    pub modifiers: BattleModifiers,
}

/// Computes the outcome of a hostile arrival.
///
/// Implementations must be pure: the same input always yields the same report.
pub trait CombatResolver: Send + Sync {
    fn resolve(&self, input: &CombatInput) -> BattleReport;
}

/// Base points per scout when scouting.
const SCOUT_ATTACK_POINTS: u32 = 35;
const SCOUT_DEFENSE_POINTS: u32 = 20;
/// Teutons plunder 80% of the cranny.
const TEUTON_CRANNY_FACTOR: f64 = 0.8;

pub struct StandardCombatResolver {
    catalog: Arc<dyn UnitCatalog>,
}

impl StandardCombatResolver {
    pub fn new(catalog: Arc<dyn UnitCatalog>) -> Self {
        Self { catalog }
    }

    fn stats(&self, unit: &UnitTypeId) -> Option<&UnitStats> {
        self.catalog.lookup(unit)
    }

    fn attack_points(&self, force: &ForceStacks) -> (f64, f64) {
        let mut infantry = 0.0;
        let mut cavalry = 0.0;
        for (unit, count) in force.units.iter() {
            let Some(stats) = self.stats(unit) else {
                continue;
            };
            if !stats.role.is_combatant() {
                continue;
            }
            let tech = force.tech_for(unit);
            let points = stats.apply_smithy_upgrade(tech.attack, stats.attack) * *count as f64;
            if stats.role == UnitRole::Cavalry {
                cavalry += points;
            } else {
                infantry += points;
            }
        }
        (infantry, cavalry)
    }

    fn defense_points(&self, force: &ForceStacks) -> (f64, f64) {
        let mut infantry = 0.0;
        let mut cavalry = 0.0;
        for (unit, count) in force.units.iter() {
            let Some(stats) = self.stats(unit) else {
                continue;
            };
            if !stats.role.is_combatant() {
                continue;
            }
            let tech = force.tech_for(unit);
            infantry += stats.apply_smithy_upgrade(tech.defense, stats.defense_infantry) * *count as f64;
            cavalry += stats.apply_smithy_upgrade(tech.defense, stats.defense_cavalry) * *count as f64;
        }
        (infantry, cavalry)
    }

    fn scouting_points(&self, force: &ForceStacks, base_points: u32, attacking: bool) -> (f64, u32) {
        let mut points = 0.0;
        let mut scouts: u32 = 0;
        for (unit, count) in force.units.iter() {
            let Some(stats) = self.stats(unit) else {
                continue;
            };
            if stats.role != UnitRole::Scout {
                continue;
            }
            let tech = force.tech_for(unit);
            let level = if attacking { tech.attack } else { tech.defense };
            points += stats.apply_smithy_upgrade(level, base_points) * *count as f64;
            scouts = scouts.saturating_add(*count);
        }
        (points, scouts)
    }

    fn units_with_role(&self, units: &TroopSet, role: UnitRole) -> u32 {
        units
            .iter()
            .filter(|(unit, _)| self.stats(unit).map(|s| s.role) == Some(role))
            .fold(0u32, |acc, (_, count)| acc.saturating_add(*count))
    }

    /// Highest attack smithy level among units of a role, used for siege damage.
    fn smithy_level_for(&self, force: &ForceStacks, role: UnitRole) -> u8 {
        force
            .units
            .keys()
            .filter(|unit| self.stats(unit).map(|s| s.role) == Some(role))
            .map(|unit| force.tech_for(unit).attack)
            .max()
            .unwrap_or(0)
    }

    fn carry_capacity(&self, units: &TroopSet) -> u32 {
        units
            .iter()
            .filter_map(|(unit, count)| self.stats(unit).map(|s| s.capacity.saturating_mul(*count)))
            .fold(0u32, u32::saturating_add)
    }

    fn calculate_battle(&self, input: &CombatInput, rng: &mut StdRng) -> BattleReport {
        let modifiers = &input.modifiers;

        // ====================================================================
        // STEP 1: Calculate total attack and defense points
        // ====================================================================
        let (attacker_infantry_points, attacker_cavalry_points) =
            self.attack_points(&input.attacker);

        let mut defender_infantry_points = 0.0;
        let mut defender_cavalry_points = 0.0;
        let mut defender_immensity: u32 = 0;
        for contingent in input.defenders.iter() {
            let (infantry, cavalry) = self.defense_points(&contingent.force);
            defender_infantry_points += infantry;
            defender_cavalry_points += cavalry;
            defender_immensity = defender_immensity.saturating_add(head_count(&contingent.force.units));
        }

        // Wall and night bonus
        let wall_bonus = modifiers
            .wall
            .map(|wall| wall.kind.defense_bonus(wall.level))
            .unwrap_or(1.0);
        let defense_bonus = wall_bonus * modifiers.night_defense_multiplier;
        defender_infantry_points *= defense_bonus;
        defender_cavalry_points *= defense_bonus;

        // ====================================================================
        // STEP 2: Calculate total power and casualties
        // ====================================================================
        let total_attack_power = attacker_infantry_points + attacker_cavalry_points;
        let total_defense_power = if total_attack_power > 0.0 {
            let infantry_ratio = attacker_infantry_points / total_attack_power;
            let cavalry_ratio = attacker_cavalry_points / total_attack_power;
            defender_infantry_points * infantry_ratio + defender_cavalry_points * cavalry_ratio
        } else {
            defender_infantry_points.max(defender_cavalry_points)
        };

        let immensity = head_count(&input.attacker.units).saturating_add(defender_immensity);

        let (attacker_loss_percentage, defender_loss_percentage) = if total_defense_power <= 0.0 {
            // Nobody defending
            (0.0, 0.0)
        } else if total_attack_power <= 0.0 {
            (1.0, 0.0)
        } else {
            calculate_losses_percentages(
                &input.attack_type,
                total_attack_power,
                total_defense_power,
                immensity,
            )
        };

        let winner = if total_attack_power > total_defense_power {
            BattleWinner::Attacker
        } else {
            BattleWinner::Defender
        };
        let power_ratio = total_attack_power / total_defense_power.max(1.0);

        let attacker = apply_losses(&input.attacker.units, attacker_loss_percentage, rng);
        let defenders: Vec<DefenderPartyReport> = input
            .defenders
            .iter()
            .map(|contingent| DefenderPartyReport {
                account_id: contingent.account_id,
                party: apply_losses(&contingent.force.units, defender_loss_percentage, rng),
            })
            .collect();

        // ====================================================================
        // STEP 3: Calculate damages to wall and buildings
        // ====================================================================
        let mut wall_report = None;
        let mut buildings = vec![];

        if input.attack_type == AttackType::Normal {
            // 3.1: Rams damage
            let surviving_rams = self.units_with_role(&attacker.survivors, UnitRole::Ram);
            let wall = modifiers.wall.filter(|w| w.level > 0 && surviving_rams > 0);
            if let Some(wall) = wall {
                let ram_damage = calculate_machine_damage(
                    surviving_rams,
                    self.smithy_level_for(&input.attacker, UnitRole::Ram),
                    modifiers.building_durability,
                    power_ratio,
                    1.0,
                );
                wall_report = Some(WallDamageReport {
                    kind: wall.kind,
                    level_before: wall.level,
                    level_after: calculate_new_building_level(wall.level, ram_damage),
                });
            }

            // 3.2: Catapults damage
            let surviving_catapults =
                self.units_with_role(&attacker.survivors, UnitRole::Catapult);
            if surviving_catapults > 0 {
                let targets = pick_catapult_targets(modifiers, rng);
                if !targets.is_empty() {
                    let per_target = surviving_catapults / targets.len() as u32;
                    let catapult_damage = calculate_machine_damage(
                        per_target,
                        self.smithy_level_for(&input.attacker, UnitRole::Catapult),
                        modifiers.building_durability,
                        power_ratio,
                        1.0,
                    );
                    buildings = targets
                        .into_iter()
                        .map(|t| BuildingDamageReport {
                            level_after: calculate_new_building_level(t.level, catapult_damage),
                            level_before: t.level,
                            target: t.target,
                        })
                        .collect();
                }
            }
        }

        // ====================================================================
        // STEP 4: Bounty and loyalty
        // ====================================================================
        let bounty = self.calculate_bounty(&attacker.survivors, modifiers);

        let loyalty = match (modifiers.loyalty, winner) {
            (Some(before), BattleWinner::Attacker) => {
                let chiefs = self.units_with_role(&attacker.survivors, UnitRole::Chief);
                let reduction: u32 = (0..chiefs).map(|_| rng.gen_range(20..=25)).sum();
                Some(LoyaltyReport {
                    before,
                    after: (before as u32).saturating_sub(reduction) as u16,
                })
            }
            (Some(before), BattleWinner::Defender) => Some(LoyaltyReport {
                before,
                after: before,
            }),
            (None, _) => None,
        };

        BattleReport {
            attack_type: input.attack_type,
            winner,
            attacker,
            defenders,
            bounty,
            wall: wall_report,
            buildings,
            loyalty,
            scouting: None,
            night_defense_multiplier: modifiers.night_defense_multiplier,
        }
    }

    fn calculate_bounty(&self, survivors: &TroopSet, modifiers: &BattleModifiers) -> ResourceGroup {
        let capacity = self.carry_capacity(survivors);
        if capacity == 0 {
            return ResourceGroup::default();
        }

        let protected = if modifiers.attacker_tribe == Tribe::Teuton {
            (modifiers.cranny_capacity as f64 * TEUTON_CRANNY_FACTOR).floor() as u32
        } else {
            modifiers.cranny_capacity
        };
        let available = modifiers.defender_resources.saturating_sub_each(protected);
        let total = available.total();
        if total <= capacity {
            return available;
        }
        available * (capacity as f64 / total as f64)
    }

    fn calculate_scout_battle(&self, input: &CombatInput, rng: &mut StdRng) -> BattleReport {
        let modifiers = &input.modifiers;

        // ====================================================================
        // STEP 1: Calculates attack and defense points for scouts
        // ====================================================================
        let (total_scout_attack_power, total_attack_scouts) =
            self.scouting_points(&input.attacker, SCOUT_ATTACK_POINTS, true);

        let mut total_scout_defense_power = 0.0;
        let mut total_defense_scouts: u32 = 0;
        for contingent in input.defenders.iter() {
            let (points, scouts) =
                self.scouting_points(&contingent.force, SCOUT_DEFENSE_POINTS, false);
            total_scout_defense_power += points;
            total_defense_scouts = total_defense_scouts.saturating_add(scouts);
        }
        let defender_has_scouts = total_defense_scouts > 0;

        // ====================================================================
        // STEP 2: Apply bonuses and casualties
        // ====================================================================
        let mut attacker_loss_percentage = 0.0;
        if defender_has_scouts && total_scout_attack_power > 0.0 {
            let wall_bonus = modifiers
                .wall
                .map(|wall| wall.kind.defense_bonus(wall.level))
                .unwrap_or(1.0);
            total_scout_defense_power =
                total_scout_defense_power * wall_bonus * modifiers.night_defense_multiplier + 10.0;

            let m_factor = calculate_m_factor(total_attack_scouts + total_defense_scouts);
            let power_ratio = total_scout_defense_power / total_scout_attack_power;
            attacker_loss_percentage = power_ratio.powf(m_factor).min(1.0);
        }

        // ====================================================================
        // STEP 3: Final result
        // ====================================================================
        let scouts: TroopSet = input
            .attacker
            .units
            .iter()
            .filter(|(unit, _)| self.stats(unit).map(|s| s.role) == Some(UnitRole::Scout))
            .map(|(unit, count)| (unit.clone(), *count))
            .collect();
        let mut attacker = apply_losses(&scouts, attacker_loss_percentage, rng);
        for (unit, count) in input.attacker.units.iter() {
            if !scouts.contains_key(unit) {
                attacker.units_before.insert(unit.clone(), *count);
                attacker.survivors.insert(unit.clone(), *count);
                attacker.losses.insert(unit.clone(), 0);
            }
        }

        let scouts_survived = self.units_with_role(&attacker.survivors, UnitRole::Scout) > 0;
        let scouting = if scouts_survived {
            let mut defending_units = TroopSet::new();
            for contingent in input.defenders.iter() {
                for (unit, count) in contingent.force.units.iter() {
                    let seen = defending_units.entry(unit.clone()).or_insert(0);
                    *seen = seen.saturating_add(*count);
                }
            }
            ScoutingReport {
                was_detected: defender_has_scouts,
                resources: Some(modifiers.defender_resources.clone()),
                wall_level: Some(modifiers.wall.map(|w| w.level).unwrap_or(0)),
                defending_units: Some(defending_units),
            }
        } else {
            ScoutingReport {
                was_detected: defender_has_scouts,
                resources: None,
                wall_level: None,
                defending_units: None,
            }
        };

        let defenders = input
            .defenders
            .iter()
            .map(|contingent| DefenderPartyReport {
                account_id: contingent.account_id,
                party: apply_losses(&contingent.force.units, 0.0, rng),
            })
            .collect();

        BattleReport {
            attack_type: AttackType::Scout,
            winner: if scouts_survived {
                BattleWinner::Attacker
            } else {
                BattleWinner::Defender
            },
            attacker,
            defenders,
            bounty: ResourceGroup::default(),
            wall: None,
            buildings: vec![],
            loyalty: None,
            scouting: Some(scouting),
            night_defense_multiplier: modifiers.night_defense_multiplier,
        }
    }
}

impl CombatResolver for StandardCombatResolver {
    fn resolve(&self, input: &CombatInput) -> BattleReport {
        let mut rng = StdRng::seed_from_u64(input.modifiers.seed);
        match input.attack_type {
            AttackType::Scout => self.calculate_scout_battle(input, &mut rng),
            AttackType::Raid | AttackType::Normal => self.calculate_battle(input, &mut rng),
        }
    }
}

fn pick_catapult_targets(modifiers: &BattleModifiers, rng: &mut StdRng) -> Vec<SiegeTarget> {
    if !modifiers.catapult_targets.is_empty() {
        return modifiers.catapult_targets.clone();
    }
    let standing: Vec<&SiegeTarget> = modifiers
        .standing_buildings
        .iter()
        .filter(|b| b.level > 0)
        .collect();
    if standing.is_empty() {
        return vec![];
    }
    let idx = rng.gen_range(0..standing.len());
    vec![standing[idx].clone()]
}

/// Applies a loss percentage to every unit type, rounding fractions at random.
fn apply_losses(units: &TroopSet, loss_percentage: f64, rng: &mut StdRng) -> BattlePartyReport {
    let loss_percentage = loss_percentage.clamp(0.0, 1.0);
    let mut survivors = TroopSet::new();
    let mut losses = TroopSet::new();

    for (unit, count) in units.iter() {
        let exact = *count as f64 * loss_percentage;
        let mut lost = exact.floor() as u32;
        let fraction = exact - exact.floor();
        if fraction > 0.0 && rng.gen_bool(fraction) {
            lost += 1;
        }
        let lost = lost.min(*count);
        survivors.insert(unit.clone(), count - lost);
        losses.insert(unit.clone(), lost);
    }

    BattlePartyReport {
        units_before: units.clone(),
        survivors,
        losses,
        loss_percentage,
    }
}

/// Troop count of a stack, saturating at `u32::MAX`.
fn head_count(units: &TroopSet) -> u32 {
    units.values().fold(0u32, |acc, count| acc.saturating_add(*count))
}

// Massive battles factor (Mfactor)
fn calculate_m_factor(immensity: u32) -> f64 {
    if immensity >= 1000 {
        (2.0 * (1.8592 - (immensity as f64).powf(0.015))).clamp(1.2578, 1.5)
    } else {
        1.5
    }
}

// Losses are calculated in percentages and applied to all armies involved, according to a winner/loser logic
fn calculate_losses_percentages(
    attack_type: &AttackType,
    attack_power: f64,
    defense_power: f64,
    immensity: u32,
) -> (f64, f64) {
    let m_factor = calculate_m_factor(immensity);

    if attack_power > defense_power {
        calculate_loss_factor_by_attack_type(attack_type, attack_power, defense_power, m_factor)
    } else {
        let (defender_losses, attacker_losses) = calculate_loss_factor_by_attack_type(
            attack_type,
            defense_power,
            attack_power,
            m_factor,
        );
        (attacker_losses, defender_losses)
    }
}

// Returns (winner losses, loser losses)
fn calculate_loss_factor_by_attack_type(
    attack_type: &AttackType,
    winner: f64,
    loser: f64,
    m_factor: f64,
) -> (f64, f64) {
    let loss_factor = (loser / winner).powf(m_factor);

    match attack_type {
        AttackType::Raid => (loss_factor / (1.0 + loss_factor), 1.0 / (1.0 + loss_factor)),
        AttackType::Normal | AttackType::Scout => (loss_factor, 1.0),
    }
}

// sigma function from Kirilloid to calculate damages to buildings (catapults) and wall (rams)
fn sigma(x: f64) -> f64 {
    if x > 1.0 {
        (2.0 - x.powf(-1.5)) / 2.0
    } else {
        x.powf(1.5) / 2.0
    }
}

// Calculates damage for catapults/rams
fn calculate_machine_damage(
    quantity: u32,
    smithy_level: u8,
    durability: f64,
    ad_ratio: f64,
    morale: f64,
) -> f64 {
    let upgrades = 1.0205f64.powf(smithy_level as f64);
    let efficiency = (quantity as f64 / durability.max(f64::EPSILON)).floor();

    4.0 * sigma(ad_ratio) * efficiency * upgrades / morale
}

// Calculates new building level after damages
fn calculate_new_building_level(old_level: u8, mut damage: f64) -> u8 {
    let mut current_level = old_level;
    damage -= 0.5;
    if damage < 0.0 {
        return current_level;
    }

    while damage >= current_level as f64 && current_level > 0 {
        damage -= current_level as f64;
        current_level -= 1;
    }
    current_level
}
