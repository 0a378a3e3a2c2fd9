//! Consequences once the shooting stops: ambush damage, hijack
//! proceeds, bombardment and germ-warfare settlement, sieges, and the
//! diplomatic fallout of betraying an ally.

use std::collections::BTreeSet;

use crate::combat::battle::Battle;
use crate::combat::power::bombardment_reference;
use crate::combat::rounds::BattleTallies;
use crate::economy::{Transaction, TransactionKind, TransactionLedger};
use crate::error::CombatError;
use crate::galaxy::{Colony, ColonyFlags, Galaxy, Item, ShipStatus};
use crate::report::{LogLevel, ReportSet};
use crate::rng::CombatRng;

/// Springs every ambush committed at the battle sector before the first
/// shot is fired. Enemy ships are aged by the committed funds spread
/// over the tonnage they brought, warship tonnage counting ten times;
/// ships that slipped in through a natural wormhole take double.
pub fn apply_ambushes(
    galaxy: &mut Galaxy,
    battle: &Battle,
    deletions: &mut BTreeSet<usize>,
    reports: &mut ReportSet,
) {
    let participants = battle.participant_ids();
    for entry in &battle.entries {
        if entry.ambush_amount == 0 {
            continue;
        }
        let Some(ambusher) = galaxy.species_by_id(entry.species_id) else {
            continue;
        };
        let ambusher_name = ambusher.name.clone();
        let enemies = ambusher.enemies.clone();

        let targets: Vec<usize> = galaxy
            .ships
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                enemies.contains(&s.owner)
                    && s.coords == battle.coords
                    && s.present_for_battle()
                    && !s.combat.non_combatant
            })
            .map(|(i, _)| i)
            .collect();

        // The funds are committed either way; they only hurt somebody
        // when an enemy actually shows up.
        for cidx in 0..galaxy.colonies.len() {
            let colony = &mut galaxy.colonies[cidx];
            if colony.owner == entry.species_id && colony.coords == battle.coords {
                colony.use_on_ambush = 0;
            }
        }
        if targets.is_empty() {
            continue;
        }

        let weighted: u64 = targets
            .iter()
            .map(|&i| {
                let ship = &galaxy.ships[i];
                let weight = if ship.class.is_transport() { 1 } else { 10 };
                u64::from(ship.tonnage) * weight
            })
            .sum();
        let increment = entry.ambush_amount / weighted.max(1);
        if increment == 0 {
            continue;
        }

        reports.broadcast(
            &participants,
            LogLevel::Summary,
            &format!("SP {ambusher_name} springs an ambush at {}!", battle.coords),
        );
        for &sidx in &targets {
            let aging = if galaxy.ships[sidx].via_wormhole {
                increment * 2
            } else {
                increment
            };
            let ship = &mut galaxy.ships[sidx];
            ship.age = ship.age.saturating_add(aging.min(u64::from(u32::MAX)) as u32);
            let label = format!(
                "SP {} {}",
                species_name(galaxy, galaxy.ships[sidx].owner),
                galaxy.ships[sidx].classed_name()
            );
            if galaxy.ships[sidx].is_destroyed() {
                deletions.insert(sidx);
                reports.broadcast(
                    &participants,
                    LogLevel::Summary,
                    &format!("  {label} is destroyed in the ambush!"),
                );
            } else {
                reports.broadcast(
                    &participants,
                    LogLevel::Summary,
                    &format!("  {label} is damaged, aging {aging} years."),
                );
            }
        }
    }
}

/// Pays a hijacker for a ship just boarded: salvage on the hull scaled
/// down by its age, plus half the cargo's build cost. The hulk itself
/// is lost either way and the cargo stripped.
pub fn settle_hijack(
    galaxy: &mut Galaxy,
    ship_index: usize,
    hijacker: u16,
    reports: &mut ReportSet,
) {
    let ship = &galaxy.ships[ship_index];
    if ship.status == ShipStatus::UnderConstruction {
        return;
    }
    // A distortion field burned off in the fight means the prize was a
    // masked decoy; there is nothing aboard worth taking.
    if ship.combat.distortion_revealed {
        reports.log(
            hijacker,
            LogLevel::Summary,
            &format!(
                "  {} was running under a distortion field; the boarding party finds nothing.",
                ship.classed_name()
            ),
        );
        return;
    }
    let age = u64::from(ship.age.min(60));
    let hull_value = 3 * ship.original_cost() * (60 - age) / 200;
    let cargo_value: u64 = ship
        .inventory
        .iter()
        .map(|(item, qty)| item.cost() * u64::from(*qty) / 2)
        .sum();
    let proceeds = hull_value + cargo_value;
    let name = ship.classed_name();
    galaxy.ships[ship_index].inventory.clear();
    if let Some(sp) = galaxy.species.iter_mut().find(|sp| sp.id == hijacker) {
        sp.econ_units += proceeds as i64;
    }
    reports.log(
        hijacker,
        LogLevel::Summary,
        &format!("  {name} stripped for {proceeds} economic units."),
    );
}

/// Settles accumulated bombardment damage against each tallied colony.
/// Damage is measured against a fixed reference barrage; matching it
/// destroys the colony outright, along with anything its shipyards had
/// on the slips.
pub fn resolve_bombardment(
    galaxy: &mut Galaxy,
    battle: &Battle,
    tallies: &BattleTallies,
    deletions: &mut BTreeSet<usize>,
    reports: &mut ReportSet,
) {
    let participants = battle.participant_ids();
    for (&cidx, tally) in &tallies.bombardment {
        let pct = (100 * tally.damage / bombardment_reference()).min(101);
        let colony = &mut galaxy.colonies[cidx];
        let name = colony.name.clone();
        if pct == 0 {
            reports.broadcast(
                &participants,
                LogLevel::Summary,
                &format!("Bombardment of PL {name} causes only superficial damage."),
            );
            continue;
        }
        if pct >= 100 {
            let owner = colony.owner;
            let at = colony.coords;
            let orbit = colony.orbit;
            wipe_colony(colony);
            for (sidx, ship) in galaxy.ships.iter().enumerate() {
                if ship.owner == owner
                    && ship.coords == at
                    && ship.orbit == orbit
                    && ship.status == ShipStatus::UnderConstruction
                {
                    deletions.insert(sidx);
                }
            }
            reports.broadcast(
                &participants,
                LogLevel::Summary,
                &format!("PL {name} is completely destroyed by the bombardment!"),
            );
        } else {
            colony.mi_base -= colony.mi_base * pct / 100;
            colony.ma_base -= colony.ma_base * pct / 100;
            colony.pop_units -= colony.pop_units * pct / 100;
            colony.shipyards -= (u64::from(colony.shipyards) * pct / 100) as u32;
            for qty in colony.inventory.values_mut() {
                *qty -= (u64::from(*qty) * pct / 100) as u32;
            }
            reports.broadcast(
                &participants,
                LogLevel::Summary,
                &format!("Bombardment destroys {pct}% of PL {name}."),
            );
        }
    }
}

/// Drops the tallied germ bombs. Each bomb gets one infection roll,
/// decided by the biology gap between the species; the first success
/// annihilates the colony and books its loot value to the attacker.
/// Every bomb is spent whether or not it was needed.
pub fn resolve_germ_warfare(
    galaxy: &mut Galaxy,
    battle: &Battle,
    tallies: &BattleTallies,
    rng: &mut CombatRng,
    ledger: &mut TransactionLedger,
    reports: &mut ReportSet,
) -> Result<(), CombatError> {
    let participants = battle.participant_ids();
    for strike in &tallies.germ_strikes {
        let colony = &galaxy.colonies[strike.colony];
        if colony.pop_units == 0 {
            continue;
        }
        let attacker_id = battle.entries[strike.attacker_entry].species_id;
        let attacker_bi = galaxy
            .species_by_id(attacker_id)
            .map_or(0, |sp| i64::from(sp.tech.biology));
        let defender_bi = galaxy
            .species_by_id(colony.owner)
            .map_or(0, |sp| i64::from(sp.tech.biology));
        let chance = 50 + 2 * (attacker_bi - defender_bi);

        let mut infected = false;
        for &(sidx, bombs) in &strike.bomb_ships {
            for _ in 0..bombs {
                if !infected && chance > 0 && i64::from(rng.roll(100)) <= chance {
                    infected = true;
                }
            }
            galaxy.ships[sidx].inventory.insert(Item::GermBomb, 0);
        }

        let colony = &mut galaxy.colonies[strike.colony];
        let name = colony.name.clone();
        if infected {
            let value = colony.loot_value();
            let owner = colony.owner;
            let at = colony.coords;
            let orbit = colony.orbit;
            wipe_colony(colony);
            ledger.push(Transaction {
                kind: TransactionKind::Looting,
                donor: owner,
                recipient: attacker_id,
                value,
                location: at,
                orbit,
                name1: species_name(galaxy, attacker_id),
                name2: name.clone(),
            })?;
            reports.broadcast(
                &participants,
                LogLevel::Summary,
                &format!("Germ bombs wipe out all life on PL {name}!"),
            );
        } else {
            reports.broadcast(
                &participants,
                LogLevel::Summary,
                &format!("Germ bombs dropped on PL {name} fail to take hold."),
            );
        }
    }
    Ok(())
}

/// Marks each besieged colony and books one blockade transaction per
/// besieging ship, which the economic phase turns into lost output.
pub fn resolve_sieges(
    galaxy: &mut Galaxy,
    battle: &Battle,
    tallies: &BattleTallies,
    ledger: &mut TransactionLedger,
    reports: &mut ReportSet,
) -> Result<(), CombatError> {
    let participants = battle.participant_ids();
    for pair in &tallies.siege_pairs {
        let attacker_id = battle.entries[pair.attacker_entry].species_id;
        let ship_name = galaxy.ships[pair.ship].classed_name();
        let ship_tonnage = u64::from(galaxy.ships[pair.ship].tonnage);
        let colony = &mut galaxy.colonies[pair.colony];
        colony.under_siege = true;
        let colony_name = colony.name.clone();
        ledger.push(Transaction {
            kind: TransactionKind::Besiege,
            donor: battle.entries[pair.defender_entry].species_id,
            recipient: attacker_id,
            value: ship_tonnage,
            location: battle.coords,
            orbit: colony.orbit,
            name1: ship_name.clone(),
            name2: colony_name.clone(),
        })?;
        reports.broadcast(
            &participants,
            LogLevel::Summary,
            &format!("{ship_name} lays siege to PL {colony_name}."),
        );
    }
    Ok(())
}

/// After all battles resolve, betraying an ally rewrites the map's
/// diplomacy: the victim turns on the traitor, the alliance is struck,
/// and every species allied to both and in contact with both does the
/// same.
pub fn apply_betrayals(galaxy: &mut Galaxy, battles: &[Battle], reports: &mut ReportSet) {
    for battle in battles {
        for &(traitor_e, victim_e) in &battle.betrayals {
            let traitor = battle.entries[traitor_e].species_id;
            let victim = battle.entries[victim_e].species_id;

            let bystanders: Vec<u16> = galaxy
                .species
                .iter()
                .filter(|sp| {
                    sp.id != traitor
                        && sp.id != victim
                        && sp.is_ally(traitor)
                        && sp.is_ally(victim)
                        && sp.has_contact(traitor)
                        && sp.has_contact(victim)
                })
                .map(|sp| sp.id)
                .collect();

            let traitor_name = species_name(galaxy, traitor);
            let victim_name = species_name(galaxy, victim);
            if let Some(sp) = galaxy.species.iter_mut().find(|sp| sp.id == victim) {
                sp.declare_enemy(traitor);
            }
            if let Some(sp) = galaxy.species.iter_mut().find(|sp| sp.id == traitor) {
                sp.allies.remove(&victim);
            }
            reports.log(
                victim,
                LogLevel::Summary,
                &format!("SP {traitor_name} has betrayed the alliance! They are now an enemy."),
            );
            reports.log(
                traitor,
                LogLevel::Summary,
                &format!("SP {victim_name} will remember this betrayal."),
            );
            for bid in bystanders {
                if let Some(sp) = galaxy.species.iter_mut().find(|sp| sp.id == bid) {
                    sp.declare_enemy(traitor);
                }
                reports.log(
                    bid,
                    LogLevel::Summary,
                    &format!(
                        "SP {traitor_name} has betrayed SP {victim_name}; \
                         you have declared them an enemy."
                    ),
                );
            }
        }
    }
}

/// Reduces a colony to lifeless ground. The site and its home-world
/// pedigree survive; everything built on it does not.
fn wipe_colony(colony: &mut Colony) {
    colony.mi_base = 0;
    colony.ma_base = 0;
    colony.pop_units = 0;
    colony.shipyards = 0;
    colony.siege_eff = 0;
    colony.under_siege = false;
    colony.hidden = false;
    colony.use_on_ambush = 0;
    colony.inventory.clear();
    colony.flags = ColonyFlags {
        home_planet: colony.flags.home_planet,
        colony: !colony.flags.home_planet,
        ..ColonyFlags::default()
    };
}

fn species_name(galaxy: &Galaxy, id: u16) -> String {
    galaxy
        .species_by_id(id)
        .map_or_else(|| format!("#{id}"), |sp| sp.name.clone())
}
