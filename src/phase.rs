//! Phase orchestration: the entry point a host calls to resolve one
//! combat or strike phase against a galaxy snapshot.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::combat::aftermath::{
    apply_ambushes, apply_betrayals, resolve_bombardment, resolve_germ_warfare, resolve_sieges,
};
use crate::combat::{
    assemble_battles, has_picket_line, run_action, sequence_actions, Battle, BattleTallies,
    EngagementOption, PhaseKind,
};
use crate::economy::{Transaction, TransactionLedger};
use crate::error::CombatError;
use crate::galaxy::{Galaxy, ShipCombatState};
use crate::orders::SpeciesOrders;
use crate::report::{LogLevel, ReportSet};
use crate::rng::CombatRng;

/// One phase's worth of input, the shape hosts serialize to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInput {
    /// Generator seed; zero falls back to the engine default.
    #[serde(default)]
    pub seed: u32,
    pub phase: PhaseKind,
    pub galaxy: Galaxy,
    #[serde(default)]
    pub orders: Vec<SpeciesOrders>,
}

/// Everything a resolved phase hands back to the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Per-species turn report text, keyed by species id.
    pub reports: BTreeMap<u16, String>,
    /// Interspecies transactions for the economic phase to settle.
    pub transactions: Vec<Transaction>,
    /// Ships destroyed or captured this phase, for the host's records.
    pub deletions: Vec<String>,
}

/// Resolves every battle the orders declare (or drag somebody into),
/// mutating the galaxy in place. Ship removal is deferred to the very
/// end so fighter indices stay stable across the whole phase.
pub fn resolve_combat(
    galaxy: &mut Galaxy,
    orders: &[SpeciesOrders],
    phase: PhaseKind,
    seed: u32,
) -> Result<CombatOutcome, CombatError> {
    let mut rng = CombatRng::new(seed);
    let index = galaxy.location_index();
    let mut reports = ReportSet::new();
    let mut battles = assemble_battles(galaxy, orders, &index, phase, &mut rng, &mut reports)?;
    let mut ledger = TransactionLedger::new();
    let mut deletions: BTreeSet<usize> = BTreeSet::new();

    for battle in &mut battles {
        let has_ambush = battle.entries.iter().any(|e| e.ambush_amount > 0);
        if !battle.any_hostility() && !has_ambush {
            continue;
        }
        prepare_battle(galaxy, battle, &mut reports);
        let participants = battle.participant_ids();

        if battle.any_hostility() {
            reports.broadcast(
                &participants,
                LogLevel::Summary,
                &format!("Battle at {}:", battle.coords),
            );
        }
        apply_ambushes(galaxy, battle, &mut deletions, &mut reports);
        if !battle.any_hostility() {
            continue;
        }

        let picket = has_picket_line(battle);
        let actions = sequence_actions(battle);
        let mut tallies = BattleTallies::default();
        let mut fought = false;
        for (i, action) in actions.iter().enumerate() {
            let forced = i == 0 && picket && action.option == EngagementOption::DeepSpaceFight;
            fought |= run_action(
                galaxy,
                battle,
                *action,
                forced,
                &mut rng,
                &mut reports,
                &mut tallies,
                &mut deletions,
            );
        }
        if !fought {
            reports.broadcast(
                &participants,
                LogLevel::Summary,
                "  The fleets hold their distance; no shots are exchanged.",
            );
        }

        resolve_bombardment(galaxy, battle, &tallies, &mut deletions, &mut reports);
        resolve_germ_warfare(galaxy, battle, &tallies, &mut rng, &mut ledger, &mut reports)?;
        resolve_sieges(galaxy, battle, &tallies, &mut ledger, &mut reports)?;
    }

    apply_betrayals(galaxy, &battles, &mut reports);

    let deletions_report = describe_losses(galaxy, &deletions);
    let mut next = 0usize;
    galaxy.ships.retain(|_| {
        let keep = !deletions.contains(&next);
        next += 1;
        keep
    });

    Ok(CombatOutcome {
        reports: reports.into_reports(),
        transactions: ledger.into_vec(),
        deletions: deletions_report,
    })
}

/// Per-battle bookkeeping before any fighting: summary preferences,
/// fresh combat state on every present ship, HIDE orders applied, and
/// the opening fleet counts that anchor withdrawal percentages.
fn prepare_battle(galaxy: &mut Galaxy, battle: &mut Battle, reports: &mut ReportSet) {
    reports.reset_summary();
    for entry in &mut battle.entries {
        if entry.summary_only {
            reports.set_summary(entry.species_id);
        }
        let mut fleet = 0u32;
        for ship in galaxy
            .ships
            .iter_mut()
            .filter(|s| s.owner == entry.species_id && s.coords == battle.coords)
        {
            if !ship.present_for_battle() {
                continue;
            }
            ship.combat = ShipCombatState::default();
            if entry.hidden_ships.contains(&ship.name) {
                ship.combat.non_combatant = true;
            } else {
                fleet += 1;
            }
        }
        entry.initial_fleet = fleet;
    }
}

fn describe_losses(galaxy: &Galaxy, deletions: &BTreeSet<usize>) -> Vec<String> {
    deletions
        .iter()
        .map(|&i| {
            let ship = &galaxy.ships[i];
            let owner = galaxy
                .species_by_id(ship.owner)
                .map_or_else(|| format!("#{}", ship.owner), |sp| sp.name.clone());
            format!("SP {owner} {}", ship.classed_name())
        })
        .collect()
}
