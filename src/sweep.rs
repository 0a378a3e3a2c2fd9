//! Monte Carlo outcome sampling.
//!
//! Replays one phase input across many generator seeds and aggregates
//! what happened, so a host can ask "how does this raid usually go"
//! instead of trusting a single roll of the dice. Runs are independent
//! and execute in parallel; the per-run seeds are derived up front so a
//! sweep is reproducible from its master seed alone.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::error::CombatError;
use crate::galaxy::Galaxy;
use crate::phase::{resolve_combat, TurnInput};

/// Configuration for an outcome sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Number of independent resolutions to run.
    pub runs: u32,
    /// Seed the per-run seeds are derived from (0 = use entropy).
    pub master_seed: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            runs: 100,
            master_seed: 0,
        }
    }
}

/// Aggregate of every run in a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Number of runs folded into the totals.
    pub runs: u32,
    /// Ships lost per species, summed over all runs.
    pub ship_losses: BTreeMap<u16, u64>,
    /// Inhabited colonies wiped per species, summed over all runs.
    pub colony_wipes: BTreeMap<u16, u64>,
    /// Transactions booked over all runs.
    pub transactions: u64,
}

struct RunStats {
    losses: BTreeMap<u16, u64>,
    wipes: BTreeMap<u16, u64>,
    transactions: u64,
}

/// Resolves the same input `config.runs` times, each with its own seed,
/// and folds the outcomes into one [`SweepSummary`]. The input is never
/// mutated; every run works on its own copy of the galaxy. Fails on the
/// first run that rejects the orders, which the very first run already
/// would.
pub fn run_sweep(input: &TurnInput, config: &SweepConfig) -> Result<SweepSummary, CombatError> {
    let mut seeder = if config.master_seed != 0 {
        SmallRng::seed_from_u64(config.master_seed)
    } else {
        SmallRng::from_entropy()
    };
    let seeds: Vec<u32> = (0..config.runs).map(|_| seeder.gen()).collect();

    let ships_before = ships_by_owner(&input.galaxy);
    let colonies_before = inhabited_by_owner(&input.galaxy);

    let stats: Vec<RunStats> = seeds
        .par_iter()
        .map(|&seed| -> Result<RunStats, CombatError> {
            let mut galaxy = input.galaxy.clone();
            let outcome = resolve_combat(&mut galaxy, &input.orders, input.phase, seed)?;

            let mut losses = BTreeMap::new();
            let after = ships_by_owner(&galaxy);
            for (&owner, &had) in &ships_before {
                let now = after.get(&owner).copied().unwrap_or(0);
                if now < had {
                    losses.insert(owner, had - now);
                }
            }
            let mut wipes = BTreeMap::new();
            let after = inhabited_by_owner(&galaxy);
            for (&owner, &had) in &colonies_before {
                let now = after.get(&owner).copied().unwrap_or(0);
                if now < had {
                    wipes.insert(owner, had - now);
                }
            }
            Ok(RunStats {
                losses,
                wipes,
                transactions: outcome.transactions.len() as u64,
            })
        })
        .collect::<Result<Vec<_>, CombatError>>()?;

    let mut summary = SweepSummary {
        runs: config.runs,
        ..SweepSummary::default()
    };
    for run in stats {
        for (owner, n) in run.losses {
            *summary.ship_losses.entry(owner).or_default() += n;
        }
        for (owner, n) in run.wipes {
            *summary.colony_wipes.entry(owner).or_default() += n;
        }
        summary.transactions += run.transactions;
    }
    Ok(summary)
}

fn ships_by_owner(galaxy: &Galaxy) -> BTreeMap<u16, u64> {
    let mut counts = BTreeMap::new();
    for ship in &galaxy.ships {
        *counts.entry(ship.owner).or_default() += 1;
    }
    counts
}

fn inhabited_by_owner(galaxy: &Galaxy) -> BTreeMap<u16, u64> {
    let mut counts = BTreeMap::new();
    for colony in &galaxy.colonies {
        if colony.is_inhabited() {
            *counts.entry(colony.owner).or_default() += 1;
        }
    }
    counts
}
