//! Fighting units and their derived combat statistics.
//!
//! A `Fighter` is one ship or one colony defense grid as it stands in a
//! single action: statistics are computed when the action musters and
//! stay fixed until it ends, except for shield depletion and the shot
//! counter. Hull damage is expressed as ship aging, so a unit's stats
//! reflect the wear it carried into the action.

use crate::combat::power::power;
use crate::galaxy::{Colony, Ship, TechLevels, MAX_SERVICE_AGE};

/// Shots per round are capped here no matter how much offense a unit
/// stacks up.
pub const MAX_SHOTS: u32 = 5;

/// Offense needed per additional shot beyond the first.
const OFFENSE_PER_SHOT: u64 = 1500;

/// What a fighter physically is, as an index into the galaxy arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FighterBody {
    Ship(usize),
    Colony(usize),
}

/// One combat participant within one action.
#[derive(Debug, Clone)]
pub struct Fighter {
    /// Battle entry (species) the unit fights for.
    pub entry: usize,
    pub body: FighterBody,
    /// True when the unit joined through an attack option.
    pub attacker: bool,
    pub tonnage: u32,
    /// Hull damage capacity; the divisor for percentage damage.
    pub hull: u64,
    pub offense: u64,
    pub shots_per_round: u32,
    pub damage_per_shot: u64,
    /// Full shield pool from generators, zero for shieldless units.
    pub shield_max: u64,
    pub shield_left: u64,
    /// Shots remaining this round.
    pub shots_left: u32,
    /// Destroyed, captured, jumped out, or withdrawn.
    pub out: bool,
}

impl Fighter {
    /// Musters a ship into an action.
    pub fn from_ship(
        ship: &Ship,
        ship_index: usize,
        tech: &TechLevels,
        entry: usize,
        attacker: bool,
        hijacking: bool,
    ) -> Self {
        let base = power(ship.tonnage);
        let mut offense = if ship.class.is_transport() {
            base / 10
        } else {
            base
        };
        let mut hull = base;
        let mut shield = 0u64;
        for (&item, &qty) in &ship.inventory {
            if let Some(mark) = item.gun_mark() {
                offense += u64::from(qty) * power(5 * u32::from(mark));
            } else if let Some(mark) = item.shield_mark() {
                shield += u64::from(qty) * power(5 * u32::from(mark));
            }
        }
        offense = offense * u64::from(100 + tech.military) / 100;
        hull = hull * u64::from(100 + tech.life_support) / 100;
        shield = shield * u64::from(100 + tech.life_support) / 100;

        // Wear: a ship at the service-age limit fights at 1/50 strength.
        let wear = u64::from((MAX_SERVICE_AGE + 1).saturating_sub(ship.age.min(MAX_SERVICE_AGE)));
        offense = offense * wear / 50;
        hull = hull * wear / 50;
        shield = shield * wear / 50;

        if hijacking {
            offense /= 4;
            hull /= 4;
            shield /= 4;
        }

        let (shots, damage) = shot_allotment(offense, tech.military);
        let shield_left = shield * u64::from(ship.combat.shield_pct) / 100;
        Fighter {
            entry,
            body: FighterBody::Ship(ship_index),
            attacker,
            tonnage: ship.tonnage,
            hull,
            offense,
            shots_per_round: shots,
            damage_per_shot: damage,
            shield_max: shield,
            shield_left,
            shots_left: 0,
            out: false,
        }
    }

    /// Musters a colony's planetary defenses into an action. Colonies
    /// never attack and carry no shield generators.
    pub fn from_colony(colony: &Colony, colony_index: usize, tech: &TechLevels, entry: usize) -> Self {
        let tonnage = colony.defense_tonnage();
        let base = power(tonnage);
        let offense = base * u64::from(100 + tech.military) / 100;
        let hull = base * u64::from(100 + tech.life_support) / 100;
        let (shots, damage) = shot_allotment(offense, tech.military);
        Fighter {
            entry,
            body: FighterBody::Colony(colony_index),
            attacker: false,
            tonnage,
            hull,
            offense,
            shots_per_round: shots,
            damage_per_shot: damage,
            shield_max: 0,
            shield_left: 0,
            shots_left: 0,
            out: false,
        }
    }

    pub fn is_ship(&self) -> bool {
        matches!(self.body, FighterBody::Ship(_))
    }

    pub fn ship_index(&self) -> Option<usize> {
        match self.body {
            FighterBody::Ship(i) => Some(i),
            FighterBody::Colony(_) => None,
        }
    }

    pub fn colony_index(&self) -> Option<usize> {
        match self.body {
            FighterBody::Colony(i) => Some(i),
            FighterBody::Ship(_) => None,
        }
    }

    /// Percentage of shield pool remaining, 0..=100. Shieldless units
    /// report zero.
    pub fn shield_pct(&self) -> u32 {
        if self.shield_max == 0 {
            0
        } else {
            (self.shield_left * 100 / self.shield_max) as u32
        }
    }

    /// A unit with no live shields takes doubled fire.
    pub fn unshielded(&self) -> bool {
        self.shield_left == 0
    }
}

/// Shots per round and damage per shot from a unit's offense. A species
/// with no military technology cannot fire at all.
fn shot_allotment(offense: u64, military: u32) -> (u32, u64) {
    if military == 0 || offense == 0 {
        return (0, 0);
    }
    let shots = (1 + (offense / OFFENSE_PER_SHOT) as u32).min(MAX_SHOTS);
    (shots, 2 * offense / u64::from(shots))
}
