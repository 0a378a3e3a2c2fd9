//! Combat order types.
//!
//! Represents the full set of combat commands a species can submit for
//! one turn: battle declaration, engagement options, withdrawal policy,
//! targeting, and hostility declarations. The host's order pipeline has
//! already tokenized player text; the engine receives these structured
//! forms and revalidates every argument itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::galaxy::Coords;

/// Target classes a species can concentrate fire on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetClass {
    Warships,
    Transports,
    Starbases,
    PlanetaryDefenses,
}

impl TargetClass {
    pub const fn label(self) -> &'static str {
        match self {
            TargetClass::Warships => "warships",
            TargetClass::Transports => "transports",
            TargetClass::Starbases => "starbases",
            TargetClass::PlanetaryDefenses => "planetary defenses",
        }
    }

    /// The numeric code players write in TARGET orders.
    pub const fn code(self) -> u8 {
        match self {
            TargetClass::Warships => 1,
            TargetClass::Transports => 2,
            TargetClass::Starbases => 3,
            TargetClass::PlanetaryDefenses => 4,
        }
    }
}

/// A single combat command, scoped to the most recent `Battle` in the
/// same species' command list.
///
/// Each variant carries exactly the data its validation needs; nothing
/// here implies the command is legal, only that it was well-formed
/// enough to structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatCommand {
    /// Battle: opens (or joins) the battle at a sector. All commands
    /// that follow apply to this battle until the next `Battle`.
    Battle { coords: Coords },

    /// Summary: trims this species' report for the current battle down
    /// to totals.
    Summary,

    /// Withdraw: damage thresholds that trigger retreat, as ages for
    /// transports and warships and a destroyed-percentage for the
    /// fleet. All three are clamped to 0..=100.
    Withdraw {
        transports: u32,
        warships: u32,
        fleet_percent: u32,
    },

    /// Haven: the sector withdrawing ships jump to.
    Haven { coords: Coords },

    /// Engage: one engagement option, with an orbit slot for the
    /// planet-scoped options.
    Engage { code: u8, orbit: Option<u8> },

    /// Hide: keeps a landed ship out of the battle.
    Hide { ship: String },

    /// Target: concentrate fire on one class of target.
    Target { preference: TargetClass },

    /// Attack: declares hostility toward a species, named loosely.
    /// `"0"` expands to every currently-declared enemy.
    Attack { target: String },

    /// Hijack: like `Attack`, but fighting to capture rather than kill.
    Hijack { target: String },
}

impl fmt::Display for CombatCommand {
    /// Renders the command back in order-sheet form, for echoing
    /// ignored orders into reports.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatCommand::Battle { coords } => write!(f, "BATTLE {coords}"),
            CombatCommand::Summary => write!(f, "SUMMARY"),
            CombatCommand::Withdraw {
                transports,
                warships,
                fleet_percent,
            } => write!(f, "WITHDRAW {transports} {warships} {fleet_percent}"),
            CombatCommand::Haven { coords } => write!(f, "HAVEN {coords}"),
            CombatCommand::Engage { code, orbit } => match orbit {
                Some(orbit) => write!(f, "ENGAGE {code} {orbit}"),
                None => write!(f, "ENGAGE {code}"),
            },
            CombatCommand::Hide { ship } => write!(f, "HIDE {ship}"),
            CombatCommand::Target { preference } => write!(f, "TARGET {}", preference.code()),
            CombatCommand::Attack { target } => write!(f, "ATTACK {target}"),
            CombatCommand::Hijack { target } => write!(f, "HIJACK {target}"),
        }
    }
}

/// All combat commands one species submitted this turn, in the order
/// the player wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesOrders {
    pub species: u16,
    pub commands: Vec<CombatCommand>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_echo_in_order_sheet_form() {
        let cmd = CombatCommand::Engage {
            code: 4,
            orbit: Some(2),
        };
        assert_eq!(cmd.to_string(), "ENGAGE 4 2");
        let cmd = CombatCommand::Withdraw {
            transports: 0,
            warships: 50,
            fleet_percent: 100,
        };
        assert_eq!(cmd.to_string(), "WITHDRAW 0 50 100");
        let cmd = CombatCommand::Target {
            preference: TargetClass::Transports,
        };
        assert_eq!(cmd.to_string(), "TARGET 2");
    }

    #[test]
    fn orders_serialize_round_trip() {
        let orders = SpeciesOrders {
            species: 3,
            commands: vec![
                CombatCommand::Battle {
                    coords: Coords::new(10, 10, 10),
                },
                CombatCommand::Engage {
                    code: 4,
                    orbit: Some(2),
                },
                CombatCommand::Attack {
                    target: "Klaxxon".into(),
                },
            ],
        };
        let json = serde_json::to_string(&orders).unwrap();
        let back: SpeciesOrders = serde_json::from_str(&json).unwrap();
        assert_eq!(back, orders);
    }
}
