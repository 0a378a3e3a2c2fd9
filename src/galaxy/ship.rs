//! Ships, ship classes, and transient per-battle ship state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::galaxy::coords::Coords;
use crate::galaxy::item::Item;

/// A ship older than this has taken fatal structural damage.
pub const MAX_SERVICE_AGE: u32 = 49;

/// Hull classes, ordered by standard tonnage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShipClass {
    PicketBoat = 0,
    Corvette = 1,
    Escort = 2,
    Frigate = 3,
    Destroyer = 4,
    LightCruiser = 5,
    StrikeCruiser = 6,
    HeavyCruiser = 7,
    CommandCruiser = 8,
    Battlecruiser = 9,
    Battleship = 10,
    Dreadnought = 11,
    SuperDreadnought = 12,
    Battlemoon = 13,
    Battleworld = 14,
    Battlestar = 15,
    Transport = 16,
    Starbase = 17,
}

struct ClassInfo {
    abbr: &'static str,
    name: &'static str,
    /// Standard tonnage for warship hulls; transports and starbases are
    /// sized per ship, so their entry here is zero.
    tonnage: u32,
}

const CLASS_INFO: [ClassInfo; 18] = [
    ClassInfo { abbr: "PB", name: "Picketboat", tonnage: 1 },
    ClassInfo { abbr: "CT", name: "Corvette", tonnage: 2 },
    ClassInfo { abbr: "ES", name: "Escort", tonnage: 5 },
    ClassInfo { abbr: "FF", name: "Frigate", tonnage: 10 },
    ClassInfo { abbr: "DD", name: "Destroyer", tonnage: 15 },
    ClassInfo { abbr: "CL", name: "Light Cruiser", tonnage: 20 },
    ClassInfo { abbr: "CS", name: "Strike Cruiser", tonnage: 25 },
    ClassInfo { abbr: "CA", name: "Heavy Cruiser", tonnage: 30 },
    ClassInfo { abbr: "CC", name: "Command Cruiser", tonnage: 35 },
    ClassInfo { abbr: "BC", name: "Battlecruiser", tonnage: 40 },
    ClassInfo { abbr: "BS", name: "Battleship", tonnage: 45 },
    ClassInfo { abbr: "DN", name: "Dreadnought", tonnage: 50 },
    ClassInfo { abbr: "SD", name: "Super Dreadnought", tonnage: 55 },
    ClassInfo { abbr: "BM", name: "Battlemoon", tonnage: 60 },
    ClassInfo { abbr: "BW", name: "Battleworld", tonnage: 65 },
    ClassInfo { abbr: "BB", name: "Battlestar", tonnage: 70 },
    ClassInfo { abbr: "TR", name: "Transport", tonnage: 0 },
    ClassInfo { abbr: "BA", name: "Starbase", tonnage: 0 },
];

impl ShipClass {
    pub const fn abbr(self) -> &'static str {
        CLASS_INFO[self as usize].abbr
    }

    pub const fn name(self) -> &'static str {
        CLASS_INFO[self as usize].name
    }

    /// Standard tonnage of the hull, or `None` for the sized classes.
    pub const fn standard_tonnage(self) -> Option<u32> {
        let t = CLASS_INFO[self as usize].tonnage;
        if t == 0 {
            None
        } else {
            Some(t)
        }
    }

    pub const fn is_transport(self) -> bool {
        matches!(self, ShipClass::Transport)
    }

    pub const fn is_starbase(self) -> bool {
        matches!(self, ShipClass::Starbase)
    }

    pub const fn is_warship(self) -> bool {
        !self.is_transport() && !self.is_starbase()
    }
}

/// Where a ship is and what it is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipStatus {
    UnderConstruction,
    OnSurface,
    InOrbit,
    InDeepSpace,
    /// Jumped away mid-battle; will arrive at its destination next turn.
    JumpedInCombat,
    /// Thrown out of the sector by a forced-jump or misjump unit.
    ForcedJump,
}

/// Per-battle state that never leaves the engine. Reset when a ship's
/// location comes under battle, persisted across the actions within
/// that battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipCombatState {
    /// Percentage of shield strength remaining, 0..=100.
    pub shield_pct: u32,
    /// A field-distorted ship stays anonymous until hull damage
    /// exposes it.
    pub distortion_revealed: bool,
    /// Set by a HIDE order; the ship sits out the battle on the surface.
    pub non_combatant: bool,
}

impl Default for ShipCombatState {
    fn default() -> Self {
        ShipCombatState {
            shield_pct: 100,
            distortion_revealed: false,
            non_combatant: false,
        }
    }
}

/// A single ship in the galaxy snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub owner: u16,
    pub name: String,
    pub class: ShipClass,
    pub tonnage: u32,
    pub coords: Coords,
    /// Orbit slot 1..=9, or 0 for deep space.
    pub orbit: u8,
    pub status: ShipStatus,
    /// Years of accumulated wear. Hull damage converts to age; past
    /// [`MAX_SERVICE_AGE`] the ship breaks up.
    pub age: u32,
    /// Set when the ship arrived through a natural wormhole this turn.
    #[serde(default)]
    pub via_wormhole: bool,
    /// Jump destination for ships leaving the sector.
    #[serde(default)]
    pub dest: Option<Coords>,
    #[serde(default)]
    pub inventory: BTreeMap<Item, u32>,
    #[serde(skip)]
    pub combat: ShipCombatState,
}

impl Ship {
    pub fn item_qty(&self, item: Item) -> u32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    pub fn is_destroyed(&self) -> bool {
        self.age > MAX_SERVICE_AGE
    }

    pub fn in_deep_space(&self) -> bool {
        self.orbit == 0
    }

    /// A full load of field-distortion units masks the ship's owner and
    /// name from everyone else's reports.
    pub fn fully_distorted(&self) -> bool {
        self.tonnage > 0 && self.item_qty(Item::FieldDistortion) >= self.tonnage
    }

    /// Original build cost in economic units; the base for hijack
    /// salvage value.
    pub fn original_cost(&self) -> u64 {
        let rate = if self.class.is_transport() { 50 } else { 100 };
        u64::from(self.tonnage) * rate
    }

    /// Class abbreviation plus name, the way reports identify ships.
    pub fn classed_name(&self) -> String {
        format!("{} {}", self.class.abbr(), self.name)
    }

    /// True when the ship is physically present and finished; surface
    /// ships count because they can still be caught in a planet attack.
    pub fn present_for_battle(&self) -> bool {
        matches!(
            self.status,
            ShipStatus::OnSurface | ShipStatus::InOrbit | ShipStatus::InDeepSpace
        )
    }

    /// The stricter test used when deciding whether a silent species is
    /// dragged into a battle at all.
    pub fn triggers_auto_join(&self) -> bool {
        matches!(self.status, ShipStatus::InOrbit | ShipStatus::InDeepSpace)
    }
}
