//! Colonies and their combat-relevant state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::galaxy::coords::Coords;
use crate::galaxy::item::Item;

/// Status flags carried by every colony. Combat reads most of them and
/// rewrites them wholesale when a colony is obliterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ColonyFlags {
    pub home_planet: bool,
    pub colony: bool,
    pub populated: bool,
    pub mining_colony: bool,
    pub resort_colony: bool,
    pub disbanded: bool,
}

/// A planetary settlement. `mi_base`/`ma_base` are the economic bases
/// whose sum prices the colony for looting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Colony {
    pub owner: u16,
    pub name: String,
    pub coords: Coords,
    /// Orbit slot 1..=9 of the planet the colony sits on.
    pub orbit: u8,
    pub mi_base: u64,
    pub ma_base: u64,
    pub pop_units: u64,
    pub shipyards: u32,
    /// Siege effectiveness accumulated by the economic phase.
    #[serde(default)]
    pub siege_eff: i32,
    #[serde(default)]
    pub under_siege: bool,
    /// A hidden colony has dug in and does not show up to attackers.
    #[serde(default)]
    pub hidden: bool,
    /// Economic units committed to ambush defense at this location.
    #[serde(default)]
    pub use_on_ambush: u64,
    pub flags: ColonyFlags,
    #[serde(default)]
    pub inventory: BTreeMap<Item, u32>,
}

impl Colony {
    pub fn item_qty(&self, item: Item) -> u32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    pub fn pd_units(&self) -> u32 {
        self.item_qty(Item::PlanetaryDefense)
    }

    /// Effective tonnage the defense grid fights at: one ton per 200
    /// planetary-defense units, with a floor of one while any remain.
    pub fn defense_tonnage(&self) -> u32 {
        let pd = self.pd_units();
        if pd == 0 {
            0
        } else {
            (pd / 200).max(1)
        }
    }

    /// True when anyone lives or works here. Inhabited colonies can be
    /// attacked even with no defenses to speak of.
    pub fn is_inhabited(&self) -> bool {
        self.flags.populated || self.flags.mining_colony || self.flags.resort_colony
    }

    /// True when the colony can anchor a battle on its own: populated,
    /// not abandoned, not dug in, and actually armed.
    pub fn is_combat_ready(&self) -> bool {
        self.flags.populated && !self.flags.disbanded && !self.hidden && self.pd_units() > 0
    }

    /// Loot value credited when the colony is wiped by germ warfare.
    /// Home worlds are worth five times their economic base.
    pub fn loot_value(&self) -> u64 {
        let base = self.mi_base + self.ma_base;
        if self.flags.home_planet {
            base * 5
        } else {
            base
        }
    }
}
