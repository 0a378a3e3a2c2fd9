//! Galaxy snapshot types.
//!
//! Contains the persistent data structures the host hands the engine:
//! species, ships, colonies, coordinates, technology, and items, plus
//! the turn-wide location index built over them.

pub mod coords;
pub mod item;
pub mod planet;
pub mod ship;
pub mod species;
pub mod tech;

pub use coords::Coords;
pub use item::Item;
pub use planet::{Colony, ColonyFlags};
pub use ship::{Ship, ShipClass, ShipCombatState, ShipStatus, MAX_SERVICE_AGE};
pub use species::Species;
pub use tech::{TechLevels, Technology};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Everything combat needs to know about the game world. Ships and
/// colonies live in flat arenas and are referred to by index for the
/// duration of a phase; nothing is removed until the phase ends.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Galaxy {
    pub species: Vec<Species>,
    pub ships: Vec<Ship>,
    pub colonies: Vec<Colony>,
}

impl Galaxy {
    pub fn species_by_id(&self, id: u16) -> Option<&Species> {
        self.species.iter().find(|sp| sp.id == id)
    }

    pub fn species_by_id_mut(&mut self, id: u16) -> Option<&mut Species> {
        self.species.iter_mut().find(|sp| sp.id == id)
    }

    /// Indices of all finished, present ships a species has in a sector.
    pub fn ship_indices_at(&self, owner: u16, at: Coords) -> Vec<usize> {
        self.ships
            .iter()
            .enumerate()
            .filter(|(_, s)| s.owner == owner && s.coords == at && s.present_for_battle())
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of all colonies a species has in a sector.
    pub fn colony_indices_at(&self, owner: u16, at: Coords) -> Vec<usize> {
        self.colonies
            .iter()
            .enumerate()
            .filter(|(_, c)| c.owner == owner && c.coords == at)
            .map(|(i, _)| i)
            .collect()
    }

    /// Builds the occupancy index consulted when validating battle
    /// orders and sweeping for silent defenders.
    pub fn location_index(&self) -> LocationIndex {
        let mut map: BTreeMap<Coords, BTreeSet<u16>> = BTreeMap::new();
        for ship in &self.ships {
            map.entry(ship.coords).or_default().insert(ship.owner);
        }
        for colony in &self.colonies {
            map.entry(colony.coords).or_default().insert(colony.owner);
        }
        LocationIndex { map }
    }
}

/// Which species have any presence (ship or colony) in each sector.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    map: BTreeMap<Coords, BTreeSet<u16>>,
}

impl LocationIndex {
    pub fn occupies(&self, species: u16, at: Coords) -> bool {
        self.map.get(&at).is_some_and(|set| set.contains(&species))
    }

    /// Species present in a sector, in ascending id order.
    pub fn species_at(&self, at: Coords) -> impl Iterator<Item = u16> + '_ {
        self.map.get(&at).into_iter().flatten().copied()
    }
}
