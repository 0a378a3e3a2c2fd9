//! Species and their diplomatic stance toward each other.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::galaxy::tech::TechLevels;

/// One player species. Ids are assigned by the host, start at 1, and
/// never change over the life of a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    pub id: u16,
    pub name: String,
    /// Alias shown for this species' field-distorted ships.
    pub distorted_id: u32,
    pub tech: TechLevels,
    #[serde(default)]
    pub allies: BTreeSet<u16>,
    #[serde(default)]
    pub enemies: BTreeSet<u16>,
    /// Species this one has met; enmity only propagates along contact.
    #[serde(default)]
    pub contacts: BTreeSet<u16>,
    #[serde(default)]
    pub econ_units: i64,
}

impl Species {
    pub fn is_ally(&self, other: u16) -> bool {
        self.allies.contains(&other)
    }

    pub fn is_enemy(&self, other: u16) -> bool {
        self.enemies.contains(&other)
    }

    pub fn has_contact(&self, other: u16) -> bool {
        self.contacts.contains(&other)
    }

    /// Declares enmity, displacing any standing alliance.
    pub fn declare_enemy(&mut self, other: u16) {
        self.allies.remove(&other);
        self.enemies.insert(other);
    }
}
