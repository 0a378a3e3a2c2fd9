//! Cargo and installation item types.
//!
//! Inventories are `BTreeMap<Item, u32>` everywhere so that iteration
//! order, and therefore report order and dice consumption, is identical
//! from run to run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything a ship hold or colony stockpile can contain. Gun and
/// shield generators carry their mark (1..=9) inline.
///
/// Items serialize as their two-letter codes ("RM", "GU5") so they can
/// key JSON inventory maps directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Item {
    RawMaterials,
    ColonistUnits,
    MiningUnits,
    ManufacturingUnits,
    StarbaseUnits,
    PlanetaryDefense,
    FieldDistortion,
    ForcedJump,
    ForcedMisjump,
    GermBomb,
    Gun(u8),
    Shield(u8),
}

impl Item {
    /// Build cost per unit in economic units. Hijack salvage credits
    /// half of this for every item aboard the captured ship.
    pub fn cost(self) -> u64 {
        match self {
            Item::RawMaterials | Item::ColonistUnits => 1,
            Item::MiningUnits | Item::ManufacturingUnits => 1,
            Item::StarbaseUnits => 110,
            Item::PlanetaryDefense => 1,
            Item::FieldDistortion => 50,
            Item::ForcedJump | Item::ForcedMisjump => 100,
            Item::GermBomb => 1000,
            Item::Gun(mark) | Item::Shield(mark) => 250 * u64::from(mark),
        }
    }

    /// Mark of a gun generator, if this is one.
    pub fn gun_mark(self) -> Option<u8> {
        match self {
            Item::Gun(mark) => Some(mark),
            _ => None,
        }
    }

    /// Mark of a shield generator, if this is one.
    pub fn shield_mark(self) -> Option<u8> {
        match self {
            Item::Shield(mark) => Some(mark),
            _ => None,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::RawMaterials => write!(f, "RM"),
            Item::ColonistUnits => write!(f, "CU"),
            Item::MiningUnits => write!(f, "IU"),
            Item::ManufacturingUnits => write!(f, "AU"),
            Item::StarbaseUnits => write!(f, "SU"),
            Item::PlanetaryDefense => write!(f, "PD"),
            Item::FieldDistortion => write!(f, "FD"),
            Item::ForcedJump => write!(f, "FJ"),
            Item::ForcedMisjump => write!(f, "FM"),
            Item::GermBomb => write!(f, "GW"),
            Item::Gun(mark) => write!(f, "GU{mark}"),
            Item::Shield(mark) => write!(f, "SG{mark}"),
        }
    }
}

impl From<Item> for String {
    fn from(item: Item) -> String {
        item.to_string()
    }
}

impl TryFrom<String> for Item {
    type Error = String;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        let item = match code.as_str() {
            "RM" => Item::RawMaterials,
            "CU" => Item::ColonistUnits,
            "IU" => Item::MiningUnits,
            "AU" => Item::ManufacturingUnits,
            "SU" => Item::StarbaseUnits,
            "PD" => Item::PlanetaryDefense,
            "FD" => Item::FieldDistortion,
            "FJ" => Item::ForcedJump,
            "FM" => Item::ForcedMisjump,
            "GW" => Item::GermBomb,
            other => {
                let mark = other
                    .get(2..)
                    .and_then(|m| m.parse::<u8>().ok())
                    .filter(|m| (1..=9).contains(m));
                match (other.get(..2), mark) {
                    (Some("GU"), Some(mark)) => Item::Gun(mark),
                    (Some("SG"), Some(mark)) => Item::Shield(mark),
                    _ => return Err(format!("unknown item code {code:?}")),
                }
            }
        };
        Ok(item)
    }
}
