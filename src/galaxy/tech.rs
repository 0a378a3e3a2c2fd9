//! Technology levels.

use serde::{Deserialize, Serialize};

/// The six research tracks a species can advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Technology {
    Mining = 0,
    Manufacturing = 1,
    Military = 2,
    Gravitics = 3,
    LifeSupport = 4,
    Biology = 5,
}

impl Technology {
    /// Two-letter abbreviation used in reports.
    pub const fn abbr(self) -> &'static str {
        match self {
            Technology::Mining => "MI",
            Technology::Manufacturing => "MA",
            Technology::Military => "ML",
            Technology::Gravitics => "GV",
            Technology::LifeSupport => "LS",
            Technology::Biology => "BI",
        }
    }
}

/// A species' current level in each track. Levels only matter to combat
/// through ratios and percentage bonuses, so plain integers suffice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TechLevels {
    pub mining: u32,
    pub manufacturing: u32,
    pub military: u32,
    pub gravitics: u32,
    pub life_support: u32,
    pub biology: u32,
}

impl TechLevels {
    pub fn level(&self, tech: Technology) -> u32 {
        match tech {
            Technology::Mining => self.mining,
            Technology::Manufacturing => self.manufacturing,
            Technology::Military => self.military,
            Technology::Gravitics => self.gravitics,
            Technology::LifeSupport => self.life_support,
            Technology::Biology => self.biology,
        }
    }
}
