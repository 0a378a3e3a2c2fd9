//! Engagement options and the actions sequenced from them.

use serde::{Deserialize, Serialize};

/// Which resolution phase is running. The strike phase follows normal
/// movement and only permits the non-atrocity options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    Combat,
    Strike,
}

/// The eight engagement codes a species can declare, in code order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EngagementOption {
    /// Defend ships and colonies where they stand.
    DefenseInPlace = 0,
    /// Defend in deep space, forcing a deep-space fight first.
    DeepSpaceDefense = 1,
    /// Defend a specific planet.
    PlanetDefense = 2,
    /// Seek battle in deep space.
    DeepSpaceFight = 3,
    /// Attack ships and defenses at a specific planet.
    PlanetAttack = 4,
    /// Bombard a planet's colonies from orbit.
    Bombardment = 5,
    /// Germ-bomb a planet's colonies.
    GermWarfare = 6,
    /// Lay siege to a planet's colonies.
    Siege = 7,
}

impl EngagementOption {
    /// Decodes a player-supplied engagement code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(EngagementOption::DefenseInPlace),
            1 => Some(EngagementOption::DeepSpaceDefense),
            2 => Some(EngagementOption::PlanetDefense),
            3 => Some(EngagementOption::DeepSpaceFight),
            4 => Some(EngagementOption::PlanetAttack),
            5 => Some(EngagementOption::Bombardment),
            6 => Some(EngagementOption::GermWarfare),
            7 => Some(EngagementOption::Siege),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Options that commit the species to attacking rather than waiting.
    pub const fn is_attack(self) -> bool {
        self.code() >= 3
    }

    /// Options scoped to one planet's orbit slot.
    pub const fn needs_orbit(self) -> bool {
        matches!(
            self,
            EngagementOption::PlanetDefense
                | EngagementOption::PlanetAttack
                | EngagementOption::Bombardment
                | EngagementOption::GermWarfare
                | EngagementOption::Siege
        )
    }

    /// The planet-scoped escalations that require control of the orbit
    /// to have been fought for first.
    pub const fn requires_orbit_control(self) -> bool {
        matches!(
            self,
            EngagementOption::Bombardment | EngagementOption::GermWarfare | EngagementOption::Siege
        )
    }

    /// Whether this option may be declared in the given phase.
    pub const fn allowed_in(self, phase: PhaseKind) -> bool {
        match phase {
            PhaseKind::Combat => true,
            PhaseKind::Strike => self.code() <= 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EngagementOption::DefenseInPlace => "defense in place",
            EngagementOption::DeepSpaceDefense => "deep space defense",
            EngagementOption::PlanetDefense => "planet defense",
            EngagementOption::DeepSpaceFight => "deep space fight",
            EngagementOption::PlanetAttack => "planet attack",
            EngagementOption::Bombardment => "bombardment",
            EngagementOption::GermWarfare => "germ warfare",
            EngagementOption::Siege => "siege",
        }
    }
}

/// One fight the sequencer scheduled: an engagement option plus the
/// orbit it applies to (0 for the deep-space options).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    pub option: EngagementOption,
    pub orbit: u8,
}

impl Action {
    pub const fn new(option: EngagementOption, orbit: u8) -> Self {
        Action { option, orbit }
    }
}
