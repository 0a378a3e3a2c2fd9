//! Galactic coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in the galaxy. Combat locations are always whole sectors;
/// orbit slots within a sector are tracked separately on ships and
/// colonies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coords {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Coords { x, y, z }
    }

    /// Offsets each axis, clamping at zero so a jump destination never
    /// leaves the charted octant.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Coords {
            x: (self.x + dx).max(0),
            y: (self.y + dy).max(0),
            z: (self.z + dz).max(0),
        }
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}
