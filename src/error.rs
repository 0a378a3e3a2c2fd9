//! Fatal error conditions for the combat engine.
//!
//! Recoverable problems (a malformed order, a name that matches no
//! species) never surface here; they are echoed into the offending
//! species' report and resolution continues. A `CombatError` means the
//! turn snapshot itself is inconsistent and the whole phase must abort.

use thiserror::Error;

use crate::galaxy::Coords;

/// Errors that abort combat resolution for the entire turn.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CombatError {
    #[error("transaction ledger full ({0} entries)")]
    TransactionOverflow(usize),

    #[error("species {0} referenced by orders does not exist")]
    MissingSpecies(u16),

    #[error("ship index {index} out of range at {location}")]
    MissingShip { index: usize, location: Coords },

    #[error("colony index {index} out of range at {location}")]
    MissingColony { index: usize, location: Coords },
}
