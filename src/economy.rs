//! Inter-species economic transactions raised by combat.
//!
//! Combat itself never moves economic units between species directly
//! except for hijack salvage; everything else goes through the ledger
//! so the economic phase can settle it. The ledger is capacity-bounded
//! and running it over is a snapshot-consistency failure.

use serde::{Deserialize, Serialize};

use crate::error::CombatError;
use crate::galaxy::Coords;

/// Maximum number of transactions one turn can raise.
pub const MAX_TRANSACTIONS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Loot recovered from a colony wiped out by germ warfare.
    Looting,
    /// A standing siege of a colony by one ship.
    Besiege,
}

/// One economic consequence of combat, settled later by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    /// Species paying or suffering the transaction.
    pub donor: u16,
    /// Species benefiting from it.
    pub recipient: u16,
    pub value: u64,
    pub location: Coords,
    pub orbit: u8,
    /// Ship or attacker description, kind-dependent.
    pub name1: String,
    /// Colony or victim description, kind-dependent.
    pub name2: String,
}

/// Append-only transaction store with a hard capacity.
#[derive(Debug, Clone, Default)]
pub struct TransactionLedger {
    entries: Vec<Transaction>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        TransactionLedger::default()
    }

    pub fn push(&mut self, transaction: Transaction) -> Result<(), CombatError> {
        if self.entries.len() >= MAX_TRANSACTIONS {
            return Err(CombatError::TransactionOverflow(MAX_TRANSACTIONS));
        }
        self.entries.push(transaction);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Transaction> {
        self.entries
    }
}
