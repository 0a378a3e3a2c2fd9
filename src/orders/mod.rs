//! Combat order structures and target-name resolution.

pub mod command;
pub mod naming;

pub use command::{CombatCommand, SpeciesOrders, TargetClass};
pub use naming::{resolve_target, TargetRef};
