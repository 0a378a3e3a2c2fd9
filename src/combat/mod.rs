//! The battle resolver.
//!
//! A battle is assembled from per-species order sheets, sequenced into
//! actions, fought shot by shot, and settled: bombardment and germ
//! damage, hijack proceeds, sieges, and betrayed alliances. Everything
//! downstream of the order sheets is deterministic in the battle
//! generator's seed.

pub mod aftermath;
pub mod assemble;
pub mod battle;
pub mod options;
pub mod power;
pub mod rounds;
pub mod sequence;
pub mod unit;

pub use assemble::assemble_battles;
pub use battle::{Battle, BattleEntry, Hostility, SurpriseState, MAX_ENGAGE_OPTIONS};
pub use options::{Action, EngagementOption, PhaseKind};
pub use power::{bombardment_reference, power, MAX_TONNAGE};
pub use rounds::{run_action, BattleTallies, BOMBARDMENT_ROUNDS};
pub use sequence::{has_picket_line, sequence_actions};
pub use unit::{Fighter, FighterBody};
