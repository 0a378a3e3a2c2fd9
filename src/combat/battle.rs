//! Assembled battles: who is present at a sector and how they relate.

use std::collections::BTreeSet;

use crate::combat::options::EngagementOption;
use crate::galaxy::Coords;
use crate::orders::TargetClass;

/// Cap on declared engagement options per species per battle.
pub const MAX_ENGAGE_OPTIONS: usize = 20;

/// How one battle participant intends to treat another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hostility {
    #[default]
    Neutral,
    Attack,
    /// Fight to capture; quarters the aggressor's combat power.
    Hijack,
}

/// Whether a species can still be caught off guard in this battle.
///
/// Only species dragged in silently are eligible; being attacked by a
/// trusted ally confirms the surprise, while any attack from a declared
/// non-ally is enough of a warning to spoil it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurpriseState {
    #[default]
    Ineligible,
    Eligible,
    Confirmed,
}

/// One species' stake in one battle.
#[derive(Debug, Clone)]
pub struct BattleEntry {
    pub species_id: u16,
    pub summary_only: bool,
    /// Declared (option, orbit) pairs, at most [`MAX_ENGAGE_OPTIONS`].
    pub options: Vec<(EngagementOption, u8)>,
    pub transport_withdraw_age: u32,
    pub warship_withdraw_age: u32,
    pub fleet_withdraw_percent: u32,
    pub haven: Option<Coords>,
    pub special_target: Option<TargetClass>,
    /// Whether this species issued an ATTACK or HIJACK that found its
    /// target here. Being counter-attacked does not set it.
    pub declared_attack: bool,
    pub surprise: SurpriseState,
    /// Ambush budget this species' colonies committed at the sector.
    pub ambush_amount: u64,
    /// Names of ships this species HID for the battle.
    pub hidden_ships: BTreeSet<String>,
    /// Number of ships fielded when the battle opened; the base for the
    /// fleet-percentage withdrawal check.
    pub initial_fleet: u32,
}

impl BattleEntry {
    pub fn new(species_id: u16) -> Self {
        BattleEntry {
            species_id,
            summary_only: false,
            options: Vec::new(),
            transport_withdraw_age: 0,
            warship_withdraw_age: 100,
            fleet_withdraw_percent: 100,
            haven: None,
            special_target: None,
            declared_attack: false,
            surprise: SurpriseState::Ineligible,
            ambush_amount: 0,
            hidden_ships: BTreeSet::new(),
            initial_fleet: 0,
        }
    }

    pub fn has_option(&self, option: EngagementOption) -> bool {
        self.options.iter().any(|(opt, _)| *opt == option)
    }

    /// Committed to an attack without declaring any attacking engagement
    /// of its own. Such a species presses the fight in deep space.
    pub fn bare_attacker(&self) -> bool {
        self.declared_attack && !self.options.iter().any(|(opt, _)| opt.is_attack())
    }
}

/// A battle at one sector: the participating species and the pairwise
/// hostility matrix between them, indexed by entry position.
#[derive(Debug, Clone)]
pub struct Battle {
    pub coords: Coords,
    pub entries: Vec<BattleEntry>,
    hostility: Vec<Vec<Hostility>>,
    /// Entry pairs (traitor, victim) where an ally opened fire.
    pub betrayals: Vec<(usize, usize)>,
}

impl Battle {
    pub fn new(coords: Coords) -> Self {
        Battle {
            coords,
            entries: Vec::new(),
            hostility: Vec::new(),
            betrayals: Vec::new(),
        }
    }

    pub fn entry_index(&self, species: u16) -> Option<usize> {
        self.entries.iter().position(|e| e.species_id == species)
    }

    /// Index of the species' entry, adding a fresh one (and growing the
    /// hostility matrix) if it is not yet a participant.
    pub fn ensure_entry(&mut self, species: u16) -> usize {
        if let Some(idx) = self.entry_index(species) {
            return idx;
        }
        self.entries.push(BattleEntry::new(species));
        let n = self.entries.len();
        for row in &mut self.hostility {
            row.push(Hostility::Neutral);
        }
        self.hostility.push(vec![Hostility::Neutral; n]);
        n - 1
    }

    /// Records hostility of `from` toward `to`. The reverse direction
    /// is promoted to `Attack` if still neutral, so a victim always
    /// fights back.
    pub fn declare_hostility(&mut self, from: usize, to: usize, kind: Hostility) {
        if from == to || kind == Hostility::Neutral {
            return;
        }
        self.hostility[from][to] = kind;
        if self.hostility[to][from] == Hostility::Neutral {
            self.hostility[to][from] = Hostility::Attack;
        }
    }

    pub fn hostility(&self, from: usize, to: usize) -> Hostility {
        self.hostility[from][to]
    }

    pub fn is_hostile(&self, from: usize, to: usize) -> bool {
        from != to && self.hostility[from][to] != Hostility::Neutral
    }

    /// True when any pair of entries has hostility declared.
    pub fn any_hostility(&self) -> bool {
        self.hostility
            .iter()
            .flatten()
            .any(|h| *h != Hostility::Neutral)
    }

    /// Species ids of every participant, in entry order.
    pub fn participant_ids(&self) -> Vec<u16> {
        self.entries.iter().map(|e| e.species_id).collect()
    }
}
