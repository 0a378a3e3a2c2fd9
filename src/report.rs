//! Per-species combat reports.
//!
//! Every species that appears in any battle gets its own append-only
//! text buffer. Shot-by-shot narration is written at `Detail` level and
//! suppressed for species that asked for a summary of the current
//! battle; outcome lines are written at `Summary` level and always kept.

use std::collections::{BTreeMap, BTreeSet};

/// How important a report line is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Always reported: battle headers, losses, jumps, consequences.
    Summary,
    /// Shot-by-shot narration; dropped for summary-mode readers.
    Detail,
}

/// The set of report buffers for one resolution run.
#[derive(Debug, Clone, Default)]
pub struct ReportSet {
    buffers: BTreeMap<u16, String>,
    summary_only: BTreeSet<u16>,
}

impl ReportSet {
    pub fn new() -> Self {
        ReportSet::default()
    }

    /// Switches a species to summary mode for the current battle.
    pub fn set_summary(&mut self, species: u16) {
        self.summary_only.insert(species);
    }

    /// Clears all summary-mode flags; called between battles.
    pub fn reset_summary(&mut self) {
        self.summary_only.clear();
    }

    /// Appends one line to one species' report, subject to its level.
    pub fn log(&mut self, species: u16, level: LogLevel, line: &str) {
        if level == LogLevel::Detail && self.summary_only.contains(&species) {
            return;
        }
        let buf = self.buffers.entry(species).or_default();
        buf.push_str(line);
        buf.push('\n');
    }

    /// Appends the same line to several species' reports.
    pub fn broadcast(&mut self, species: &[u16], level: LogLevel, line: &str) {
        for &sp in species {
            self.log(sp, level, line);
        }
    }

    /// The accumulated report for one species; empty if it saw nothing.
    pub fn report(&self, species: u16) -> &str {
        self.buffers.get(&species).map_or("", |s| s.as_str())
    }

    /// All non-empty reports, keyed by species id.
    pub fn into_reports(self) -> BTreeMap<u16, String> {
        self.buffers
            .into_iter()
            .filter(|(_, text)| !text.is_empty())
            .collect()
    }
}
