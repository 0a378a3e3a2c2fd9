//! Tolerant species-name resolution for ATTACK and HIJACK arguments.
//!
//! Players type species names from memory, so the engine accepts minor
//! misspellings: a candidate matches when its edit distance from the
//! argument stays within one seventh of its length plus one. Numeric
//! arguments are distorted-identity aliases and must match exactly, and
//! the literal `0` means every currently-declared enemy.

use crate::galaxy::Species;

/// What an ATTACK or HIJACK argument resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRef {
    /// The `0` shorthand.
    AllDeclaredEnemies,
    Species(u16),
}

/// Resolves a raw target argument against the species roster. Returns
/// `None` when nothing matches or the best match is ambiguous; the
/// caller reports that to the ordering species and drops the command.
pub fn resolve_target(raw: &str, roster: &[Species]) -> Option<TargetRef> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw == "0" {
        return Some(TargetRef::AllDeclaredEnemies);
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        let alias: u32 = raw.parse().ok()?;
        return roster
            .iter()
            .find(|sp| sp.distorted_id == alias)
            .map(|sp| TargetRef::Species(sp.id));
    }
    fuzzy_match(raw, roster).map(TargetRef::Species)
}

/// Picks the roster entry closest to `raw`, requiring both a qualifying
/// score and a strictly better score than the runner-up. A tie means
/// the argument is ambiguous and nothing is returned.
fn fuzzy_match(raw: &str, roster: &[Species]) -> Option<u16> {
    let raw_lower = raw.to_ascii_lowercase();
    let mut best: Option<(u16, isize)> = None;
    let mut contested = false;
    for sp in roster {
        let name_lower = sp.name.to_ascii_lowercase();
        let len = name_lower.len() as isize;
        let score = len - edit_distance(raw_lower.as_bytes(), name_lower.as_bytes()) as isize;
        if score < len - (len / 7 + 1) {
            continue;
        }
        match best {
            Some((_, top)) if score > top => {
                best = Some((sp.id, score));
                contested = false;
            }
            Some((_, top)) if score == top => contested = true,
            Some(_) => {}
            None => best = Some((sp.id, score)),
        }
    }
    if contested {
        None
    } else {
        best.map(|(id, _)| id)
    }
}

/// Edit distance with substitutions, insertions, deletions, and
/// adjacent transpositions all costing one.
fn edit_distance(a: &[u8], b: &[u8]) -> usize {
    let (m, n) = (a.len(), b.len());
    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }
    let mut dist = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dist.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dist[0][j] = j;
    }
    for i in 1..=m {
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut d = (dist[i - 1][j] + 1)
                .min(dist[i][j - 1] + 1)
                .min(dist[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                d = d.min(dist[i - 2][j - 2] + 1);
            }
            dist[i][j] = d;
        }
    }
    dist[m][n]
}
