//! Action sequencing: ordering the fights within one battle.
//!
//! A battle breaks down into a sequence of actions, each an engagement
//! option at one orbit. If anyone declared a deep-space defense, a
//! deep-space fight is forced to the front so attackers must get past
//! the picket line first. The planet-scoped escalations (bombardment,
//! germ warfare, siege) each require a planet attack at the same orbit
//! to have been scheduled before them, inserting one if the attacker
//! forgot to declare it. A species that named a target but no attacking
//! engagement still gets a deep-space fight to press the attack in.

use crate::combat::battle::Battle;
use crate::combat::options::{Action, EngagementOption};

/// Produces the action list for a battle, in fight order. Duplicate
/// declarations collapse to a single action; the first species to name
/// a fight fixes its position.
pub fn sequence_actions(battle: &Battle) -> Vec<Action> {
    let mut actions: Vec<Action> = Vec::new();

    let picket_line = battle
        .entries
        .iter()
        .any(|e| e.has_option(EngagementOption::DeepSpaceDefense));
    if picket_line {
        push_unique(
            &mut actions,
            Action::new(EngagementOption::DeepSpaceFight, 0),
        );
    }

    for entry in &battle.entries {
        for &(option, orbit) in &entry.options {
            // The picket declaration itself is not a separate fight.
            if option == EngagementOption::DeepSpaceDefense {
                continue;
            }
            let action = Action::new(option, orbit);
            if option.requires_orbit_control() {
                push_unique(
                    &mut actions,
                    Action::new(EngagementOption::PlanetAttack, orbit),
                );
            }
            push_unique(&mut actions, action);
        }
    }

    if battle.entries.iter().any(|e| e.bare_attacker()) {
        push_unique(
            &mut actions,
            Action::new(EngagementOption::DeepSpaceFight, 0),
        );
    }

    actions
}

fn push_unique(actions: &mut Vec<Action>, action: Action) {
    if !actions.contains(&action) {
        actions.push(action);
    }
}

/// Whether the battle opened behind a declared deep-space picket; the
/// forced opening fight is round-limited by the military gap.
pub fn has_picket_line(battle: &Battle) -> bool {
    battle
        .entries
        .iter()
        .any(|e| e.has_option(EngagementOption::DeepSpaceDefense))
}
