//! Battle assembly: turning per-species order lists into battles.
//!
//! Assembly walks every species' commands in submission order, opening
//! or joining one battle per named sector and validating each command
//! against the galaxy snapshot. Recoverable problems are echoed into
//! the offending species' report and skipped. After the ordered
//! participants are in, silent species with fighting assets at a
//! contested sector are pulled in as defenders, havens are rolled for
//! anyone who named none, and hostility declarations are folded into
//! each battle's pairwise matrix.

use std::collections::BTreeSet;

use crate::combat::battle::{Battle, Hostility, SurpriseState, MAX_ENGAGE_OPTIONS};
use crate::combat::options::{EngagementOption, PhaseKind};
use crate::error::CombatError;
use crate::galaxy::{Galaxy, LocationIndex, ShipStatus, Species};
use crate::orders::{resolve_target, CombatCommand, SpeciesOrders, TargetRef};
use crate::report::{LogLevel, ReportSet};
use crate::rng::CombatRng;

/// One ATTACK or HIJACK that survived validation, applied to the
/// hostility matrix after all species are entered.
#[derive(Debug, Clone, Copy)]
struct Declaration {
    from: u16,
    to: u16,
    hijack: bool,
}

/// Assembles all battles for the turn. The returned battles are in the
/// order their sectors were first named, which also fixes the order
/// they will be fought and the order haven dice are consumed.
pub fn assemble_battles(
    galaxy: &Galaxy,
    orders: &[SpeciesOrders],
    index: &LocationIndex,
    phase: PhaseKind,
    rng: &mut CombatRng,
    reports: &mut ReportSet,
) -> Result<Vec<Battle>, CombatError> {
    let mut battles: Vec<Battle> = Vec::new();
    let mut declarations: Vec<Vec<Declaration>> = Vec::new();

    for species_orders in orders {
        let species = galaxy
            .species_by_id(species_orders.species)
            .ok_or(CombatError::MissingSpecies(species_orders.species))?;
        apply_species_orders(
            galaxy,
            species,
            species_orders,
            index,
            phase,
            reports,
            &mut battles,
            &mut declarations,
        );
    }

    for battle in &mut battles {
        default_options(battle);
    }
    auto_join(galaxy, index, &mut battles);
    for battle in &mut battles {
        collect_ambush_budgets(galaxy, battle);
    }
    roll_havens(&mut battles, rng);
    for (battle, decls) in battles.iter_mut().zip(&declarations) {
        apply_declarations(galaxy, battle, decls);
    }

    Ok(battles)
}

/// Walks one species' command list, entering battles and filling its
/// entries. Commands before the first valid BATTLE, or after one that
/// failed validation, are dropped with a notice.
#[allow(clippy::too_many_arguments)]
fn apply_species_orders(
    galaxy: &Galaxy,
    species: &Species,
    species_orders: &SpeciesOrders,
    index: &LocationIndex,
    phase: PhaseKind,
    reports: &mut ReportSet,
    battles: &mut Vec<Battle>,
    declarations: &mut Vec<Vec<Declaration>>,
) {
    let sid = species.id;
    let mut current: Option<(usize, usize)> = None;

    for cmd in &species_orders.commands {
        if let CombatCommand::Battle { coords } = cmd {
            if !index.occupies(sid, *coords) {
                ignore(reports, sid, cmd, "you have no presence at that location");
                current = None;
                continue;
            }
            let bidx = match battles.iter().position(|b| b.coords == *coords) {
                Some(i) => i,
                None => {
                    battles.push(Battle::new(*coords));
                    declarations.push(Vec::new());
                    battles.len() - 1
                }
            };
            let eidx = battles[bidx].ensure_entry(sid);
            current = Some((bidx, eidx));
            continue;
        }

        let Some((bidx, eidx)) = current else {
            ignore(reports, sid, cmd, "no BATTLE order given first");
            continue;
        };
        let battle_coords = battles[bidx].coords;

        match cmd {
            CombatCommand::Battle { .. } => unreachable!("handled above"),
            CombatCommand::Summary => {
                battles[bidx].entries[eidx].summary_only = true;
            }
            CombatCommand::Withdraw {
                transports,
                warships,
                fleet_percent,
            } => {
                let entry = &mut battles[bidx].entries[eidx];
                entry.transport_withdraw_age = (*transports).min(100);
                entry.warship_withdraw_age = (*warships).min(100);
                entry.fleet_withdraw_percent = (*fleet_percent).min(100);
            }
            CombatCommand::Haven { coords } => {
                battles[bidx].entries[eidx].haven = Some(*coords);
            }
            CombatCommand::Engage { code, orbit } => {
                let Some(option) = EngagementOption::from_code(*code) else {
                    ignore(reports, sid, cmd, "invalid engagement option");
                    continue;
                };
                if !option.allowed_in(phase) {
                    ignore(reports, sid, cmd, "option not allowed during a strike");
                    continue;
                }
                let orbit = if option.needs_orbit() {
                    match orbit {
                        Some(o) if (1..=9).contains(o) => *o,
                        _ => {
                            ignore(reports, sid, cmd, "option requires an orbit from 1 to 9");
                            continue;
                        }
                    }
                } else {
                    0
                };
                let entry = &mut battles[bidx].entries[eidx];
                if entry.options.len() >= MAX_ENGAGE_OPTIONS {
                    ignore(reports, sid, cmd, "too many engagement options");
                    continue;
                }
                entry.options.push((option, orbit));
            }
            CombatCommand::Hide { ship } => {
                let found = galaxy.ships.iter().find(|s| {
                    s.owner == sid
                        && s.coords == battle_coords
                        && s.name.eq_ignore_ascii_case(ship)
                });
                match found {
                    Some(s) if s.status == ShipStatus::OnSurface => {
                        battles[bidx].entries[eidx].hidden_ships.insert(s.name.clone());
                    }
                    Some(_) => ignore(reports, sid, cmd, "ship is not landed"),
                    None => ignore(reports, sid, cmd, "you have no such ship there"),
                }
            }
            CombatCommand::Target { preference } => {
                battles[bidx].entries[eidx].special_target = Some(*preference);
            }
            CombatCommand::Attack { target } | CombatCommand::Hijack { target } => {
                let hijack = matches!(cmd, CombatCommand::Hijack { .. });
                match resolve_target(target, &galaxy.species) {
                    Some(TargetRef::AllDeclaredEnemies) => {
                        if species.enemies.is_empty() {
                            ignore(reports, sid, cmd, "you have no declared enemies");
                        }
                        for &enemy in &species.enemies {
                            declarations[bidx].push(Declaration {
                                from: sid,
                                to: enemy,
                                hijack,
                            });
                        }
                    }
                    Some(TargetRef::Species(to)) if to == sid => {
                        ignore(reports, sid, cmd, "you cannot attack yourself");
                    }
                    Some(TargetRef::Species(to)) => {
                        declarations[bidx].push(Declaration {
                            from: sid,
                            to,
                            hijack,
                        });
                    }
                    None => ignore(reports, sid, cmd, "no species matches that name"),
                }
            }
        }
    }
}

fn ignore(reports: &mut ReportSet, sid: u16, cmd: &CombatCommand, reason: &str) {
    reports.log(
        sid,
        LogLevel::Summary,
        &format!("!!! Order ignored, {reason}: {cmd}"),
    );
}

/// A participant that declared nothing defends in place.
fn default_options(battle: &mut Battle) {
    for entry in &mut battle.entries {
        if entry.options.is_empty() {
            entry.options.push((EngagementOption::DefenseInPlace, 0));
        }
    }
}

/// Pulls silent species into battles at sectors where they keep combat
/// assets. They come in as defenders-in-place with a planet defense for
/// each armed colony, eligible to be caught by surprise.
fn auto_join(galaxy: &Galaxy, index: &LocationIndex, battles: &mut [Battle]) {
    for battle in battles.iter_mut() {
        let present: Vec<u16> = index.species_at(battle.coords).collect();
        for sid in present {
            if battle.entry_index(sid).is_some() {
                continue;
            }
            let mut colony_present = false;
            let mut orbits: BTreeSet<u8> = BTreeSet::new();
            for colony in galaxy
                .colonies
                .iter()
                .filter(|c| c.owner == sid && c.coords == battle.coords)
            {
                if colony.flags.disbanded || !colony.is_inhabited() {
                    continue;
                }
                // A dug-in colony stays out of sight until someone
                // explicitly goes after its orbit.
                if colony.hidden && !orbit_under_attack(battle, sid, colony.orbit) {
                    continue;
                }
                colony_present = true;
                if colony.pd_units() > 0 {
                    orbits.insert(colony.orbit);
                }
            }
            let has_ships = galaxy
                .ships
                .iter()
                .any(|s| s.owner == sid && s.coords == battle.coords && s.triggers_auto_join());
            if !colony_present && !has_ships {
                continue;
            }
            let eidx = battle.ensure_entry(sid);
            let entry = &mut battle.entries[eidx];
            entry.surprise = SurpriseState::Eligible;
            entry.options.push((EngagementOption::DefenseInPlace, 0));
            for orbit in orbits {
                entry.options.push((EngagementOption::PlanetDefense, orbit));
            }
        }
    }
}

fn orbit_under_attack(battle: &Battle, victim: u16, orbit: u8) -> bool {
    battle.entries.iter().any(|e| {
        e.species_id != victim
            && e.options
                .iter()
                .any(|(opt, o)| opt.is_attack() && opt.needs_orbit() && *o == orbit)
    })
}

/// Sums the ambush budget each participant's colonies committed at the
/// battle sector.
fn collect_ambush_budgets(galaxy: &Galaxy, battle: &mut Battle) {
    for entry in &mut battle.entries {
        entry.ambush_amount = galaxy
            .colonies
            .iter()
            .filter(|c| c.owner == entry.species_id && c.coords == battle.coords)
            .map(|c| c.use_on_ambush)
            .sum();
    }
}

/// Rolls a retreat sector for every entry that named no haven: a
/// nonzero offset of up to two parsecs on each axis.
fn roll_havens(battles: &mut [Battle], rng: &mut CombatRng) {
    for battle in battles.iter_mut() {
        for entry in &mut battle.entries {
            if entry.haven.is_some() {
                continue;
            }
            loop {
                let dx = rng.roll(5) as i32 - 3;
                let dy = rng.roll(5) as i32 - 3;
                let dz = rng.roll(5) as i32 - 3;
                if (dx, dy, dz) != (0, 0, 0) {
                    entry.haven = Some(battle.coords.offset(dx, dy, dz));
                    break;
                }
            }
        }
    }
}

/// Applies the surviving ATTACK/HIJACK declarations to the hostility
/// matrix, settles surprise, and records betrayals of standing allies.
fn apply_declarations(galaxy: &Galaxy, battle: &mut Battle, declarations: &[Declaration]) {
    for decl in declarations {
        let Some(from) = battle.entry_index(decl.from) else {
            continue;
        };
        let Some(to) = battle.entry_index(decl.to) else {
            // Target species is not at the sector; nothing to fight.
            continue;
        };
        let kind = if decl.hijack {
            Hostility::Hijack
        } else {
            Hostility::Attack
        };
        battle.declare_hostility(from, to, kind);
        battle.entries[from].declared_attack = true;

        let victim_trusts_attacker = galaxy
            .species_by_id(decl.to)
            .is_some_and(|v| v.is_ally(decl.from));
        if victim_trusts_attacker {
            if battle.entries[to].surprise == SurpriseState::Eligible {
                battle.entries[to].surprise = SurpriseState::Confirmed;
            }
            if !battle.betrayals.contains(&(from, to)) {
                battle.betrayals.push((from, to));
            }
        } else {
            // Any attack from a declared non-ally is warning enough.
            battle.entries[to].surprise = SurpriseState::Ineligible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::{
        Colony, ColonyFlags, Coords, Item, Ship, ShipClass, ShipCombatState, Species, TechLevels,
    };
    use std::collections::BTreeMap;

    fn species(id: u16, name: &str) -> Species {
        Species {
            id,
            name: name.into(),
            distorted_id: 100 + u32::from(id),
            tech: TechLevels {
                military: 10,
                life_support: 10,
                ..TechLevels::default()
            },
            allies: BTreeSet::new(),
            enemies: BTreeSet::new(),
            contacts: BTreeSet::new(),
            econ_units: 0,
        }
    }

    fn ship(owner: u16, name: &str, at: Coords, status: ShipStatus) -> Ship {
        Ship {
            owner,
            name: name.into(),
            class: ShipClass::LightCruiser,
            tonnage: 20,
            coords: at,
            orbit: 0,
            status,
            age: 0,
            via_wormhole: false,
            dest: None,
            inventory: BTreeMap::new(),
            combat: ShipCombatState::default(),
        }
    }

    fn colony(owner: u16, name: &str, at: Coords, orbit: u8, pd: u32) -> Colony {
        let mut inventory = BTreeMap::new();
        if pd > 0 {
            inventory.insert(Item::PlanetaryDefense, pd);
        }
        Colony {
            owner,
            name: name.into(),
            coords: at,
            orbit,
            mi_base: 50,
            ma_base: 50,
            pop_units: 500,
            shipyards: 1,
            siege_eff: 0,
            under_siege: false,
            hidden: false,
            use_on_ambush: 0,
            flags: ColonyFlags {
                colony: true,
                populated: true,
                ..ColonyFlags::default()
            },
            inventory,
        }
    }

    fn here() -> Coords {
        Coords::new(12, 7, 9)
    }

    fn two_species_galaxy() -> Galaxy {
        Galaxy {
            species: vec![species(1, "Klaxxon"), species(2, "Zebulon")],
            ships: vec![ship(1, "Avenger", here(), ShipStatus::InDeepSpace)],
            colonies: vec![colony(2, "Vega III", here(), 3, 400)],
        }
    }

    fn run(
        galaxy: &Galaxy,
        orders: &[SpeciesOrders],
        phase: PhaseKind,
    ) -> (Vec<Battle>, ReportSet) {
        let index = galaxy.location_index();
        let mut rng = CombatRng::new(12_345);
        let mut reports = ReportSet::new();
        let battles =
            assemble_battles(galaxy, orders, &index, phase, &mut rng, &mut reports).unwrap();
        (battles, reports)
    }

    fn attack_orders(target: &str) -> Vec<SpeciesOrders> {
        vec![SpeciesOrders {
            species: 1,
            commands: vec![
                CombatCommand::Battle { coords: here() },
                CombatCommand::Engage {
                    code: 4,
                    orbit: Some(3),
                },
                CombatCommand::Attack {
                    target: target.into(),
                },
            ],
        }]
    }

    #[test]
    fn silent_defender_is_pulled_in() {
        let galaxy = two_species_galaxy();
        let (battles, _) = run(&galaxy, &attack_orders("Zebulon"), PhaseKind::Combat);
        assert_eq!(battles.len(), 1);
        let battle = &battles[0];
        assert_eq!(battle.participant_ids(), vec![1, 2]);
        let defender = &battle.entries[1];
        assert!(defender.has_option(EngagementOption::DefenseInPlace));
        assert!(defender
            .options
            .contains(&(EngagementOption::PlanetDefense, 3)));
        assert!(battle.is_hostile(0, 1));
        assert!(battle.is_hostile(1, 0));
        assert!(battle.entries[0].declared_attack);
        assert!(!defender.declared_attack);
        // Attacked by a declared non-ally: warned, not surprised.
        assert_eq!(defender.surprise, SurpriseState::Ineligible);
    }

    #[test]
    fn trusted_ally_attack_confirms_surprise_and_betrayal() {
        let mut galaxy = two_species_galaxy();
        galaxy.species[1].allies.insert(1);
        let (battles, _) = run(&galaxy, &attack_orders("Zebulon"), PhaseKind::Combat);
        let battle = &battles[0];
        assert_eq!(battle.entries[1].surprise, SurpriseState::Confirmed);
        assert_eq!(battle.betrayals, vec![(0, 1)]);
    }

    #[test]
    fn commands_without_battle_are_ignored() {
        let galaxy = two_species_galaxy();
        let orders = vec![SpeciesOrders {
            species: 1,
            commands: vec![CombatCommand::Engage {
                code: 3,
                orbit: None,
            }],
        }];
        let (battles, reports) = run(&galaxy, &orders, PhaseKind::Combat);
        assert!(battles.is_empty());
        assert!(reports.report(1).contains("no BATTLE order given first"));
        assert!(reports.report(1).contains("ENGAGE 3"));
    }

    #[test]
    fn battle_requires_presence() {
        let galaxy = two_species_galaxy();
        let orders = vec![SpeciesOrders {
            species: 2,
            commands: vec![
                CombatCommand::Battle {
                    coords: Coords::new(50, 50, 50),
                },
                CombatCommand::Engage {
                    code: 3,
                    orbit: None,
                },
            ],
        }];
        let (battles, reports) = run(&galaxy, &orders, PhaseKind::Combat);
        assert!(battles.is_empty());
        assert!(reports.report(2).contains("no presence"));
        // The follow-up command must not attach to some earlier battle.
        assert!(reports.report(2).contains("no BATTLE order given first"));
    }

    #[test]
    fn engage_validation() {
        let galaxy = two_species_galaxy();
        let orders = vec![SpeciesOrders {
            species: 1,
            commands: vec![
                CombatCommand::Battle { coords: here() },
                CombatCommand::Engage {
                    code: 9,
                    orbit: None,
                },
                CombatCommand::Engage {
                    code: 4,
                    orbit: None,
                },
                CombatCommand::Engage {
                    code: 4,
                    orbit: Some(12),
                },
            ],
        }];
        let (battles, reports) = run(&galaxy, &orders, PhaseKind::Combat);
        // Nothing stuck, so the entry defaults to defense in place.
        assert_eq!(
            battles[0].entries[0].options,
            vec![(EngagementOption::DefenseInPlace, 0)]
        );
        assert!(reports.report(1).contains("invalid engagement option"));
        assert!(reports.report(1).contains("orbit from 1 to 9"));
    }

    #[test]
    fn strike_phase_rejects_atrocities() {
        let galaxy = two_species_galaxy();
        let orders = vec![SpeciesOrders {
            species: 1,
            commands: vec![
                CombatCommand::Battle { coords: here() },
                CombatCommand::Engage {
                    code: 6,
                    orbit: Some(3),
                },
            ],
        }];
        let (battles, reports) = run(&galaxy, &orders, PhaseKind::Strike);
        assert!(!battles[0].entries[0].has_option(EngagementOption::GermWarfare));
        assert!(reports.report(1).contains("not allowed during a strike"));
    }

    #[test]
    fn engage_option_cap() {
        let galaxy = two_species_galaxy();
        let mut commands = vec![CombatCommand::Battle { coords: here() }];
        for _ in 0..25 {
            commands.push(CombatCommand::Engage {
                code: 3,
                orbit: None,
            });
        }
        let orders = vec![SpeciesOrders {
            species: 1,
            commands,
        }];
        let (battles, reports) = run(&galaxy, &orders, PhaseKind::Combat);
        assert_eq!(battles[0].entries[0].options.len(), MAX_ENGAGE_OPTIONS);
        assert!(reports.report(1).contains("too many engagement options"));
    }

    #[test]
    fn withdraw_clamps_and_haven_sticks() {
        let galaxy = two_species_galaxy();
        let orders = vec![SpeciesOrders {
            species: 1,
            commands: vec![
                CombatCommand::Battle { coords: here() },
                CombatCommand::Withdraw {
                    transports: 250,
                    warships: 45,
                    fleet_percent: 101,
                },
                CombatCommand::Haven {
                    coords: Coords::new(1, 2, 3),
                },
            ],
        }];
        let (battles, _) = run(&galaxy, &orders, PhaseKind::Combat);
        let entry = &battles[0].entries[0];
        assert_eq!(entry.transport_withdraw_age, 100);
        assert_eq!(entry.warship_withdraw_age, 45);
        assert_eq!(entry.fleet_withdraw_percent, 100);
        assert_eq!(entry.haven, Some(Coords::new(1, 2, 3)));
    }

    #[test]
    fn rolled_havens_are_nearby_and_deterministic() {
        let galaxy = two_species_galaxy();
        let (a, _) = run(&galaxy, &attack_orders("Zebulon"), PhaseKind::Combat);
        let (b, _) = run(&galaxy, &attack_orders("Zebulon"), PhaseKind::Combat);
        for battle in [&a[0], &b[0]] {
            for entry in &battle.entries {
                let haven = entry.haven.unwrap();
                assert_ne!(haven, battle.coords);
                assert!((haven.x - battle.coords.x).abs() <= 2);
                assert!((haven.y - battle.coords.y).abs() <= 2);
                assert!((haven.z - battle.coords.z).abs() <= 2);
            }
        }
        assert_eq!(a[0].entries[0].haven, b[0].entries[0].haven);
        assert_eq!(a[0].entries[1].haven, b[0].entries[1].haven);
    }

    #[test]
    fn hide_requires_landed_ship() {
        let mut galaxy = two_species_galaxy();
        galaxy.ships.push(ship(1, "Lander", here(), ShipStatus::OnSurface));
        let orders = vec![SpeciesOrders {
            species: 1,
            commands: vec![
                CombatCommand::Battle { coords: here() },
                CombatCommand::Hide {
                    ship: "lander".into(),
                },
                CombatCommand::Hide {
                    ship: "Avenger".into(),
                },
                CombatCommand::Hide {
                    ship: "Ghost".into(),
                },
            ],
        }];
        let (battles, reports) = run(&galaxy, &orders, PhaseKind::Combat);
        let entry = &battles[0].entries[0];
        assert!(entry.hidden_ships.contains("Lander"));
        assert_eq!(entry.hidden_ships.len(), 1);
        assert!(reports.report(1).contains("ship is not landed"));
        assert!(reports.report(1).contains("no such ship"));
    }

    #[test]
    fn attack_zero_expands_to_declared_enemies() {
        let mut galaxy = two_species_galaxy();
        galaxy.species[0].enemies.insert(2);
        let (battles, _) = run(&galaxy, &attack_orders("0"), PhaseKind::Combat);
        assert!(battles[0].is_hostile(0, 1));
    }

    #[test]
    fn unknown_attack_target_is_reported() {
        let galaxy = two_species_galaxy();
        let (battles, reports) = run(&galaxy, &attack_orders("Xyzzyplugh"), PhaseKind::Combat);
        assert!(!battles[0].any_hostility());
        assert!(reports.report(1).contains("no species matches that name"));
    }

    #[test]
    fn hidden_colony_stays_out_until_its_orbit_is_attacked() {
        let mut galaxy = two_species_galaxy();
        galaxy.colonies[0].hidden = true;
        // The colony is species 2's only asset here, so with it hidden
        // there is nothing to pull them in.
        let orders = vec![SpeciesOrders {
            species: 1,
            commands: vec![
                CombatCommand::Battle { coords: here() },
                CombatCommand::Engage {
                    code: 3,
                    orbit: None,
                },
            ],
        }];
        let (battles, _) = run(&galaxy, &orders, PhaseKind::Combat);
        assert_eq!(battles[0].participant_ids(), vec![1]);

        // Attacking orbit 3 explicitly drags the hidden colony in.
        let (battles, _) = run(&galaxy, &attack_orders("Zebulon"), PhaseKind::Combat);
        assert_eq!(battles[0].participant_ids(), vec![1, 2]);
        assert!(battles[0].entries[1]
            .options
            .contains(&(EngagementOption::PlanetDefense, 3)));
    }

    #[test]
    fn ambush_budgets_are_summed() {
        let mut galaxy = two_species_galaxy();
        galaxy.colonies[0].use_on_ambush = 600;
        galaxy.colonies.push(colony(2, "Vega IV", here(), 4, 100));
        galaxy.colonies[1].use_on_ambush = 150;
        let (battles, _) = run(&galaxy, &attack_orders("Zebulon"), PhaseKind::Combat);
        let defender = &battles[0].entries[1];
        assert_eq!(defender.ambush_amount, 750);
    }

    #[test]
    fn orders_for_unknown_species_are_fatal() {
        let galaxy = two_species_galaxy();
        let orders = vec![SpeciesOrders {
            species: 9,
            commands: vec![CombatCommand::Battle { coords: here() }],
        }];
        let index = galaxy.location_index();
        let mut rng = CombatRng::new(1);
        let mut reports = ReportSet::new();
        let err = assemble_battles(
            &galaxy,
            &orders,
            &index,
            PhaseKind::Combat,
            &mut rng,
            &mut reports,
        )
        .unwrap_err();
        assert_eq!(err, CombatError::MissingSpecies(9));
    }

    #[test]
    fn hijack_declaration_is_kept_distinct() {
        let galaxy = two_species_galaxy();
        let orders = vec![SpeciesOrders {
            species: 1,
            commands: vec![
                CombatCommand::Battle { coords: here() },
                CombatCommand::Hijack {
                    target: "Zebulon".into(),
                },
            ],
        }];
        let (battles, _) = run(&galaxy, &orders, PhaseKind::Combat);
        assert_eq!(battles[0].hostility(0, 1), Hostility::Hijack);
        assert_eq!(battles[0].hostility(1, 0), Hostility::Attack);
    }
}
