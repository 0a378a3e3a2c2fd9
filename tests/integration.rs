//! Integration tests for the broadside binary.
//!
//! Spawns the real executable, feeds it host-shaped JSON snapshots on
//! stdin or through a file argument, and checks the printed reports,
//! ledger, and roster losses.

use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};

/// Runs the binary with the given arguments and optional stdin payload,
/// collecting stdout, stderr, and the exit status.
fn run_broadside(args: &[&str], input: Option<&str>) -> (String, String, ExitStatus) {
    let exe = env!("CARGO_BIN_EXE_broadside");
    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start broadside");

    let mut stdin = child.stdin.take().unwrap();
    if let Some(text) = input {
        stdin.write_all(text.as_bytes()).unwrap();
    }
    drop(stdin);

    let mut stdout = String::new();
    child.stdout.take().unwrap().read_to_string(&mut stdout).unwrap();
    let mut stderr = String::new();
    child.stderr.take().unwrap().read_to_string(&mut stderr).unwrap();
    let status = child.wait().expect("failed to wait on child");
    (stdout, stderr, status)
}

/// A cruiser raid on a lone frigate. The gun-heavy cruiser cannot lose
/// the opening round, so the frigate is always the wreck.
const RAID_TURN: &str = r#"{
    "seed": 9,
    "phase": "Combat",
    "galaxy": {
        "species": [
            {
                "id": 1, "name": "Klaxxon", "distorted_id": 501,
                "tech": {
                    "mining": 10, "manufacturing": 10, "military": 30,
                    "gravitics": 10, "life_support": 30, "biology": 10
                }
            },
            {
                "id": 2, "name": "Zebulon", "distorted_id": 502,
                "tech": {
                    "mining": 10, "manufacturing": 10, "military": 20,
                    "gravitics": 10, "life_support": 20, "biology": 10
                }
            }
        ],
        "ships": [
            {
                "owner": 1, "name": "Avenger", "class": "LightCruiser",
                "tonnage": 20, "coords": {"x": 1, "y": 2, "z": 3},
                "orbit": 0, "status": "InDeepSpace", "age": 0,
                "inventory": {"GU5": 2}
            },
            {
                "owner": 2, "name": "Vigilant", "class": "Frigate",
                "tonnage": 10, "coords": {"x": 1, "y": 2, "z": 3},
                "orbit": 0, "status": "InDeepSpace", "age": 0
            }
        ],
        "colonies": []
    },
    "orders": [
        {
            "species": 1,
            "commands": [
                {"Battle": {"coords": {"x": 1, "y": 2, "z": 3}}},
                {"Engage": {"code": 3, "orbit": null}},
                {"Attack": {"target": "Zebulon"}}
            ]
        }
    ]
}"#;

/// Two warships besieging an undefended colony; no shots, one ledger
/// entry per hull.
const SIEGE_TURN: &str = r#"{
    "phase": "Combat",
    "galaxy": {
        "species": [
            {
                "id": 1, "name": "Klaxxon", "distorted_id": 501,
                "tech": {
                    "mining": 10, "manufacturing": 10, "military": 20,
                    "gravitics": 10, "life_support": 20, "biology": 10
                }
            },
            {
                "id": 2, "name": "Zebulon", "distorted_id": 502,
                "tech": {
                    "mining": 10, "manufacturing": 10, "military": 20,
                    "gravitics": 10, "life_support": 20, "biology": 10
                }
            }
        ],
        "ships": [
            {
                "owner": 1, "name": "Avenger", "class": "LightCruiser",
                "tonnage": 20, "coords": {"x": 2, "y": 6, "z": 3},
                "orbit": 0, "status": "InDeepSpace", "age": 0
            },
            {
                "owner": 1, "name": "Resolute", "class": "Destroyer",
                "tonnage": 15, "coords": {"x": 2, "y": 6, "z": 3},
                "orbit": 0, "status": "InDeepSpace", "age": 0
            }
        ],
        "colonies": [
            {
                "owner": 2, "name": "Vega III",
                "coords": {"x": 2, "y": 6, "z": 3}, "orbit": 4,
                "mi_base": 150, "ma_base": 150, "pop_units": 1200,
                "shipyards": 1,
                "flags": {
                    "home_planet": false, "colony": true, "populated": true,
                    "mining_colony": false, "resort_colony": false,
                    "disbanded": false
                }
            }
        ]
    },
    "orders": [
        {
            "species": 1,
            "commands": [
                {"Battle": {"coords": {"x": 2, "y": 6, "z": 3}}},
                {"Engage": {"code": 7, "orbit": 4}},
                {"Attack": {"target": "Zebulon"}}
            ]
        }
    ]
}"#;

#[test]
fn resolves_a_turn_from_stdin() {
    let (stdout, _, status) = run_broadside(&[], Some(RAID_TURN));
    assert!(status.success());
    assert!(stdout.contains("Report for SP Klaxxon:"));
    assert!(stdout.contains("Report for SP Zebulon:"));
    assert!(stdout.contains("Battle at 1 2 3:"));
    assert!(stdout.contains("Struck from the roster:"));
    assert!(stdout.contains("  SP Zebulon FF Vigilant"));
}

#[test]
fn reads_the_snapshot_from_a_file() {
    let path = std::env::temp_dir().join(format!("broadside_turn_{}.json", std::process::id()));
    std::fs::write(&path, RAID_TURN).unwrap();
    let (stdout, _, status) = run_broadside(&[path.to_str().unwrap()], None);
    std::fs::remove_file(&path).ok();

    assert!(status.success());
    assert!(stdout.contains("Report for SP Klaxxon:"));
    assert!(stdout.contains("Struck from the roster:"));
}

#[test]
fn siege_turns_print_the_ledger() {
    let (stdout, _, status) = run_broadside(&[], Some(SIEGE_TURN));
    assert!(status.success());
    assert!(stdout.contains("CL Avenger lays siege to PL Vega III."));
    assert!(stdout.contains("Transactions:"));
    assert!(stdout.contains("Besiege"));
    assert!(stdout.contains("SP 2 owes SP 1"));
}

#[test]
fn quiet_turns_say_so() {
    let quiet = r#"{
        "phase": "Combat",
        "galaxy": { "species": [], "ships": [], "colonies": [] }
    }"#;
    let (stdout, _, status) = run_broadside(&[], Some(quiet));
    assert!(status.success());
    assert!(stdout.contains("No battles were fought."));
    assert!(!stdout.contains("Report for"));
}

#[test]
fn bad_json_exits_nonzero() {
    let (stdout, stderr, status) = run_broadside(&[], Some("this is not a snapshot"));
    assert!(!status.success());
    assert!(stderr.contains("Bad snapshot"));
    assert!(stdout.is_empty());
}

#[test]
fn help_flag_prints_usage() {
    let (stdout, stderr, status) = run_broadside(&["--help"], None);
    assert!(status.success());
    assert!(stderr.contains("Usage: broadside"));
    assert!(stdout.is_empty());
}

#[test]
fn unknown_flags_are_rejected() {
    let (_, stderr, status) = run_broadside(&["--frobnicate"], None);
    assert!(!status.success());
    assert!(stderr.contains("Unknown argument"));
}
