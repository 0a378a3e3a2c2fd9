//! Broadside -- a space-combat resolution engine for 4X game hosts.
//!
//! This binary reads one phase's input (galaxy snapshot, per-species
//! battle orders, phase kind, and generator seed) as JSON from a file or
//! stdin, resolves every battle, and prints the per-species reports, the
//! transaction ledger, and the ships struck from the roster.
//!
//! Usage:
//!   broadside [FILE]
//!
//! With no FILE (or with `-`) the snapshot is read from stdin.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use broadside::phase::{resolve_combat, TurnInput};

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return;
            }
            "-" => {}
            other if other.starts_with('-') => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
            other => path = Some(other.to_string()),
        }
        i += 1;
    }

    let text = match read_input(path.as_deref()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to read input: {}", e);
            process::exit(1);
        }
    };

    let mut input: TurnInput = match serde_json::from_str(&text) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Bad snapshot: {}", e);
            process::exit(1);
        }
    };

    let outcome = match resolve_combat(&mut input.galaxy, &input.orders, input.phase, input.seed) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Resolution failed: {}", e);
            process::exit(1);
        }
    };

    if outcome.reports.is_empty() {
        println!("No battles were fought.");
    }
    for (id, report) in &outcome.reports {
        let name = input
            .galaxy
            .species_by_id(*id)
            .map_or_else(|| format!("#{}", id), |sp| sp.name.clone());
        println!("Report for SP {}:", name);
        print!("{}", report);
        println!();
    }

    if !outcome.transactions.is_empty() {
        println!("Transactions:");
        for t in &outcome.transactions {
            println!(
                "  {:?} at {} orbit {}: SP {} owes SP {} {} EU ({}; {})",
                t.kind, t.location, t.orbit, t.donor, t.recipient, t.value, t.name1, t.name2
            );
        }
    }

    if !outcome.deletions.is_empty() {
        println!("Struck from the roster:");
        for line in &outcome.deletions {
            println!("  {}", line);
        }
    }
}

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn print_usage() {
    eprintln!("Usage: broadside [FILE]");
    eprintln!();
    eprintln!("Resolves one combat or strike phase from a JSON snapshot.");
    eprintln!("With no FILE (or with '-') the snapshot is read from stdin.");
}
