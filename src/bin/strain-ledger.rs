//! strain-ledger — inspect breeding provenance save files
//!
//! Commands:
//!   strain-ledger demo    — breed a small family and write a save file
//!   strain-ledger verify  — replay and audit a save file
//!   strain-ledger lineage — print the ancestry of a genome
//!   strain-ledger history — list the events recorded by one breeder
//!   strain-ledger stats   — summary numbers for a save file
//!   strain-ledger hash    — fingerprint a genetic profile JSON file

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strain_ledger::genome::{compute_genome_hash, short_hash, GeneticProfile, StrainType, TraitSet};
use strain_ledger::lineage::{LineageNode, LineageResolver};
use strain_ledger::miner::search_nonce;
use strain_ledger::storage::{load_ledger, save_ledger};
use strain_ledger::{BreedingLedger, LedgerConfig, LogSink};
use std::env;
use std::error::Error;
use std::sync::Arc;

const DEFAULT_SAVE: &str = "strain-ledger.json";

fn print_usage() {
    println!(
        r#"
Strain Ledger — breeding provenance inspector

Usage: strain-ledger <command> [options]

Commands:
  demo     [save]                 Breed a demo family and write it to a save file
  verify   [save]                 Replay and audit a save file
  lineage  <genome-prefix> [save] Print the ancestor tree of a genome
  history  <breeder> [save]       List events recorded by a breeder
  stats    [save]                 Show ledger statistics
  hash     <profile.json>         Fingerprint a genetic profile

Default save file: {}
"#,
        DEFAULT_SAVE
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let result = match args[1].as_str() {
        "demo" => cmd_demo(&args[2..]),
        "verify" => cmd_verify(&args[2..]),
        "lineage" => cmd_lineage(&args[2..]),
        "history" => cmd_history(&args[2..]),
        "stats" => cmd_stats(&args[2..]),
        "hash" => cmd_hash(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("  Error: {}", e);
        std::process::exit(1);
    }
}

fn save_path(args: &[String], position: usize) -> &str {
    args.get(position).map(|s| s.as_str()).unwrap_or(DEFAULT_SAVE)
}

fn open(path: &str) -> Result<BreedingLedger, Box<dyn Error>> {
    Ok(load_ledger(path, LedgerConfig::default(), Arc::new(LogSink))?)
}

/// Stand-in for the simulation's crossover engine: blend parent traits and
/// jitter them deterministically from the mutation seed.
fn demo_cross(a: &GeneticProfile, b: &GeneticProfile, name: &str, mutation_seed: u64) -> GeneticProfile {
    let mut rng = StdRng::seed_from_u64(mutation_seed);
    let mut blend = |x: f64, y: f64| (x + y) / 2.0 * rng.gen_range(0.95..1.05);
    let traits = TraitSet {
        thc: blend(a.traits.thc, b.traits.thc),
        cbd: blend(a.traits.cbd, b.traits.cbd),
        yield_potential: blend(a.traits.yield_potential, b.traits.yield_potential),
        flowering_days: blend(a.traits.flowering_days, b.traits.flowering_days).round(),
        height: blend(a.traits.height, b.traits.height),
        vigor: blend(a.traits.vigor, b.traits.vigor),
        disease_resistance: blend(a.traits.disease_resistance, b.traits.disease_resistance),
    };
    GeneticProfile::new(uuid::Uuid::new_v4().to_string(), name, "cannabis")
        .with_strain_type(StrainType::Hybrid)
        .with_traits(traits)
}

fn founder(name: &str, strain_type: StrainType, rng: &mut impl Rng) -> GeneticProfile {
    GeneticProfile::new(uuid::Uuid::new_v4().to_string(), name, "cannabis")
        .with_strain_type(strain_type)
        .with_traits(TraitSet {
            thc: rng.gen_range(12.0..26.0),
            cbd: rng.gen_range(0.1..8.0),
            yield_potential: rng.gen_range(0.3..0.9),
            flowering_days: rng.gen_range(50..80) as f64,
            height: rng.gen_range(0.6..2.2),
            vigor: rng.gen_range(0.3..0.9),
            disease_resistance: rng.gen_range(0.2..0.9),
        })
}

fn cmd_demo(args: &[String]) -> Result<(), Box<dyn Error>> {
    let path = save_path(args, 0);
    let config = LedgerConfig::default();
    let attempts = config.max_nonce_attempts;
    let mut ledger = BreedingLedger::new(config);
    let mut rng = rand::thread_rng();

    println!("\n  Registering founders (difficulty {})", ledger.difficulty());
    let mut profiles = Vec::new();
    for (name, kind) in [
        ("Northern Lights", StrainType::Indica),
        ("Haze", StrainType::Sativa),
        ("Skunk #1", StrainType::Hybrid),
    ] {
        let profile = founder(name, kind, &mut rng);
        let hash = compute_genome_hash(Some(&profile));
        let draft = ledger.draft_genesis(&hash, "seed-bank", name);
        ledger.add_block(search_nonce(draft, ledger.difficulty(), attempts)?)?;
        println!("  + {} [{}]", name, short_hash(&hash, 8, 4));
        profiles.push(profile);
    }

    let crosses = [(0, 1, "NL x Haze", "alice"), (3, 2, "Haze Skunk", "bob"), (4, 0, "Night Haze", "alice")];
    for (i, j, name, breeder) in crosses {
        let seed: u64 = rng.gen();
        let child = demo_cross(&profiles[i], &profiles[j], name, seed);
        let p1 = compute_genome_hash(Some(&profiles[i]));
        let p2 = compute_genome_hash(Some(&profiles[j]));
        let hash = compute_genome_hash(Some(&child));
        let draft = ledger.draft_cross(&p1, &p2, &hash, seed, breeder, name);
        let block = search_nonce(draft, ledger.difficulty(), attempts)?;
        println!("  + {}", block.summary());
        ledger.add_block(block)?;
        profiles.push(child);
    }

    save_ledger(&ledger, path)?;
    println!("\n  {}", ledger.summary());
    println!("  Saved to {}", path);
    Ok(())
}

fn cmd_verify(args: &[String]) -> Result<(), Box<dyn Error>> {
    let path = save_path(args, 0);
    let ledger = open(path)?;
    println!("\n  {} is valid: {} breeding events", path, ledger.get_chain_length());
    if !ledger.quarantined().is_empty() {
        println!("  {} events quarantined", ledger.quarantined().len());
    }
    Ok(())
}

fn cmd_lineage(args: &[String]) -> Result<(), Box<dyn Error>> {
    let prefix = match args.first() {
        Some(p) => p,
        None => {
            eprintln!("Usage: strain-ledger lineage <genome-prefix> [save]");
            return Ok(());
        }
    };
    let ledger = open(save_path(args, 1))?;
    let genome = ledger
        .blocks()
        .iter()
        .map(|b| b.offspring_genome_hash.as_str())
        .find(|h| h.starts_with(prefix.as_str()));
    let genome = match genome {
        Some(g) => g,
        None => {
            eprintln!("  No recorded genome matching '{}'", prefix);
            return Ok(());
        }
    };

    let resolver = LineageResolver::new(&ledger);
    println!("\n  Ancestry ({} events, oldest first):", resolver.get_lineage(genome).len());
    for event in resolver.get_lineage(genome) {
        println!("  {}", event.summary());
    }
    println!("\n  Tree:");
    print_tree(&resolver.lineage_tree(genome), 1);
    Ok(())
}

fn print_tree(node: &LineageNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        LineageNode::Bred { event, parents, .. } => {
            println!("{}{} (F{})", indent, event.strain_name, event.generation);
            for parent in parents {
                print_tree(parent, depth + 1);
            }
        }
        LineageNode::Founder { genome_hash } => {
            println!("{}[external {}]", indent, short_hash(genome_hash, 8, 4));
        }
        LineageNode::Repeated { genome_hash } => {
            println!("{}(see above: {})", indent, short_hash(genome_hash, 8, 4));
        }
    }
}

fn cmd_history(args: &[String]) -> Result<(), Box<dyn Error>> {
    let breeder = match args.first() {
        Some(b) => b,
        None => {
            eprintln!("Usage: strain-ledger history <breeder> [save]");
            return Ok(());
        }
    };
    let ledger = open(save_path(args, 1))?;
    let events = ledger.get_player_events(breeder);
    println!("\n  Strains bred by {} ({}):", breeder, events.len());
    for event in events {
        println!("  {} | {}", event.timestamp.format("%Y-%m-%d %H:%M"), event.summary());
    }
    Ok(())
}

fn cmd_stats(args: &[String]) -> Result<(), Box<dyn Error>> {
    let ledger = open(save_path(args, 0))?;
    println!("\n  {}", ledger.summary());
    println!("{}", serde_json::to_string_pretty(&ledger.stats())?);
    Ok(())
}

fn cmd_hash(args: &[String]) -> Result<(), Box<dyn Error>> {
    let path = match args.first() {
        Some(p) => p,
        None => {
            eprintln!("Usage: strain-ledger hash <profile.json>");
            return Ok(());
        }
    };
    let json = std::fs::read_to_string(path)?;
    let profile: GeneticProfile = serde_json::from_str(&json)?;
    let hash = compute_genome_hash(Some(&profile));
    if hash.is_empty() {
        println!("  (no genetics present)");
    } else {
        println!("  {}", hash);
    }
    Ok(())
}
