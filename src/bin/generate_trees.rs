//! Batch tree generation utility
//!
//! Grows trees and writes their trunk paths, branch skeletons and voxel
//! sets as JSON.
//!
//! Usage:
//!     generate_trees [OPTIONS] <OUTPUT_FILE>
//!
//! Options:
//!     -a, --archetype <NAME>  oak, conifer, willow, mangrove, or all (default: all)
//!     -n, --count <N>         Number of trees per archetype (default: 8)
//!     --seed <SEED>           Base seed (default: 12345)
//!     --spacing <BLOCKS>      Distance between tree origins (default: 24)
//!     --spiral                Also grow one multi-root spiral trunk
//!     -c, --config <FILE>     Generation config JSON (branching override)
//!     -h, --help              Show this help message

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use glam::DVec3;
use serde::Serialize;

use voxgen::core::logging;
use voxgen::generation::{GenerationConfig, GenerationContext};
use voxgen::random::RandomSource;
use voxgen::tree::{SpiralTrunk, SpiralTrunkParams, Tree, TrunkArchetype, generate_multi_root_spiral_trunk};

fn print_help() {
    eprintln!("generate_trees - Batch tree generation utility");
    eprintln!();
    eprintln!("Usage: generate_trees [OPTIONS] <OUTPUT_FILE>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -a, --archetype <NAME>  oak, conifer, willow, mangrove, or all (default: all)");
    eprintln!("    -n, --count <N>         Number of trees per archetype (default: 8)");
    eprintln!("    --seed <SEED>           Base seed (default: 12345)");
    eprintln!("    --spacing <BLOCKS>      Distance between tree origins (default: 24)");
    eprintln!("    --spiral                Also grow one multi-root spiral trunk");
    eprintln!("    -c, --config <FILE>     Generation config JSON (branching override)");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    generate_trees -a oak -n 4 trees.json");
    eprintln!("    generate_trees --seed 42 --spiral forest.json");
}

#[derive(Debug)]
struct Args {
    output: PathBuf,
    archetype: Option<TrunkArchetype>, // None means all archetypes
    count: usize,
    seed: u64,
    spacing: f64,
    spiral: bool,
    config: Option<PathBuf>,
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i).map(String::as_str).ok_or_else(|| format!("Missing value for {}", flag))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        return Err("Missing output file".to_string());
    }

    let mut archetype = None;
    let mut count = 8;
    let mut seed = 12345;
    let mut spacing = 24.0;
    let mut spiral = false;
    let mut config = None;
    let mut output: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-a" | "--archetype" => {
                i += 1;
                let name = value(&args, i, "--archetype")?.to_lowercase();
                archetype = match name.as_str() {
                    "all" => None,
                    other => Some(TrunkArchetype::parse(other).ok_or_else(|| {
                        format!("Unknown archetype: {}. Valid: oak, conifer, willow, mangrove, all", other)
                    })?),
                };
            }
            "-n" | "--count" => {
                i += 1;
                let v = value(&args, i, "--count")?;
                count = v.parse().map_err(|_| format!("Invalid count: {}", v))?;
            }
            "--seed" => {
                i += 1;
                let v = value(&args, i, "--seed")?;
                seed = v.parse().map_err(|_| format!("Invalid seed: {}", v))?;
            }
            "--spacing" => {
                i += 1;
                let v = value(&args, i, "--spacing")?;
                spacing = v.parse().map_err(|_| format!("Invalid spacing: {}", v))?;
            }
            "--spiral" => spiral = true,
            "-c" | "--config" => {
                i += 1;
                config = Some(PathBuf::from(value(&args, i, "--config")?));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            path => {
                if output.is_some() {
                    return Err("Multiple output files specified".to_string());
                }
                output = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    let output = output.ok_or("Missing output file")?;

    Ok(Args { output, archetype, count, seed, spacing, spiral, config })
}

#[derive(Serialize)]
struct TreeExport {
    seed: u64,
    trees: Vec<Tree>,
    spiral: Option<SpiralTrunk>,
}

fn run(args: &Args) -> voxgen::core::Result<TreeExport> {
    let config = match &args.config {
        Some(path) => GenerationConfig::load(path)?,
        None => GenerationConfig::with_seed(args.seed),
    };
    let ctx = GenerationContext::new(config)?;

    let archetypes: Vec<TrunkArchetype> = match args.archetype {
        Some(a) => vec![a],
        None => TrunkArchetype::ALL.to_vec(),
    };

    let root = RandomSource::new(args.seed);
    let mut trees = Vec::new();
    for (row, archetype) in archetypes.iter().enumerate() {
        let start = Instant::now();
        let origins: Vec<DVec3> = (0..args.count)
            .map(|i| DVec3::new(i as f64 * args.spacing, 0.0, row as f64 * args.spacing))
            .collect();
        let grown = ctx
            .tree_builder(*archetype)
            .grow_forest(root.fork(row as u64).seed(), &origins);
        log::info!(
            "{}: {} trees in {:.2}s",
            archetype.as_str(),
            grown.len(),
            start.elapsed().as_secs_f64()
        );
        trees.extend(grown);
    }

    let spiral = args.spiral.then(|| {
        let origin = DVec3::new(0.0, 0.0, -2.0 * args.spacing);
        let seed = root.fork(archetypes.len() as u64).seed();
        generate_multi_root_spiral_trunk(seed, origin, &SpiralTrunkParams::default(), &mut RandomSource::new(seed))
    });

    Ok(TreeExport { seed: args.seed, trees, spiral })
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    let total_start = Instant::now();
    let export = match run(&args) {
        Ok(export) => export,
        Err(e) => {
            eprintln!("Error generating trees: {}", e);
            std::process::exit(1);
        }
    };

    let json = match serde_json::to_string(&export) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error encoding trees: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(&args.output, json) {
        eprintln!("Error writing {}: {}", args.output.display(), e);
        std::process::exit(1);
    }

    let voxels: usize = export.trees.iter().map(|t| t.voxels.len()).sum();
    println!("Summary:");
    println!("  Trees generated: {}", export.trees.len());
    println!("  Tree voxels: {}", voxels);
    if let Some(spiral) = &export.spiral {
        println!("  Spiral trunk: {} roots, {} voxels", spiral.roots.len(), spiral.voxels.len());
    }
    println!("  Total time: {:.2}s", total_start.elapsed().as_secs_f64());
    println!("  Output: {}", args.output.display());
}
