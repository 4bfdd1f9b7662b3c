//! City layout preview
//!
//! Lays out one city over the generated terrain and prints an ASCII map
//! plus a summary of roads, buildings and decorators.
//!
//! Usage:
//!     generate_city [OPTIONS]
//!
//! Options:
//!     --seed <SEED>           World seed (default: 12345)
//!     --center <X,Z>          City centre (default: 0,0)
//!     --flat <Y>              Use a flat height map instead of terrain
//!     --build                 Place the city into an in-memory world
//!     -o, --output <FILE>     Also write the layout as JSON
//!     -c, --config <FILE>     Generation config JSON
//!     -h, --help              Show this help message

use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use std::time::Instant;

use voxgen::city::{BuildingKind, CityLayout, HeightMap, PlacementEvent, RoadType};
use voxgen::core::logging;
use voxgen::generation::{GenerationConfig, GenerationContext};
use voxgen::math::BlockPos;
use voxgen::structure::{InMemoryWorld, StructureStore, StructureTemplate, TemplateLibrary};

fn print_help() {
    eprintln!("generate_city - City layout preview");
    eprintln!();
    eprintln!("Usage: generate_city [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    --seed <SEED>           World seed (default: 12345)");
    eprintln!("    --center <X,Z>          City centre (default: 0,0)");
    eprintln!("    --flat <Y>              Use a flat height map instead of terrain");
    eprintln!("    --build                 Place the city into an in-memory world");
    eprintln!("    -o, --output <FILE>     Also write the layout as JSON");
    eprintln!("    -c, --config <FILE>     Generation config JSON");
    eprintln!("    -h, --help              Show this help message");
}

#[derive(Debug)]
struct Args {
    seed: Option<u64>,
    center: (i32, i32),
    flat: Option<i32>,
    build: bool,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i).map(String::as_str).ok_or_else(|| format!("Missing value for {}", flag))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut parsed = Args { seed: None, center: (0, 0), flat: None, build: false, output: None, config: None };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--seed" => {
                i += 1;
                let v = value(&args, i, "--seed")?;
                parsed.seed = Some(v.parse().map_err(|_| format!("Invalid seed: {}", v))?);
            }
            "--center" => {
                i += 1;
                let v = value(&args, i, "--center")?;
                let (x, z) = v.split_once(',').ok_or_else(|| format!("Invalid center: {}", v))?;
                let x = x.trim().parse().map_err(|_| format!("Invalid center x: {}", x))?;
                let z = z.trim().parse().map_err(|_| format!("Invalid center z: {}", z))?;
                parsed.center = (x, z);
            }
            "--flat" => {
                i += 1;
                let v = value(&args, i, "--flat")?;
                parsed.flat = Some(v.parse().map_err(|_| format!("Invalid height: {}", v))?);
            }
            "--build" => parsed.build = true,
            "-o" | "--output" => {
                i += 1;
                parsed.output = Some(PathBuf::from(value(&args, i, "--output")?));
            }
            "-c" | "--config" => {
                i += 1;
                parsed.config = Some(PathBuf::from(value(&args, i, "--config")?));
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(parsed)
}

fn road_char(road_type: RoadType) -> char {
    match road_type {
        RoadType::StraightNS => '|',
        RoadType::StraightEW => '-',
        RoadType::Plaza => '#',
        t if t.is_cross() => '+',
        t if t.dead_end_direction().is_some() => 'o',
        _ => '=',
    }
}

/// One character per cell; buildings over decorators over roads
fn render_ascii(layout: &CityLayout, half: i32) -> String {
    let mut out = String::new();
    for z in layout.center_z - half..=layout.center_z + half {
        for x in layout.center_x - half..=layout.center_x + half {
            let c = if let Some(b) = layout.building_at(x, z) {
                match b.kind {
                    BuildingKind::TownHall => 'T',
                    BuildingKind::Special => 'S',
                    BuildingKind::House => 'h',
                }
            } else if layout.decorators.iter().any(|d| d.pos.x == x && d.pos.z == z) {
                '*'
            } else if let Some(r) = layout.road_at(x, z) {
                road_char(r.road_type)
            } else {
                '.'
            };
            out.push(c);
        }
        out.push('\n');
    }
    out
}

/// Single-block stand-ins for every template the layout references
fn stub_templates(layout: &CityLayout) -> TemplateLibrary {
    let mut ids = BTreeSet::new();
    for road in &layout.roads {
        ids.extend(road.road_type.piece_candidates().into_iter().take(1));
    }
    ids.extend(layout.buildings.iter().map(|b| b.id.clone()));
    ids.extend(layout.decorators.iter().map(|d| d.id.clone()));

    let mut library = TemplateLibrary::new();
    for id in ids {
        let state = if id.starts_with("road/") { "gravel" } else { "planks" };
        library.insert(StructureTemplate::filled(id, BlockPos::new(1, 1, 1), state));
    }
    library
}

fn run(args: &Args) -> voxgen::core::Result<CityLayout> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::load(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let ctx = GenerationContext::new(config)?;
    let builder = ctx.city_builder()?;
    let (cx, cz) = args.center;
    let half = builder.config().radius;

    let start = Instant::now();
    let height_map = match args.flat {
        Some(y) => HeightMap::flat(cx, cz, half, y),
        None => ctx.height_map(cx, cz, half),
    };

    if !args.build {
        let layout = builder.layout(&height_map, cx, cz);
        log::info!("Laid out city in {:.2}s", start.elapsed().as_secs_f64());
        return Ok(layout);
    }

    let preview = builder.layout(&height_map, cx, cz);
    let stubs;
    let store: &dyn StructureStore = if ctx.templates().is_empty() {
        log::warn!("No structure templates loaded, placing single-block stand-ins");
        stubs = stub_templates(&preview);
        &stubs
    } else {
        ctx.templates()
    };

    let mut world = InMemoryWorld::new();
    let mut placements = [0usize; 3];
    let layout = builder.build(&mut world, store, &height_map, cx, cz, |event| match event {
        PlacementEvent::Road(_) => placements[0] += 1,
        PlacementEvent::Building(_) => placements[1] += 1,
        PlacementEvent::Decorator(_) => placements[2] += 1,
    })?;
    log::info!(
        "Built city in {:.2}s: {} road pieces, {} buildings, {} decorators, {} blocks",
        start.elapsed().as_secs_f64(),
        placements[0],
        placements[1],
        placements[2],
        world.len()
    );
    Ok(layout)
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

    let layout = match run(&args) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("Error generating city: {}", e);
            std::process::exit(1);
        }
    };

    let half = layout
        .roads
        .iter()
        .map(|r| r.pos.horizontal_chebyshev(&BlockPos::new(layout.center_x, 0, layout.center_z)))
        .max()
        .unwrap_or(0)
        + 1;
    print!("{}", render_ascii(&layout, half));

    println!();
    println!("Summary:");
    println!("  Road tiles: {}", layout.roads.len());
    for (road_type, count) in layout.road_histogram() {
        println!("    {:<20} {}", road_type.as_str(), count);
    }
    println!("  Buildings: {}", layout.buildings.len());
    println!("  Decorators: {}", layout.decorators.len());

    if let Some(path) = &args.output {
        let written = serde_json::to_string_pretty(&layout)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => println!("  Output: {}", path.display()),
            Err(e) => {
                eprintln!("Error writing {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
}
