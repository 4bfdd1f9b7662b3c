//! Biome map renderer
//!
//! Resolves a square of the world and writes one pixel per sample as PNG,
//! coloured by biome category.
//!
//! Usage:
//!     render_biomes [OPTIONS] <OUTPUT_PNG>
//!
//! Options:
//!     -s, --size <PIXELS>     Image edge length (default: 512)
//!     --scale <BLOCKS>        Blocks per pixel (default: 4)
//!     --center <X,Z>          World centre of the image (default: 0,0)
//!     --seed <SEED>           World seed (default: 12345)
//!     --rule-table            Use the rule-table resolver
//!     -c, --config <FILE>     Generation config JSON
//!     -h, --help              Show this help message

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::time::Instant;

use voxgen::biome::BiomeCategory;
use voxgen::core::logging;
use voxgen::generation::{GenerationConfig, GenerationContext, ResolverKind};

fn print_help() {
    eprintln!("render_biomes - Biome map renderer");
    eprintln!();
    eprintln!("Usage: render_biomes [OPTIONS] <OUTPUT_PNG>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -s, --size <PIXELS>     Image edge length (default: 512)");
    eprintln!("    --scale <BLOCKS>        Blocks per pixel (default: 4)");
    eprintln!("    --center <X,Z>          World centre of the image (default: 0,0)");
    eprintln!("    --seed <SEED>           World seed (default: 12345)");
    eprintln!("    --rule-table            Use the rule-table resolver");
    eprintln!("    -c, --config <FILE>     Generation config JSON");
    eprintln!("    -h, --help              Show this help message");
}

#[derive(Debug)]
struct Args {
    output: PathBuf,
    size: u32,
    scale: i32,
    center: (i32, i32),
    seed: Option<u64>,
    rule_table: bool,
    config: Option<PathBuf>,
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i).map(String::as_str).ok_or_else(|| format!("Missing value for {}", flag))
}

fn parse_center(s: &str) -> Result<(i32, i32), String> {
    let (x, z) = s.split_once(',').ok_or_else(|| format!("Invalid center: {}", s))?;
    let x = x.trim().parse().map_err(|_| format!("Invalid center x: {}", x))?;
    let z = z.trim().parse().map_err(|_| format!("Invalid center z: {}", z))?;
    Ok((x, z))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut size = 512;
    let mut scale = 4;
    let mut center = (0, 0);
    let mut seed = None;
    let mut rule_table = false;
    let mut config = None;
    let mut output: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-s" | "--size" => {
                i += 1;
                let v = value(&args, i, "--size")?;
                size = v.parse().map_err(|_| format!("Invalid size: {}", v))?;
            }
            "--scale" => {
                i += 1;
                let v = value(&args, i, "--scale")?;
                scale = v.parse().map_err(|_| format!("Invalid scale: {}", v))?;
            }
            "--center" => {
                i += 1;
                center = parse_center(value(&args, i, "--center")?)?;
            }
            "--seed" => {
                i += 1;
                let v = value(&args, i, "--seed")?;
                seed = Some(v.parse().map_err(|_| format!("Invalid seed: {}", v))?);
            }
            "--rule-table" => rule_table = true,
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
    if size == 0 || scale <= 0 {
        return Err("Size and scale must be positive".to_string());
    }

    Ok(Args { output, size, scale, center, seed, rule_table, config })
}

/// Map colour for a category
fn category_color(category: BiomeCategory) -> [u8; 3] {
    match category {
        BiomeCategory::DeepOcean => [0x10, 0x20, 0x70],
        BiomeCategory::Ocean => [0x30, 0x50, 0xC0],
        BiomeCategory::Beach => [0xE8, 0xDC, 0x9A],
        BiomeCategory::Icy => [0xE0, 0xF4, 0xFF],
        BiomeCategory::Tundra => [0xB8, 0xC8, 0xC0],
        BiomeCategory::Taiga => [0x2E, 0x5E, 0x4E],
        BiomeCategory::Plains => [0x8D, 0xB3, 0x60],
        BiomeCategory::Forest => [0x2F, 0x7A, 0x2F],
        BiomeCategory::Swamp => [0x4C, 0x5E, 0x3A],
        BiomeCategory::Desert => [0xF0, 0xD0, 0x80],
        BiomeCategory::Savanna => [0xBD, 0xB2, 0x5F],
        BiomeCategory::Badlands => [0xC0, 0x60, 0x30],
        BiomeCategory::Jungle => [0x1E, 0x8E, 0x1E],
        BiomeCategory::Rainforest => [0x0A, 0x5A, 0x28],
        BiomeCategory::Mountain => [0x88, 0x88, 0x88],
        BiomeCategory::Wetland => [0x50, 0x80, 0x70],
    }
}

fn run(args: &Args) -> voxgen::core::Result<BTreeMap<BiomeCategory, usize>> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::load(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.rule_table {
        config.resolver = ResolverKind::RuleTable;
    }
    let ctx = GenerationContext::new(config)?;

    let half = args.size as i32 * args.scale / 2;
    let (min_x, min_z) = (args.center.0 - half, args.center.1 - half);
    let edge = args.size as usize;

    let start = Instant::now();
    let grid = ctx.biome_grid(min_x, min_z, edge, edge, args.scale);
    log::info!("Resolved {} samples in {:.2}s", edge * edge, start.elapsed().as_secs_f64());

    let mut counts = BTreeMap::new();
    let mut img = image::RgbImage::new(args.size, args.size);
    for (row, biomes) in grid.iter().enumerate() {
        for (col, biome) in biomes.iter().enumerate() {
            *counts.entry(biome.category()).or_insert(0) += 1;
            img.put_pixel(col as u32, row as u32, image::Rgb(category_color(biome.category())));
        }
    }
    img.save(&args.output)?;
    Ok(counts)
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

    let counts = match run(&args) {
        Ok(counts) => counts,
        Err(e) => {
            eprintln!("Error rendering biomes: {}", e);
            std::process::exit(1);
        }
    };

    let total: usize = counts.values().sum();
    println!("Biome coverage ({} samples):", total);
    for (category, count) in &counts {
        println!("  {:<12} {:>6.2}%", category.as_str(), *count as f64 * 100.0 / total.max(1) as f64);
    }
    println!("Output: {}", args.output.display());
}
