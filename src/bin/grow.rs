//! Plant growth utility
//!
//! Grows a procedural plant and derives its wind animation, printing
//! summary statistics.
//!
//! Usage:
//!     grow [OPTIONS]
//!
//! Options:
//!     --seed <SEED>           RNG seed (default: 0)
//!     --levels <N>            Branching levels (default: 2)
//!     --density <D>           Stems per unit length (default: 0.5)
//!     --length-factor <F>     Stem length per unit radius (default: 60)
//!     --frames <N>            Wind keyframes (default: 21)
//!     --config <FILE>         JSON derivation config overriding the above
//!     -h, --help              Show this help message

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use serde::Deserialize;

use sylva::animation::Wind;
use sylva::core::Error;
use sylva::generator::PseudoGenerator;
use sylva::params::{Derivation, DerivationTree};
use sylva::plant::Plant;

fn print_help() {
    eprintln!("grow - plant growth utility");
    eprintln!();
    eprintln!("Usage: grow [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    --seed <SEED>           RNG seed (default: 0)");
    eprintln!("    --levels <N>            Branching levels (default: 2)");
    eprintln!("    --density <D>           Stems per unit length (default: 0.5)");
    eprintln!("    --length-factor <F>     Stem length per unit radius (default: 60)");
    eprintln!("    --frames <N>            Wind keyframes (default: 21)");
    eprintln!("    --config <FILE>         JSON derivation config overriding the above");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    grow --seed 42 --levels 3 --density 1.0");
}

#[derive(Debug)]
struct Args {
    seed: u64,
    levels: u32,
    density: f32,
    length_factor: f32,
    frames: usize,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut seed: u64 = 0;
    let mut levels: u32 = 2;
    let mut density: f32 = 0.5;
    let mut length_factor: f32 = 60.0;
    let mut frames: usize = 21;
    let mut config: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--seed" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --seed")?;
                seed = value.parse().map_err(|_| format!("Invalid seed: {}", value))?;
            }
            "--levels" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --levels")?;
                levels = value.parse().map_err(|_| format!("Invalid levels: {}", value))?;
            }
            "--density" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --density")?;
                density = value.parse().map_err(|_| format!("Invalid density: {}", value))?;
            }
            "--length-factor" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --length-factor")?;
                length_factor = value
                    .parse()
                    .map_err(|_| format!("Invalid length factor: {}", value))?;
            }
            "--frames" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --frames")?;
                frames = value.parse().map_err(|_| format!("Invalid frames: {}", value))?;
            }
            "--config" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --config")?;
                config = Some(PathBuf::from(value));
            }
            arg => {
                return Err(format!("Unknown option: {}", arg));
            }
        }
        i += 1;
    }

    Ok(Args {
        seed,
        levels,
        density,
        length_factor,
        frames,
        config,
    })
}

/// JSON shape of a derivation config: one entry per branching level.
#[derive(Debug, Deserialize)]
struct DerivationConfig {
    #[serde(default)]
    seed: u64,
    levels: Vec<Derivation>,
}

fn load_config(path: &PathBuf) -> Result<DerivationTree, Error> {
    let text = fs::read_to_string(path)?;
    let config: DerivationConfig = serde_json::from_str(&text)?;
    if config.levels.is_empty() {
        return Err(Error::Config("config needs at least one level".into()));
    }

    let mut derivation = DerivationTree::with_levels(config.levels.len() as u32);
    derivation.set_seed(config.seed);
    let mut name = String::from("1");
    for level in config.levels {
        if let Some(data) = derivation.tree_mut().data_mut(&name) {
            *data = level;
        }
        name.push_str(".1");
    }
    Ok(derivation)
}

fn default_derivation(args: &Args) -> DerivationTree {
    let mut derivation = DerivationTree::with_levels(args.levels);
    derivation.set_seed(args.seed);
    let mut name = String::from("1");
    for level in 0..args.levels {
        if let Some(data) = derivation.tree_mut().data_mut(&name) {
            data.stem_density = args.density;
            data.stem_start = 0.5;
            data.length_factor = args.length_factor;
            data.leaf_density = if level + 1 == args.levels { 2.0 } else { 0.0 };
            data.radius_threshold = 0.001;
        }
        name.push_str(".1");
    }
    derivation
}

fn run(args: Args) -> Result<(), Error> {
    let derivation = match &args.config {
        Some(path) => load_config(path)?,
        None => default_derivation(&args),
    };

    let mut plant = Plant::new();
    let generator = PseudoGenerator::new(derivation);

    let start = Instant::now();
    let root = generator.grow(&mut plant)?;
    let grow_time = start.elapsed();

    let mut wind = Wind::new();
    wind.set_seed(args.seed);
    wind.set_frame_count(args.frames);

    let start = Instant::now();
    let animation = wind.generate(&mut plant);
    let wind_time = start.elapsed();

    let stems = plant.subtree(root);
    let total_length: f32 = stems
        .iter()
        .filter_map(|id| plant.get(*id))
        .map(|stem| stem.path().length())
        .sum();
    let leaves: usize = stems
        .iter()
        .filter_map(|id| plant.get(*id))
        .map(|stem| stem.leaf_count())
        .sum();
    let max_depth = stems
        .iter()
        .filter_map(|id| plant.get(*id))
        .map(|stem| stem.depth())
        .max()
        .unwrap_or(0);

    println!("Plant summary:");
    println!("  Stems: {}", stems.len());
    println!("  Leaves: {}", leaves);
    println!("  Max depth: {}", max_depth);
    println!("  Total stem length: {:.2}", total_length);
    println!("  Grown in {:.2}ms", grow_time.as_secs_f64() * 1000.0);
    println!();
    println!("Wind animation:");
    println!("  Joints: {}", animation.joint_count());
    println!("  Frames per joint: {}", animation.frame_count());
    println!("  Duration: {} ticks", animation.duration());
    println!("  Generated in {:.2}ms", wind_time.as_secs_f64() * 1000.0);

    Ok(())
}

fn main() -> ExitCode {
    sylva::core::logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
