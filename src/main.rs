//! # Overworld Encounters Main Entry Point
//!
//! Loads a rules file, drops a traveller into a generated world and lets the
//! encounter timer run, printing what happened as JSON.

use clap::Parser;
use log::{info, warn};
use overworld_encounters::{
    Calendar, Dice, Encounter, EncounterEngine, EncounterResult, EncounterScheduler, EngineConfig,
    EngineStatus, Position, SimWorld, TriggerRecord, SECTOR_SIZE,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// Command line arguments for the encounter simulator.
#[derive(Parser, Debug)]
#[command(name = "overworld_encounters")]
#[command(about = "Simulates random overworld encounters from a rules file")]
#[command(version)]
struct Args {
    /// Rules file with the encounter charts and tables
    rules: PathBuf,

    /// Random seed for the world and the dice
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of timer firings to simulate
    #[arg(short, long, default_value_t = 50)]
    timers: usize,

    /// Player level; encounters never fire without one
    #[arg(long, default_value_t = 1)]
    player_level: i32,

    /// Width and height of the generated world in sectors
    #[arg(long, default_value_t = 32)]
    world_size: i32,

    /// JSON file with engine settings
    #[arg(long)]
    engine_config: Option<PathBuf>,

    /// Trigger counts to restore before simulating
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Where to write trigger counts afterwards
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// One encounter seen during the run.
#[derive(Debug, Serialize)]
struct EncounterLog {
    /// Game time of the timer firing
    at_ms: u64,
    /// Hour of day at the firing
    hour: u32,
    #[serde(flatten)]
    encounter: Encounter,
}

/// Summary printed at the end of a run.
#[derive(Debug, Serialize)]
struct Report {
    version: &'static str,
    seed: u64,
    status: EngineStatus,
    timers_fired: usize,
    encounters: Vec<EncounterLog>,
    /// Entries that fired at least once, including restored counts
    triggered: Vec<TriggerRecord>,
}

fn main() -> EncounterResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    info!("Starting overworld encounters v{}", overworld_encounters::VERSION);

    let report = run(&args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Initializes env_logger at the requested level.
fn initialize_logging(log_level: &str) -> EncounterResult<()> {
    let level = match log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .target(env_logger::Target::Stderr)
        .init();

    Ok(())
}

fn load_engine_config(args: &Args) -> EncounterResult<EngineConfig> {
    match &args.engine_config {
        Some(path) => {
            let config = serde_json::from_reader(BufReader::new(File::open(path)?))?;
            info!("Engine settings read from {}", path.display());
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Runs the simulation and collects the report.
fn run(args: &Args) -> EncounterResult<Report> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut engine = EncounterEngine::new(load_engine_config(args)?);
    let status = engine.load_rules_from_path(&args.rules)?;
    if status != EngineStatus::Active {
        warn!("Random encounters are {:?}; no encounter will fire", status);
    }

    if let Some(path) = &args.resume {
        engine.load(BufReader::new(File::open(path)?))?;
        info!("Trigger counts restored from {}", path.display());
    }

    let size = args.world_size.max(1);
    let centre = Position::new(size * SECTOR_SIZE / 2, size * SECTOR_SIZE / 2);
    let mut world = SimWorld::generated(seed as u32, size, size, centre);
    world.player_level = Some(args.player_level);

    let scheduler = EncounterScheduler::from_config(engine.config());
    scheduler.schedule(&mut world, &mut rng);

    let mut encounters = Vec::new();
    let mut timers_fired = 0;
    while timers_fired < args.timers && world.advance_to_next_timer() {
        timers_fired += 1;
        wander(&mut world, &mut rng, size);

        if let Some(encounter) = scheduler.on_timer(&mut engine, &mut world, &mut rng)? {
            encounters.push(EncounterLog {
                at_ms: world.clock_ms(),
                hour: world.current_hour(),
                encounter,
            });
            // The fight is over by the next firing; travel resumes.
            world.clear_creatures();
            world.world_map_open = true;
        }
    }

    if let Some(path) = &args.save {
        engine.save(BufWriter::new(File::create(path)?))?;
        info!("Trigger counts saved to {}", path.display());
    }

    let triggered = engine
        .trigger_records()
        .into_iter()
        .filter(|record| record.trigger_count > 0)
        .collect();

    info!(
        "Simulated {} timer firings, {} encounters",
        timers_fired,
        encounters.len()
    );

    Ok(Report {
        version: overworld_encounters::VERSION,
        seed,
        status: engine.status(),
        timers_fired,
        encounters,
        triggered,
    })
}

/// Moves the traveller up to one sector in each direction, staying on the map.
fn wander(world: &mut SimWorld, rng: &mut StdRng, size_sectors: i32) {
    let limit = size_sectors * SECTOR_SIZE - 1;
    let dx = rng.between(-SECTOR_SIZE, SECTOR_SIZE);
    let dy = rng.between(-SECTOR_SIZE, SECTOR_SIZE);
    let next = world.player_tile.offset(dx, dy);
    world.player_tile = Position::new(next.x.clamp(0, limit), next.y.clamp(0, limit));
}
