//! # Delve Main Entry Point
//!
//! Generates a seeded dungeon, prints its layout statistics and optionally
//! walks the explorer to the boss.

use clap::Parser;
use delve::{
    ContentEntity, DelveResult, ExplorerConfig, ExplorerEngine, GenerationConfig, Position,
};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// Command line arguments for the dungeon simulator.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Seeded procedural dungeon generation and exploration")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<u32>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<u32>,

    /// Number of rooms to place
    #[arg(short, long)]
    rooms: Option<i64>,

    /// JSON file holding a full generation configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Starting hit points of the explorer
    #[arg(long)]
    hp: Option<u32>,

    /// Walk the explorer along the shortest path to the boss
    #[arg(long)]
    walk_to_boss: bool,

    /// Print the final session snapshot as JSON
    #[arg(long)]
    snapshot: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting Delve v{}", delve::VERSION);

    let config = resolve_config(&args)?;
    info!(
        "Generating a {}x{} dungeon with {} rooms from seed {}",
        config.width, config.height, config.room_count, config.seed
    );

    let mut explorer_config = ExplorerConfig::default();
    if let Some(hp) = args.hp {
        explorer_config.hp = hp;
    }

    let mut engine = ExplorerEngine::from_config(&config, explorer_config).map_err(|e| {
        error!("Generation failed: {}", e);
        e
    })?;

    let stats = engine.map().stats();
    println!(
        "{} rooms: {} empty, {} treasures, {} monsters, {} bosses, {} events",
        stats.total, stats.empty, stats.treasures, stats.monsters, stats.bosses, stats.events
    );
    println!("Average connections per room: {:.2}", stats.average_connections);

    if args.walk_to_boss {
        match boss_position(&engine) {
            Some(boss) => walk_to(&mut engine, boss),
            None => warn!("This dungeon has no boss to walk to"),
        }
    }

    if args.snapshot {
        println!("{}", engine.snapshot().to_json()?);
    }

    Ok(())
}

/// Initializes env_logger at `log_level` unless `RUST_LOG` says otherwise.
fn initialize_logging(log_level: &str) {
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
        .parse_default_env()
        .init();
}

/// Starts from the config file when given, then applies command line overrides.
fn resolve_config(args: &Args) -> DelveResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GenerationConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(rooms) = args.rooms {
        config.room_count = rooms;
    }
    Ok(config)
}

fn load_config(path: &Path) -> DelveResult<GenerationConfig> {
    info!("Loading generation config from {}", path.display());
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn boss_position(engine: &ExplorerEngine) -> Option<Position> {
    engine
        .map()
        .rooms()
        .find(|room| matches!(room.content, Some(ContentEntity::Boss(_))))
        .map(|room| room.position)
}

fn walk_to(engine: &mut ExplorerEngine, destination: Position) {
    println!("Walking to the boss at {}", destination);
    match engine.move_along(destination) {
        Ok(log) => {
            for line in log {
                println!("  {}", line);
            }
        }
        Err(e) => println!("The walk ended early: {}", e),
    }

    let explorer = engine.explorer();
    println!(
        "Explorer at {} with {} hp, attack {}, carrying {} items",
        explorer.position,
        explorer.hp,
        explorer.compute_attack(),
        explorer.inventory.len()
    );
}
