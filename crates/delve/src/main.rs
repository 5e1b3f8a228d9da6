//! Command-line dungeon generator
//!
//! Generates one or more successive levels from a single seeded generator and
//! prints them as text or JSON.

use std::fs::read_to_string;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use simple_logger::SimpleLogger;

use delve_core::{Dungeon, ExhaustionPolicy, GenConfig, GenerationStatus, Generator};

/// Generate roguelike dungeon levels
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(author, version, about = "Generate roguelike dungeon levels", long_about = None)]
struct Args {
    /// TOML file with generation settings, overridden by the flags below
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed of the random stream (random when unset)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Grid width in tiles
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in tiles
    #[arg(long)]
    height: Option<usize>,

    /// Number of rooms to place
    #[arg(short, long)]
    rooms: Option<usize>,

    /// Whole-level attempts before giving up
    #[arg(short, long)]
    attempts: Option<usize>,

    /// Fail instead of accepting a degraded layout
    #[arg(long)]
    strict: bool,

    /// Number of successive levels to generate
    #[arg(short, long, default_value_t = 1)]
    levels: usize,

    /// Print the levels as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Flags set on the command line win over the file
    fn apply(&self, config: GenConfig) -> GenConfig {
        GenConfig {
            seed: self.seed.or(config.seed),
            width: self.width.unwrap_or(config.width),
            height: self.height.unwrap_or(config.height),
            room_count: self.rooms.unwrap_or(config.room_count),
            max_attempts: self.attempts.unwrap_or(config.max_attempts),
            on_exhausted: if self.strict {
                ExhaustionPolicy::Fail
            } else {
                config.on_exhausted
            },
            ..config
        }
    }
}

#[derive(Serialize)]
struct Output<'a> {
    seed: u64,
    config: &'a GenConfig,
    levels: &'a [Dungeon],
}

fn describe(status: &GenerationStatus) -> String {
    match status {
        GenerationStatus::Complete { attempts } => format!("complete after {attempts} attempt(s)"),
        GenerationStatus::Degraded {
            attempts,
            violation,
        } => format!("degraded after {attempts} attempt(s): {violation}"),
    }
}

fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .without_timestamps()
        .with_level(if cfg!(debug_assertions) {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .env()
        .init()
        .context("While initializing logging")?;

    let args = Args::parse();
    let file_config: GenConfig = args
        .config
        .as_ref()
        .map(|path| {
            read_to_string(path)
                .with_context(|| format!("Cannot read config file {}", path.display()))
                .and_then(|s| toml::from_str(&s).context("Cannot parse config file"))
        })
        .transpose()
        .context("While loading configs")?
        .unwrap_or_default();
    let config = args.apply(file_config);

    let mut generator = Generator::new(config).context("Invalid configuration")?;
    log::info!("seed {}", generator.seed());

    let mut levels = Vec::with_capacity(args.levels);
    for level in 1..=args.levels {
        let dungeon = generator
            .generate()
            .with_context(|| format!("While generating level {level}"))?;
        levels.push(dungeon);
    }

    if args.json {
        let output = Output {
            seed: generator.seed(),
            config: generator.config(),
            levels: &levels,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for (index, dungeon) in levels.iter().enumerate() {
        println!("level {}", index + 1);
        print!("{}", dungeon.grid);
        println!(
            "{} rooms, {} corridors, {}",
            dungeon.rooms.len(),
            dungeon.corridors.len(),
            describe(&dungeon.status)
        );
    }
    Ok(())
}
