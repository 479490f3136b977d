use anyhow::{Context, Result};
use clap::Parser;
use hazard_snake::game::{Difficulty, GameConfig, Session};
use hazard_snake::modes::HumanMode;
use hazard_snake::storage::{JsonFileStore, MemoryStore, ScoreStore, StoreError};
use log::{info, warn};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hazard_snake")]
#[command(version, about = "Snake with timed hazards and a persisted best score")]
struct Cli {
    /// JSON file with game settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting difficulty (can be changed from the start screen)
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Grid width and height
    #[arg(long)]
    grid_size: Option<usize>,

    /// Turn off the transient hazards
    #[arg(long)]
    no_hazards: bool,

    /// Where the best score is kept
    #[arg(long, default_value = "hazard_snake_scores.json")]
    score_file: PathBuf,

    /// Keep the best score in memory only
    #[arg(long)]
    no_persist: bool,

    /// Write logs to this file (RUST_LOG controls the level, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    // The TUI owns the terminal, so logs only go somewhere when asked to
    let mut builder = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {:?}", path))?;
            let mut builder =
                env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            builder
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")),
    };
    builder.init();
    Ok(())
}

fn build_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(grid_size) = cli.grid_size {
        config.grid_size = grid_size;
    }
    if cli.no_hazards {
        config.hazards_enabled = false;
    }

    config.validate()?;
    Ok(config)
}

fn open_store(cli: &Cli) -> Box<dyn ScoreStore> {
    if cli.no_persist {
        return Box::new(MemoryStore::new());
    }

    // Called before the TUI takes the terminal, so stderr is still visible
    let store = match JsonFileStore::open(&cli.score_file) {
        Ok(store) => store,
        Err(err @ StoreError::Malformed { .. }) => {
            eprintln!("warning: {err}; starting from an empty score file");
            warn!("ignoring unreadable score file: {err}");
            JsonFileStore::empty(&cli.score_file)
        }
        Err(err) => {
            eprintln!("warning: {err}; the best score will not be saved this session");
            warn!("best score will not be saved this session: {err}");
            return Box::new(MemoryStore::new());
        }
    };
    info!("best score kept in {:?}", store.path());
    Box::new(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let config = build_config(&cli)?;
    info!(
        "grid {}x{}, difficulty {}, hazards {}",
        config.grid_size,
        config.grid_size,
        config.difficulty.as_str(),
        if config.hazards_enabled { "on" } else { "off" }
    );

    let session = Session::new(config, open_store(&cli));
    let mut human_mode = HumanMode::new(session);
    human_mode.run().await?;

    Ok(())
}
