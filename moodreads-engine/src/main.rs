//! moodreads - batch profiling and ad-hoc recommendation
//!
//! Startup order:
//! 1. Load bootstrap TOML config
//! 2. Initialize tracing
//! 3. Resolve API key (fail fast when missing)
//! 4. Resolve root folder, open store and cache

use anyhow::Result;
use clap::{Parser, Subcommand};
use moodreads_common::config::{
    locate_config_file, read_toml_config, resolve_api_key, resolve_root_folder, TomlConfig,
};
use moodreads_common::logging::init_tracing;
use moodreads_engine::config::EngineConfig;
use moodreads_engine::workflow::BatchMode;
use moodreads_engine::Engine;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "moodreads", version, about = "Mood-based book recommendations")]
struct Cli {
    /// Bootstrap config file (defaults to <config_dir>/moodreads/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Folder holding moodreads.db and emotion_cache.json
    #[arg(long, global = true)]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build emotion profiles and vectors for stored books
    Profile {
        /// Re-profile every book, not only unprofiled ones
        #[arg(long)]
        all: bool,
    },
    /// Regenerate stale or missing vectors from stored profiles
    RefreshVectors,
    /// Recommend books for a mood (prints JSON)
    Recommend {
        mood: String,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = locate_config_file(cli.config.as_deref())?;
    let toml_config = match &config_path {
        Some(path) => read_toml_config(path)?,
        None => TomlConfig::default(),
    };
    init_tracing(&toml_config.logging)?;

    info!("Starting moodreads v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No config file found, using built-in defaults"),
    }

    let api_key = resolve_api_key(&toml_config)?;
    let root_folder = resolve_root_folder(cli.root_folder.as_deref(), &toml_config);
    let config = EngineConfig::from_toml(&root_folder, &toml_config);

    let engine = Engine::open(&config, api_key).await?;

    match cli.command {
        Command::Profile { all } => {
            let mode = if all { BatchMode::All } else { BatchMode::MissingProfile };
            let summary = engine.profiler.run(mode).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::RefreshVectors => {
            let summary = engine.profiler.refresh_vectors().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Recommend { mood, limit } => {
            let recommendations = engine.orchestrator.recommend(&mood, limit).await;
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        }
    }

    Ok(())
}
