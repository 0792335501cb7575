//! interactio - deterministic in-world crafting
//!
//! Headless runner: loads a recipe pack, simulates a scripted world and
//! reports every craft.

mod config;
mod demo;
mod pack;

use anyhow::{Context, Result};
use clap::Parser;
use config::{SimConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use interactio_crafting::RecipeRegistry;
use pack::RecipePack;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the interactio crafting demo headlessly", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Override the number of ticks to simulate
    #[arg(long)]
    ticks: Option<u64>,
    /// Override the world seed
    #[arg(long)]
    seed: Option<u64>,
    /// Write committed crafts as JSONL to this file
    #[arg(long)]
    event_log: Option<PathBuf>,
    /// Load recipes from this pack instead of the built-in one
    #[arg(long)]
    pack: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = SimConfig::try_load_from_path(&args.config);
    let filter = loaded
        .as_ref()
        .map_or(DEFAULT_LOG_FILTER, |cfg| cfg.log_filter.as_str())
        .to_string();
    // Config decides the default filter; RUST_LOG still wins.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    info!("Starting interactio v{}", env!("CARGO_PKG_VERSION"));

    let mut config = SimConfig::or_defaults(loaded, &args.config);
    if let Some(ticks) = args.ticks {
        config.ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.world_seed = seed;
    }
    if args.event_log.is_some() {
        config.event_log = args.event_log;
    }
    if args.pack.is_some() {
        config.recipe_pack = args.pack;
    }

    let pack = match &config.recipe_pack {
        Some(path) => RecipePack::load(path)?,
        None => RecipePack::builtin()?,
    };
    let catalog = pack.catalog();
    let mut registry = RecipeRegistry::new();
    let report = registry.load(pack.definitions(&catalog));
    if !report.rejected.is_empty() {
        warn!(
            "{} of {} recipes rejected",
            report.rejected.len(),
            report.rejected.len() + report.loaded
        );
    }
    info!(recipes = report.loaded, "recipe pack loaded");

    let summary = demo::run(&registry, &config).context("demo run failed")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to format summary")?
    );
    Ok(())
}
