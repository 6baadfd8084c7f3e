//! enchantcraft - declarative custom enchantments on a headless host
//!
//! Loads `config/enchantcraft.toml` (or the path given as the first argument),
//! reads enchantment definitions from content packs and runs the simulation.

mod config;
mod content_packs;
mod demo;

use anyhow::Result;
use config::{HostConfig, DEFAULT_CONFIG_PATH};
use content_packs::ContentPacks;
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let loaded = HostConfig::try_load_from_path(&config_path);

    // RUST_LOG wins, then the config file, then WARN.
    let fallback = loaded
        .as_ref()
        .ok()
        .and_then(|cfg| cfg.log_filter.clone())
        .unwrap_or_else(|| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();

    info!("Starting enchantcraft v{}", env!("CARGO_PKG_VERSION"));

    let config = loaded.unwrap_or_else(|err| {
        warn!("{err:#}. Using defaults");
        HostConfig::default()
    });
    let packs = ContentPacks::load_lenient(Path::new(&config.content_packs_dir));
    let report = demo::run(&config, packs)?;
    info!(
        ticks = report.ticks,
        players = report.players_online,
        registered = report.registered,
        "Simulation finished"
    );
    Ok(())
}
