#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Planet Protector spawning session.

mod simulation;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use planet_protector_core::SpawnerConfig;
use planet_protector_system_spawning::Spawning;
use planet_protector_world::{Playfield, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use simulation::SimulationOptions;

/// Simulates hazard waves against a headless playfield and reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "planet-protector", version)]
struct Cli {
    /// TOML file with `[spawner]` tuning and `[session]` defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the deterministic random source.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Playfield width in world units; overrides the config file.
    #[arg(long)]
    width: Option<f64>,
    /// Playfield height in world units; overrides the config file.
    #[arg(long)]
    height: Option<f64>,
    /// Lifetime of a hazard before it leaves the playfield; overrides the config file.
    #[arg(long)]
    hazard_lifetime_ms: Option<u64>,
    /// Maximum log level (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    #[arg(long, default_value = "info", value_parser = parse_level)]
    log_level: LevelFilter,
    /// Writes logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// On-disk configuration layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    spawner: SpawnerConfig,
    session: SessionFile,
}

/// Session settings that may also be supplied on the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SessionFile {
    width: Option<f64>,
    height: Option<f64>,
    hazard_lifetime_ms: Option<u64>,
}

/// Entry point for the Planet Protector command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    install_logger(cli.log_level, cli.log_file.as_deref())?;

    let file = match cli.config.as_deref() {
        Some(path) => load_config(path)?,
        None => ConfigFile::default(),
    };

    let defaults = Playfield::default();
    let playfield = Playfield::new(
        cli.width
            .or(file.session.width)
            .unwrap_or(defaults.width()),
        cli.height
            .or(file.session.height)
            .unwrap_or(defaults.height()),
    );
    let hazard_lifetime = cli
        .hazard_lifetime_ms
        .or(file.session.hazard_lifetime_ms)
        .map(Duration::from_millis);

    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    let mut spawning = Spawning::new(&file.spawner, &mut rng)
        .map_err(|err| {
            error!("rejected spawner configuration: {err}");
            err
        })
        .context("invalid spawner configuration")?;
    let mut world = World::new(playfield, hazard_lifetime);

    info!(
        "simulating {} ticks of {}ms on a {}x{} playfield (seed {})",
        cli.ticks,
        cli.tick_ms,
        playfield.width(),
        playfield.height(),
        cli.seed
    );

    let summary = simulation::run(
        &mut world,
        &mut spawning,
        SimulationOptions {
            ticks: cli.ticks,
            tick: Duration::from_millis(cli.tick_ms),
        },
        &mut rng,
    );
    println!("{summary}");
    Ok(())
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse()
        .map_err(|err: log::ParseLevelError| err.to_string())
}

fn install_logger(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => simple_logging::log_to_file(path, level)
            .with_context(|| format!("failed to open log file {}", path.display())),
        None => {
            simple_logging::log_to_stderr(level);
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> Result<ConfigFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_config(contents: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(contents)?)
}
