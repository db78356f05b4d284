#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Grand Chase experience.

mod config;
mod simulation;

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::Parser;
use grand_chase_rendering::RenderingBackend;
use grand_chase_rendering_terminal::TerminalBackend;
use grand_chase_system_bootstrap::Bootstrap;
use grand_chase_world::World;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::ConfigFile, simulation::Simulation};

/// Command-line arguments accepted by the Grand Chase binary.
#[derive(Debug, Parser)]
#[command(name = "grand-chase", version, about = "Cat and mouse chase in the terminal")]
struct CliArgs {
    /// TOML file overriding the default gameplay tunables.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for item placement; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Frames presented per second.
    #[arg(long, value_name = "FPS")]
    fps: Option<u32>,
    /// File receiving log output while the game owns the terminal.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Accept a reset after the final level has been cleared.
    #[arg(long)]
    replay_after_final_win: bool,
}

/// Entry point for the Grand Chase command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_file.as_deref())?;

    let mut config = match &args.config {
        Some(path) => ConfigFile::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => ConfigFile::default(),
    };
    if let Some(fps) = args.fps {
        config.frames_per_second = fps;
    }
    if args.replay_after_final_win {
        config.replay_after_final_win = true;
    }
    let settings = config.into_settings().context("configuration rejected")?;

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, fps = settings.frames_per_second, "starting session");

    let bootstrap = Bootstrap;
    let replay_after_final_win = settings.rules.replay_after_final_win;
    let world = World::new(settings.rules, seed).context("gameplay rules rejected")?;
    let mut simulation = Simulation::new(world, &bootstrap, replay_after_final_win);

    TerminalBackend::new(settings.frames_per_second).run(
        bootstrap.title(),
        move |dt, input, scene| simulation.frame(dt, input, scene),
    )
}

/// Installs the global subscriber. The terminal is in raw mode while the
/// game runs, so full output only goes to an explicit log file.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("warn"))
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}
