#![warn(clippy::all, rust_2018_idioms)]

use std::{path::PathBuf, thread, time::Duration};

use anyhow::Context;
use clap::Parser;
use gridmap::OccupancyMapper;
use tracing_subscriber::EnvFilter;

mod config;
mod pipeline;
mod publisher;

use config::Config;
use pipeline::Pipeline;
use publisher::{GridSummary, Publisher};

/// Builds an occupancy grid from simulated laser scans and publishes it at a fixed rate.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of publication cycles to run, overrides `publish.cycles`.
    #[arg(long)]
    cycles: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    // Log to stdout (filter with `RUST_LOG=debug`).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(cycles) = cli.cycles {
        config.publish.cycles = cycles;
    }
    config.validate()?;

    run(config)
}

fn run(config: Config) -> anyhow::Result<()> {
    let simulator = config
        .simulator
        .instantiate()
        .context("could not set up the simulator")?;
    let mapper = OccupancyMapper::new(&config.map).context("invalid map config")?;

    let meta = mapper.map().meta();
    tracing::info!(
        "mapping {}x{} cells @ {}m, publishing at {}Hz for {} cycles",
        meta.width,
        meta.height,
        meta.resolution,
        config.publish.rate_hz,
        config.publish.cycles
    );

    let pipeline = Pipeline::start(simulator, mapper, config.queue_depth);
    let mut publisher = Publisher::new(pipeline.map().clone(), config.publish.grid_every);

    let period = Duration::from_secs_f32(1.0 / config.publish.rate_hz);
    let mut grids = 0;
    for _ in 0..config.publish.cycles {
        // transport is up to whoever consumes the publication
        let publication = publisher.publish();
        debug_assert_eq!(*publication.meta(), meta);
        if publication.grid().is_some() {
            grids += 1;
        }
        thread::sleep(period);
    }

    let map = pipeline.map().clone();
    let (scanner, mapping) = pipeline.stop()?;
    let final_grid = map.snapshot();

    tracing::info!(
        "published {} cycles, {} with the full grid",
        publisher.cycle(),
        grids
    );
    tracing::info!(
        "done: {} scans fused, {} rejected, {} dropped at the queue",
        mapping.applied,
        mapping.rejected,
        scanner.dropped
    );
    tracing::info!("update time {}", mapping.stats);
    tracing::info!("final map: {}", GridSummary::of(&final_grid));

    Ok(())
}
