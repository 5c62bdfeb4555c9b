//! nomad-world-sim binary
//!
//! Runs the simulator either headless (replay an action log for a fixed
//! number of ticks and print the final snapshot) or in realtime until
//! Ctrl-C.
//!
//! ## Configuration (env / TOML via `config` crate)
//!
//! | Key                           | Default        | Description                     |
//! |-------------------------------|----------------|---------------------------------|
//! | `NOMAD_SEED`                  | `1000`         | Planet seed                     |
//! | `NOMAD_TICK_MS`               | `12`           | Logical tick length             |
//! | `NOMAD_CHUNK_SIZE`            | `64`           | Chunk side in planet units      |
//! | `NOMAD_PLANET_CHUNKS`         | `1000`         | Chunks per planet side          |
//! | `NOMAD_CHUNK_CACHE_CAPACITY`  | `4096`         | Cached chunks (0 = unbounded)   |
//! | `NOMAD_MOUNT_POLICY`          | `first_match`  | `first_match` or `nearest`      |

use anyhow::{Context, Result};
use clap::Parser;
use nomad_world::{
    actor::JoinDetails,
    replay::{self, ActionLog},
    runner,
    service::WorldService,
    settings::SimConfig,
};
use std::path::PathBuf;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "nomad-world-sim", about = "Nomad World Simulator", version)]
struct Args {
    /// TOML configuration file
    #[arg(long, env = "NOMAD_CONFIG")]
    config: Option<PathBuf>,

    /// Planet seed (overrides config)
    #[arg(long)]
    seed: Option<i64>,

    /// Tick length in milliseconds (overrides config)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// JSON action log to replay
    #[arg(long)]
    actions: Option<PathBuf>,

    /// Ticks to run headless (defaults to the last logged tick + 1)
    #[arg(long)]
    ticks: Option<u64>,

    /// Run the realtime loop until Ctrl-C instead of replaying
    #[arg(long)]
    realtime: bool,

    /// Nomad to join in realtime mode
    #[arg(long, default_value = "nomad-1")]
    nomad: String,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nomad_world=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config =
        SimConfig::load(args.config.as_deref()).context("Failed to load simulator config")?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.tick_ms = tick_ms;
    }
    config.validate().context("Invalid simulator config")?;

    log::info!(
        "Starting nomad-world-sim (name='{}', seed={}, tick={}ms, cache={})",
        config.name,
        config.seed,
        config.tick_ms,
        config.chunk_cache_capacity,
    );

    if args.realtime {
        run_realtime(config, &args.nomad).await
    } else {
        run_headless(config, &args)
    }
}

fn run_headless(config: SimConfig, args: &Args) -> Result<()> {
    let action_log = match &args.actions {
        Some(path) => ActionLog::from_path(path)
            .with_context(|| format!("Failed to read action log {}", path.display()))?,
        None => ActionLog {
            joins: vec![args.nomad.clone()],
            actions: Vec::new(),
        },
    };
    let ticks = args.ticks.unwrap_or_else(|| action_log.last_tick() + 1);

    let mut service = replay::replay(config, &action_log, ticks)?;
    log::info!("Replay finished: {:?}", service.stats());

    for id in &action_log.joins {
        if let Some(snapshot) = service.snapshot_for(id) {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }
    Ok(())
}

async fn run_realtime(config: SimConfig, nomad: &str) -> Result<()> {
    let service = WorldService::new(config)?;
    let handle = runner::start(service);
    handle.join(nomad, JoinDetails::default());

    let mut events = handle.subscribe();
    let watcher = tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Snapshot watcher lagged, skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            let n = &event.payload.nomad;
            log::debug!(
                "tick {} {}: ({}, {}, {:.1}) {:?}",
                event.tick,
                event.nomad_id,
                n.x,
                n.y,
                n.z,
                n.locomotion
            );
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    log::info!("Shutting down (SIGINT)");

    handle.shutdown().await;
    watcher.abort();
    Ok(())
}
