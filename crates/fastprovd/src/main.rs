//! fastprovd — the fast provisioning daemon.
//!
//! Assembles the provisioning subsystems in one process:
//! - In-memory load statistics and build queue
//! - Simulated static pools from the config file
//! - Fast provisioning strategy + early-wake listener
//! - Provisioner tick loop and a work dispatcher
//!
//! # Usage
//!
//! ```text
//! fastprovd run --config fastprov.toml
//! fastprovd check-config --config fastprov.toml
//! ```

mod static_pool;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{debug, info};

use fastprov_core::{DrainSwitch, FastProvConfig, Label, LoadStatistics};
use fastprov_provisioner::{BuildQueue, InMemoryLoad, Provisioner};
use fastprov_strategy::{EarlyWakeListener, FastProvisioningStrategy};

use crate::static_pool::StaticPool;

#[derive(Parser)]
#[command(name = "fastprovd", about = "Fast capacity provisioning daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the provisioning loop against the configured pools.
    Run {
        /// Path to the config file.
        #[arg(long, default_value = "fastprov.toml")]
        config: PathBuf,

        /// Override the periodic tick interval in seconds.
        #[arg(long)]
        tick_secs: Option<u64>,

        /// Seed for randomized pool order.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate a config file and print the effective settings.
    CheckConfig {
        /// Path to the config file.
        #[arg(long, default_value = "fastprov.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,fastprov=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            tick_secs,
            seed,
        } => run(config, tick_secs, seed).await,
        Command::CheckConfig { config } => {
            let config = FastProvConfig::from_file(&config)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

async fn run(
    config_path: PathBuf,
    tick_secs: Option<u64>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let config = FastProvConfig::from_file(&config_path)?;
    anyhow::ensure!(tick_secs != Some(0), "--tick-secs must be at least 1");
    let interval = tick_secs.map_or_else(|| config.tick_interval(), Duration::from_secs);
    info!(path = ?config_path, pools = config.pools.len(), "config loaded");

    // ── Wire subsystems ────────────────────────────────────────

    let load = Arc::new(InMemoryLoad::new());
    let drain = Arc::new(DrainSwitch::new());
    let provisioner = Arc::new(Provisioner::new(load.clone()));

    for pool_config in &config.pools {
        let pool = StaticPool::from_config(pool_config, tokio::runtime::Handle::current());
        info!(
            pool = %pool_config.name,
            max_slots = pool_config.max_slots,
            "static pool registered"
        );
        provisioner.register_cloud(Arc::new(pool));
    }

    let mut strategy = FastProvisioningStrategy::new(drain.clone(), Arc::new(config.clone()));
    if let Some(seed) = seed {
        strategy = strategy.with_seed(seed);
    }
    provisioner.register_strategy(Arc::new(strategy));

    let queue = Arc::new(BuildQueue::new(load.clone()));
    queue.register_listener(Arc::new(EarlyWakeListener::new(
        provisioner.clone(),
        provisioner.clone(),
    )));

    // ── Seed demand ────────────────────────────────────────────

    for demand in &config.demand {
        let label = demand.label.as_deref().and_then(Label::parse);
        provisioner.watch_label(label.as_ref());
        for _ in 0..demand.count {
            queue.enter_buildable(label.clone());
        }
        info!(
            label = %Label::describe(label.as_ref()),
            count = demand.count,
            "demand enqueued"
        );
    }

    // ── Start background tasks ─────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let provisioner_handle = tokio::spawn(provisioner.clone().run(interval, shutdown_rx.clone()));
    let dispatch_handle = tokio::spawn(dispatch_loop(queue.clone(), shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    // Quiet down first so no tick provisions while the loop winds down.
    drain.begin_drain();
    let _ = shutdown_tx.send(true);

    let _ = provisioner_handle.await;
    let _ = dispatch_handle.await;

    for label in load.labels() {
        let snapshot = load.snapshot(label.as_ref());
        info!(
            label = %Label::describe(label.as_ref()),
            queue = snapshot.queue_length,
            available = snapshot.available_executors,
            planned = provisioner.planned_capacity(label.as_ref()),
            "final load"
        );
    }

    info!("fastprovd stopped");
    Ok(())
}

/// Hand waiting work to idle executors.
async fn dispatch_loop(queue: Arc<BuildQueue>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for label in queue.labels() {
                    let mut assigned = 0u32;
                    while queue.take(label.as_ref()).is_some() {
                        assigned += 1;
                    }
                    if assigned > 0 {
                        debug!(label = %Label::describe(label.as_ref()), assigned, "work assigned");
                    }
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}
