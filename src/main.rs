//! Commodity market simulator - main binary.
//!
//! Wires the simulation controller to the HTTP surface: loads configuration
//! and the commodity catalog, optionally fast-forwards history, then serves
//! the API until interrupted.

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use server::{ServerConfig, ServerState, serve};
use simulation::{CommodityCatalog, RuntimeConfig, Simulation};

#[derive(Parser)]
#[command(name = "commodity-sim")]
#[command(about = "Agent-based commodity market simulation engine")]
struct Cli {
    /// Path to the runtime config JSON (merge-patched over defaults).
    #[arg(long, default_value = "config.json")]
    config: String,

    /// Path to the commodity catalog JSON.
    #[arg(long, default_value = "commodities.json")]
    commodities: String,

    /// API server host.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// API server port.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Default directory for tick exports.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Start ticking immediately.
    #[arg(long)]
    auto_start: bool,

    /// Populate this many days of history before serving.
    #[arg(long, num_args = 0..=1, default_missing_value = "180")]
    populate: Option<u32>,

    /// Populate exactly this many ticks before serving.
    #[arg(long, num_args = 0..=1, default_missing_value = "100000")]
    populate_ticks: Option<u64>,

    /// Export the tick buffer as CSV right after startup/population.
    #[arg(long)]
    export_on_start: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("=== commodity market simulation engine ===");

    // Runtime config: file is optional, malformed content is fatal.
    let mut config = RuntimeConfig::default();
    match fs::read_to_string(&cli.config) {
        Ok(raw) => {
            let patch: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("parsing config file {}", cli.config))?;
            config = config
                .merge_patch(&patch)
                .with_context(|| format!("applying config file {}", cli.config))?;
            info!(path = %cli.config, "config loaded");
        }
        Err(_) => warn!(path = %cli.config, "config file not found, using defaults"),
    }

    let sim = Simulation::new(config);

    // Commodity catalog: file optional, falls back to the built-in world.
    match fs::read_to_string(&cli.commodities) {
        Ok(raw) => {
            let catalog = CommodityCatalog::from_json(&raw)
                .with_context(|| format!("parsing catalog file {}", cli.commodities))?;
            info!(path = %cli.commodities, count = catalog.commodities.len(), "catalog loaded");
            sim.set_catalog(catalog);
        }
        Err(_) => warn!(path = %cli.commodities, "catalog file not found, using defaults"),
    }

    sim.initialize()
        .map_err(|e| anyhow::anyhow!("initialization failed: {}", e))?;

    if let Some(days) = cli.populate {
        info!(days, "populating history");
        let start_date = sim.runtime_config().simulation.start_date;
        sim.populate(days, &start_date)
            .map_err(|e| anyhow::anyhow!("populate failed: {}", e))?;
    } else if let Some(ticks) = cli.populate_ticks {
        info!(ticks, "populating history");
        let start_date = sim.runtime_config().simulation.start_date;
        sim.populate_ticks(ticks, &start_date)
            .map_err(|e| anyhow::anyhow!("populate failed: {}", e))?;
    }

    if cli.export_on_start {
        sim.export_csv(&cli.data_dir, 0)
            .map_err(|e| anyhow::anyhow!("export failed: {}", e))?;
        info!(dir = %cli.data_dir.display(), "startup export complete");
    }

    if cli.auto_start {
        sim.start();
    }

    let state = ServerState::new(sim.clone(), cli.data_dir.clone());
    let server_config = ServerConfig {
        host: cli.host,
        port: cli.port,
    };

    info!(addr = %server_config.bind_addr(), "ready, press ctrl-c to exit");
    tokio::select! {
        result = serve(state, server_config) => {
            result.context("api server failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    sim.stop();
    info!("clean shutdown");
    Ok(())
}
