//! Separator Energy - dashboard backend
//!
//! Serves per-minute operating state and time-of-use energy cost for a
//! separator motor, computed on demand from the plant historian.
//!
//! # Usage
//!
//! ```bash
//! # Live, against the configured TimeBase historian
//! cargo run --release
//!
//! # Explicit config file and bind address
//! ./separator-energy --config /etc/separator/energy_config.toml --addr 0.0.0.0:3030
//!
//! # Offline replay of a captured JSON file (clock pinned to the last sample)
//! ./separator-energy --replay capture.json
//! ```
//!
//! # Environment Variables
//!
//! - `SEPARATOR_CONFIG`: Path to the facility TOML config
//! - `SEPARATOR_SERVER_ADDR`: Bind address override
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use separator_energy::api::{create_app, DashboardState};
use separator_energy::config::{FacilityConfig, RuntimeConfig, RuntimeConfigManager};
use separator_energy::historian::{HistorianSource, MemoryHistorian, TimeBaseClient};
use separator_energy::pipeline::{Clock, EnergyPipeline};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "separator-energy")]
#[command(about = "Separator energy dashboard backend")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default from config: "0.0.0.0:3030")
    #[arg(short, long, env = "SEPARATOR_SERVER_ADDR")]
    addr: Option<String>,

    /// Facility config file; skips the SEPARATOR_CONFIG / ./energy_config.toml search
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Serve a captured JSON file (`{ "<tag alias>": [TVQ, ...] }`) instead of the historian
    #[arg(long, value_name = "PATH")]
    replay: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init(),
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
    }
}

// ============================================================================
// Startup
// ============================================================================

fn load_config(args: &CliArgs) -> Result<FacilityConfig> {
    match &args.config {
        Some(path) => FacilityConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(FacilityConfig::load()),
    }
}

/// Live historian with the system clock, or a replay file with the clock
/// pinned to its latest sample so lookback windows cover the capture.
fn build_historian(args: &CliArgs, config: &FacilityConfig) -> Result<(Arc<dyn HistorianSource>, Clock)> {
    if let Some(path) = &args.replay {
        let replay = MemoryHistorian::load_replay(path, &config.tags, config.historian.min_good_quality)?;
        let clock = match replay.latest_timestamp() {
            Some(latest) => Clock::Fixed(latest),
            None => {
                warn!(path = %path.display(), "Replay file has no samples, using system clock");
                Clock::System
            }
        };
        return Ok((Arc::new(replay), clock));
    }

    let client = TimeBaseClient::new(&config.historian).context("Failed to build historian client")?;
    info!(
        url = %client.data_url(),
        lookback_days = config.historian.lookback_days,
        "Using TimeBase historian"
    );
    Ok((Arc::new(client), Clock::System))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_format);

    let config = load_config(&args)?;
    let addr = args.addr.clone().unwrap_or_else(|| config.server.addr.clone());
    info!(
        facility = %config.facility.name,
        timezone = %config.facility.timezone,
        "Separator energy dashboard starting"
    );

    let (historian, clock) = build_historian(&args, &config)?;
    let runtime = Arc::new(RuntimeConfigManager::new(RuntimeConfig::from_electrical(&config.electrical)));
    let pipeline = Arc::new(EnergyPipeline::new(historian, Arc::new(config), runtime));
    let app = create_app(DashboardState::new(pipeline, clock));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "HTTP server listening");

    let cancel_token = CancellationToken::new();
    let shutdown = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
        shutdown.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}
