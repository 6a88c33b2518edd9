//! zmm quoting engine - Entry Point

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use zmm_bot::{AppConfig, CliOverrides, Supervisor};
use zmm_core::Network;

/// Two-sided quoting engine for an on-chain perp market
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via ZMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Network to quote on (mainnet, devnet, localnet)
    #[arg(short, long)]
    network: Option<Network>,

    /// RPC endpoint override
    #[arg(short, long)]
    url: Option<String>,

    /// Asset symbol
    #[arg(short, long)]
    asset: Option<String>,

    /// Quote size in lots
    #[arg(short, long)]
    size: Option<Decimal>,

    /// Quote edge in bps
    #[arg(short, long)]
    edge: Option<Decimal>,

    /// Quote offset in bps (accepted, not applied)
    #[arg(short, long)]
    offset: Option<Decimal>,

    /// JSON-lines book update file to replay
    #[arg(short, long)]
    replay: Option<String>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            network: self.network,
            url: self.url.clone(),
            asset: self.asset.clone(),
            size: self.size,
            edge_bps: self.edge,
            offset_bps: self.offset,
            replay: self.replay.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    zmm_telemetry::init_logging()?;

    info!("Starting zmm v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > ZMM_CONFIG env var > default
    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var("ZMM_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let mut config = AppConfig::load(&config_path)?;
    config.apply_overrides(&args.overrides());
    config.validate()?;
    info!(
        network = %config.network,
        endpoint = %config.endpoint(),
        asset = %config.asset(),
        "Configuration loaded"
    );

    let supervisor = Supervisor::from_config(&config)?;
    let final_state = supervisor.run(CancellationToken::new()).await?;
    info!(state = final_state.as_str(), "Exiting");

    Ok(())
}
