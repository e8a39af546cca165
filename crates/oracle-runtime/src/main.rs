//! # Quorum-Oracle Runtime
//!
//! ```text
//! oracle-runtime [run]                 launch ledger + agents until Ctrl+C
//! oracle-runtime status --asset <id>   print round/price/registry state
//! oracle-runtime leave --key <hex>     unregister one identity
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use oracle_runtime::{OracleRuntime, RuntimeConfig};
use oracle_telemetry::{init_telemetry, TelemetryConfig};
use qo_05_reporter::{DriverConfig, RpcLedgerClient, TransactionDriver, TxIntent};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{format_address, format_hash, Price, PRICE_DECIMALS, U256};

#[derive(Parser)]
#[command(name = "oracle-runtime")]
#[command(about = "Quorum-Oracle: reporter agents and ledger host", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Launch the ledger (unless RPC_URL is set) and every reporter agent
    Run,

    /// Print the round, price and registry state of an asset
    Status {
        /// Asset identifier
        #[arg(short, long, default_value = "ethereum")]
        asset: String,

        /// Ledger JSON-RPC endpoint (defaults to RPC_URL or the embedded port)
        #[arg(long)]
        rpc_url: Option<String>,
    },

    /// Remove one identity from the reporter registry
    Leave {
        /// Hex secp256k1 private key of the identity
        #[arg(short, long)]
        key: String,

        /// Ledger JSON-RPC endpoint (defaults to RPC_URL or the embedded port)
        #[arg(long)]
        rpc_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run().await,
        Command::Status { asset, rpc_url } => status(&asset, rpc_url).await,
        Command::Leave { key, rpc_url } => leave(&key, rpc_url).await,
    }
}

async fn run() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Invalid configuration")?;

    info!("===========================================");
    info!("  Quorum-Oracle Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        reporters = config.keys.len(),
        assets = ?config.assets,
        interval_secs = config.submission_interval.as_secs(),
        "Starting"
    );

    let runtime = OracleRuntime::start(config)
        .await
        .context("Failed to start runtime")?;

    info!("Oracle is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}

fn ledger_client(rpc_url: Option<String>) -> Result<RpcLedgerClient> {
    let url = match rpc_url {
        Some(url) => url,
        None => RuntimeConfig::from_env()
            .context("Invalid configuration")?
            .ledger_url(),
    };
    Ok(RpcLedgerClient::new(url)?)
}

async fn status(asset: &str, rpc_url: Option<String>) -> Result<()> {
    let client = ledger_client(rpc_url)?;

    let block = client.block_number().await?;
    let reporters = client.reporter_count().await?;
    let quorum = client.quorum().await?;
    let round = client.round(asset).await?;
    let published = client.published(asset).await?;

    println!("Ledger:     {} (block #{block})", client.url());
    println!("Reporters:  {reporters} (quorum {quorum})");
    println!(
        "Round:      #{} with {}/{quorum} submissions",
        round.id, round.submission_count
    );
    match published {
        Some(p) => println!(
            "Price:      {} USD (round #{}, finalized at {})",
            format_price(p.price),
            p.round_id,
            p.finalized_at
        ),
        None => println!("Price:      not finalized yet"),
    }
    Ok(())
}

async fn leave(key: &str, rpc_url: Option<String>) -> Result<()> {
    let key = Secp256k1KeyPair::from_hex(key).context("Invalid private key")?;
    let client = Arc::new(ledger_client(rpc_url)?);

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let driver = TransactionDriver::new(client, key, DriverConfig::default(), shutdown_rx);
    let address = driver.address();

    let receipt = driver
        .execute(TxIntent::Unregister)
        .await
        .with_context(|| format!("Failed to unregister {}", format_address(&address)))?;

    println!(
        "Unregistered {} in block #{} (tx {})",
        format_address(&address),
        receipt.block_number,
        format_hash(&receipt.tx_hash)
    );
    Ok(())
}

/// Renders a fixed-point price with all its decimals.
fn format_price(price: Price) -> String {
    let scale = U256::exp10(PRICE_DECIMALS as usize);
    format!(
        "{}.{:0width$}",
        price / scale,
        (price % scale).low_u64(),
        width = PRICE_DECIMALS as usize
    )
}
