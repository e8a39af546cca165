//! Starts and stops every task of a deployment.
//!
//! ## Startup Sequence
//!
//! 1. Ledger: embedded host (block loop, JSON-RPC server, price log) or a
//!    JSON-RPC client of a remote one
//! 2. Price source shared by all agents
//! 3. One task per agent: register, then serve HTTP and run the submission loop
//!
//! Every task watches the same shutdown channel.

use crate::config::{LedgerTarget, PriceSourceConfig, RuntimeConfig};
use qo_03_ledger::{spawn_rpc_server, LedgerNode, SystemTimeSource};
use qo_04_price_feed::{CoinGeckoClient, FetchError, PriceSource, StaticPriceSource};
use qo_05_reporter::{
    shutdown_requested, spawn_http_server, AgentConfig, DriverConfig, InProcessLedgerClient,
    LedgerClient, LedgerClientError, ReporterAgent, RpcLedgerClient, TransactionDriver,
};
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, OracleEvent};
use shared_types::{format_address, format_hash};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn, Instrument};

/// Time granted to tasks to wind down after the shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Startup failures.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to bind {what} on {addr}: {source}")]
    Bind {
        what: &'static str,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("price source: {0}")]
    PriceSource(#[from] FetchError),

    #[error("ledger client: {0}")]
    LedgerClient(#[from] LedgerClientError),
}

/// A running deployment.
pub struct OracleRuntime {
    ledger: Option<Arc<LedgerNode>>,
    ledger_rpc: Option<SocketAddr>,
    agents: Vec<Arc<ReporterAgent>>,
    tasks: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl OracleRuntime {
    /// Starts every task described by `config`.
    pub async fn start(config: RuntimeConfig) -> Result<Self, LaunchError> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = Vec::new();

        let (client, ledger, ledger_rpc) = match config.ledger {
            LedgerTarget::Embedded {
                config: ledger_config,
                rpc_port,
            } => {
                let bus = Arc::new(InMemoryEventBus::new());
                let node = Arc::new(LedgerNode::new(
                    ledger_config,
                    bus.clone(),
                    Arc::new(SystemTimeSource),
                ));

                tasks.push(spawn_price_log(&bus, shutdown_rx.clone()));
                tasks.push(tokio::spawn(node.clone().run(shutdown_rx.clone())));

                let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, rpc_port));
                let (bound, handle) = spawn_rpc_server(node.clone(), addr, shutdown_rx.clone())
                    .await
                    .map_err(|source| LaunchError::Bind {
                        what: "ledger JSON-RPC",
                        addr,
                        source,
                    })?;
                tasks.push(handle);
                info!(rpc = %bound, chain_id = node.chain_id(), "Embedded ledger started");

                let client: Arc<dyn LedgerClient> = Arc::new(InProcessLedgerClient::new(node.clone()));
                (client, Some(node), Some(bound))
            }
            LedgerTarget::Remote { url } => {
                info!(url = %url, "Using remote ledger");
                let client: Arc<dyn LedgerClient> = Arc::new(RpcLedgerClient::new(url)?);
                (client, None, None)
            }
        };

        let prices = build_price_source(config.prices)?;

        let mut agents = Vec::with_capacity(config.keys.len());
        for (index, key) in config.keys.into_iter().enumerate() {
            let driver = TransactionDriver::new(
                client.clone(),
                key,
                DriverConfig::default(),
                shutdown_rx.clone(),
            );
            let agent = Arc::new(ReporterAgent::new(
                AgentConfig {
                    index,
                    assets: config.assets.clone(),
                    interval: config.submission_interval,
                    ..AgentConfig::default()
                },
                driver,
                client.clone(),
                prices.clone(),
            ));
            info!(node = index, address = %format_address(&agent.address()), "Agent created");

            let http_addr = agent_http_addr(config.http_port, index);
            tasks.push(tokio::spawn(run_agent(
                agent.clone(),
                prices.clone(),
                http_addr,
                shutdown_rx.clone(),
            )));
            agents.push(agent);
        }

        Ok(Self {
            ledger,
            ledger_rpc,
            agents,
            tasks,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// The embedded ledger, if this process hosts it.
    pub fn ledger(&self) -> Option<&Arc<LedgerNode>> {
        self.ledger.as_ref()
    }

    /// Address of the embedded ledger's JSON-RPC server.
    pub fn ledger_rpc(&self) -> Option<SocketAddr> {
        self.ledger_rpc
    }

    pub fn agents(&self) -> &[Arc<ReporterAgent>] {
        &self.agents
    }

    /// A receiver of the deployment-wide shutdown signal.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Signals every task and waits for them to finish, up to a grace period.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");
        if self.shutdown_tx.send(true).is_err() {
            warn!("No task was listening for the shutdown signal");
        }

        let tasks = self.tasks;
        let join_all = async move {
            for task in tasks {
                if let Err(e) = task.await {
                    error!(error = %e, "Task ended abnormally");
                }
            }
        };
        if tokio::time::timeout(SHUTDOWN_GRACE, join_all).await.is_err() {
            warn!(grace_secs = SHUTDOWN_GRACE.as_secs(), "Tasks still running after grace period");
        }

        info!("Shutdown complete");
    }
}

/// Port `0` binds every agent to an ephemeral port.
fn agent_http_addr(base_port: u16, index: usize) -> SocketAddr {
    let port = if base_port == 0 {
        0
    } else {
        base_port.saturating_add(u16::try_from(index).unwrap_or(u16::MAX))
    };
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

fn build_price_source(config: PriceSourceConfig) -> Result<Arc<dyn PriceSource>, FetchError> {
    match config {
        PriceSourceConfig::CoinGecko(cg) => {
            if cg.api_key.is_none() {
                warn!("COINGECKO_API_KEY is not set; requests may be rate limited");
            }
            Ok(Arc::new(CoinGeckoClient::new(cg)?))
        }
        PriceSourceConfig::Static(quotes) => {
            info!(assets = quotes.len(), "Using static prices");
            let source = quotes
                .into_iter()
                .fold(StaticPriceSource::new(), |source, (asset, quote)| {
                    source.with_quote(&asset, quote)
                });
            Ok(Arc::new(source))
        }
    }
}

/// Registration gates everything else: an agent that cannot register
/// neither serves HTTP nor submits.
async fn run_agent(
    agent: Arc<ReporterAgent>,
    prices: Arc<dyn PriceSource>,
    http_addr: SocketAddr,
    shutdown: watch::Receiver<bool>,
) {
    let span = agent.span();
    async move {
        if let Err(e) = agent.ensure_registered().await {
            error!(error = %e, "Agent stopped before starting");
            return;
        }

        let http = match spawn_http_server(prices, http_addr, shutdown.clone()).await {
            Ok((_, handle)) => Some(handle),
            Err(e) => {
                error!(addr = %http_addr, error = %e, "HTTP server failed to start");
                None
            }
        };

        agent.run(shutdown).await;

        if let Some(handle) = http {
            if let Err(e) = handle.await {
                error!(error = %e, "HTTP server task ended abnormally");
            }
        }
    }
    .instrument(span)
    .await
}

/// Logs every finalized price and registry change published by the ledger;
/// blocks are logged at debug level. Ends on shutdown or when the bus is
/// dropped.
pub fn spawn_price_log(
    bus: &InMemoryEventBus,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let mut events = bus.event_stream(EventFilter::topics(vec![
        EventTopic::Finalization,
        EventTopic::Registry,
        EventTopic::Ledger,
    ]));

    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = shutdown_requested(&mut shutdown) => break,
                event = events.next() => event,
            };
            match event {
                Some(OracleEvent::PriceFinalized {
                    asset,
                    price,
                    round_id,
                    finalized_at,
                }) => {
                    info!(asset = %asset, price = %price, round_id, finalized_at, "Price updated");
                }
                Some(OracleEvent::ReporterRegistered {
                    reporter,
                    registry_size,
                }) => {
                    info!(reporter = %format_address(&reporter), registry_size, "Reporter joined");
                }
                Some(OracleEvent::ReporterRemoved {
                    reporter,
                    registry_size,
                }) => {
                    info!(reporter = %format_address(&reporter), registry_size, "Reporter left");
                }
                Some(OracleEvent::BlockProduced { number, hash, .. }) => {
                    debug!(number, hash = %format_hash(&hash), "Block produced");
                }
                None => break,
            }
        }
    })
}
