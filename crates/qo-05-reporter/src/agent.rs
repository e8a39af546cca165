//! # Reporter Agent
//!
//! One identity, one key, one price source. Registers once, then submits a
//! quote per asset on every tick until shutdown.

use crate::domain::{AgentError, DriverError, TxIntent};
use crate::driver::TransactionDriver;
use crate::ports::LedgerClient;
use crate::shutdown_requested;
use oracle_telemetry::{metric_inc, PRICE_FETCH_FAILURES, REPORTER_SUBMISSIONS};
use qo_04_price_feed::PriceSource;
use shared_types::{format_address, short_address, Address, Receipt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};

/// Per-agent settings.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Position of the agent in the launcher, used in logs.
    pub index: usize,
    pub assets: Vec<String>,
    /// Time between ticks.
    pub interval: Duration,
    /// Pause between two assets of the same tick.
    pub asset_delay: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            index: 0,
            assets: vec!["ethereum".to_string()],
            interval: Duration::from_secs(20),
            asset_delay: Duration::from_secs(1),
        }
    }
}

/// Outcome of one pass over the asset list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundReport {
    pub confirmed: usize,
    pub failed: usize,
}

/// A reporter agent.
pub struct ReporterAgent {
    config: AgentConfig,
    address: Address,
    label: String,
    driver: TransactionDriver,
    client: Arc<dyn LedgerClient>,
    prices: Arc<dyn PriceSource>,
    confirmed: AtomicU64,
    failed: AtomicU64,
}

impl ReporterAgent {
    pub fn new(
        config: AgentConfig,
        driver: TransactionDriver,
        client: Arc<dyn LedgerClient>,
        prices: Arc<dyn PriceSource>,
    ) -> Self {
        let address = driver.address();
        Self {
            label: short_address(&address),
            config,
            address,
            driver,
            client,
            prices,
            confirmed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Submissions confirmed since start.
    pub fn confirmed(&self) -> u64 {
        self.confirmed.load(Ordering::Relaxed)
    }

    /// Submissions that failed since start.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Span carrying this agent's identity; every agent log line is emitted inside it.
    pub fn span(&self) -> tracing::Span {
        info_span!("reporter", node = self.config.index, address = %self.label)
    }

    /// Registers the agent unless it already is a member.
    pub async fn ensure_registered(&self) -> Result<(), AgentError> {
        async {
            let member = self
                .client
                .is_reporter(&self.address)
                .await
                .map_err(|e| AgentError::RegistrationFailed(e.to_string()))?;
            if member {
                debug!("Already registered");
                return Ok(());
            }

            info!(address = %format_address(&self.address), "Registering");
            self.driver
                .execute(TxIntent::Register)
                .await
                .map_err(|e| AgentError::RegistrationFailed(e.to_string()))?;
            info!("Registered");
            Ok(())
        }
        .instrument(self.span())
        .await
    }

    /// Leaves the registry through the `Unregister` intent.
    pub async fn leave(&self) -> Result<Receipt, DriverError> {
        self.driver
            .execute(TxIntent::Unregister)
            .instrument(self.span())
            .await
    }

    /// Fetches the current quote of `asset` and drives it to a confirmed
    /// submission.
    pub async fn submit_price(&self, asset: &str) -> Result<Receipt, AgentError> {
        let price = match self.prices.fetch_price(asset).await {
            Ok(price) => price,
            Err(source) => {
                metric_inc!(PRICE_FETCH_FAILURES, &[asset]);
                return Err(AgentError::FetchFailed {
                    asset: asset.to_string(),
                    source,
                });
            }
        };
        info!(asset, price = %price, "Fetched price");

        let intent = TxIntent::Submit {
            asset: asset.to_string(),
            price,
        };
        self.driver
            .execute(intent)
            .await
            .map_err(|source| AgentError::Submission {
                asset: asset.to_string(),
                source,
            })
    }

    /// One pass over the asset list. Failures are logged and counted; they
    /// never stop the pass.
    pub async fn run_round(&self) -> RoundReport {
        let mut report = RoundReport::default();
        for (i, asset) in self.config.assets.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.asset_delay).await;
            }
            match self.submit_price(asset).await {
                Ok(receipt) => {
                    report.confirmed += 1;
                    self.confirmed.fetch_add(1, Ordering::Relaxed);
                    metric_inc!(REPORTER_SUBMISSIONS, &[self.label.as_str(), asset.as_str(), "confirmed"]);
                    info!(asset = %asset, block = receipt.block_number, "Submission confirmed");
                }
                Err(e) => {
                    report.failed += 1;
                    self.failed.fetch_add(1, Ordering::Relaxed);
                    metric_inc!(REPORTER_SUBMISSIONS, &[self.label.as_str(), asset.as_str(), "failed"]);
                    warn!(asset = %asset, error = %e, "Submission failed");
                }
            }
        }
        report
    }

    /// Runs a pass immediately and then once per interval until shutdown.
    /// An in-flight pass is abandoned when shutdown fires.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let span = self.span();
        async move {
            info!(
                assets = ?self.config.assets,
                interval_secs = self.config.interval.as_secs(),
                "Submission loop started"
            );
            let mut interval = tokio::time::interval(self.config.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_requested(&mut shutdown) => break,
                    _ = interval.tick() => {}
                }
                tokio::select! {
                    _ = shutdown_requested(&mut shutdown) => break,
                    report = self.run_round() => {
                        debug!(confirmed = report.confirmed, failed = report.failed, "Tick complete");
                    }
                }
            }
            info!(
                confirmed = self.confirmed(),
                failed = self.failed(),
                "Submission loop stopped"
            );
        }
        .instrument(span)
        .await
    }
}
