//! Ledger host service.
//!
//! Owns the chain behind a mutex, produces blocks on a timer, records
//! metrics and fans committed notifications out on the event bus.

use crate::config::LedgerConfig;
use crate::domain::{Block, ChainState, LedgerError, ProducedBlock};
use crate::ports::TimeSource;
use oracle_telemetry::{
    metric_inc, time_histogram, BLOCKS_PRODUCED, BLOCK_PRODUCTION_DURATION, CONTRACT_CALLS,
    PENDING_TRANSACTIONS, REGISTERED_REPORTERS, ROUNDS_FINALIZED, TRANSACTIONS_REJECTED,
};
use parking_lot::Mutex;
use qo_02_aggregation::{OracleQueries, PublishedPrice, Round, Submission};
use shared_bus::{EventPublisher, InMemoryEventBus, OracleEvent};
use shared_types::{format_hash, Address, Hash, Price, Receipt, SignedTransaction};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// The ledger host.
///
/// Every mutation goes through the single chain lock, so transactions
/// execute strictly one at a time.
pub struct LedgerNode {
    state: Mutex<ChainState>,
    config: LedgerConfig,
    bus: Arc<InMemoryEventBus>,
    time: Arc<dyn TimeSource>,
}

impl LedgerNode {
    pub fn new(config: LedgerConfig, bus: Arc<InMemoryEventBus>, time: Arc<dyn TimeSource>) -> Self {
        let state = ChainState::new(config.clone(), time.now());
        Self {
            state: Mutex::new(state),
            config,
            bus,
            time,
        }
    }

    /// Validates and pools a signed transaction, returning its hash.
    pub fn send_transaction(&self, signed: SignedTransaction) -> Result<Hash, LedgerError> {
        let mut state = self.state.lock();
        match state.accept(signed) {
            Ok(hash) => {
                PENDING_TRANSACTIONS.set(state.pending_count() as f64);
                Ok(hash)
            }
            Err(err) => {
                metric_inc!(TRANSACTIONS_REJECTED, &[err.label()]);
                debug!(error = %err, "Transaction rejected");
                Err(err)
            }
        }
    }

    /// Executes the pool into a new block and publishes what it produced.
    pub async fn mine_block(&self) -> Block {
        let produced = {
            let _timer = time_histogram!(BLOCK_PRODUCTION_DURATION);
            let mut state = self.state.lock();
            let produced = state.produce_block(self.time.now());
            PENDING_TRANSACTIONS.set(state.pending_count() as f64);
            REGISTERED_REPORTERS.set(state.contract().reporter_count() as f64);
            produced
        };

        self.record(&produced);
        self.publish(produced).await
    }

    fn record(&self, produced: &ProducedBlock) {
        metric_inc!(BLOCKS_PRODUCED);
        for executed in &produced.executed {
            let outcome = if executed.receipt.is_success() {
                "success"
            } else {
                "reverted"
            };
            metric_inc!(CONTRACT_CALLS, &[executed.method, outcome]);
            if let Some(reason) = executed.receipt.revert_reason() {
                warn!(
                    tx_hash = %format_hash(&executed.receipt.tx_hash),
                    method = executed.method,
                    reason,
                    "Call reverted"
                );
            }
        }
        for event in &produced.events {
            if let OracleEvent::PriceFinalized {
                asset,
                price,
                round_id,
                ..
            } = event
            {
                metric_inc!(ROUNDS_FINALIZED, &[asset.as_str()]);
                info!(asset = %asset, price = %price, round_id, "Price finalized");
            }
        }
        if !produced.executed.is_empty() {
            info!(
                number = produced.block.number,
                hash = %format_hash(&produced.block.hash),
                transactions = produced.executed.len(),
                "Block produced"
            );
        }
    }

    async fn publish(&self, produced: ProducedBlock) -> Block {
        let ProducedBlock { block, events, .. } = produced;
        for event in events {
            self.bus.publish(event).await;
        }
        self.bus
            .publish(OracleEvent::BlockProduced {
                number: block.number,
                hash: block.hash,
                transaction_count: block.transactions.len(),
                timestamp: block.timestamp,
            })
            .await;
        block
    }

    /// Produces a block every `block_time` while transactions are pending,
    /// until `shutdown` flips to true.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.block_time);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(
            chain_id = self.config.chain_id,
            block_time_ms = self.config.block_time.as_millis() as u64,
            "Block production started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.pending_count() > 0 {
                        self.mine_block().await;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Block production stopped");
    }

    pub fn receipt(&self, hash: &Hash) -> Option<Receipt> {
        self.state.lock().receipt(hash)
    }

    pub fn pending_nonce(&self, address: &Address) -> u64 {
        self.state.lock().pending_nonce(address)
    }

    pub fn gas_price(&self) -> u64 {
        self.state.lock().gas_price()
    }

    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    pub fn block_number(&self) -> u64 {
        self.state.lock().head().number
    }

    pub fn block(&self, number: u64) -> Option<Block> {
        self.state.lock().block(number).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending_count()
    }

    /// Assets with at least one accepted submission, sorted.
    pub fn assets(&self) -> Vec<String> {
        self.state.lock().contract().assets()
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }
}

impl OracleQueries for LedgerNode {
    fn is_reporter(&self, reporter: &Address) -> bool {
        self.state.lock().contract().is_reporter(reporter)
    }

    fn reporter_count(&self) -> usize {
        self.state.lock().contract().reporter_count()
    }

    fn reporter_at(&self, index: usize) -> Option<Address> {
        self.state.lock().contract().reporter_at(index)
    }

    fn quorum(&self) -> usize {
        self.state.lock().contract().quorum()
    }

    fn round(&self, asset: &str) -> Round {
        self.state.lock().contract().round(asset)
    }

    fn submission(&self, asset: &str, round_id: u64, reporter: &Address) -> Submission {
        self.state
            .lock()
            .contract()
            .submission(asset, round_id, reporter)
    }

    fn price(&self, asset: &str) -> Price {
        self.state.lock().contract().price(asset)
    }

    fn published(&self, asset: &str) -> Option<PublishedPrice> {
        self.state.lock().contract().published(asset)
    }
}
