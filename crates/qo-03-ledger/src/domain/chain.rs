//! # Chain State
//!
//! Single-threaded core of the ledger host. The service wraps it in a mutex;
//! nothing here locks, sleeps or publishes.

use super::entities::{Block, ExecutedTransaction, ProducedBlock};
use super::errors::LedgerError;
use super::gas::{execution_gas, intrinsic_gas};
use crate::config::LedgerConfig;
use qo_02_aggregation::OracleContract;
use shared_crypto::recover_sender;
use shared_types::{Address, Hash, OracleCall, Receipt, ReceiptStatus, SignedTransaction, Timestamp};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// A transaction waiting for inclusion.
#[derive(Debug, Clone)]
struct PooledTransaction {
    hash: Hash,
    sender: Address,
    signed: SignedTransaction,
}

impl PooledTransaction {
    fn nonce(&self) -> u64 {
        self.signed.transaction.nonce
    }
}

/// Accounts, pool, blocks, receipts and the hosted oracle contract.
#[derive(Debug)]
pub struct ChainState {
    config: LedgerConfig,
    contract: OracleContract,
    /// Next nonce of every account that has had a transaction included.
    nonces: HashMap<Address, u64>,
    /// Arrival order.
    pool: VecDeque<PooledTransaction>,
    pooled: HashSet<Hash>,
    pending_by_sender: HashMap<Address, Vec<u64>>,
    blocks: Vec<Block>,
    receipts: HashMap<Hash, Receipt>,
}

impl ChainState {
    /// Creates a chain holding only the genesis block.
    pub fn new(config: LedgerConfig, genesis_timestamp: Timestamp) -> Self {
        Self {
            config,
            contract: OracleContract::new(),
            nonces: HashMap::new(),
            pool: VecDeque::new(),
            pooled: HashSet::new(),
            pending_by_sender: HashMap::new(),
            blocks: vec![Block::genesis(genesis_timestamp)],
            receipts: HashMap::new(),
        }
    }

    /// Validates `signed` and adds it to the pool.
    pub fn accept(&mut self, signed: SignedTransaction) -> Result<Hash, LedgerError> {
        let hash = signed.hash();
        if self.pooled.contains(&hash) || self.receipts.contains_key(&hash) {
            return Err(LedgerError::AlreadyKnown(hash));
        }

        let sender =
            recover_sender(&signed).map_err(|e| LedgerError::InvalidSignature(e.to_string()))?;
        let tx = &signed.transaction;

        if tx.chain_id != self.config.chain_id {
            return Err(LedgerError::WrongChainId {
                expected: self.config.chain_id,
                actual: tx.chain_id,
            });
        }

        let account_nonce = self.account_nonce(&sender);
        if tx.nonce < account_nonce {
            return Err(LedgerError::NonceTooLow {
                expected: account_nonce,
                actual: tx.nonce,
            });
        }

        let pending = self.pending_by_sender.get(&sender);
        if pending.is_some_and(|nonces| nonces.contains(&tx.nonce)) {
            return Err(LedgerError::NonceAlreadyPending { nonce: tx.nonce });
        }

        if tx.gas_price < self.config.min_gas_price {
            return Err(LedgerError::Underpriced {
                minimum: self.config.min_gas_price,
                offered: tx.gas_price,
            });
        }

        let required = intrinsic_gas(&tx.call);
        if tx.gas_limit < required {
            return Err(LedgerError::IntrinsicGasTooLow {
                required,
                provided: tx.gas_limit,
            });
        }

        if self.pool.len() >= self.config.max_pending {
            return Err(LedgerError::PoolFull {
                capacity: self.config.max_pending,
            });
        }
        if pending.map_or(0, Vec::len) >= self.config.max_pending_per_sender {
            return Err(LedgerError::SenderLimitReached {
                limit: self.config.max_pending_per_sender,
            });
        }

        debug!(
            tx_hash = %shared_types::format_hash(&hash),
            sender = %shared_types::format_address(&sender),
            nonce = tx.nonce,
            method = tx.call.method(),
            "Transaction pooled"
        );

        self.pending_by_sender
            .entry(sender)
            .or_default()
            .push(tx.nonce);
        self.pooled.insert(hash);
        self.pool.push_back(PooledTransaction {
            hash,
            sender,
            signed,
        });
        Ok(hash)
    }

    /// Executes every pooled transaction whose nonce is next for its sender,
    /// in arrival order, repeating until a pass makes no progress, and
    /// commits the result as a new block.
    pub fn produce_block(&mut self, now: Timestamp) -> ProducedBlock {
        let parent = self.head().clone();
        let number = parent.number + 1;
        let timestamp = now.max(parent.timestamp);

        let mut executed = Vec::new();
        let mut events = Vec::new();

        loop {
            let mut progressed = false;
            let mut index = 0;
            while index < self.pool.len() {
                let expected = self.account_nonce(&self.pool[index].sender);
                let nonce = self.pool[index].nonce();

                if nonce > expected {
                    index += 1;
                    continue;
                }

                let Some(tx) = self.pool.remove(index) else {
                    break;
                };
                self.unpool(&tx);

                if nonce < expected {
                    // Unreachable through `accept`; drop rather than wedge the sender.
                    warn!(tx_hash = %shared_types::format_hash(&tx.hash), "Dropping stale pooled transaction");
                    continue;
                }

                let position = executed.len() as u32;
                let (result, produced) = self.execute(&tx, number, position, timestamp);
                events.extend(produced);
                executed.push(result);
                progressed = true;
            }
            if !progressed {
                break;
            }
        }

        let hashes: Vec<Hash> = executed.iter().map(|e| e.receipt.tx_hash).collect();
        let block = Block::seal(number, timestamp, parent.hash, &hashes);
        self.blocks.push(block.clone());

        ProducedBlock {
            block,
            executed,
            events,
        }
    }

    fn unpool(&mut self, tx: &PooledTransaction) {
        self.pooled.remove(&tx.hash);
        if let Some(nonces) = self.pending_by_sender.get_mut(&tx.sender) {
            nonces.retain(|n| *n != tx.nonce());
            if nonces.is_empty() {
                self.pending_by_sender.remove(&tx.sender);
            }
        }
    }

    /// Runs one transaction against the contract. The nonce is consumed
    /// whatever the outcome.
    fn execute(
        &mut self,
        tx: &PooledTransaction,
        block_number: u64,
        index: u32,
        timestamp: Timestamp,
    ) -> (ExecutedTransaction, Vec<shared_bus::OracleEvent>) {
        let transaction = &tx.signed.transaction;
        let call = &transaction.call;
        *self.nonces.entry(tx.sender).or_insert(0) += 1;

        let intrinsic = intrinsic_gas(call);
        let work = match call {
            OracleCall::SubmitPrice { asset, .. } => self.contract.finalization_work(asset),
            _ => 0,
        };
        let required = intrinsic + execution_gas(call, work);

        let (status, gas_used, events) = if required > transaction.gas_limit {
            (
                ReceiptStatus::Reverted {
                    reason: "out of gas".to_string(),
                },
                transaction.gas_limit,
                Vec::new(),
            )
        } else {
            match self.contract.execute(tx.sender, call, timestamp) {
                Ok(events) => (ReceiptStatus::Success, required, events),
                Err(err) => (
                    ReceiptStatus::Reverted {
                        reason: err.to_string(),
                    },
                    intrinsic,
                    Vec::new(),
                ),
            }
        };

        let receipt = Receipt {
            tx_hash: tx.hash,
            from: tx.sender,
            block_number,
            index,
            gas_used,
            status,
        };
        self.receipts.insert(tx.hash, receipt.clone());

        (
            ExecutedTransaction {
                receipt,
                method: call.method(),
            },
            events,
        )
    }

    /// Next nonce the ledger will execute for `address`.
    pub fn account_nonce(&self, address: &Address) -> u64 {
        self.nonces.get(address).copied().unwrap_or(0)
    }

    /// Nonce the sender's next transaction should carry.
    pub fn pending_nonce(&self, address: &Address) -> u64 {
        let pending = self.pending_by_sender.get(address).map_or(0, Vec::len) as u64;
        self.account_nonce(address) + pending
    }

    /// Suggested gas price: the floor plus a premium per pooled transaction.
    pub fn gas_price(&self) -> u64 {
        self.config
            .min_gas_price
            .saturating_add(self.config.gas_price_step.saturating_mul(self.pool.len() as u64))
    }

    pub fn pending_count(&self) -> usize {
        self.pool.len()
    }

    pub fn receipt(&self, hash: &Hash) -> Option<Receipt> {
        self.receipts.get(hash).cloned()
    }

    pub fn head(&self) -> &Block {
        // `new` always pushes genesis.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn block(&self, number: u64) -> Option<&Block> {
        usize::try_from(number).ok().and_then(|n| self.blocks.get(n))
    }

    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    pub fn contract(&self) -> &OracleContract {
        &self.contract
    }
}
