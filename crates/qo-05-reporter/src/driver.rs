//! # Transaction Driver
//!
//! Turns a [`TxIntent`] into a confirmed ledger mutation:
//!
//! 1. acquire chain id, pending nonce and gas price, fresh on every call;
//! 2. sign and submit;
//! 3. poll for the receipt until it arrives, the deadline passes or
//!    shutdown fires.
//!
//! There is no retry here. Callers decide what a failure means.

use crate::domain::{DriverError, LedgerClientError, TxIntent};
use crate::ports::LedgerClient;
use crate::shutdown_requested;
use oracle_telemetry::{time_histogram, CONFIRMATION_DURATION};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{format_hash, Address, Hash, Receipt, Transaction};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Receipt polling settings.
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    pub poll_interval: Duration,
    pub confirmation_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            confirmation_timeout: Duration::from_secs(60),
        }
    }
}

/// Signs and confirms transactions for one identity.
pub struct TransactionDriver {
    client: Arc<dyn LedgerClient>,
    key: Secp256k1KeyPair,
    config: DriverConfig,
    shutdown: watch::Receiver<bool>,
}

impl TransactionDriver {
    pub fn new(
        client: Arc<dyn LedgerClient>,
        key: Secp256k1KeyPair,
        config: DriverConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            key,
            config,
            shutdown,
        }
    }

    pub fn address(&self) -> Address {
        self.key.address()
    }

    /// Submits `intent` and waits for a successful receipt.
    pub async fn execute(&self, intent: TxIntent) -> Result<Receipt, DriverError> {
        let label = intent.label();
        let hash = self.submit(intent).await?;
        debug!(intent = label, tx_hash = %format_hash(&hash), "Transaction submitted");

        let receipt = self.confirm(hash).await?;
        info!(
            intent = label,
            tx_hash = %format_hash(&hash),
            block = receipt.block_number,
            index = receipt.index,
            gas_used = receipt.gas_used,
            "Transaction confirmed"
        );
        Ok(receipt)
    }

    /// Signs `intent` with fresh ordering parameters and sends it.
    pub async fn submit(&self, intent: TxIntent) -> Result<Hash, DriverError> {
        let address = self.key.address();
        let (chain_id, nonce, gas_price) = tokio::try_join!(
            self.client.chain_id(),
            self.client.pending_nonce(&address),
            self.client.gas_price(),
        )
        .map_err(DriverError::Transport)?;

        let transaction = Transaction {
            chain_id,
            nonce,
            gas_price,
            gas_limit: intent.gas_limit(),
            call: intent.into_call(),
        };
        let signed = self.key.sign_transaction(transaction)?;

        self.client
            .send_transaction(signed)
            .await
            .map_err(|e| match e {
                LedgerClientError::Rejected(reason) => DriverError::SubmissionRejected(reason),
                other => DriverError::Transport(other),
            })
    }

    /// Waits for the receipt of `hash`. Transport errors while polling are
    /// retried until the deadline.
    pub async fn confirm(&self, hash: Hash) -> Result<Receipt, DriverError> {
        let _timer = time_histogram!(CONFIRMATION_DURATION);
        let tx_hash = format_hash(&hash);
        let mut shutdown = self.shutdown.clone();

        let poll = async {
            loop {
                match self.client.receipt(&hash).await {
                    Ok(Some(receipt)) => return receipt,
                    Ok(None) => {}
                    Err(e) => debug!(tx_hash = %tx_hash, error = %e, "Receipt poll failed"),
                }
                tokio::time::sleep(self.config.poll_interval).await;
            }
        };

        let receipt = tokio::select! {
            result = tokio::time::timeout(self.config.confirmation_timeout, poll) => {
                result.map_err(|_| DriverError::ConfirmationTimeout {
                    tx_hash: tx_hash.clone(),
                    waited: self.config.confirmation_timeout,
                })?
            }
            _ = shutdown_requested(&mut shutdown) => return Err(DriverError::Cancelled),
        };

        match receipt.revert_reason() {
            None => Ok(receipt),
            Some(reason) => Err(DriverError::ConfirmationFailed {
                tx_hash,
                reason: reason.to_string(),
            }),
        }
    }
}
