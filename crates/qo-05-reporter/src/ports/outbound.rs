//! Outbound (Driven) ports for the reporter.

use crate::domain::LedgerClientError;
use async_trait::async_trait;
use shared_types::{Address, Hash, Receipt, SignedTransaction};

/// The ledger as seen by an agent.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64, LedgerClientError>;

    /// Suggested gas price at this instant.
    async fn gas_price(&self) -> Result<u64, LedgerClientError>;

    /// Nonce the next transaction from `address` must carry, counting
    /// pooled transactions.
    async fn pending_nonce(&self, address: &Address) -> Result<u64, LedgerClientError>;

    /// Submits a signed transaction and returns its hash.
    async fn send_transaction(&self, signed: SignedTransaction) -> Result<Hash, LedgerClientError>;

    /// Receipt of an included transaction, `None` while pending or unknown.
    async fn receipt(&self, hash: &Hash) -> Result<Option<Receipt>, LedgerClientError>;

    async fn is_reporter(&self, address: &Address) -> Result<bool, LedgerClientError>;
}
