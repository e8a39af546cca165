//! Ledger client calling an embedded [`LedgerNode`] directly.

use crate::domain::LedgerClientError;
use crate::ports::LedgerClient;
use async_trait::async_trait;
use qo_02_aggregation::OracleQueries;
use qo_03_ledger::LedgerNode;
use shared_types::{Address, Hash, Receipt, SignedTransaction};
use std::sync::Arc;

/// Shares the launcher's ledger host; never fails with `Transport`.
#[derive(Clone)]
pub struct InProcessLedgerClient {
    node: Arc<LedgerNode>,
}

impl InProcessLedgerClient {
    pub fn new(node: Arc<LedgerNode>) -> Self {
        Self { node }
    }
}

#[async_trait]
impl LedgerClient for InProcessLedgerClient {
    async fn chain_id(&self) -> Result<u64, LedgerClientError> {
        Ok(self.node.chain_id())
    }

    async fn gas_price(&self) -> Result<u64, LedgerClientError> {
        Ok(self.node.gas_price())
    }

    async fn pending_nonce(&self, address: &Address) -> Result<u64, LedgerClientError> {
        Ok(self.node.pending_nonce(address))
    }

    async fn send_transaction(&self, signed: SignedTransaction) -> Result<Hash, LedgerClientError> {
        self.node
            .send_transaction(signed)
            .map_err(|e| LedgerClientError::Rejected(e.to_string()))
    }

    async fn receipt(&self, hash: &Hash) -> Result<Option<Receipt>, LedgerClientError> {
        Ok(self.node.receipt(hash))
    }

    async fn is_reporter(&self, address: &Address) -> Result<bool, LedgerClientError> {
        Ok(self.node.is_reporter(address))
    }
}
