//! Ledger client speaking JSON-RPC over HTTP.

use crate::domain::LedgerClientError;
use crate::ports::LedgerClient;
use async_trait::async_trait;
use qo_02_aggregation::{PublishedPrice, Round};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared_types::{format_address, format_hash, parse_hash, Address, Hash, Receipt, SignedTransaction};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Code the ledger uses for refused transactions.
const TRANSACTION_REJECTED: i32 = -32000;

#[derive(Serialize)]
struct JsonRpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct JsonRpcResponse<R> {
    result: Option<R>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// JSON-RPC client of a remote ledger host.
pub struct RpcLedgerClient {
    client: Client,
    url: String,
    request_id: AtomicU64,
}

impl RpcLedgerClient {
    pub fn new(url: impl Into<String>) -> Result<Self, LedgerClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| LedgerClientError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            request_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Calls `method`; `Ok(None)` when the ledger answers `null`.
    async fn call<P: Serialize + Send, R: DeserializeOwned + Send>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, LedgerClientError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id(),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LedgerClientError::Transport(format!("cannot connect to {}", self.url))
                } else {
                    LedgerClientError::Transport(e.to_string())
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| LedgerClientError::Malformed(e.to_string()))?;

        match rpc_response.error {
            Some(error) if error.code == TRANSACTION_REJECTED => {
                Err(LedgerClientError::Rejected(error.message))
            }
            Some(error) => Err(LedgerClientError::Rpc {
                code: error.code,
                message: error.message,
            }),
            None => Ok(rpc_response.result),
        }
    }

    async fn call_required<P: Serialize + Send, R: DeserializeOwned + Send>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, LedgerClientError> {
        self.call(method, params)
            .await?
            .ok_or_else(|| LedgerClientError::Malformed(format!("{method} returned no result")))
    }

    pub async fn block_number(&self) -> Result<u64, LedgerClientError> {
        self.call_required("oracle_blockNumber", [(); 0]).await
    }

    pub async fn reporter_count(&self) -> Result<u64, LedgerClientError> {
        self.call_required("oracle_reporterCount", [(); 0]).await
    }

    pub async fn quorum(&self) -> Result<u64, LedgerClientError> {
        self.call_required("oracle_quorum", [(); 0]).await
    }

    pub async fn round(&self, asset: &str) -> Result<Round, LedgerClientError> {
        self.call_required("oracle_round", [asset]).await
    }

    /// Last finalized price of `asset`; `None` before the first finalization.
    pub async fn published(&self, asset: &str) -> Result<Option<PublishedPrice>, LedgerClientError> {
        self.call("oracle_published", [asset]).await
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn chain_id(&self) -> Result<u64, LedgerClientError> {
        self.call_required("oracle_chainId", [(); 0]).await
    }

    async fn gas_price(&self) -> Result<u64, LedgerClientError> {
        self.call_required("oracle_gasPrice", [(); 0]).await
    }

    async fn pending_nonce(&self, address: &Address) -> Result<u64, LedgerClientError> {
        self.call_required("oracle_getTransactionCount", [format_address(address)])
            .await
    }

    async fn send_transaction(&self, signed: SignedTransaction) -> Result<Hash, LedgerClientError> {
        let hash: String = self
            .call_required("oracle_sendTransaction", [signed])
            .await?;
        parse_hash(&hash).map_err(|e| LedgerClientError::Malformed(e.to_string()))
    }

    async fn receipt(&self, hash: &Hash) -> Result<Option<Receipt>, LedgerClientError> {
        self.call("oracle_getTransactionReceipt", [format_hash(hash)])
            .await
    }

    async fn is_reporter(&self, address: &Address) -> Result<bool, LedgerClientError> {
        self.call_required("oracle_isReporter", [format_address(address)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qo_03_ledger::{spawn_rpc_server, LedgerConfig, LedgerNode, SystemTimeSource};
    use shared_bus::InMemoryEventBus;
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{OracleCall, Transaction};
    use std::sync::Arc;
    use tokio::sync::watch;

    async fn start() -> (Arc<LedgerNode>, RpcLedgerClient, watch::Sender<bool>) {
        let node = Arc::new(LedgerNode::new(
            LedgerConfig::default(),
            Arc::new(InMemoryEventBus::new()),
            Arc::new(SystemTimeSource),
        ));
        let (tx, rx) = watch::channel(false);
        let (addr, _) = spawn_rpc_server(node.clone(), "127.0.0.1:0".parse().unwrap(), rx)
            .await
            .unwrap();
        let client = RpcLedgerClient::new(format!("http://{addr}/")).unwrap();
        (node, client, tx)
    }

    #[tokio::test]
    async fn test_round_trip_through_rpc() {
        let (node, client, _shutdown) = start().await;
        let key = Secp256k1KeyPair::generate();

        assert_eq!(client.chain_id().await.unwrap(), 31337);
        let gas_price = client.gas_price().await.unwrap();
        let nonce = client.pending_nonce(&key.address()).await.unwrap();
        let signed = key
            .sign_transaction(Transaction {
                chain_id: 31337,
                nonce,
                gas_price,
                gas_limit: 100_000,
                call: OracleCall::Register,
            })
            .unwrap();

        let hash = client.send_transaction(signed).await.unwrap();
        assert_eq!(client.receipt(&hash).await.unwrap(), None);
        assert_eq!(client.pending_nonce(&key.address()).await.unwrap(), 1);

        node.mine_block().await;

        let receipt = client.receipt(&hash).await.unwrap().unwrap();
        assert!(receipt.is_success());
        assert!(client.is_reporter(&key.address()).await.unwrap());
    }

    #[tokio::test]
    async fn test_status_reads() {
        let (_node, client, _shutdown) = start().await;

        assert_eq!(client.block_number().await.unwrap(), 0);
        assert_eq!(client.reporter_count().await.unwrap(), 0);
        assert_eq!(client.quorum().await.unwrap(), 3);
        assert_eq!(client.round("ethereum").await.unwrap(), Round::default());
        assert_eq!(client.published("ethereum").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejection_is_distinguished() {
        let (_node, client, _shutdown) = start().await;
        let key = Secp256k1KeyPair::generate();
        let signed = key
            .sign_transaction(Transaction {
                chain_id: 7,
                nonce: 0,
                gas_price: 1_000_000_000,
                gas_limit: 100_000,
                call: OracleCall::Register,
            })
            .unwrap();

        assert!(matches!(
            client.send_transaction(signed).await,
            Err(LedgerClientError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_ledger_is_transport_error() {
        let client = RpcLedgerClient::new("http://127.0.0.1:9/").unwrap();
        assert!(matches!(
            client.chain_id().await,
            Err(LedgerClientError::Transport(_))
        ));
    }
}
