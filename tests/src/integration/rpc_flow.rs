//! # RPC Flow
//!
//! Agents that reach the ledger host only through its JSON-RPC server, and
//! the agent HTTP surface observed from outside.
//!
//! ```text
//! ReporterAgent → RpcLedgerClient ──HTTP/JSON-RPC──→ axum router → LedgerNode
//! reqwest ──HTTP──→ agent router (/health, /price, /metrics)
//! OracleRuntime (RPC_URL set) ──→ remote ledger
//! ```

#[cfg(test)]
mod tests {
    use oracle_runtime::{OracleRuntime, RuntimeConfig, DEV_KEYS};
    use qo_03_ledger::{spawn_rpc_server, LedgerConfig, LedgerNode, SystemTimeSource};
    use qo_04_price_feed::StaticPriceSource;
    use qo_05_reporter::{
        spawn_http_server, AgentConfig, DriverConfig, ReporterAgent, RpcLedgerClient,
        TransactionDriver,
    };
    use shared_bus::InMemoryEventBus;
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::U256;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    struct RemoteLedger {
        url: String,
        shutdown: watch::Sender<bool>,
    }

    async fn start_ledger() -> RemoteLedger {
        let node = Arc::new(LedgerNode::new(
            LedgerConfig {
                block_time: Duration::from_millis(20),
                ..LedgerConfig::default()
            },
            Arc::new(InMemoryEventBus::new()),
            Arc::new(SystemTimeSource),
        ));
        let (shutdown, rx) = watch::channel(false);
        tokio::spawn(node.clone().run(rx.clone()));
        let (addr, _) = spawn_rpc_server(node, "127.0.0.1:0".parse().unwrap(), rx)
            .await
            .unwrap();
        RemoteLedger {
            url: format!("http://{addr}/"),
            shutdown,
        }
    }

    fn remote_agent(
        ledger: &RemoteLedger,
        index: usize,
        prices: Arc<StaticPriceSource>,
    ) -> ReporterAgent {
        let client = Arc::new(RpcLedgerClient::new(ledger.url.clone()).unwrap());
        let driver = TransactionDriver::new(
            client.clone(),
            Secp256k1KeyPair::generate(),
            DriverConfig {
                poll_interval: Duration::from_millis(20),
                confirmation_timeout: Duration::from_secs(5),
            },
            ledger.shutdown.subscribe(),
        );
        ReporterAgent::new(
            AgentConfig {
                index,
                ..AgentConfig::default()
            },
            driver,
            client,
            prices,
        )
    }

    #[tokio::test]
    async fn test_agents_finalize_over_json_rpc() {
        let ledger = start_ledger().await;
        let prices = Arc::new(StaticPriceSource::new().with_quote("ethereum", 1234.5));
        let agents: Vec<_> = (0..4)
            .map(|i| remote_agent(&ledger, i, prices.clone()))
            .collect();

        for agent in &agents {
            agent.ensure_registered().await.unwrap();
        }
        for agent in &agents[..3] {
            assert_eq!(agent.run_round().await.confirmed, 1);
        }

        let reader = RpcLedgerClient::new(ledger.url.clone()).unwrap();
        assert_eq!(reader.reporter_count().await.unwrap(), 4);
        assert_eq!(reader.quorum().await.unwrap(), 3);
        let published = reader.published("ethereum").await.unwrap().unwrap();
        assert_eq!(published.price, U256::from(123_450_000_000u64));
        assert_eq!(published.round_id, 0);
        assert_eq!(reader.round("ethereum").await.unwrap().id, 1);
        assert!(reader.block_number().await.unwrap() >= 2);

        ledger.shutdown.send_replace(true);
    }

    #[tokio::test]
    async fn test_runtime_against_remote_ledger() {
        let ledger = start_ledger().await;
        let vars: HashMap<&str, String> = HashMap::from([
            ("RPC_URL", ledger.url.clone()),
            ("PRIVATE_KEYS", DEV_KEYS[..3].join(",")),
            ("COINS", "ethereum".to_string()),
            ("STATIC_PRICES", "ethereum=42".to_string()),
            ("HTTP_PORT", "0".to_string()),
            ("SUBMISSION_INTERVAL", "3600".to_string()),
        ]);
        let config = RuntimeConfig::from_lookup(|name| vars.get(name).cloned()).unwrap();

        let runtime = OracleRuntime::start(config).await.unwrap();
        assert!(runtime.ledger().is_none());
        assert_eq!(runtime.agents().len(), 3);

        let reader = RpcLedgerClient::new(ledger.url.clone()).unwrap();
        let published = tokio::time::timeout(Duration::from_secs(20), async {
            loop {
                if let Some(published) = reader.published("ethereum").await.unwrap() {
                    return published;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        })
        .await
        .expect("runtime agents finalize a price");

        assert_eq!(published.price, U256::from(4_200_000_000u64));
        assert_eq!(reader.reporter_count().await.unwrap(), 3);

        runtime.shutdown().await;
        ledger.shutdown.send_replace(true);
    }

    #[tokio::test]
    async fn test_agent_http_surface() {
        let prices = Arc::new(StaticPriceSource::new().with_quote("bitcoin", 64_000.25));
        let (shutdown, rx) = watch::channel(false);
        let (addr, handle) = spawn_http_server(prices, "127.0.0.1:0".parse().unwrap(), rx)
            .await
            .unwrap();
        let base = format!("http://{addr}");

        let health = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(health.text().await.unwrap(), "Oracle Node is running");

        let quote: serde_json::Value = reqwest::get(format!("{base}/price?coin=bitcoin"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(quote["coin"], "bitcoin");
        assert_eq!(quote["price"], 64_000.25);
        assert_eq!(quote["currency"], "usd");

        let missing = reqwest::get(format!("{base}/price")).await.unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::BAD_REQUEST);

        let unknown = reqwest::get(format!("{base}/price?coin=dogecoin")).await.unwrap();
        assert_eq!(unknown.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(unknown
            .text()
            .await
            .unwrap()
            .starts_with("Failed to fetch price"));

        let metrics = reqwest::get(format!("{base}/metrics"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(metrics.contains("qo_ledger_blocks_produced_total"));

        shutdown.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
