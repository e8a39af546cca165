//! # Agent Flow
//!
//! Reporter agents drive an in-process ledger host whose block loop runs on
//! a short block time.
//!
//! ```text
//! StaticPriceSource → ReporterAgent → TransactionDriver → InProcessLedgerClient
//!                                                               │
//!                                   LedgerNode::run (every 20ms) ┘
//! ```

#[cfg(test)]
mod tests {
    use qo_02_aggregation::OracleQueries;
    use qo_03_ledger::{LedgerConfig, LedgerNode, SystemTimeSource};
    use qo_04_price_feed::StaticPriceSource;
    use qo_05_reporter::{
        AgentConfig, AgentError, DriverConfig, DriverError, InProcessLedgerClient, LedgerClient,
        ReporterAgent, RoundReport, TransactionDriver,
    };
    use shared_bus::{EventFilter, InMemoryEventBus, OracleEvent};
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::U256;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    struct Network {
        node: Arc<LedgerNode>,
        bus: Arc<InMemoryEventBus>,
        client: Arc<InProcessLedgerClient>,
        prices: Arc<StaticPriceSource>,
        shutdown: watch::Sender<bool>,
        block_loop: JoinHandle<()>,
    }

    impl Network {
        fn start() -> Self {
            let bus = Arc::new(InMemoryEventBus::new());
            let node = Arc::new(LedgerNode::new(
                LedgerConfig {
                    block_time: Duration::from_millis(20),
                    ..LedgerConfig::default()
                },
                bus.clone(),
                Arc::new(SystemTimeSource),
            ));
            let (shutdown, rx) = watch::channel(false);
            let block_loop = tokio::spawn(node.clone().run(rx));
            Self {
                client: Arc::new(InProcessLedgerClient::new(node.clone())),
                node,
                bus,
                prices: Arc::new(StaticPriceSource::new()),
                shutdown,
                block_loop,
            }
        }

        fn agent(&self, index: usize, assets: &[&str]) -> Arc<ReporterAgent> {
            let driver = TransactionDriver::new(
                self.client.clone(),
                Secp256k1KeyPair::generate(),
                DriverConfig {
                    poll_interval: Duration::from_millis(10),
                    confirmation_timeout: Duration::from_secs(5),
                },
                self.shutdown.subscribe(),
            );
            Arc::new(ReporterAgent::new(
                AgentConfig {
                    index,
                    assets: assets.iter().map(|a| a.to_string()).collect(),
                    interval: Duration::from_millis(100),
                    asset_delay: Duration::from_millis(5),
                },
                driver,
                self.client.clone(),
                self.prices.clone(),
            ))
        }

        async fn stop(self) {
            self.shutdown.send_replace(true);
            timeout(Duration::from_secs(2), self.block_loop)
                .await
                .expect("block loop did not stop")
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_three_agents_finalize_average() {
        let net = Network::start();
        net.prices.set("ethereum", 3000.0);
        let agents: Vec<_> = (0..3).map(|i| net.agent(i, &["ethereum"])).collect();
        for agent in &agents {
            agent.ensure_registered().await.unwrap();
        }
        assert_eq!(net.node.reporter_count(), 3);
        let mut sub = net.bus.subscribe(EventFilter::for_assets(vec!["ethereum".into()]));

        assert_eq!(agents[0].run_round().await, RoundReport { confirmed: 1, failed: 0 });
        net.prices.set("ethereum", 3001.0);
        assert_eq!(agents[1].run_round().await, RoundReport { confirmed: 1, failed: 0 });

        let event = timeout(Duration::from_secs(1), sub.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            OracleEvent::PriceFinalized {
                price, round_id, ..
            } => {
                assert_eq!(price, U256::from(300_050_000_000u64));
                assert_eq!(round_id, 0);
            }
            other => panic!("Expected PriceFinalized, got {other:?}"),
        }

        // The third agent lands in the next round.
        agents[2].run_round().await;
        let round = net.node.round("ethereum");
        assert_eq!((round.id, round.submission_count), (1, 1));
        assert_eq!(agents[2].confirmed(), 1);

        net.stop().await;
    }

    #[tokio::test]
    async fn test_registration_is_idempotent() {
        let net = Network::start();
        let agent = net.agent(0, &["ethereum"]);

        agent.ensure_registered().await.unwrap();
        agent.ensure_registered().await.unwrap();

        assert!(net.node.is_reporter(&agent.address()));
        assert_eq!(net.node.pending_nonce(&agent.address()), 1);
        net.stop().await;
    }

    #[tokio::test]
    async fn test_fetch_failure_sends_nothing() {
        let net = Network::start();
        net.prices.set("ethereum", 3000.0);
        let agent = net.agent(0, &["bitcoin", "ethereum"]);
        agent.ensure_registered().await.unwrap();

        let report = agent.run_round().await;

        assert_eq!(report, RoundReport { confirmed: 1, failed: 1 });
        assert_eq!(net.node.pending_nonce(&agent.address()), 2);
        assert_eq!(net.node.round("bitcoin").submission_count, 0);
        assert_eq!(net.node.round("ethereum").submission_count, 1);
        assert!(matches!(
            agent.submit_price("bitcoin").await,
            Err(AgentError::FetchFailed { ref asset, .. }) if asset == "bitcoin"
        ));
        net.stop().await;
    }

    #[tokio::test]
    async fn test_departed_agent_submission_reverts() {
        let net = Network::start();
        net.prices.set("ethereum", 3000.0);
        let agent = net.agent(0, &["ethereum"]);
        agent.ensure_registered().await.unwrap();

        let receipt = agent.leave().await.unwrap();
        assert!(receipt.is_success());
        assert!(!net.client.is_reporter(&agent.address()).await.unwrap());

        match agent.submit_price("ethereum").await {
            Err(AgentError::Submission {
                source: DriverError::ConfirmationFailed { reason, .. },
                ..
            }) => assert_eq!(reason, "reporter not registered"),
            other => panic!("Expected a reverted submission, got {other:?}"),
        }
        assert_eq!(net.node.round("ethereum").submission_count, 0);
        net.stop().await;
    }

    #[tokio::test]
    async fn test_running_agents_publish_and_stop() {
        let net = Network::start();
        net.prices.set("ethereum", 2500.0);
        net.prices.set("bitcoin", 61000.0);
        let agents: Vec<_> = (0..4)
            .map(|i| net.agent(i, &["ethereum", "bitcoin"]))
            .collect();

        let mut loops = Vec::new();
        for agent in &agents {
            agent.ensure_registered().await.unwrap();
            loops.push(tokio::spawn(agent.clone().run(net.shutdown.subscribe())));
        }

        timeout(Duration::from_secs(10), async {
            while net.node.published("ethereum").is_none() || net.node.published("bitcoin").is_none() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("both assets finalize");

        assert_eq!(net.node.price("ethereum"), U256::from(250_000_000_000u64));
        assert_eq!(net.node.price("bitcoin"), U256::from(6_100_000_000_000u64));

        net.shutdown.send_replace(true);
        for handle in loops {
            timeout(Duration::from_secs(2), handle)
                .await
                .expect("agent loop did not stop")
                .unwrap();
        }
        net.stop().await;
    }
}
