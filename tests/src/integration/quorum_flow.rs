//! # Quorum Flow
//!
//! Signed calls from several identities go through the ledger host and the
//! oracle state machine, and finalizations come out on the bus.
//!
//! ```text
//! identities ──sign──→ LedgerNode::send_transaction ──mine_block──→ OracleContract
//!                                                                        │
//!                                  PriceFinalized ←──bus (after commit)──┘
//! ```

#[cfg(test)]
mod tests {
    use super::super::{Harness, GENESIS_TIME};
    use proptest::prelude::*;
    use qo_02_aggregation::{quorum, OracleQueries, Round};
    use shared_bus::{EventFilter, OracleEvent};
    use shared_types::{OracleCall, U256};
    use std::time::Duration;
    use tokio::time::timeout;

    async fn next_event(sub: &mut shared_bus::Subscription) -> OracleEvent {
        timeout(Duration::from_millis(200), sub.recv())
            .await
            .expect("timeout waiting for event")
            .expect("bus closed")
    }

    #[tokio::test]
    async fn test_quorum_of_four_finalizes_on_third_submission() {
        let h = Harness::new(4);
        h.register(4).await;
        assert_eq!(h.node.reporter_count(), 4);
        assert_eq!(h.node.quorum(), 3);

        let mut sub = h.bus.subscribe(EventFilter::for_assets(vec!["ethereum".into()]));

        h.submit(0, "ethereum", 100);
        h.submit(1, "ethereum", 200);
        h.node.mine_block().await;
        assert_eq!(h.node.round("ethereum").submission_count, 2);
        assert_eq!(h.node.published("ethereum"), None);

        h.time.advance(12);
        h.submit(2, "ethereum", 300);
        h.node.mine_block().await;

        match next_event(&mut sub).await {
            OracleEvent::PriceFinalized {
                asset,
                price,
                round_id,
                finalized_at,
            } => {
                assert_eq!(asset, "ethereum");
                assert_eq!(price, U256::from(200u64));
                assert_eq!(round_id, 0);
                assert_eq!(finalized_at, GENESIS_TIME + 12);
            }
            other => panic!("Expected PriceFinalized, got {other:?}"),
        }

        assert_eq!(
            h.node.round("ethereum"),
            Round {
                id: 1,
                submission_count: 0,
                last_finalized_at: GENESIS_TIME + 12,
            }
        );
        assert_eq!(h.node.price("ethereum"), U256::from(200u64));
    }

    #[tokio::test]
    async fn test_late_submission_opens_next_round() {
        let h = Harness::new(4);
        h.register(4).await;

        for who in 0..3 {
            h.submit(who, "ethereum", 1_000);
        }
        let late = h.submit(3, "ethereum", 9_000);
        h.node.mine_block().await;

        assert!(h.node.receipt(&late).unwrap().is_success());
        assert_eq!(h.node.round("ethereum").id, 1);
        assert_eq!(h.node.round("ethereum").submission_count, 1);
        assert!(h.node.submission("ethereum", 1, &h.keys[3].address()).submitted);
        assert_eq!(h.node.price("ethereum"), U256::from(1_000u64));
    }

    #[tokio::test]
    async fn test_duplicate_submission_reverts_and_consumes_nonce() {
        let h = Harness::new(4);
        h.register(4).await;

        h.submit(0, "ethereum", 100);
        let duplicate = h.submit(0, "ethereum", 999);
        h.node.mine_block().await;

        let receipt = h.node.receipt(&duplicate).unwrap();
        assert_eq!(
            receipt.revert_reason(),
            Some("already submitted for ethereum in round 0")
        );
        assert_eq!(h.node.pending_nonce(&h.keys[0].address()), 3);
        assert_eq!(h.node.round("ethereum").submission_count, 1);
        assert_eq!(
            h.node.submission("ethereum", 0, &h.keys[0].address()).value,
            U256::from(100u64)
        );
    }

    #[tokio::test]
    async fn test_outsider_submission_reverts() {
        let h = Harness::new(4);
        h.register(3).await;

        let outsider = h.submit(3, "ethereum", 100);
        h.node.mine_block().await;

        assert_eq!(
            h.node.receipt(&outsider).unwrap().revert_reason(),
            Some("reporter not registered")
        );
        assert_eq!(h.node.round("ethereum"), Round::default());
    }

    #[tokio::test]
    async fn test_departure_lowers_quorum_mid_round() {
        let h = Harness::new(4);
        h.register(4).await;

        h.submit(0, "ethereum", 100);
        h.submit(1, "ethereum", 200);
        h.send(3, OracleCall::Unregister);
        h.node.mine_block().await;
        assert_eq!(h.node.quorum(), 2);
        assert_eq!(h.node.published("ethereum"), None);

        h.submit(2, "ethereum", 300);
        h.node.mine_block().await;

        assert_eq!(h.node.price("ethereum"), U256::from(200u64));
    }

    #[tokio::test]
    async fn test_departed_reporter_value_still_counts() {
        let h = Harness::new(4);
        h.register(4).await;

        h.submit(0, "ethereum", 100);
        h.submit(1, "ethereum", 200);
        h.send(0, OracleCall::Unregister);
        h.node.mine_block().await;
        assert!(!h.node.is_reporter(&h.keys[0].address()));

        h.submit(2, "ethereum", 600);
        h.node.mine_block().await;

        // (100 + 200 + 600) / 3
        assert_eq!(h.node.price("ethereum"), U256::from(300u64));
    }

    #[tokio::test]
    async fn test_assets_finalize_independently() {
        let h = Harness::new(3);
        h.register(3).await;

        h.submit(0, "bitcoin", 60_000);
        h.submit(0, "ethereum", 3_000);
        h.submit(1, "ethereum", 3_100);
        h.node.mine_block().await;

        assert_eq!(h.node.price("ethereum"), U256::from(3_050u64));
        assert_eq!(h.node.published("bitcoin"), None);
        assert_eq!(h.node.round("bitcoin").submission_count, 1);
        assert_eq!(h.node.assets(), vec!["bitcoin", "ethereum"]);
    }

    #[tokio::test]
    async fn test_notifications_wait_for_block_commit() {
        let h = Harness::new(3);
        h.register(3).await;
        let mut sub = h.bus.subscribe(EventFilter::all());

        h.submit(0, "ethereum", 10);
        h.submit(1, "ethereum", 20);
        assert_eq!(sub.try_recv().unwrap(), None);

        let block = h.node.mine_block().await;

        assert!(matches!(
            next_event(&mut sub).await,
            OracleEvent::PriceFinalized { round_id: 0, .. }
        ));
        match next_event(&mut sub).await {
            OracleEvent::BlockProduced {
                number,
                transaction_count,
                ..
            } => {
                assert_eq!(number, block.number);
                assert_eq!(transaction_count, 2);
            }
            other => panic!("Expected BlockProduced, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_small_registry_cannot_finalize() {
        let h = Harness::new(2);
        h.register(2).await;
        assert_eq!(h.node.quorum(), 3);

        h.submit(0, "ethereum", 10);
        h.submit(1, "ethereum", 20);
        h.node.mine_block().await;

        assert_eq!(h.node.published("ethereum"), None);
        assert_eq!(h.node.round("ethereum").submission_count, 2);
    }

    #[tokio::test]
    async fn test_large_registries_finalize() {
        for members in [33, 64, 150] {
            let h = Harness::new(members);
            h.register(members).await;
            assert_eq!(h.node.reporter_count(), members);
            let needed = quorum(members);

            let sent: Vec<_> = (0..members)
                .map(|who| h.submit(who, "ethereum", 1_000 + who as u64))
                .collect();
            h.node.mine_block().await;

            for hash in &sent {
                let receipt = h.node.receipt(hash).unwrap();
                assert!(receipt.is_success(), "{members} members: {:?}", receipt.status);
            }
            // Floor average of 1_000 + 0..needed.
            let expected = 1_000 + (needed as u64 - 1) / 2;
            assert_eq!(h.node.price("ethereum"), U256::from(expected));
            let round = h.node.round("ethereum");
            assert_eq!(round.id, 1);
            assert_eq!(round.submission_count, (members - needed) as u64);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// With every reporter submitting once, the round finalizes on the
        /// quorum-th submission at the floor average of the values so far.
        #[test]
        fn prop_finalized_price_is_floor_average_of_quorum(
            prices in prop::collection::vec(1u64..1_000_000_000_000, 3..8)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let members = prices.len();
            let needed = quorum(members);

            let (price, round) = runtime.block_on(async {
                let h = Harness::new(members);
                h.register(members).await;
                for (who, price) in prices.iter().enumerate() {
                    h.submit(who, "ethereum", *price);
                }
                h.node.mine_block().await;
                (h.node.price("ethereum"), h.node.round("ethereum"))
            });

            let sum: u128 = prices[..needed].iter().map(|p| u128::from(*p)).sum();
            let expected = U256::from(sum / needed as u128);
            prop_assert_eq!(price, expected);
            prop_assert_eq!(round.id, 1);
            prop_assert_eq!(round.submission_count, (members - needed) as u64);
        }
    }
}
