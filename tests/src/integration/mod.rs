//! Cross-crate integration flows.

pub mod agent_flow;
pub mod quorum_flow;
pub mod rpc_flow;

use qo_03_ledger::{LedgerConfig, LedgerNode, ManualTimeSource};
use qo_05_reporter::{REGISTRY_GAS_LIMIT, SUBMIT_GAS_LIMIT};
use shared_bus::InMemoryEventBus;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{Hash, OracleCall, Transaction};
use std::sync::Arc;

/// Block time of the first mined block.
pub const GENESIS_TIME: u64 = 1_700_000_000;

/// A ledger host with a hand-driven clock and fresh signing identities.
pub struct Harness {
    pub node: Arc<LedgerNode>,
    pub bus: Arc<InMemoryEventBus>,
    pub time: Arc<ManualTimeSource>,
    pub keys: Vec<Secp256k1KeyPair>,
}

impl Harness {
    pub fn new(identities: usize) -> Self {
        Self::with_config(identities, LedgerConfig::default())
    }

    pub fn with_config(identities: usize, config: LedgerConfig) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let time = Arc::new(ManualTimeSource::new(GENESIS_TIME));
        let node = Arc::new(LedgerNode::new(config, bus.clone(), time.clone()));
        Self {
            node,
            bus,
            time,
            keys: (0..identities)
                .map(|_| Secp256k1KeyPair::generate())
                .collect(),
        }
    }

    /// Signs `call` for identity `who` at its pending nonce, with the gas
    /// limit a reporter agent would use, and pools it.
    pub fn send(&self, who: usize, call: OracleCall) -> Hash {
        let key = &self.keys[who];
        let gas_limit = match call {
            OracleCall::SubmitPrice { .. } => SUBMIT_GAS_LIMIT,
            OracleCall::Register | OracleCall::Unregister => REGISTRY_GAS_LIMIT,
        };
        let signed = key
            .sign_transaction(Transaction {
                chain_id: self.node.chain_id(),
                nonce: self.node.pending_nonce(&key.address()),
                gas_price: self.node.gas_price(),
                gas_limit,
                call,
            })
            .expect("signing");
        self.node.send_transaction(signed).expect("accepted")
    }

    /// Registers identities `0..count` in one block.
    pub async fn register(&self, count: usize) {
        for who in 0..count {
            self.send(who, OracleCall::Register);
        }
        self.node.mine_block().await;
    }

    pub fn submit(&self, who: usize, asset: &str, price: u64) -> Hash {
        self.send(
            who,
            OracleCall::SubmitPrice {
                asset: asset.to_string(),
                price: price.into(),
            },
        )
    }
}
