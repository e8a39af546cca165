//! Blocks and execution results.

use serde::{Deserialize, Serialize};
use shared_bus::OracleEvent;
use shared_types::{hex_bytes, keccak256, Hash, Receipt, Timestamp};

/// A committed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub number: u64,
    pub timestamp: Timestamp,
    #[serde(with = "hex_bytes")]
    pub parent_hash: Hash,
    #[serde(with = "hex_bytes")]
    pub hash: Hash,
    /// Hashes of included transactions, in execution order.
    pub transactions: Vec<String>,
}

impl Block {
    /// The block every chain starts from.
    pub fn genesis(timestamp: Timestamp) -> Self {
        Self::seal(0, timestamp, [0u8; 32], &[])
    }

    /// Builds a block and computes its hash over header and transactions.
    pub fn seal(number: u64, timestamp: Timestamp, parent_hash: Hash, transactions: &[Hash]) -> Self {
        let mut preimage = Vec::with_capacity(48 + 32 * transactions.len());
        preimage.extend_from_slice(&number.to_be_bytes());
        preimage.extend_from_slice(&timestamp.to_be_bytes());
        preimage.extend_from_slice(&parent_hash);
        for tx in transactions {
            preimage.extend_from_slice(tx);
        }

        Self {
            number,
            timestamp,
            parent_hash,
            hash: keccak256(&preimage),
            transactions: transactions
                .iter()
                .map(shared_types::format_hash)
                .collect(),
        }
    }
}

/// An included transaction with the call it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedTransaction {
    pub receipt: Receipt,
    /// `OracleCall::method()` of the executed call.
    pub method: &'static str,
}

/// Everything one round of block production yielded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedBlock {
    pub block: Block,
    pub executed: Vec<ExecutedTransaction>,
    /// Notifications of successful calls, in execution order.
    pub events: Vec<OracleEvent>,
}
