//! # Transactions and Receipts
//!
//! The envelope a reporter signs and the ledger host executes.
//!
//! ```text
//! OracleCall ──wrap──→ Transaction ──sign──→ SignedTransaction ──include──→ Receipt
//! ```
//!
//! The sender is never part of the payload. The ledger recovers it from the
//! signature over [`Transaction::signing_hash`].

use crate::entities::{hex_bytes, Address, AssetId, Hash, Price};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// A call into the oracle state machine.
///
/// Registration and removal are self-service: they always act on the
/// transaction sender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OracleCall {
    /// Add the sender to the reporter registry.
    Register,
    /// Remove the sender from the reporter registry.
    Unregister,
    /// Record the sender's observation for `asset` in the current round.
    SubmitPrice { asset: AssetId, price: Price },
}

impl OracleCall {
    /// Stable method name, used in logs and metrics labels.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Unregister => "unregister",
            Self::SubmitPrice { .. } => "submit_price",
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::Register => 0x01,
            Self::Unregister => 0x02,
            Self::SubmitPrice { .. } => 0x03,
        }
    }

    fn hash_into(&self, hasher: &mut Keccak256) {
        hasher.update([self.tag()]);
        if let Self::SubmitPrice { asset, price } = self {
            // usize is at most 64 bits on every supported target.
            let len = u64::try_from(asset.len()).unwrap_or(u64::MAX);
            hasher.update(len.to_be_bytes());
            hasher.update(asset.as_bytes());
            let mut price_bytes = [0u8; 32];
            price.to_big_endian(&mut price_bytes);
            hasher.update(price_bytes);
        }
    }
}

/// An unsigned transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Chain the transaction is valid on (replay protection).
    pub chain_id: u64,
    /// Sender's nonce; the ledger executes each sender's transactions in nonce order.
    pub nonce: u64,
    /// Price per unit of gas offered by the sender.
    pub gas_price: u64,
    /// Maximum gas the call may consume before reverting.
    pub gas_limit: u64,
    /// The oracle call to execute.
    pub call: OracleCall,
}

impl Transaction {
    /// Hash signed by the sender.
    pub fn signing_hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        self.hash_fields(&mut hasher);
        hasher.finalize().into()
    }

    fn hash_fields(&self, hasher: &mut Keccak256) {
        hasher.update(self.chain_id.to_be_bytes());
        hasher.update(self.nonce.to_be_bytes());
        hasher.update(self.gas_price.to_be_bytes());
        hasher.update(self.gas_limit.to_be_bytes());
        self.call.hash_into(hasher);
    }
}

/// Recoverable secp256k1 signature (r, s, v).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    #[serde(with = "hex_bytes")]
    pub r: [u8; 32],
    #[serde(with = "hex_bytes")]
    pub s: [u8; 32],
    /// Recovery id (0 or 1).
    pub v: u8,
}

/// A transaction with its sender's signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: TxSignature,
}

impl SignedTransaction {
    /// Transaction handle: Keccak-256 over the signed payload and the signature.
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        self.transaction.hash_fields(&mut hasher);
        hasher.update(self.signature.r);
        hasher.update(self.signature.s);
        hasher.update([self.signature.v]);
        hasher.finalize().into()
    }
}

/// Execution outcome of an included transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReceiptStatus {
    Success,
    Reverted { reason: String },
}

/// Proof of inclusion returned by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(with = "hex_bytes")]
    pub tx_hash: Hash,
    /// Sender recovered from the signature.
    #[serde(with = "hex_bytes")]
    pub from: Address,
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Position within the block.
    pub index: u32,
    pub gas_used: u64,
    pub status: ReceiptStatus,
}

impl Receipt {
    /// Returns true if the call executed without reverting.
    pub fn is_success(&self) -> bool {
        matches!(self.status, ReceiptStatus::Success)
    }

    /// Revert reason, if the call reverted.
    pub fn revert_reason(&self) -> Option<&str> {
        match &self.status {
            ReceiptStatus::Success => None,
            ReceiptStatus::Reverted { reason } => Some(reason),
        }
    }
}
