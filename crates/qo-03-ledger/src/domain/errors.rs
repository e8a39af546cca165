//! Ledger acceptance errors.
//!
//! These refuse a transaction before it is pooled. Failures inside the
//! oracle contract are not ledger errors: they become reverted receipts.

use shared_types::{format_hash, Hash};
use thiserror::Error;

/// Why a transaction was refused at submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No sender could be recovered from the signature.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Signed for another chain.
    #[error("wrong chain id: expected {expected}, got {actual}")]
    WrongChainId { expected: u64, actual: u64 },

    /// Nonce already consumed by an included transaction.
    #[error("nonce too low: account nonce is {expected}, got {actual}")]
    NonceTooLow { expected: u64, actual: u64 },

    /// The sender already has a pooled transaction with this nonce.
    #[error("nonce {nonce} already pending")]
    NonceAlreadyPending { nonce: u64 },

    /// Gas price below the ledger floor.
    #[error("transaction underpriced: minimum {minimum}, offered {offered}")]
    Underpriced { minimum: u64, offered: u64 },

    /// Gas limit cannot even cover the intrinsic cost.
    #[error("intrinsic gas too low: requires {required}, limit {provided}")]
    IntrinsicGasTooLow { required: u64, provided: u64 },

    /// Same transaction already pooled or included.
    #[error("transaction already known: {}", format_hash(.0))]
    AlreadyKnown(Hash),

    /// Pool at capacity.
    #[error("transaction pool full ({capacity} pending)")]
    PoolFull { capacity: usize },

    /// Sender has too many pooled transactions.
    #[error("sender has {limit} pending transactions")]
    SenderLimitReached { limit: usize },
}

impl LedgerError {
    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidSignature(_) => "invalid_signature",
            Self::WrongChainId { .. } => "wrong_chain_id",
            Self::NonceTooLow { .. } => "nonce_too_low",
            Self::NonceAlreadyPending { .. } => "nonce_already_pending",
            Self::Underpriced { .. } => "underpriced",
            Self::IntrinsicGasTooLow { .. } => "intrinsic_gas_too_low",
            Self::AlreadyKnown(_) => "already_known",
            Self::PoolFull { .. } => "pool_full",
            Self::SenderLimitReached { .. } => "sender_limit",
        }
    }
}
