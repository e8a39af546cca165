//! Reporter error types.

use qo_04_price_feed::FetchError;
use shared_crypto::CryptoError;
use std::time::Duration;
use thiserror::Error;

/// Failure talking to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerClientError {
    /// The ledger could not be reached or did not answer.
    #[error("ledger transport error: {0}")]
    Transport(String),

    /// The ledger refused the transaction at submission.
    #[error("ledger rejected transaction: {0}")]
    Rejected(String),

    /// The ledger answered with an error other than a rejection.
    #[error("ledger rpc error {code}: {message}")]
    Rpc { code: i32, message: String },

    /// The answer could not be decoded.
    #[error("malformed ledger response: {0}")]
    Malformed(String),
}

/// Why an intent did not end in a successful receipt.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Parameters could not be acquired or the transaction could not be sent.
    #[error(transparent)]
    Transport(LedgerClientError),

    /// The transaction could not be signed.
    #[error("signing failed: {0}")]
    Signing(#[from] CryptoError),

    /// The ledger refused the transaction outright.
    #[error("submission rejected: {0}")]
    SubmissionRejected(String),

    /// No receipt before the deadline.
    #[error("transaction {tx_hash} not confirmed within {waited:?}")]
    ConfirmationTimeout { tx_hash: String, waited: Duration },

    /// Included but reverted.
    #[error("transaction {tx_hash} reverted: {reason}")]
    ConfirmationFailed { tx_hash: String, reason: String },

    /// Shutdown fired while waiting.
    #[error("confirmation wait cancelled")]
    Cancelled,
}

impl DriverError {
    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Signing(_) => "signing",
            Self::SubmissionRejected(_) => "rejected",
            Self::ConfirmationTimeout { .. } => "timeout",
            Self::ConfirmationFailed { .. } => "reverted",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Agent-level failures.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Membership could not be established. Fatal to the agent.
    #[error("registration failed: {0}")]
    RegistrationFailed(String),

    /// No usable quote for the asset.
    #[error("fetching {asset} failed: {source}")]
    FetchFailed {
        asset: String,
        #[source]
        source: FetchError,
    },

    /// The quote was fetched but not confirmed on the ledger.
    #[error("submitting {asset} failed: {source}")]
    Submission {
        asset: String,
        #[source]
        source: DriverError,
    },
}
