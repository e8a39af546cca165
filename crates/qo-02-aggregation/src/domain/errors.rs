//! Oracle state machine errors.
//!
//! The display strings double as revert reasons on the ledger.

use qo_01_registry::RegistryError;
use thiserror::Error;

/// Every way a call into the oracle can be refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Caller is not a registered reporter.
    #[error("reporter not registered")]
    NotRegistered,

    /// Caller is already a registered reporter.
    #[error("reporter already registered")]
    AlreadyRegistered,

    /// Caller already submitted for this asset in the current round.
    #[error("already submitted for {asset} in round {round_id}")]
    DuplicateSubmission { asset: String, round_id: u64 },

    /// Registry is at capacity.
    #[error("registry full ({capacity} reporters)")]
    RegistryFull { capacity: usize },

    /// Asset identifier is empty or longer than `MAX_ASSET_LEN`.
    #[error("invalid asset identifier")]
    InvalidAsset,

    /// The round's running sum does not fit in 256 bits.
    #[error("arithmetic overflow while aggregating {asset}")]
    ArithmeticOverflow { asset: String },
}

impl From<RegistryError> for ContractError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::AlreadyRegistered => Self::AlreadyRegistered,
            RegistryError::NotRegistered => Self::NotRegistered,
            RegistryError::Full { capacity } => Self::RegistryFull { capacity },
        }
    }
}
