//! Logical ledger mutations an agent can request.

use shared_types::{AssetId, OracleCall, Price};

/// Gas limit of registry calls.
pub const REGISTRY_GAS_LIMIT: u64 = 100_000;

/// Gas limit of price submissions; covers the ledger's worst-case
/// submission, including one that finalizes a round.
pub const SUBMIT_GAS_LIMIT: u64 = 300_000;

/// What the agent wants the ledger to do. Every intent takes the same
/// acquire, sign, submit, confirm path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxIntent {
    Register,
    Unregister,
    Submit { asset: AssetId, price: Price },
}

impl TxIntent {
    pub fn gas_limit(&self) -> u64 {
        match self {
            Self::Register | Self::Unregister => REGISTRY_GAS_LIMIT,
            Self::Submit { .. } => SUBMIT_GAS_LIMIT,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Unregister => "unregister",
            Self::Submit { .. } => "submit",
        }
    }

    pub fn into_call(self) -> OracleCall {
        match self {
            Self::Register => OracleCall::Register,
            Self::Unregister => OracleCall::Unregister,
            Self::Submit { asset, price } => OracleCall::SubmitPrice { asset, price },
        }
    }
}
