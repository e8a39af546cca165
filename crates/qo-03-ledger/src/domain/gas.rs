//! Gas schedule.
//!
//! Fixed costs per call type plus a per-identity charge when a submission
//! finalizes a round, since finalization walks the registry. The
//! finalization charge is capped so that the submission which reaches
//! quorum never costs more than [`max_submit_gas`], whatever the registry
//! size.

use shared_types::{OracleCall, MAX_ASSET_LEN};

/// Charged for every transaction.
pub const TX_BASE_GAS: u64 = 21_000;
/// Charged per payload byte.
pub const PAYLOAD_BYTE_GAS: u64 = 16;

pub const REGISTER_GAS: u64 = 44_000;
pub const UNREGISTER_GAS: u64 = 26_000;
pub const SUBMIT_GAS: u64 = 66_000;
/// Per identity visited while finalizing.
pub const FINALIZE_ENTRY_GAS: u64 = 4_000;
/// Ceiling of the whole finalization charge (32 entries' worth).
pub const FINALIZE_GAS_CAP: u64 = 128_000;

/// Selector plus the 32-byte price.
const SUBMIT_FIXED_PAYLOAD: u64 = 4 + 32;

/// Encoded payload size: 4-byte selector, then the asset and a 32-byte price.
fn payload_len(call: &OracleCall) -> u64 {
    match call {
        OracleCall::Register | OracleCall::Unregister => 4,
        OracleCall::SubmitPrice { asset, .. } => SUBMIT_FIXED_PAYLOAD + asset.len() as u64,
    }
}

/// Gas consumed before any execution; the minimum acceptable gas limit.
pub fn intrinsic_gas(call: &OracleCall) -> u64 {
    TX_BASE_GAS + PAYLOAD_BYTE_GAS * payload_len(call)
}

/// Gas consumed by executing `call`, given how many identities a
/// finalization would visit (0 if the call does not finalize).
pub fn execution_gas(call: &OracleCall, finalization_work: usize) -> u64 {
    match call {
        OracleCall::Register => REGISTER_GAS,
        OracleCall::Unregister => UNREGISTER_GAS,
        OracleCall::SubmitPrice { .. } => {
            let finalization = FINALIZE_ENTRY_GAS
                .saturating_mul(finalization_work as u64)
                .min(FINALIZE_GAS_CAP);
            SUBMIT_GAS + finalization
        }
    }
}

/// Most gas any acceptable submission can use: longest asset identifier,
/// finalization charged at the cap. A submit gas limit at least this large
/// never runs out of gas.
pub const fn max_submit_gas() -> u64 {
    TX_BASE_GAS
        + PAYLOAD_BYTE_GAS * (SUBMIT_FIXED_PAYLOAD + MAX_ASSET_LEN as u64)
        + SUBMIT_GAS
        + FINALIZE_GAS_CAP
}
