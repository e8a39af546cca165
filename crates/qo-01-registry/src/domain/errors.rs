//! Registry error types.

use thiserror::Error;

/// Registry precondition failures.
///
/// None of them mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The identity is already a member.
    #[error("reporter already registered")]
    AlreadyRegistered,

    /// The identity is not a member.
    #[error("reporter not registered")]
    NotRegistered,

    /// The registry already holds [`MAX_REPORTERS`](super::MAX_REPORTERS) members.
    #[error("registry full ({capacity} reporters)")]
    Full { capacity: usize },
}
