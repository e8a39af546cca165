//! # Shared Crypto - Reporter Identities
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `ecdsa` | secp256k1 (recoverable) | Transaction signing, sender recovery |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S normalization (EIP-2)
//! - **Addresses**: last 20 bytes of Keccak-256 over the uncompressed public key
//! - **Sender recovery**: the ledger never trusts a claimed sender; it recovers
//!   the address from `(signing_hash, r, s, v)`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;

// Re-exports
pub use ecdsa::{address_from_verifying_key, recover_address, recover_sender, Secp256k1KeyPair};
pub use errors::CryptoError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
