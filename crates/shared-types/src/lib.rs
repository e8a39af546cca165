//! # Shared Types Crate
//!
//! Types exchanged between the reporter agents and the ledger host.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identities, prices, the `OracleCall` variant
//!   and the transaction envelope are defined here and nowhere else.
//! - **Sender from signature**: transactions carry no `from` field; the ledger
//!   recovers the sender from the signature, so identity cannot be spoofed in
//!   the payload.

pub mod entities;
pub mod transaction;

pub use entities::*;
pub use transaction::*;
