//! Ports layer for the ledger host.

pub mod outbound;

pub use outbound::*;
