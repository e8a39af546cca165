//! # Ledger Host Subsystem
//!
//! **Subsystem ID:** 3
//!
//! ## Purpose
//!
//! The shared, strongly-consistent, append-only store that hosts the oracle
//! state machine. Reporters submit signed transactions; the host checks
//! them, pools them and executes them one at a time in blocks, so every
//! call into the oracle is atomic with respect to every other.
//!
//! ## Transaction Lifecycle
//!
//! ```text
//! send_transaction ──validate──→ [POOLED] ──produce_block──→ [INCLUDED] ──→ Receipt
//!        │                                      │
//!        └─ LedgerError (nothing stored)        └─ Success | Reverted { reason }
//! ```
//!
//! | Stage | Checks |
//! |-------|--------|
//! | Acceptance | signature recovers a sender, chain id, nonce, gas price, intrinsic gas, duplicates, pool capacity |
//! | Inclusion | per-sender nonce order, gas limit covers execution, contract preconditions |
//!
//! A call that fails inside a block still consumes its nonce and gets a
//! reverted receipt; oracle state is untouched. Notifications of the calls
//! that succeeded are published on the bus once the block is committed.
//!
//! ## Module Structure
//!
//! ```text
//! config.rs          - LedgerConfig
//! domain/gas.rs      - intrinsic and execution gas
//! domain/chain.rs    - ChainState: pool, nonces, blocks, receipts, contract
//! ports/outbound.rs  - TimeSource
//! service.rs         - LedgerNode: locking, bus publication, metrics, block loop
//! rpc/               - JSON-RPC 2.0 over axum
//! ```

pub mod config;
pub mod domain;
pub mod ports;
pub mod rpc;
pub mod service;

pub use config::LedgerConfig;
pub use domain::*;
pub use ports::*;
pub use rpc::{router, spawn_rpc_server};
pub use service::LedgerNode;
