//! # Aggregation Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! The ledger-resident oracle state machine. Reporters submit one value per
//! asset per round; once a two-thirds quorum of the registry has submitted,
//! the integer average is published and the round advances, in the same
//! atomic step as the submission that reached quorum.
//!
//! ## Round Lifecycle
//!
//! ```text
//!            submit (count < quorum)
//!            ┌──────┐
//!            ▼      │
//! [OPEN id] ─┴──────┘──submit (count ≥ quorum)──→ finalize ──→ [OPEN id+1]
//!                                                  │
//!                                                  └─ publish sum/count, emit PriceFinalized
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | One submission per (asset, round, reporter) | `RoundLedger::submit` duplicate check |
//! | Finalization is atomic with the quorum-reaching submission | single `OracleContract::execute` entry point |
//! | Errors leave state unchanged | every effect is computed before the first write |
//! | Round ids only increase | `Round::advance` |
//!
//! ## Module Structure
//!
//! ```text
//! domain/quorum.rs     - quorum(n)
//! domain/aggregator.rs - pure averaging
//! domain/ledger.rs     - RoundLedger (rounds, submissions, published prices)
//! domain/contract.rs   - OracleContract: registry + ledger behind execute()
//! ports/inbound.rs     - OracleQueries read API
//! ```

pub mod domain;
pub mod ports;

pub use domain::*;
pub use ports::*;
