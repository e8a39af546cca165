//! # Domain Layer - Aggregation Subsystem
//!
//! Pure business logic; no I/O, no clocks (the caller passes `now`).

pub mod aggregator;
pub mod contract;
pub mod entities;
pub mod errors;
pub mod ledger;
pub mod quorum;

pub use aggregator::*;
pub use contract::*;
pub use entities::*;
pub use errors::*;
pub use ledger::*;
pub use quorum::*;
