//! Domain layer for the ledger host.

pub mod chain;
pub mod entities;
pub mod errors;
pub mod gas;

pub use chain::*;
pub use entities::*;
pub use errors::*;
pub use gas::*;
