//! Ports layer for the price feed.

pub mod outbound;

pub use outbound::*;
