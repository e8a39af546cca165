//! Ports layer for the aggregation subsystem.

pub mod inbound;

pub use inbound::*;
