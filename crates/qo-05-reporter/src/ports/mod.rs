//! Ports layer for the reporter.

pub mod outbound;

pub use outbound::*;
