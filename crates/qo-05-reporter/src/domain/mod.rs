//! Domain layer for the reporter.

pub mod errors;
pub mod intent;

pub use errors::*;
pub use intent::*;
