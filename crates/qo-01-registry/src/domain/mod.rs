//! Domain layer for the reporter registry.

pub mod errors;
pub mod registry;

pub use errors::*;
pub use registry::*;
