//! Domain layer for the price feed.

pub mod errors;
pub mod fixed_point;

pub use errors::*;
pub use fixed_point::*;
