//! # Price Feed Subsystem
//!
//! **Subsystem ID:** 4
//!
//! ## Purpose
//!
//! Reads the current USD quote of an asset from an external price source
//! and converts it to the fixed-point integer reporters submit.
//!
//! ```text
//! PriceSource::fetch_usd("ethereum") ──→ 3012.4567 ──to_fixed_point──→ 301_245_670_000
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! domain/fixed_point.rs  - float quote to 8-decimal integer
//! domain/errors.rs       - FetchError
//! ports/outbound.rs      - PriceSource
//! adapters/coingecko.rs  - CoinGecko `simple/price` client
//! adapters/in_memory.rs  - in-memory quotes for tests and offline runs
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{CoinGeckoClient, CoinGeckoConfig, StaticPriceSource, DEFAULT_BASE_URL};
pub use domain::*;
pub use ports::*;
