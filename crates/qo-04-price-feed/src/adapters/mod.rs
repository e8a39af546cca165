//! Adapters implementing [`PriceSource`](crate::PriceSource).

pub mod coingecko;
pub mod in_memory;

pub use coingecko::{parse_simple_price, CoinGeckoClient, CoinGeckoConfig, DEFAULT_BASE_URL};
pub use in_memory::StaticPriceSource;
