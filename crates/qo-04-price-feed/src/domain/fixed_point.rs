//! Fixed-point conversion of floating quotes.

use super::errors::FetchError;
use shared_types::{Price, PRICE_DECIMALS};

const SCALE: f64 = 10u64.pow(PRICE_DECIMALS) as f64;

/// `2^128`, the first value that no longer fits the integer conversion.
const LIMIT: f64 = 340_282_366_920_938_463_463_374_607_431_768_211_456.0;

/// Converts a USD quote to an integer with [`PRICE_DECIMALS`] implied
/// decimals, truncating toward zero.
///
/// Negative, non-finite and out-of-range quotes are rejected.
pub fn to_fixed_point(asset: &str, quote: f64) -> Result<Price, FetchError> {
    let scaled = (quote * SCALE).trunc();
    if !quote.is_finite() || quote < 0.0 || scaled >= LIMIT {
        return Err(FetchError::InvalidQuote {
            asset: asset.to_string(),
            quote,
        });
    }
    Ok(Price::from(scaled as u128))
}
