//! Outbound (Driven) port: the external price source.

use crate::domain::{to_fixed_point, FetchError};
use async_trait::async_trait;
use shared_types::Price;

/// A source of current USD quotes.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current USD quote of `asset`.
    async fn fetch_usd(&self, asset: &str) -> Result<f64, FetchError>;

    /// Current quote of `asset` as a fixed-point [`Price`].
    async fn fetch_price(&self, asset: &str) -> Result<Price, FetchError> {
        let quote = self.fetch_usd(asset).await?;
        to_fixed_point(asset, quote)
    }
}
