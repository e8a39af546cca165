//! Price source backed by an in-memory table.

use crate::domain::FetchError;
use crate::ports::PriceSource;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Quotes set by hand. Unknown assets fail with [`FetchError::MissingAsset`].
#[derive(Debug, Default)]
pub struct StaticPriceSource {
    quotes: RwLock<HashMap<String, f64>>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with_quote(self, asset: &str, quote: f64) -> Self {
        self.set(asset, quote);
        self
    }

    pub fn set(&self, asset: &str, quote: f64) {
        self.quotes.write().insert(asset.to_string(), quote);
    }

    pub fn remove(&self, asset: &str) {
        self.quotes.write().remove(asset);
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    async fn fetch_usd(&self, asset: &str) -> Result<f64, FetchError> {
        self.quotes
            .read()
            .get(asset)
            .copied()
            .ok_or_else(|| FetchError::MissingAsset(asset.to_string()))
    }
}
