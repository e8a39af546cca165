//! CoinGecko `simple/price` client.

use crate::domain::FetchError;
use crate::ports::PriceSource;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

/// Public CoinGecko v3 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Header carrying the demo API key.
pub const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Connection settings for [`CoinGeckoClient`].
#[derive(Clone, Debug)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    /// Attached as [`API_KEY_HEADER`] when set.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP price source speaking the CoinGecko `simple/price` protocol.
pub struct CoinGeckoClient {
    client: Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoClient {
    pub fn new(config: CoinGeckoConfig) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// `{base}/simple/price?ids={asset}&vs_currencies=usd`
    pub fn simple_price_url(&self, asset: &str) -> Result<Url, FetchError> {
        let base = self.config.base_url.trim_end_matches('/');
        Url::parse_with_params(
            &format!("{base}/simple/price"),
            &[("ids", asset), ("vs_currencies", "usd")],
        )
        .map_err(|e| FetchError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch_usd(&self, asset: &str) -> Result<f64, FetchError> {
        let url = self.simple_price_url(asset)?;
        let mut request = self.client.get(url);
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                asset: asset.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let quote = parse_simple_price(&body, asset)?;
        debug!(asset, quote, "Fetched quote");
        Ok(quote)
    }
}

/// Extracts `body[asset]["usd"]` from a `simple/price` response.
pub fn parse_simple_price(body: &str, asset: &str) -> Result<f64, FetchError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    let entry = value
        .get(asset)
        .ok_or_else(|| FetchError::MissingAsset(asset.to_string()))?;
    entry
        .get("usd")
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| FetchError::Malformed(format!("no numeric usd quote for {asset}")))
}
