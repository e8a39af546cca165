//! Runtime configuration, read from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `RPC_URL` | unset (embedded ledger) |
//! | `LEDGER_RPC_PORT` | `8545` |
//! | `CHAIN_ID` | `31337` |
//! | `BLOCK_TIME_MS` | `1000` |
//! | `PRIVATE_KEYS` | first `REPORTER_COUNT` development keys |
//! | `REPORTER_COUNT` | `4` |
//! | `COINS` | `ethereum` |
//! | `SUBMISSION_INTERVAL` | `20` (seconds) |
//! | `HTTP_PORT` | `8080` (agent *i* listens on `HTTP_PORT + i`) |
//! | `COINGECKO_API_KEY` | unset |
//! | `COINGECKO_URL` | CoinGecko v3 |
//! | `STATIC_PRICES` | unset (`asset=quote,...` replaces CoinGecko) |

use qo_03_ledger::LedgerConfig;
use qo_04_price_feed::{CoinGeckoConfig, DEFAULT_BASE_URL};
use shared_crypto::{CryptoError, Secp256k1KeyPair};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Well-known development keys of a local test chain. Never fund them anywhere real.
pub const DEV_KEYS: [&str; 10] = [
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
    "7c852118294e51e653712a81e05800f419141751be58f605c371e15141b007a6",
    "47e179ec197488593b187f80a00eb0da91f1b9d0b13f8733639f19c30a34926a",
    "8b3a350cf5c34c9194ca85829a2df0ec3153be0318b5e2d3348e872092edffba",
    "92db14e403b83dfe3df233f83dfa3a0d7096f21ca9b0d6d6b8d88b2b4ec1564e",
    "4bbbf85ce3377467afe5d46f804f221813b2bb87f24d81f60f1fcdbf7cbf4356",
    "dbda1821b80551c9d65939329250298aa3472ba22feea921c0cf5d620ea67b97",
    "2a871d0798f97d79848a013d4936a73bf4cc922c825d33c1cf7073dff6d409c6",
];

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("private key #{index} is invalid: {source}")]
    InvalidKey {
        index: usize,
        #[source]
        source: CryptoError,
    },

    #[error("REPORTER_COUNT is {requested} but only {available} development keys exist")]
    NotEnoughDevKeys { requested: usize, available: usize },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("invalid STATIC_PRICES entry {0:?} (expected asset=quote)")]
    InvalidStaticPrice(String),

    #[error("invalid ledger configuration: {0}")]
    Ledger(String),
}

/// Where the ledger lives.
#[derive(Debug, Clone)]
pub enum LedgerTarget {
    /// Start a ledger host in this process and expose it on `rpc_port`.
    Embedded { config: LedgerConfig, rpc_port: u16 },
    /// Talk to an already running ledger host.
    Remote { url: String },
}

/// Where the agents get their quotes.
#[derive(Debug, Clone)]
pub enum PriceSourceConfig {
    CoinGecko(CoinGeckoConfig),
    /// Fixed quotes, for offline runs.
    Static(Vec<(String, f64)>),
}

/// Everything the launcher needs.
#[derive(Debug)]
pub struct RuntimeConfig {
    pub ledger: LedgerTarget,
    /// One agent per key, in order.
    pub keys: Vec<Secp256k1KeyPair>,
    pub assets: Vec<String>,
    pub submission_interval: Duration,
    /// Agent *i* serves HTTP on `http_port + i`.
    pub http_port: u16,
    pub prices: PriceSourceConfig,
}

impl RuntimeConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let ledger = match var("RPC_URL") {
            Some(url) => LedgerTarget::Remote { url },
            None => {
                let config = LedgerConfig {
                    chain_id: parse_or(var("CHAIN_ID"), "CHAIN_ID", 31337)?,
                    block_time: Duration::from_millis(parse_or(
                        var("BLOCK_TIME_MS"),
                        "BLOCK_TIME_MS",
                        1000,
                    )?),
                    ..LedgerConfig::default()
                };
                config.validate().map_err(ConfigError::Ledger)?;
                LedgerTarget::Embedded {
                    config,
                    rpc_port: parse_or(var("LEDGER_RPC_PORT"), "LEDGER_RPC_PORT", 8545)?,
                }
            }
        };

        let keys = match var("PRIVATE_KEYS") {
            Some(list) => parse_keys(list.split(',').map(str::trim).filter(|k| !k.is_empty()))?,
            None => {
                let count: usize = parse_or(var("REPORTER_COUNT"), "REPORTER_COUNT", 4)?;
                if count > DEV_KEYS.len() {
                    return Err(ConfigError::NotEnoughDevKeys {
                        requested: count,
                        available: DEV_KEYS.len(),
                    });
                }
                parse_keys(DEV_KEYS.iter().copied().take(count))?
            }
        };
        if keys.is_empty() {
            return Err(ConfigError::Empty("PRIVATE_KEYS"));
        }

        let assets = match var("COINS") {
            Some(list) => split_list(&list),
            None => vec!["ethereum".to_string()],
        };
        if assets.is_empty() {
            return Err(ConfigError::Empty("COINS"));
        }

        let prices = match var("STATIC_PRICES") {
            Some(list) => PriceSourceConfig::Static(parse_static_prices(&list)?),
            None => PriceSourceConfig::CoinGecko(CoinGeckoConfig {
                base_url: var("COINGECKO_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                api_key: var("COINGECKO_API_KEY"),
                ..CoinGeckoConfig::default()
            }),
        };

        Ok(Self {
            ledger,
            keys,
            assets,
            submission_interval: Duration::from_secs(parse_or(
                var("SUBMISSION_INTERVAL"),
                "SUBMISSION_INTERVAL",
                20,
            )?),
            http_port: parse_or(var("HTTP_PORT"), "HTTP_PORT", 8080)?,
            prices,
        })
    }

    /// JSON-RPC endpoint of the ledger, as seen from this host.
    pub fn ledger_url(&self) -> String {
        match &self.ledger {
            LedgerTarget::Remote { url } => url.clone(),
            LedgerTarget::Embedded { rpc_port, .. } => format!("http://127.0.0.1:{rpc_port}/"),
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}

fn parse_keys<'a>(keys: impl Iterator<Item = &'a str>) -> Result<Vec<Secp256k1KeyPair>, ConfigError> {
    keys.enumerate()
        .map(|(index, key)| {
            Secp256k1KeyPair::from_hex(key).map_err(|source| ConfigError::InvalidKey { index, source })
        })
        .collect()
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_static_prices(list: &str) -> Result<Vec<(String, f64)>, ConfigError> {
    split_list(list)
        .into_iter()
        .map(|entry| {
            let parsed = entry.split_once('=').and_then(|(asset, quote)| {
                let asset = asset.trim();
                let quote: f64 = quote.trim().parse().ok()?;
                (!asset.is_empty()).then(|| (asset.to_string(), quote))
            });
            parsed.ok_or(ConfigError::InvalidStaticPrice(entry))
        })
        .collect()
}
