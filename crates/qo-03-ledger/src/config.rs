//! Ledger host configuration.

use serde::Deserialize;
use std::time::Duration;

/// One gwei, the default minimum gas price.
pub const GWEI: u64 = 1_000_000_000;

/// Runtime configuration for the ledger host.
#[derive(Clone, Debug, Deserialize)]
pub struct LedgerConfig {
    /// Chain id every transaction must carry.
    pub chain_id: u64,

    /// Interval between produced blocks.
    #[serde(with = "duration_millis")]
    pub block_time: Duration,

    /// Gas price floor.
    pub min_gas_price: u64,

    /// Premium added to the suggested gas price per pending transaction.
    pub gas_price_step: u64,

    /// Pool capacity across all senders.
    pub max_pending: usize,

    /// Pool capacity per sender.
    pub max_pending_per_sender: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            block_time: Duration::from_secs(1),
            min_gas_price: GWEI,
            gas_price_step: GWEI / 100,
            max_pending: 4096,
            max_pending_per_sender: 16,
        }
    }
}

impl LedgerConfig {
    /// Checks that the configuration can produce a working ledger.
    pub fn validate(&self) -> Result<(), String> {
        if self.block_time.is_zero() {
            return Err("block_time must be greater than zero".into());
        }
        if self.max_pending == 0 || self.max_pending_per_sender == 0 {
            return Err("pool capacities must be greater than zero".into());
        }
        if self.max_pending_per_sender > self.max_pending {
            return Err("max_pending_per_sender cannot exceed max_pending".into());
        }
        Ok(())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
