//! # Quorum-Oracle Runtime
//!
//! Launches a complete deployment in one process.
//!
//! ```text
//!                 ┌──────────────────────────────┐
//!  agent 0 ──┐    │ Ledger host (qo-03)          │
//!  agent 1 ──┼──→ │  pool → blocks → contract    │ ──bus──→ price log
//!  agent N ──┘    │  JSON-RPC on LEDGER_RPC_PORT │
//!     │           └──────────────────────────────┘
//!     └── HTTP on HTTP_PORT + i (/health, /price, /metrics)
//! ```
//!
//! With `RPC_URL` set the ledger is not embedded; agents reach the remote
//! host over JSON-RPC instead and no price log runs.
//!
//! ## Modules
//!
//! - `config/` - environment variables, development keys
//! - `launcher/` - task startup and graceful shutdown

pub mod config;
pub mod launcher;

pub use config::{ConfigError, LedgerTarget, PriceSourceConfig, RuntimeConfig, DEV_KEYS};
pub use launcher::{spawn_price_log, LaunchError, OracleRuntime};
