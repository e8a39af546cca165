//! # Reporter Subsystem
//!
//! **Subsystem ID:** 5
//!
//! ## Purpose
//!
//! The off-chain half of the oracle. Each agent owns one signing key,
//! registers itself once, then on every tick fetches a quote per asset and
//! drives it to a confirmed ledger transaction.
//!
//! ## Submission Path
//!
//! ```text
//! ReporterAgent ──TxIntent──→ TransactionDriver ──sign──→ LedgerClient::send_transaction
//!                                    │
//!                                    └── poll receipt ──→ Success | Reverted | timeout | cancelled
//! ```
//!
//! Failures on one asset are logged and counted; the loop moves on. Only a
//! failed registration stops an agent, before its loop ever starts.
//!
//! ## Module Structure
//!
//! ```text
//! domain/intent.rs        - TxIntent and per-intent gas limits
//! domain/errors.rs        - LedgerClientError, DriverError, AgentError
//! ports/outbound.rs       - LedgerClient
//! adapters/in_process.rs  - LedgerClient over an embedded LedgerNode
//! adapters/rpc.rs         - LedgerClient over JSON-RPC
//! driver.rs               - TransactionDriver
//! agent.rs                - ReporterAgent
//! http.rs                 - /health, /price, /metrics
//! ```

pub mod adapters;
pub mod agent;
pub mod domain;
pub mod driver;
pub mod http;
pub mod ports;

pub use adapters::{InProcessLedgerClient, RpcLedgerClient};
pub use agent::{AgentConfig, ReporterAgent, RoundReport};
pub use domain::*;
pub use driver::{DriverConfig, TransactionDriver};
pub use http::{router as http_router, spawn_http_server};
pub use ports::*;

use tokio::sync::watch;

/// Resolves once `shutdown` reads true. Never resolves if the sender is
/// dropped without signalling.
pub async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
