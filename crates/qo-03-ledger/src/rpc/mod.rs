//! JSON-RPC 2.0 interface of the ledger host.
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `oracle_chainId` | none | `u64` |
//! | `oracle_blockNumber` | none | `u64` |
//! | `oracle_gasPrice` | none | `u64` |
//! | `oracle_getTransactionCount` | `[address]` | pending nonce |
//! | `oracle_sendTransaction` | `[SignedTransaction]` | tx hash |
//! | `oracle_getTransactionReceipt` | `[hash]` | `Receipt` or `null` |
//! | `oracle_getBlockByNumber` | `[u64]` | `Block` or `null` |
//! | `oracle_isReporter` | `[address]` | `bool` |
//! | `oracle_reporterCount` | none | `u64` |
//! | `oracle_reporterAt` | `[index]` | address or `null` |
//! | `oracle_quorum` | none | `u64` |
//! | `oracle_round` | `[asset]` | `Round` |
//! | `oracle_submission` | `[asset, round_id, address]` | `Submission` |
//! | `oracle_price` | `[asset]` | hex `U256` |
//! | `oracle_published` | `[asset]` | `PublishedPrice` or `null` |
//! | `oracle_assets` | none | `[asset]` |

pub mod server;
pub mod types;

pub use server::{router, spawn_rpc_server};
pub use types::{codes, RpcError};
