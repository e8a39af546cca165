//! [`LedgerClient`](crate::LedgerClient) adapters.

pub mod in_process;
pub mod rpc;

pub use in_process::InProcessLedgerClient;
pub use rpc::RpcLedgerClient;
