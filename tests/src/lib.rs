//! # Quorum-Oracle Test Suite
//!
//! Scenarios that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── quorum_flow.rs   # signed calls → ledger host → finalization → bus
//!     ├── agent_flow.rs    # reporter agents driving an in-process ledger
//!     └── rpc_flow.rs      # agents and CLI reads over JSON-RPC and HTTP
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p qo-tests
//! cargo test -p qo-tests integration::quorum_flow::
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
