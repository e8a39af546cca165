//! # Reporter Registry Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! The set of reporter identities allowed to submit observations. Leaf
//! component: it knows nothing about rounds or prices; the aggregation
//! subsystem reads its size for quorum math and its membership for
//! authorization.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | No duplicate members | `register()` rejects existing members |
//! | At most `MAX_REPORTERS` members | `register()` rejects when full |
//! | `order` holds exactly the members, each once | `positions` index kept in sync on every mutation |
//! | Failed operations change nothing | errors are returned before any write |
//!
//! ## Removal
//!
//! ```text
//! order:  [A, B, C, D]      unregister(B)
//!              ↑     │
//!              └─────┘ swap with last, truncate
//! order:  [A, D, C]         positions[D] = 1
//! ```

pub mod domain;

pub use domain::*;
