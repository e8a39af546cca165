//! # Shared Bus - Oracle Event Bus
//!
//! Carries the events emitted by the oracle state machine (registry changes,
//! finalized prices) and by the ledger host (produced blocks) to in-process
//! observers such as the runtime's price log.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Ledger host  │                    │   Observer   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Events are published only after the block that produced them is committed,
//! so an observer never sees a finalization that a later revert undoes.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, OracleEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Events buffered per subscriber; a slower subscriber skips the oldest.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
