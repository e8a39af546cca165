//! # Oracle Events
//!
//! Everything observable about the oracle flows through these variants.

use serde::{Deserialize, Serialize};
use shared_types::{Address, AssetId, Hash, Price, Timestamp};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OracleEvent {
    // =========================================================================
    // REPORTER REGISTRY
    // =========================================================================
    /// A reporter joined the registry.
    ReporterRegistered {
        /// The new member.
        reporter: Address,
        /// Registry size after the change.
        registry_size: usize,
    },

    /// A reporter left the registry.
    ReporterRemoved {
        /// The departed member.
        reporter: Address,
        /// Registry size after the change.
        registry_size: usize,
    },

    // =========================================================================
    // AGGREGATION
    // =========================================================================
    /// A round reached quorum and its average became the published price.
    PriceFinalized {
        /// Asset the round was for.
        asset: AssetId,
        /// Integer average of the counted submissions.
        price: Price,
        /// Round that finalized.
        round_id: u64,
        /// Block timestamp of the finalizing submission.
        finalized_at: Timestamp,
    },

    // =========================================================================
    // LEDGER HOST
    // =========================================================================
    /// A block was committed.
    BlockProduced {
        /// Block height.
        number: u64,
        /// Block hash.
        hash: Hash,
        /// Number of included transactions.
        transaction_count: usize,
        /// Block timestamp.
        timestamp: Timestamp,
    },
}

impl OracleEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ReporterRegistered { .. } | Self::ReporterRemoved { .. } => EventTopic::Registry,
            Self::PriceFinalized { .. } => EventTopic::Finalization,
            Self::BlockProduced { .. } => EventTopic::Ledger,
        }
    }

    /// Asset this event concerns, if any.
    #[must_use]
    pub fn asset(&self) -> Option<&str> {
        match self {
            Self::PriceFinalized { asset, .. } => Some(asset),
            _ => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Reporter registry changes.
    Registry,
    /// Finalized prices.
    Finalization,
    /// Committed blocks.
    Ledger,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Assets to include. Empty means all assets; otherwise events that
    /// carry no asset are excluded.
    pub assets: Vec<AssetId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            assets: Vec::new(),
        }
    }

    /// Create a filter for finalizations of specific assets.
    #[must_use]
    pub fn for_assets(assets: Vec<AssetId>) -> Self {
        Self {
            topics: vec![EventTopic::Finalization],
            assets,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &OracleEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let asset_match = self.assets.is_empty()
            || event
                .asset()
                .is_some_and(|asset| self.assets.iter().any(|a| a == asset));

        topic_match && asset_match
    }
}
