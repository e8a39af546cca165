//! State records of the oracle.

use serde::{Deserialize, Serialize};
use shared_types::{Price, Timestamp};

/// Per-asset accounting epoch. Lazily created as all zeroes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: u64,
    pub submission_count: u64,
    /// Timestamp of the last finalization; 0 before the first one.
    pub last_finalized_at: Timestamp,
}

impl Round {
    /// The round that follows this one after a finalization at `now`.
    pub fn advance(self, now: Timestamp) -> Self {
        Self {
            id: self.id + 1,
            submission_count: 0,
            last_finalized_at: now,
        }
    }
}

/// One reporter's observation for one (asset, round).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub value: Price,
    pub submitted: bool,
}

/// The last finalized aggregate of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPrice {
    pub price: Price,
    /// Round that produced this price.
    pub round_id: u64,
    pub finalized_at: Timestamp,
}

/// What a successful submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Recorded; quorum not yet reached.
    Recorded {
        round_id: u64,
        submission_count: u64,
        quorum: usize,
    },
    /// Recorded and the round finalized.
    Finalized {
        round_id: u64,
        /// `None` only if no counted submission existed.
        published: Option<PublishedPrice>,
        counted: usize,
    },
}
