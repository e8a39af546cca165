//! # Round Ledger
//!
//! Per-asset rounds, the submission table and the published prices.
//!
//! Submission records are keyed by `(asset, round_id, reporter)` and never
//! deleted: once a round advances its records are simply never addressed
//! again. Alongside them the ledger keeps the list of reporters whose
//! submission was accepted in each open round, so a reporter that leaves the
//! registry mid-round is still counted when that round finalizes.

use super::aggregator::aggregate;
use super::entities::{PublishedPrice, Round, Submission, SubmitOutcome};
use super::errors::ContractError;
use super::quorum::quorum;
use shared_types::{Address, AssetId, Price, Timestamp, MAX_ASSET_LEN};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SubmissionKey {
    asset: AssetId,
    round_id: u64,
    reporter: Address,
}

impl SubmissionKey {
    fn new(asset: &str, round_id: u64, reporter: Address) -> Self {
        Self {
            asset: asset.to_string(),
            round_id,
            reporter,
        }
    }
}

/// Round and submission state for every asset.
#[derive(Debug, Clone, Default)]
pub struct RoundLedger {
    rounds: HashMap<AssetId, Round>,
    submissions: HashMap<SubmissionKey, Submission>,
    /// Accepted submitters of each open round, in acceptance order.
    participants: HashMap<(AssetId, u64), Vec<Address>>,
    published: HashMap<AssetId, PublishedPrice>,
}

impl RoundLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `reporter`'s `value` for the current round of `asset`, and
    /// finalizes the round if this submission reaches quorum.
    ///
    /// `members` is the registry snapshot at this instant; the caller has
    /// already checked that `reporter` belongs to it. Nothing is written
    /// unless the whole step succeeds.
    pub fn submit(
        &mut self,
        asset: &str,
        reporter: Address,
        value: Price,
        members: &[Address],
        now: Timestamp,
    ) -> Result<SubmitOutcome, ContractError> {
        if asset.is_empty() || asset.len() > MAX_ASSET_LEN {
            return Err(ContractError::InvalidAsset);
        }

        let round = self.round(asset);
        let key = SubmissionKey::new(asset, round.id, reporter);
        if self.submissions.get(&key).is_some_and(|s| s.submitted) {
            return Err(ContractError::DuplicateSubmission {
                asset: asset.to_string(),
                round_id: round.id,
            });
        }

        let submission_count = round.submission_count + 1;
        let quorum = quorum(members.len());

        if submission_count < quorum as u64 {
            self.record(key, value);
            self.rounds.insert(
                asset.to_string(),
                Round {
                    submission_count,
                    ..round
                },
            );
            return Ok(SubmitOutcome::Recorded {
                round_id: round.id,
                submission_count,
                quorum,
            });
        }

        let values = self.counted_values(asset, round.id, reporter, value, members);
        let aggregate = aggregate(values).ok_or_else(|| ContractError::ArithmeticOverflow {
            asset: asset.to_string(),
        })?;

        // Everything below is infallible.
        self.record(key, value);
        self.participants.remove(&(asset.to_string(), round.id));
        self.rounds.insert(asset.to_string(), round.advance(now));

        let published = aggregate.price.map(|price| PublishedPrice {
            price,
            round_id: round.id,
            finalized_at: now,
        });
        if let Some(published) = published {
            self.published.insert(asset.to_string(), published);
        }

        Ok(SubmitOutcome::Finalized {
            round_id: round.id,
            published,
            counted: aggregate.counted,
        })
    }

    fn record(&mut self, key: SubmissionKey, value: Price) {
        self.participants
            .entry((key.asset.clone(), key.round_id))
            .or_default()
            .push(key.reporter);
        self.submissions.insert(
            key,
            Submission {
                value,
                submitted: true,
            },
        );
    }

    /// Values counted at finalization: the pending submission plus every
    /// recorded one among the membership snapshot and the round's
    /// participants, each identity once.
    fn counted_values(
        &self,
        asset: &str,
        round_id: u64,
        reporter: Address,
        value: Price,
        members: &[Address],
    ) -> Vec<Price> {
        let participants = self
            .participants
            .get(&(asset.to_string(), round_id))
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut seen = HashSet::with_capacity(members.len() + participants.len() + 1);
        seen.insert(reporter);

        let mut values = vec![value];
        for identity in members.iter().chain(participants) {
            if !seen.insert(*identity) {
                continue;
            }
            let submission = self.submission(asset, round_id, identity);
            if submission.submitted {
                values.push(submission.value);
            }
        }
        values
    }

    /// Number of identities finalization would visit if the next submission
    /// for `asset` reached quorum, or 0 if it would not.
    pub fn finalization_work(&self, asset: &str, members: &[Address]) -> usize {
        let round = self.round(asset);
        if round.submission_count + 1 < quorum(members.len()) as u64 {
            return 0;
        }
        let participants = self
            .participants
            .get(&(asset.to_string(), round.id))
            .map_or(0, Vec::len);
        members.len() + participants
    }

    /// Current round of `asset`, defaulted if never referenced.
    pub fn round(&self, asset: &str) -> Round {
        self.rounds.get(asset).copied().unwrap_or_default()
    }

    pub fn submission(&self, asset: &str, round_id: u64, reporter: &Address) -> Submission {
        self.submissions
            .get(&SubmissionKey::new(asset, round_id, *reporter))
            .copied()
            .unwrap_or_default()
    }

    /// Last published price, or 0 if the asset never finalized.
    pub fn price(&self, asset: &str) -> Price {
        self.published
            .get(asset)
            .map(|p| p.price)
            .unwrap_or_default()
    }

    pub fn published(&self, asset: &str) -> Option<PublishedPrice> {
        self.published.get(asset).copied()
    }

    /// Assets that have been referenced by at least one submission.
    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.rounds.keys().map(String::as_str)
    }
}
