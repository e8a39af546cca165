//! # Oracle Contract
//!
//! Registry and round ledger behind a single mutation entry point. The
//! ledger host executes one call at a time, so each `execute` is atomic with
//! respect to every other call.

use super::entities::{PublishedPrice, Round, Submission, SubmitOutcome};
use super::errors::ContractError;
use super::ledger::RoundLedger;
use super::quorum::quorum;
use crate::ports::OracleQueries;
use qo_01_registry::ReporterRegistry;
use shared_bus::OracleEvent;
use shared_types::{Address, OracleCall, Price, Timestamp};

/// The oracle state machine.
#[derive(Debug, Clone, Default)]
pub struct OracleContract {
    registry: ReporterRegistry,
    rounds: RoundLedger,
}

impl OracleContract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes `call` on behalf of `caller` at block time `now`.
    ///
    /// Returns the notifications the call produced. On error no state has
    /// changed.
    pub fn execute(
        &mut self,
        caller: Address,
        call: &OracleCall,
        now: Timestamp,
    ) -> Result<Vec<OracleEvent>, ContractError> {
        match call {
            OracleCall::Register => {
                let registry_size = self.registry.register(caller)?;
                Ok(vec![OracleEvent::ReporterRegistered {
                    reporter: caller,
                    registry_size,
                }])
            }
            OracleCall::Unregister => {
                let registry_size = self.registry.unregister(&caller)?;
                Ok(vec![OracleEvent::ReporterRemoved {
                    reporter: caller,
                    registry_size,
                }])
            }
            OracleCall::SubmitPrice { asset, price } => {
                self.submit_price(caller, asset, *price, now)
            }
        }
    }

    fn submit_price(
        &mut self,
        caller: Address,
        asset: &str,
        price: Price,
        now: Timestamp,
    ) -> Result<Vec<OracleEvent>, ContractError> {
        if !self.registry.is_member(&caller) {
            return Err(ContractError::NotRegistered);
        }

        let outcome = self
            .rounds
            .submit(asset, caller, price, self.registry.members(), now)?;

        let events = match outcome {
            SubmitOutcome::Finalized {
                published: Some(published),
                ..
            } => vec![OracleEvent::PriceFinalized {
                asset: asset.to_string(),
                price: published.price,
                round_id: published.round_id,
                finalized_at: published.finalized_at,
            }],
            _ => Vec::new(),
        };
        Ok(events)
    }

    /// Identities finalization would visit if the next submission for
    /// `asset` reached quorum, 0 otherwise. Lets the host price the call
    /// before executing it.
    pub fn finalization_work(&self, asset: &str) -> usize {
        self.rounds
            .finalization_work(asset, self.registry.members())
    }

    pub fn registry(&self) -> &ReporterRegistry {
        &self.registry
    }

    /// Assets with at least one accepted submission.
    pub fn assets(&self) -> Vec<String> {
        let mut assets: Vec<String> = self.rounds.assets().map(str::to_string).collect();
        assets.sort();
        assets
    }
}

impl OracleQueries for OracleContract {
    fn is_reporter(&self, reporter: &Address) -> bool {
        self.registry.is_member(reporter)
    }

    fn reporter_count(&self) -> usize {
        self.registry.size()
    }

    fn reporter_at(&self, index: usize) -> Option<Address> {
        self.registry.member_at(index)
    }

    fn quorum(&self) -> usize {
        quorum(self.registry.size())
    }

    fn round(&self, asset: &str) -> Round {
        self.rounds.round(asset)
    }

    fn submission(&self, asset: &str, round_id: u64, reporter: &Address) -> Submission {
        self.rounds.submission(asset, round_id, reporter)
    }

    fn price(&self, asset: &str) -> Price {
        self.rounds.price(asset)
    }

    fn published(&self, asset: &str) -> Option<PublishedPrice> {
        self.rounds.published(asset)
    }
}
