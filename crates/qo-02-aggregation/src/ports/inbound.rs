//! Inbound (Driving) read API of the oracle state machine.
//!
//! Every read is a point-in-time snapshot. Mutations go exclusively through
//! [`OracleContract::execute`](crate::OracleContract::execute).

use crate::domain::{PublishedPrice, Round, Submission};
use shared_types::{Address, Price};

/// Read-only queries against oracle state.
pub trait OracleQueries {
    /// Whether `reporter` is a registered member.
    fn is_reporter(&self, reporter: &Address) -> bool;

    /// Current registry size.
    fn reporter_count(&self) -> usize;

    /// Member at `index` of the registry's order list.
    fn reporter_at(&self, index: usize) -> Option<Address>;

    /// Submissions currently needed to finalize a round.
    fn quorum(&self) -> usize;

    /// Current round of `asset` (all zeroes if never referenced).
    fn round(&self, asset: &str) -> Round;

    /// Stored submission, `{0, false}` if none.
    fn submission(&self, asset: &str, round_id: u64, reporter: &Address) -> Submission;

    /// Last published price; 0 before the first finalization.
    fn price(&self, asset: &str) -> Price;

    /// Last published price with its round, `None` before the first finalization.
    fn published(&self, asset: &str) -> Option<PublishedPrice>;
}
