//! Pure aggregation of a round's counted submissions.

use shared_types::Price;

/// Result of aggregating a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    /// Floor of `sum / count`; `None` when nothing was counted.
    pub price: Option<Price>,
    pub counted: usize,
}

/// Averages `values` with integer floor division.
///
/// Returns `None` if the running sum overflows 256 bits.
pub fn aggregate<I>(values: I) -> Option<Aggregate>
where
    I: IntoIterator<Item = Price>,
{
    let mut sum = Price::zero();
    let mut counted = 0usize;
    for value in values {
        sum = sum.checked_add(value)?;
        counted += 1;
    }

    let price = (counted > 0).then(|| sum / Price::from(counted));
    Some(Aggregate { price, counted })
}
