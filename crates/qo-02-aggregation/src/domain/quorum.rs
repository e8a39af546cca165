//! Quorum math.

/// Quorum used while the registry has fewer than three members.
///
/// It exceeds the membership, so no round can finalize with so few reporters.
pub const MIN_QUORUM: usize = 3;

/// Submissions needed to finalize a round with `members` registered reporters.
///
/// `(2n + 2) / 3`, i.e. `ceil(2n / 3)`, for `n >= 3`.
pub fn quorum(members: usize) -> usize {
    if members < MIN_QUORUM {
        MIN_QUORUM
    } else {
        (2 * members + 2) / 3
    }
}
