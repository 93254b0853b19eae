//! The range splitter is the single piece of logic that all partitioning is
//! built upon. Getting the boundary handling wrong here would silently drop or
//! double-count triples.

use crate::domain::{Triple, TripleDomain};

/// The result of [`advance`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Advance {
    /// the first unconsumed position (where the next walk should resume)
    pub next: Triple,
    /// the number of triples that were walked
    pub produced: usize,
}

/// Walk the range `[start, stop)` of `domain` in canonical order, and stop
/// after `budget` triples or upon reaching `stop` (whichever comes first).
///
/// - When the range holds fewer than `budget` triples, `next` is exactly
///   `stop` and `produced` is the number of triples that were in the range.
///   We never report a position beyond `stop`.
/// - When `budget` is 0, `next` is `start` (unchanged).
///
/// Otherwise, `next` is always a member of the domain. This means that
/// `stop` may lie within a parent range (it need not be the end of the
/// domain), which is what lets us split a sub-range of a sub-range.
pub fn advance(domain: &TripleDomain, start: Triple, stop: Triple, budget: usize) -> Advance {
    if budget == 0 {
        return Advance {
            next: start,
            produced: 0,
        };
    }
    let mut iter = domain.iter_range(start, stop);
    let produced = iter.skip_triples(budget);
    Advance {
        next: iter.position(),
        produced,
    }
}
