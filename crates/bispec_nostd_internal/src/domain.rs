//! Defines the index domain of the bispectrum integral and its canonical order
//!
//! # The Domain
//!
//! The reduction visits every multipole triple `(i, j, k)` that satisfies:
//! - `2 <= i < l1_cutoff`
//! - `i <= j <= l_max`
//! - `j + (i % 2) <= k <= min(i + j, l_max)`, where `k` advances in steps of
//!   2 from its lower bound
//!
//! The parity rule on `k` ensures that `i + j + k` is always even (the
//! geometric factor vanishes otherwise) and the upper bound on `k` is the
//! triangle inequality.
//!
//! # Canonical Order
//!
//! We iterate `i` in the outer loop, `j` in the middle loop, and `k` in the
//! inner loop, each in ascending order. For valid triples, this happens to be
//! exactly the lexicographic order of `(i, j, k)`. We lean on that fact
//! heavily: a "cursor" is just a [`Triple`] and a range `[start, stop)` holds
//! every valid triple `t` where `start <= t < stop` (with the derived
//! [`Ord`] implementation). A cursor doesn't need to be a valid triple.
//!
//! It is **critical** that the partitioning logic and the reduction kernel
//! share the same notion of order. Both of them walk the domain with
//! [`TripleIter`] to make that coupling explicit.

use core::cmp;

/// The lowest value of `i` that ever appears in the domain
pub const FIRST_I: usize = 2;

/// The largest supported `l_max`. This leaves plenty of headroom for sums
/// like `i + j` and `l_max + 1`.
pub const MAX_L_MAX: usize = usize::MAX / 4;

/// An `(i, j, k)` index triple. Depending on context, this is either a
/// member of the domain or a cursor that marks a position within the
/// canonical order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl Triple {
    pub const fn new(i: usize, j: usize, k: usize) -> Self {
        Triple { i, j, k }
    }
}

impl From<(usize, usize, usize)> for Triple {
    fn from((i, j, k): (usize, usize, usize)) -> Self {
        Triple { i, j, k }
    }
}

/// Describes the domain of valid triples.
///
/// This is a tiny `Copy` type and it's fine to pass around by value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TripleDomain {
    l_max: usize,
    // exclusive upper bound on i
    l1_cutoff: usize,
}

impl TripleDomain {
    /// Construct a domain where `i` is allowed to take any value up to
    /// `l_max` (inclusive).
    pub fn with_full_cutoff(l_max: usize) -> Result<Self, &'static str> {
        let l1_cutoff = l_max.checked_add(1).ok_or("l_max is too large")?;
        Self::new(l_max, l1_cutoff)
    }

    /// Construct a domain where `i` is restricted to values less than
    /// `l1_cutoff`.
    pub fn new(l_max: usize, l1_cutoff: usize) -> Result<Self, &'static str> {
        if l_max > MAX_L_MAX {
            Err("l_max is too large")
        } else if l1_cutoff > l_max + 1 {
            Err("l1_cutoff must not exceed l_max + 1")
        } else {
            Ok(TripleDomain { l_max, l1_cutoff })
        }
    }

    pub fn l_max(&self) -> usize {
        self.l_max
    }

    pub fn l1_cutoff(&self) -> usize {
        self.l1_cutoff
    }

    /// The half-open bounds `(start, stop)` on `k` for the `(i, j)` bucket.
    ///
    /// The bucket is empty when `start >= stop`. Remember that `k` advances
    /// in steps of 2.
    #[inline(always)]
    pub fn k_range(&self, i: usize, j: usize) -> (usize, usize) {
        (j + (i % 2), cmp::min(i + j, self.l_max) + 1)
    }

    /// the number of triples in the `(i, j)` bucket
    #[inline(always)]
    fn bucket_len(&self, i: usize, j: usize) -> usize {
        let (k_start, k_stop) = self.k_range(i, j);
        k_stop.saturating_sub(k_start).div_ceil(2)
    }

    /// Returns whether `t` is a member of the domain
    pub fn contains(&self, t: Triple) -> bool {
        if t.i < FIRST_I || t.i >= self.l1_cutoff || t.j < t.i || t.j > self.l_max {
            return false;
        }
        let (k_start, k_stop) = self.k_range(t.i, t.j);
        (k_start..k_stop).contains(&t.k) && ((t.k - k_start) % 2 == 0)
    }

    /// Count the number of triples in the domain.
    ///
    /// This goes through every `(i, j)` bucket. We intentionally avoid a
    /// closed-form expression so that the result stays correct if the bounds
    /// change.
    pub fn count(&self) -> usize {
        let mut count = 0;
        for i in FIRST_I..self.l1_cutoff {
            for j in i..=self.l_max {
                count += self.bucket_len(i, j);
            }
        }
        count
    }

    /// A cursor that sorts after every member of the domain.
    ///
    /// This is the position reported when the domain has been exhausted.
    pub fn end(&self) -> Triple {
        Triple::new(
            cmp::max(self.l1_cutoff, FIRST_I),
            self.l_max + 1,
            self.l_max + 1,
        )
    }

    /// The first triple of the domain (or [`Self::end`] when it's empty)
    pub fn first(&self) -> Triple {
        self.first_at_or_after(Triple::new(FIRST_I, FIRST_I, 0))
            .unwrap_or(self.end())
    }

    /// Returns the smallest member of the domain that is `>= cursor` (if
    /// there is one).
    pub fn first_at_or_after(&self, cursor: Triple) -> Option<Triple> {
        let (mut i, mut j_floor, mut k_floor) = (cursor.i, cursor.j, cursor.k);
        if i < FIRST_I {
            (i, j_floor, k_floor) = (FIRST_I, 0, 0);
        }

        while i < self.l1_cutoff {
            let mut j = cmp::max(j_floor, i);
            // the floor on k only applies within the cursor's own bucket
            let mut k_floor_here = if j == j_floor { k_floor } else { 0 };
            while j <= self.l_max {
                let (k_start, k_stop) = self.k_range(i, j);
                let k = if k_floor_here > k_start {
                    // round up to the next value with the right parity
                    k_start + (k_floor_here - k_start).div_ceil(2) * 2
                } else {
                    k_start
                };
                if k < k_stop {
                    return Some(Triple::new(i, j, k));
                }
                j += 1;
                k_floor_here = 0;
            }
            i += 1;
            (j_floor, k_floor) = (0, 0);
        }
        None
    }

    /// Iterate over every triple in the domain
    pub fn iter(&self) -> TripleIter {
        self.iter_range(self.first(), self.end())
    }

    /// Iterate over the triples in the half-open range `[start, stop)`
    pub fn iter_range(&self, start: Triple, stop: Triple) -> TripleIter {
        TripleIter {
            domain: *self,
            cursor: self.first_at_or_after(start).filter(|t| *t < stop),
            stop,
        }
    }
}

/// Walks a range of the domain in canonical order.
///
/// Beyond the standard [`Iterator`] interface, this provides:
/// - [`TripleIter::position`], the cursor where the walk would resume
/// - [`TripleIter::skip_triples`], which efficiently skips over whole
///   k-rows at a time (this is what keeps partitioning cheap)
#[derive(Clone, Debug)]
pub struct TripleIter {
    domain: TripleDomain,
    // invariant: when this is Some, it holds a valid triple that is < stop
    cursor: Option<Triple>,
    stop: Triple,
}

impl TripleIter {
    /// The next triple that would be produced, or the `stop` cursor if the
    /// range is exhausted.
    pub fn position(&self) -> Triple {
        self.cursor.unwrap_or(self.stop)
    }

    /// exclusive upper bound on k in the `(i, j)` bucket, accounting for stop
    #[inline(always)]
    fn bucket_stop(&self, i: usize, j: usize) -> usize {
        let (_, k_stop) = self.domain.k_range(i, j);
        if (i, j) == (self.stop.i, self.stop.j) {
            cmp::min(k_stop, self.stop.k)
        } else {
            k_stop
        }
    }

    #[inline(always)]
    fn seek(&self, cursor: Triple) -> Option<Triple> {
        self.domain
            .first_at_or_after(cursor)
            .filter(|t| *t < self.stop)
    }

    /// Skip over (at most) `n` triples. Returns the number that were
    /// actually skipped, which is only smaller than `n` if the range ran out.
    pub fn skip_triples(&mut self, n: usize) -> usize {
        let mut remaining = n;
        while remaining > 0 {
            let Some(t) = self.cursor else {
                break;
            };
            let n_in_row = (self.bucket_stop(t.i, t.j) - t.k).div_ceil(2);
            if remaining < n_in_row {
                self.cursor = Some(Triple::new(t.i, t.j, t.k + 2 * remaining));
                remaining = 0;
            } else {
                remaining -= n_in_row;
                self.cursor = self.seek(Triple::new(t.i, t.j + 1, 0));
            }
        }
        n - remaining
    }
}

impl Iterator for TripleIter {
    type Item = Triple;

    #[inline]
    fn next(&mut self) -> Option<Triple> {
        let t = self.cursor?;
        self.cursor = if t.k + 2 < self.bucket_stop(t.i, t.j) {
            Some(Triple::new(t.i, t.j, t.k + 2))
        } else {
            self.seek(Triple::new(t.i, t.j + 1, 0))
        };
        Some(t)
    }
}
