//! Hierarchical decomposition of the domain into contiguous partitions
//!
//! The full domain is split in up to 3 levels:
//! 1. among `n_ranks` distributed participants,
//! 2. within a rank, between a "host" group and a "device" group (controlled
//!    by the `workshare` fraction),
//! 3. within one of those groups, among `n_threads` workers.
//!
//! Every level reuses [`advance`] against the range assigned by the previous
//! level. At every level the child partitions are contiguous, they don't
//! overlap, their union is the parent, and sibling sizes differ by at most 1.
//!
//! Everything here is intended to be computed once, sequentially, before any
//! worker starts.

use crate::domain::{Triple, TripleDomain};
use crate::splitter::advance;

/// A contiguous, half-open range `[start, stop)` of the canonical order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    pub start: Triple,
    pub stop: Triple,
    /// the number of triples held by the partition
    pub n_triples: usize,
}

impl Partition {
    /// A partition holding every triple in `domain`
    pub fn full(domain: &TripleDomain) -> Self {
        Partition {
            start: domain.first(),
            stop: domain.end(),
            n_triples: domain.count(),
        }
    }

    /// An empty partition located at `cursor`
    pub fn empty_at(cursor: Triple) -> Self {
        Partition {
            start: cursor,
            stop: cursor,
            n_triples: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.n_triples == 0
    }
}

/// Yields the sizes when `count` units are divided among `n_children`.
///
/// Each child gets `count / n_children` units and the first
/// `count % n_children` children get 1 extra unit. When `n_children` is 0,
/// nothing is yielded.
#[derive(Clone, Debug)]
pub struct SplitSizes {
    blk_size: usize,
    left_over: usize,
    n_children: usize,
    index: usize,
}

pub fn split_sizes(count: usize, n_children: usize) -> SplitSizes {
    let (blk_size, left_over) = match n_children {
        0 => (0, 0),
        n => (count / n, count % n),
    };
    SplitSizes {
        blk_size,
        left_over,
        n_children,
        index: 0,
    }
}

impl Iterator for SplitSizes {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.index == self.n_children {
            return None;
        }
        let size = self.blk_size + usize::from(self.index < self.left_over);
        self.index += 1;
        Some(size)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.n_children - self.index;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SplitSizes {}

/// Yields the contiguous child partitions of a parent partition.
///
/// Each child's start is the previous child's stop. The final cursor of every
/// walk is the parent's stop (not the end of the domain).
#[derive(Clone, Debug)]
pub struct ChildPartitions {
    domain: TripleDomain,
    cursor: Triple,
    stop: Triple,
    sizes: SplitSizes,
}

impl Iterator for ChildPartitions {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        let budget = self.sizes.next()?;
        let step = advance(&self.domain, self.cursor, self.stop, budget);
        let out = Partition {
            start: self.cursor,
            stop: step.next,
            n_triples: step.produced,
        };
        self.cursor = step.next;
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.sizes.size_hint()
    }
}

impl ExactSizeIterator for ChildPartitions {}

/// Split `parent` evenly among `n_children` contiguous partitions
pub fn child_partitions(
    domain: &TripleDomain,
    parent: &Partition,
    n_children: usize,
) -> ChildPartitions {
    ChildPartitions {
        domain: *domain,
        cursor: parent.start,
        stop: parent.stop,
        sizes: split_sizes(parent.n_triples, n_children),
    }
}

/// Compute the partition of the full domain assigned to `rank`
///
/// We walk through the ranks preceding `rank` (1 call to [`advance`] per
/// rank). When `n_ranks` is 0 or `rank >= n_ranks`, the result is an empty
/// partition.
pub fn rank_partition(domain: &TripleDomain, n_ranks: usize, rank: usize) -> Partition {
    let full = Partition::full(domain);
    child_partitions(domain, &full, n_ranks)
        .nth(rank)
        .unwrap_or(Partition::empty_at(full.stop))
}

/// Splits a rank's partition into a "host" portion followed by a "device"
/// portion.
///
/// The host portion holds `floor((1 - workshare) * work)` triples, where
/// `work` is the size of `rank_part`; the device portion holds the rest. The
/// caller is responsible for ensuring that `workshare` lies in `[0, 1]`.
pub fn split_workshare(
    domain: &TripleDomain,
    rank_part: &Partition,
    workshare: f64,
) -> (Partition, Partition) {
    let work = rank_part.n_triples;
    // the cast truncates, which is a floor for non-negative values
    let host_work = (((1.0 - workshare) * (work as f64)) as usize).min(work);

    let step = advance(domain, rank_part.start, rank_part.stop, host_work);
    let host = Partition {
        start: rank_part.start,
        stop: step.next,
        n_triples: step.produced,
    };

    let step = advance(domain, host.stop, rank_part.stop, work - host_work);
    let device = Partition {
        start: host.stop,
        stop: step.next,
        n_triples: step.produced,
    };
    (host, device)
}

/// Split `parent` among `n_threads` workers (one partition per thread)
pub fn thread_partitions(
    domain: &TripleDomain,
    parent: &Partition,
    n_threads: usize,
) -> ChildPartitions {
    child_partitions(domain, parent, n_threads)
}

/// Identifies one of the 2 execution groups within a rank
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecGroup {
    /// the group that receives the first `1 - workshare` fraction of a rank's
    /// work
    Host,
    /// the group (e.g. an accelerator) that receives the remainder
    Device,
}

/// Bundles the parameters describing the full decomposition
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecomposeSpec {
    pub n_ranks: usize,
    pub rank: usize,
    pub n_threads: usize,
    pub workshare: f64,
}

impl DecomposeSpec {
    pub fn new(
        n_ranks: usize,
        rank: usize,
        n_threads: usize,
        workshare: f64,
    ) -> Result<Self, &'static str> {
        if n_ranks == 0 {
            Err("n_ranks must be positive")
        } else if rank >= n_ranks {
            Err("rank must be less than n_ranks")
        } else if n_threads == 0 {
            Err("n_threads must be positive")
        } else if !(0.0..=1.0).contains(&workshare) {
            Err("workshare must lie between 0 and 1")
        } else {
            Ok(DecomposeSpec {
                n_ranks,
                rank,
                n_threads,
                workshare,
            })
        }
    }

    /// The partition held by `group` within this rank
    pub fn group_partition(&self, domain: &TripleDomain, group: ExecGroup) -> Partition {
        let rank_part = rank_partition(domain, self.n_ranks, self.rank);
        let (host, device) = split_workshare(domain, &rank_part, self.workshare);
        match group {
            ExecGroup::Host => host,
            ExecGroup::Device => device,
        }
    }

    /// The partitions for each of the threads of `group` within this rank
    pub fn decompose(&self, domain: &TripleDomain, group: ExecGroup) -> ChildPartitions {
        let parent = self.group_partition(domain, group);
        thread_partitions(domain, &parent, self.n_threads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sizes<const N: usize>(count: usize, expected: [usize; N]) {
        let sizes = split_sizes(count, N);
        assert_eq!(sizes.len(), N);
        for (actual, ref_val) in sizes.zip(expected) {
            assert_eq!(actual, ref_val);
        }
    }

    #[test]
    fn split_sizes_simple() {
        assert_sizes(6, [2, 2, 2]);
        assert_sizes(6, [2, 2, 1, 1]);
        assert_sizes(3, [1, 1, 1, 0, 0]);
        assert_sizes(0, [0, 0]);
        assert_eq!(split_sizes(10, 0).next(), None);
    }

    #[test]
    fn split_sizes_balanced() {
        for count in 0..40 {
            for n in 1..9 {
                let max = split_sizes(count, n).max().unwrap();
                let min = split_sizes(count, n).min().unwrap();
                assert!(max - min <= 1);
                assert_eq!(split_sizes(count, n).sum::<usize>(), count);
            }
        }
    }

    // checks that the children exactly tile the parent
    fn assert_tiles(domain: &TripleDomain, parent: &Partition, children: ChildPartitions) {
        let mut cursor = parent.start;
        let mut total = 0;
        for child in children {
            assert_eq!(child.start, cursor);
            let n_walked = domain.iter_range(child.start, child.stop).count();
            assert_eq!(n_walked, child.n_triples);
            total += child.n_triples;
            cursor = child.stop;
        }
        assert_eq!(total, parent.n_triples);
        assert_eq!(
            domain.first_at_or_after(cursor).filter(|t| *t < parent.stop),
            None
        );
    }

    #[test]
    fn rank_partitions_tile_domain() {
        let domain = TripleDomain::new(13, 9).unwrap();
        let full = Partition::full(&domain);
        for n_ranks in 1..12 {
            assert_tiles(&domain, &full, child_partitions(&domain, &full, n_ranks));
            let mut cursor = full.start;
            for rank in 0..n_ranks {
                let part = rank_partition(&domain, n_ranks, rank);
                assert_eq!(part.start, cursor);
                cursor = part.stop;
            }
            assert_eq!(cursor, full.stop);
        }
    }

    #[test]
    fn small_domain_ranks() {
        let domain = TripleDomain::new(4, 5).unwrap();
        let parts = [
            rank_partition(&domain, 4, 0),
            rank_partition(&domain, 4, 1),
            rank_partition(&domain, 4, 2),
            rank_partition(&domain, 4, 3),
        ];
        assert_eq!(parts[0].start, Triple::new(2, 2, 2));
        assert_eq!(parts[0].stop, Triple::new(2, 3, 3));
        assert_eq!(parts[1].stop, Triple::new(3, 3, 4));
        assert_eq!(parts[2].stop, Triple::new(4, 4, 4));
        assert_eq!(parts[3].stop, domain.end());
        assert_eq!(parts.map(|p| p.n_triples), [2, 2, 1, 1]);
    }

    #[test]
    fn degenerate_inputs() {
        let domain = TripleDomain::with_full_cutoff(6).unwrap();
        assert!(rank_partition(&domain, 0, 0).is_empty());
        assert!(rank_partition(&domain, 3, 3).is_empty());
        let full = Partition::full(&domain);
        assert_eq!(thread_partitions(&domain, &full, 0).count(), 0);

        let empty = TripleDomain::new(1, 0).unwrap();
        let full = Partition::full(&empty);
        for part in thread_partitions(&empty, &full, 4) {
            assert!(part.is_empty());
            assert_eq!(part.stop, empty.end());
        }
    }

    #[test]
    fn workshare_extremes() {
        let domain = TripleDomain::with_full_cutoff(10).unwrap();
        let rank_part = rank_partition(&domain, 3, 1);

        let (host, device) = split_workshare(&domain, &rank_part, 0.0);
        assert_eq!(host, rank_part);
        assert!(device.is_empty());
        assert_eq!(device.start, rank_part.stop);

        let (host, device) = split_workshare(&domain, &rank_part, 1.0);
        assert!(host.is_empty());
        assert_eq!(host.start, rank_part.start);
        assert_eq!(device, rank_part);
    }

    #[test]
    fn workshare_split() {
        let domain = TripleDomain::with_full_cutoff(10).unwrap();
        let rank_part = rank_partition(&domain, 2, 0);
        let work = rank_part.n_triples;
        let (host, device) = split_workshare(&domain, &rank_part, 0.3);
        assert_eq!(host.n_triples, ((0.7 * work as f64) as usize));
        assert_eq!(host.n_triples + device.n_triples, work);
        assert_eq!(host.stop, device.start);
        assert_eq!(device.stop, rank_part.stop);
    }

    #[test]
    fn full_decomposition_tiles_domain() {
        let domain = TripleDomain::new(16, 12).unwrap();
        let full = Partition::full(&domain);
        let mut cursor = full.start;
        let mut total = 0;
        let n_ranks = 3;
        for rank in 0..n_ranks {
            let spec = DecomposeSpec::new(n_ranks, rank, 5, 0.25).unwrap();
            for group in [ExecGroup::Host, ExecGroup::Device] {
                let parent = spec.group_partition(&domain, group);
                assert_tiles(&domain, &parent, spec.decompose(&domain, group));
                for part in spec.decompose(&domain, group) {
                    assert_eq!(part.start, cursor);
                    cursor = part.stop;
                    total += part.n_triples;
                }
            }
        }
        assert_eq!(cursor, full.stop);
        assert_eq!(total, full.n_triples);
    }

    #[test]
    fn decompose_spec_errors() {
        assert!(DecomposeSpec::new(0, 0, 1, 0.0).is_err());
        assert!(DecomposeSpec::new(2, 2, 1, 0.0).is_err());
        assert!(DecomposeSpec::new(2, 1, 0, 0.0).is_err());
        assert!(DecomposeSpec::new(2, 1, 1, -0.1).is_err());
        assert!(DecomposeSpec::new(2, 1, 1, 1.5).is_err());
        assert!(DecomposeSpec::new(2, 1, 1, f64::NAN).is_err());
        assert!(DecomposeSpec::new(2, 1, 1, 1.0).is_ok());
    }
}
