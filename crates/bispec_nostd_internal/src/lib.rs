#![no_std]
mod domain;
mod kernel;
mod parallel;
mod partition;
mod splitter;
mod state;

pub use domain::{FIRST_I, MAX_L_MAX, Triple, TripleDomain, TripleIter};
pub use kernel::{GammaKernel, GammaTables, TripleIntegrand, perm_count};
pub use parallel::{Executor, check_accum_pack};
pub use partition::{
    ChildPartitions, DecomposeSpec, ExecGroup, Partition, SplitSizes, child_partitions,
    rank_partition, split_sizes, split_workshare, thread_partitions,
};
pub use splitter::{Advance, advance};
pub use state::AccumPackViewMut;
