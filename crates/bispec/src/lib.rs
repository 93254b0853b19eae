/*!
Provides the work decomposition and per-thread reduction at the heart of the
3-index bispectrum integral (the "gamma" calculation).

# High-Level: the Gamma Calculation

The calculation sums contributions from every multipole triple `(i, j, k)`
that satisfies the triangle inequality and a parity rule. The domain of
triples isn't rectangular, which makes it a little tricky to divide the
work evenly. This crate:

1. defines a canonical order over the triples,
2. splits that order into contiguous partitions, first among ranks, then
   (optionally) between a host group and a device group within a rank, and
   finally among the threads of a group,
3. runs the reduction kernel over each thread's partition, with each thread
   accumulating into its own vector.

The results of separate threads (and separate ranks) are combined by the
caller.

# User Guide

```ignore
let config = Gamma3dConfigBuilder::new()
    .l_max(l_max)
    .n_ranks(n_ranks)
    .rank(rank)
    .n_threads(4)
    .terms(terms)
    .deltaphi(deltaphi)
    .build()?;
let root_scale = root_scale_factors(&scale_factors(&cl, &noise, &beam)?)?;
let term_perms = term_permutations(pmax, terms)?;
let inputs = GammaInputs { root_scale: &root_scale, basis: basis.view(), term_perms: &term_perms };
let accums = compute_gamma_3d(&config, inputs, &my_integrand, shell, &mut RayonExecutor::new())?;
let rank_total = merge_thread_accumulators(accums.view());
```

# Developer Guide

Most of the machinery lives in [`bispec_nostd_internal`].

*/

#![deny(rustdoc::broken_intra_doc_links)]

// inform build-system of the crates in this package
mod config;
mod error;
mod gamma;
pub mod geometry;
mod parallel_rayon;
mod parallel_serial;
mod tables;

// pull in symbols that visible outside of the package
pub use bispec_nostd_internal::{
    AccumPackViewMut, Advance, DecomposeSpec, ExecGroup, Executor, GammaKernel, GammaTables,
    MAX_L_MAX, Partition, Triple, TripleDomain, TripleIntegrand, TripleIter, advance, rank_partition,
    split_sizes, split_workshare,
};
pub use config::{Gamma3dConfig, Gamma3dConfigBuilder};
pub use error::Error;
pub use gamma::{GammaInputs, compute_gamma_3d, merge_thread_accumulators, thread_partitions};
pub use geometry::GeometricFactors;
pub use parallel_rayon::RayonExecutor;
pub use parallel_serial::SerialExecutor;
pub use tables::{padded_terms, root_scale_factors, scale_factors, term_permutations};
