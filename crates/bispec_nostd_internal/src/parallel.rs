//! Our parallelism abstraction is intentionally simple.
//!
//! Work is decomposed ahead of time into a list of [`Partition`]s (see
//! [`crate::partition`]). The partition at index `t` of that list is
//! assigned to worker `t`, and worker `t` exclusively owns column `t` of the
//! output [`AccumPackViewMut`]. Workers never coordinate with each other while
//! the kernel runs; combining their accumulators is left to the caller.
//!
//! In other words, the worker index is explicitly passed by whatever launches
//! the work. Nothing needs to ask a thread-pool which thread it is.

use crate::kernel::{GammaKernel, TripleIntegrand};
use crate::partition::Partition;
use crate::state::AccumPackViewMut;

/// Check that `out` has room for one accumulator per partition
pub fn check_accum_pack<I: TripleIntegrand>(
    out: &AccumPackViewMut,
    kernel: &GammaKernel<I>,
    partitions: &[Partition],
) -> Result<(), &'static str> {
    if out.n_accums() != partitions.len() {
        Err("out must hold exactly one accumulator per partition")
    } else if out.accum_len() < kernel.terms() {
        Err("the accumulators in out are too short to hold each term")
    } else {
        Ok(())
    }
}

/// a trait for expressing how to launch the kernel
///
/// The idea is that we implement something like this for each parallelism
/// "backend," so we have a uniform interface for easily switching between
/// backends.
///
/// **NOTE:** Types that implement this trait are intended to live entirely on
/// the CPU. A device backend would provide a type that implements this trait
/// in order to execute the CPU calls that are needed for managing memory and
/// launching device calculations.
pub trait Executor {
    /// Runs the kernel over each partition, recording the result for
    /// `partitions[t]` in accumulator `t` of `out`.
    fn drive_gamma<I>(
        &mut self,
        out: &mut AccumPackViewMut,
        kernel: &GammaKernel<I>,
        shell: usize,
        partitions: &[Partition],
    ) -> Result<(), &'static str>
    where
        I: TripleIntegrand + Sync;
}
