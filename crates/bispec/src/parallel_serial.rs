//! Implements the "serial" backend for running the kernel

use bispec_nostd_internal::{
    AccumPackViewMut, Executor, GammaKernel, Partition, TripleIntegrand, check_accum_pack,
};

/// Runs every partition, one after another, on the calling thread.
///
/// The results are bitwise identical to the ones from [`crate::RayonExecutor`]
/// since each partition is handled in exactly the same way (the only thing
/// that differs is which thread does the work).
pub struct SerialExecutor;

impl Executor for SerialExecutor {
    fn drive_gamma<I>(
        &mut self,
        out: &mut AccumPackViewMut,
        kernel: &GammaKernel<I>,
        shell: usize,
        partitions: &[Partition],
    ) -> Result<(), &'static str>
    where
        I: TripleIntegrand + Sync,
    {
        check_accum_pack(out, kernel, partitions)?;

        for (thread_index, partition) in partitions.iter().enumerate() {
            // in a multi-threaded backend, each worker would create its own
            // scratch space
            let mut scratch = kernel.integrand().new_scratch();
            kernel.accumulate(
                shell,
                partition,
                &mut scratch,
                &mut out.get_accum_mut(thread_index),
            );
        }
        Ok(())
    }
}
