//! Implements a thread-based backend built on rayon

use bispec_nostd_internal::{
    AccumPackViewMut, Executor, GammaKernel, Partition, TripleIntegrand, check_accum_pack,
};
use rayon::prelude::*;

use crate::Error;

/// Runs each partition as a separate rayon task.
///
/// Each task exclusively owns a single accumulator and its own scratch space.
/// By default, tasks run on rayon's global thread pool.
#[derive(Default)]
pub struct RayonExecutor {
    pool: Option<rayon::ThreadPool>,
}

impl RayonExecutor {
    /// Use rayon's global thread pool
    pub fn new() -> Self {
        RayonExecutor { pool: None }
    }

    /// Use a dedicated pool with `n_threads` threads
    pub fn with_n_threads(n_threads: usize) -> Result<Self, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .map_err(|_| Error::internal_legacy_adhoc("failed to build the rayon thread pool"))?;
        Ok(Self::with_pool(pool))
    }

    pub fn with_pool(pool: rayon::ThreadPool) -> Self {
        RayonExecutor { pool: Some(pool) }
    }
}

impl Executor for RayonExecutor {
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

        // pair each partition with the accumulator it writes to. The
        // accumulators are disjoint views, so they can be sent to different
        // threads
        let work: Vec<_> = out.accums_mut().zip(partitions.iter()).collect();

        let run = move || {
            work.into_par_iter().for_each(|(mut accum, partition)| {
                let mut scratch = kernel.integrand().new_scratch();
                kernel.accumulate(shell, partition, &mut scratch, &mut accum);
            })
        };

        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
        Ok(())
    }
}
