//! Drives the full calculation for a single rank & execution group

use bispec_nostd_internal::{
    AccumPackViewMut, Executor, GammaKernel, GammaTables, Partition, TripleIntegrand,
};
use log::{debug, trace};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::{Error, config::Gamma3dConfig, tables::padded_terms};

/// References to the precomputed tables consumed by the kernel
///
/// See [`crate::root_scale_factors`] and [`crate::term_permutations`] for
/// building `root_scale` and `term_perms`.
#[derive(Clone, Copy)]
pub struct GammaInputs<'a> {
    /// `sqrt(s_l)` for every degree `l` (at least `l_max + 1` entries)
    pub root_scale: &'a [f64],
    /// the basis functions. Axis 0 is the degree (at least `l_max + 1`
    /// rows) and axis 1 is the basis index
    pub basis: ArrayView2<'a, f64>,
    /// the `(p1, p2, p3)` basis indices for each term (at least `terms`
    /// entries)
    pub term_perms: &'a [[usize; 3]],
}

impl<'a> GammaInputs<'a> {
    fn into_tables(self, config: &Gamma3dConfig) -> Result<GammaTables<'a>, Error> {
        let n_degrees = config.domain().l_max() + 1;
        if self.root_scale.len() < n_degrees {
            return Err(Error::table_shape(
                "root_scale",
                n_degrees,
                self.root_scale.len(),
            ));
        } else if self.basis.shape()[0] < n_degrees {
            return Err(Error::table_shape(
                "basis",
                n_degrees,
                self.basis.shape()[0],
            ));
        } else if self.term_perms.len() < config.terms() {
            return Err(Error::table_shape(
                "term_perms",
                config.terms(),
                self.term_perms.len(),
            ));
        }
        GammaTables::new(
            config.domain(),
            ArrayView1::from(self.root_scale),
            self.basis,
            self.term_perms,
        )
        .map_err(Error::internal_legacy_adhoc)
    }
}

/// Computes the partition assigned to each thread of the configured rank and
/// execution group.
///
/// This is computed sequentially, and it should happen before any worker
/// starts.
pub fn thread_partitions(config: &Gamma3dConfig) -> Vec<Partition> {
    let domain = config.domain();
    let spec = config.decompose_spec();
    let group_part = spec.group_partition(domain, config.group());
    debug!(
        "rank {} of {} ({:?} group) holds {} triples in [{:?}, {:?})",
        spec.rank,
        spec.n_ranks,
        config.group(),
        group_part.n_triples,
        group_part.start,
        group_part.stop
    );

    let partitions: Vec<Partition> =
        bispec_nostd_internal::thread_partitions(domain, &group_part, spec.n_threads).collect();
    for (thread_index, part) in partitions.iter().enumerate() {
        trace!(
            "thread {thread_index}: [{:?}, {:?}) holds {} triples",
            part.start, part.stop, part.n_triples
        );
    }
    partitions
}

/// Computes the per-thread accumulators for the configured rank & group.
///
/// The result has shape `[padded_terms(terms), n_threads]`: column `t`
/// holds the accumulator of thread `t`. Combining the columns (and combining
/// the results across ranks) is left to the caller; see
/// [`merge_thread_accumulators`].
pub fn compute_gamma_3d<'a, I, E>(
    config: &Gamma3dConfig,
    inputs: GammaInputs<'a>,
    integrand: &'a I,
    shell: usize,
    executor: &mut E,
) -> Result<Array2<f64>, Error>
where
    I: TripleIntegrand + Sync,
    E: Executor,
{
    let tables = inputs.into_tables(config)?;
    let kernel = GammaKernel::new(
        *config.domain(),
        tables,
        integrand,
        config.terms(),
        config.deltaphi(),
    )
    .map_err(Error::internal_legacy_adhoc)?;

    debug!(
        "gamma domain holds {} triples (l_max = {}, l1_cutoff = {})",
        config.domain().count(),
        config.domain().l_max(),
        config.domain().l1_cutoff()
    );
    let partitions = thread_partitions(config);

    let mut out = Array2::<f64>::zeros((padded_terms(config.terms()), partitions.len()));
    executor
        .drive_gamma(
            &mut AccumPackViewMut::from_array_view(out.view_mut()),
            &kernel,
            shell,
            &partitions,
        )
        .map_err(Error::internal_legacy_adhoc)?;
    Ok(out)
}

/// Sums the per-thread accumulators (the columns of `accums`)
pub fn merge_thread_accumulators(accums: ArrayView2<f64>) -> Array1<f64> {
    accums.sum_axis(Axis(1))
}
