//! Defines the per-thread reduction kernel for the 3D gamma integral
//!
//! # Overview
//!
//! For every triple `(i, j, k)` in a thread's partition, the kernel computes:
//! - `x`, the value of an integral over the triple (this is opaque to us and
//!   is provided by a [`TripleIntegrand`]),
//! - `z`, a geometric weight: the permutation count times the geometric
//!   factor, divided by `sqrt(s_i * s_j * s_k)` where `s_l` is the scale
//!   factor for degree `l`,
//! - for each term `m`, `y`, the mean of the 6 products of basis-function
//!   values obtained by permuting the `(p1, p2, p3)` indices assigned to `m`.
//!
//! It adds `x * y * z` to entry `m` of the thread's accumulator. Once the
//! whole partition is consumed, every entry is scaled by `6 * deltaphi^2`.
//!
//! # Why root scale factors?
//! `sqrt` isn't available in `core`. Thus, the caller provides `r_l =
//! sqrt(s_l)` and we compute `r_i * r_j * r_k`. This also means the square
//! roots are only computed once per degree.

use crate::domain::{Triple, TripleDomain};
use crate::partition::Partition;
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1};

/// The number of distinct orderings of a triple's entries (6 when all entries
/// are distinct, 3 when 2 match, and 1 when they all match)
pub fn perm_count(t: Triple) -> u32 {
    if t.i == t.j && t.j == t.k {
        1
    } else if t.i == t.j || t.j == t.k || t.i == t.k {
        3
    } else {
        6
    }
}

/// Encapsulates the external pure functions evaluated for each triple.
///
/// Implementations are shared (read-only) between all threads. Any mutable
/// state that a thread needs while evaluating the integral (e.g. interpolation
/// buffers) lives in `Scratch`, which is created separately for each thread
/// with [`TripleIntegrand::new_scratch`].
pub trait TripleIntegrand {
    type Scratch;

    fn new_scratch(&self) -> Self::Scratch;

    /// computes the integral associated with `triple`
    ///
    /// `shell` is forwarded, unmodified, from the caller of the kernel.
    fn integral(&self, triple: Triple, shell: usize, scratch: &mut Self::Scratch) -> f64;

    #[inline(always)]
    fn perm_count(&self, triple: Triple) -> u32 {
        perm_count(triple)
    }

    fn geometric_factor(&self, triple: Triple) -> f64;
}

/// The precomputed, read-only tables consumed by the kernel
#[derive(Clone, Copy)]
pub struct GammaTables<'a> {
    /// the square root of the scale factor for each degree
    root_scale: ArrayView1<'a, f64>,
    /// the basis functions. Axis 0 is the degree and axis 1 is the basis index
    basis: ArrayView2<'a, f64>,
    /// the `(p1, p2, p3)` basis indices assigned to each term
    term_perms: &'a [[usize; 3]],
}

impl<'a> GammaTables<'a> {
    pub fn new(
        domain: &TripleDomain,
        root_scale: ArrayView1<'a, f64>,
        basis: ArrayView2<'a, f64>,
        term_perms: &'a [[usize; 3]],
    ) -> Result<Self, &'static str> {
        let n_degrees = domain.l_max() + 1;
        let n_basis = basis.shape()[1];
        if root_scale.len() < n_degrees {
            Err("root_scale must have an entry for each degree")
        } else if basis.shape()[0] < n_degrees {
            Err("basis must have a row for each degree")
        } else if term_perms.iter().flatten().any(|p| *p >= n_basis) {
            Err("term_perms holds a basis index that is out of bounds")
        } else {
            Ok(GammaTables {
                root_scale,
                basis,
                term_perms,
            })
        }
    }

    pub fn n_terms(&self) -> usize {
        self.term_perms.len()
    }
}

pub struct GammaKernel<'a, I: TripleIntegrand> {
    domain: TripleDomain,
    tables: GammaTables<'a>,
    integrand: &'a I,
    terms: usize,
    final_scale: f64,
}

impl<'a, I: TripleIntegrand> GammaKernel<'a, I> {
    pub fn new(
        domain: TripleDomain,
        tables: GammaTables<'a>,
        integrand: &'a I,
        terms: usize,
        deltaphi: f64,
    ) -> Result<Self, &'static str> {
        if terms > tables.n_terms() {
            Err("terms exceeds the number of term permutations")
        } else {
            Ok(GammaKernel {
                domain,
                tables,
                integrand,
                terms,
                final_scale: 6.0 * deltaphi * deltaphi,
            })
        }
    }

    pub fn integrand(&self) -> &I {
        self.integrand
    }

    pub fn terms(&self) -> usize {
        self.terms
    }

    /// Overwrite `accum` with the scaled contributions from every triple in
    /// `partition`.
    ///
    /// The entries of `accum` at or past [`Self::terms`] (i.e. padding) are
    /// left as zeros.
    pub fn accumulate(
        &self,
        shell: usize,
        partition: &Partition,
        scratch: &mut I::Scratch,
        accum: &mut ArrayViewMut1<f64>,
    ) {
        assert!(accum.len() >= self.terms);
        accum.fill(0.0);

        let root_scale = &self.tables.root_scale;
        let basis = &self.tables.basis;
        let term_perms = &self.tables.term_perms[..self.terms];

        for t in self.domain.iter_range(partition.start, partition.stop) {
            let x = self.integrand.integral(t, shell, scratch);

            let weight = (self.integrand.perm_count(t) as f64) * self.integrand.geometric_factor(t);
            let z = weight / (root_scale[t.i] * root_scale[t.j] * root_scale[t.k]);

            let b_i = basis.row(t.i);
            let b_j = basis.row(t.j);
            let b_k = basis.row(t.k);
            for (m, &[p1, p2, p3]) in term_perms.iter().enumerate() {
                let b1 = b_i[p1] * b_j[p2] * b_k[p3];
                let b2 = b_i[p2] * b_j[p3] * b_k[p1];
                let b3 = b_i[p3] * b_j[p1] * b_k[p2];
                let b4 = b_i[p3] * b_j[p2] * b_k[p1];
                let b5 = b_i[p2] * b_j[p1] * b_k[p3];
                let b6 = b_i[p1] * b_j[p3] * b_k[p2];

                let y = (b1 + b2 + b3 + b4 + b5 + b6) / 6.0;
                accum[m] += x * y * z;
            }
        }

        // this must only happen once per partition
        for m in 0..self.terms {
            accum[m] *= self.final_scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::{Partition, split_sizes, thread_partitions};
    use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1};

    // a simple closed-form integrand. The scratch counts how often the
    // integral gets evaluated
    struct PolyIntegrand;

    impl TripleIntegrand for PolyIntegrand {
        type Scratch = usize;

        fn new_scratch(&self) -> usize {
            0
        }

        fn integral(&self, t: Triple, shell: usize, scratch: &mut usize) -> f64 {
            *scratch += 1;
            ((t.i + 2 * t.j) as f64) - 0.25 * (t.k as f64) + (shell as f64)
        }

        fn geometric_factor(&self, t: Triple) -> f64 {
            1.0 / ((1 + t.i + t.j + t.k) as f64)
        }
    }

    const L_MAX: usize = 9;
    const N_BASIS: usize = 3;
    const TERM_PERMS: [[usize; 3]; 4] = [[0, 0, 0], [0, 0, 1], [0, 1, 2], [1, 2, 2]];

    fn tables_storage() -> ([f64; L_MAX + 1], [f64; (L_MAX + 1) * N_BASIS]) {
        let mut root_scale = [0.0; L_MAX + 1];
        for (l, val) in root_scale.iter_mut().enumerate() {
            *val = 1.0 + 0.5 * (l as f64);
        }
        let mut basis = [0.0; (L_MAX + 1) * N_BASIS];
        for (idx, val) in basis.iter_mut().enumerate() {
            let (l, p) = (idx / N_BASIS, idx % N_BASIS);
            *val = 0.1 * (l as f64) - 0.3 * (p as f64) + 1.0;
        }
        (root_scale, basis)
    }

    // the straight-forward nested-loop computation
    fn naive_accum(domain: &TripleDomain, shell: usize, deltaphi: f64, out: &mut [f64; 8]) {
        let (root_scale, basis) = tables_storage();
        let b = |l: usize, p: usize| basis[l * N_BASIS + p];
        for i in 2..domain.l1_cutoff() {
            for j in i..=L_MAX {
                let mut k = j + (i % 2);
                while k <= core::cmp::min(i + j, L_MAX) {
                    let t = Triple::new(i, j, k);
                    let x = PolyIntegrand.integral(t, shell, &mut 0);
                    let z = (perm_count(t) as f64) * PolyIntegrand.geometric_factor(t)
                        / (root_scale[i] * root_scale[j] * root_scale[k]);
                    for (m, &[p1, p2, p3]) in TERM_PERMS.iter().enumerate() {
                        let y = (b(i, p1) * b(j, p2) * b(k, p3)
                            + b(i, p2) * b(j, p3) * b(k, p1)
                            + b(i, p3) * b(j, p1) * b(k, p2)
                            + b(i, p3) * b(j, p2) * b(k, p1)
                            + b(i, p2) * b(j, p1) * b(k, p3)
                            + b(i, p1) * b(j, p3) * b(k, p2))
                            / 6.0;
                        out[m] += x * y * z;
                    }
                    k += 2;
                }
            }
        }
        for val in out.iter_mut() {
            *val *= 6.0 * deltaphi * deltaphi;
        }
    }

    fn isclose(actual: f64, ref_val: f64, rtol: f64) -> bool {
        (actual - ref_val).abs() <= rtol * ref_val.abs()
    }

    #[test]
    fn perm_counts() {
        assert_eq!(perm_count(Triple::new(2, 2, 2)), 1);
        assert_eq!(perm_count(Triple::new(2, 2, 4)), 3);
        assert_eq!(perm_count(Triple::new(2, 4, 4)), 3);
        assert_eq!(perm_count(Triple::new(3, 4, 5)), 6);
    }

    #[test]
    fn table_errors() {
        let domain = TripleDomain::with_full_cutoff(L_MAX).unwrap();
        let (root_scale, basis) = tables_storage();
        let basis_view = ArrayView2::from_shape((L_MAX + 1, N_BASIS), &basis).unwrap();

        let short = ArrayView1::from(&root_scale[..L_MAX]);
        assert!(GammaTables::new(&domain, short, basis_view, &TERM_PERMS).is_err());

        let bad_perms = [[0, 0, N_BASIS]];
        let root_view = ArrayView1::from(&root_scale);
        assert!(GammaTables::new(&domain, root_view, basis_view, &bad_perms).is_err());

        let short_basis =
            ArrayView2::from_shape((L_MAX, N_BASIS), &basis[..L_MAX * N_BASIS]).unwrap();
        assert!(GammaTables::new(&domain, root_view, short_basis, &TERM_PERMS).is_err());

        let tables = GammaTables::new(&domain, root_view, basis_view, &TERM_PERMS).unwrap();
        assert!(GammaKernel::new(domain, tables, &PolyIntegrand, 5, 1.0).is_err());
    }

    #[test]
    fn threads_reproduce_naive_result() {
        let domain = TripleDomain::new(L_MAX, 8).unwrap();
        let (root_scale, basis) = tables_storage();
        let tables = GammaTables::new(
            &domain,
            ArrayView1::from(&root_scale),
            ArrayView2::from_shape((L_MAX + 1, N_BASIS), &basis).unwrap(),
            &TERM_PERMS,
        )
        .unwrap();
        let (shell, deltaphi) = (3, 0.5);
        let kernel = GammaKernel::new(domain, tables, &PolyIntegrand, 4, deltaphi).unwrap();

        let mut expected = [0.0; 8];
        naive_accum(&domain, shell, deltaphi, &mut expected);

        let full = Partition::full(&domain);
        let n_threads = 3;
        let mut total = [0.0; 8];
        let mut n_evaluated = 0;
        for (part, size) in thread_partitions(&domain, &full, n_threads)
            .zip(split_sizes(full.n_triples, n_threads))
        {
            assert_eq!(part.n_triples, size);
            // deliberately start from garbage to check that we overwrite
            let mut buf = [7.0; 8];
            let mut scratch = kernel.integrand().new_scratch();
            kernel.accumulate(shell, &part, &mut scratch, &mut ArrayViewMut1::from(&mut buf));
            assert_eq!(scratch, part.n_triples);
            n_evaluated += scratch;
            for (tot, val) in total.iter_mut().zip(buf) {
                *tot += val;
            }
            // padding stays at zero
            assert!(buf[4..].iter().all(|v| *v == 0.0));
        }
        assert_eq!(n_evaluated, domain.count());
        for m in 0..4 {
            assert!(isclose(total[m], expected[m], 1e-13));
        }
    }

    #[test]
    fn empty_partition_is_zero() {
        let domain = TripleDomain::with_full_cutoff(L_MAX).unwrap();
        let (root_scale, basis) = tables_storage();
        let tables = GammaTables::new(
            &domain,
            ArrayView1::from(&root_scale),
            ArrayView2::from_shape((L_MAX + 1, N_BASIS), &basis).unwrap(),
            &TERM_PERMS,
        )
        .unwrap();
        let kernel = GammaKernel::new(domain, tables, &PolyIntegrand, 4, 2.0).unwrap();
        let mut buf = [1.0; 4];
        let mut scratch = 0;
        let part = Partition::empty_at(Triple::new(3, 4, 5));
        kernel.accumulate(0, &part, &mut scratch, &mut ArrayViewMut1::from(&mut buf));
        assert_eq!(scratch, 0);
        assert_eq!(buf, [0.0; 4]);
    }
}
