//! Geometric factors for a multipole triple
//!
//! The geometric factor of `(l1, l2, l3)` is
//! ```text
//! h = sqrt((2 l1 + 1) (2 l2 + 1) (2 l3 + 1) / (4 pi)) * W
//! ```
//! where `W` is the Wigner 3j symbol `(l1 l2 l3; 0 0 0)`. `W` vanishes
//! unless `l1 + l2 + l3` is even and the degrees satisfy the triangle
//! inequality (every triple in the domain meets both conditions).
//!
//! We evaluate `W` from logarithms of factorials to avoid overflow at large
//! degrees. [`GeometricFactors`] tabulates those logarithms once, so it's
//! cheap enough to call for every triple.

use bispec_nostd_internal::Triple;

pub use bispec_nostd_internal::perm_count;

/// Tabulates what's needed to compute the geometric factor of any triple with
/// degrees no larger than `l_max`.
#[derive(Clone, Debug)]
pub struct GeometricFactors {
    l_max: usize,
    // ln_factorial[n] = ln(n!)
    ln_factorial: Vec<f64>,
}

impl GeometricFactors {
    pub fn new(l_max: usize) -> Self {
        // the largest factorial we need is (l1 + l2 + l3 + 1)!
        let n_max = 3 * l_max + 1;
        let mut ln_factorial = Vec::with_capacity(n_max + 1);
        let mut cur = 0.0;
        ln_factorial.push(cur);
        for n in 1..=n_max {
            cur += (n as f64).ln();
            ln_factorial.push(cur);
        }
        GeometricFactors {
            l_max,
            ln_factorial,
        }
    }

    /// Computes the Wigner 3j symbol `(l1 l2 l3; 0 0 0)`
    ///
    /// # Panics
    /// If any degree exceeds the `l_max` passed to [`Self::new`]
    pub fn wigner_3j_zero(&self, l1: usize, l2: usize, l3: usize) -> f64 {
        assert!(l1.max(l2).max(l3) <= self.l_max);
        let big_l = l1 + l2 + l3;
        let triangle = (l1 <= l2 + l3) && (l2 <= l1 + l3) && (l3 <= l1 + l2);
        if big_l % 2 == 1 || !triangle {
            return 0.0;
        }
        let g = big_l / 2;
        let lnf = &self.ln_factorial;

        let ln_root = 0.5
            * (lnf[big_l - 2 * l1] + lnf[big_l - 2 * l2] + lnf[big_l - 2 * l3]
                - lnf[big_l + 1]);
        let ln_ratio = lnf[g] - lnf[g - l1] - lnf[g - l2] - lnf[g - l3];
        let sign = if g % 2 == 0 { 1.0 } else { -1.0 };
        sign * (ln_root + ln_ratio).exp()
    }

    /// Computes the geometric factor of the triple
    pub fn factor(&self, t: Triple) -> f64 {
        let (l1, l2, l3) = (t.i as f64, t.j as f64, t.k as f64);
        let degeneracy = (2.0 * l1 + 1.0) * (2.0 * l2 + 1.0) * (2.0 * l3 + 1.0);
        (degeneracy / (4.0 * std::f64::consts::PI)).sqrt() * self.wigner_3j_zero(t.i, t.j, t.k)
    }
}
