// the reason this is named mod.rs has to do with some complexities of how
// testing is handled
//
// we are following the advice of the rust book
// https://doc.rust-lang.org/book/ch11-03-test-organization.html#submodules-in-integration-tests

#![allow(dead_code)]

use bispec::{
    GammaInputs, GeometricFactors, Triple, TripleIntegrand, root_scale_factors, scale_factors,
    term_permutations,
};
use ndarray::Array2;
use rand::distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

// based on numpy!
// https://numpy.org/doc/stable/reference/generated/numpy.isclose.html
pub fn isclose(actual: f64, ref_val: f64, rtol: f64, atol: f64) -> bool {
    let actual_nan = actual.is_nan();
    let ref_nan = ref_val.is_nan();
    if actual_nan || ref_nan {
        actual_nan && ref_nan
    } else {
        (actual - ref_val).abs() <= (atol + rtol * ref_val.abs())
    }
}

/// owns the tables that get referenced by [`GammaInputs`]
pub struct OwnedTables {
    pub root_scale: Vec<f64>,
    pub basis: Array2<f64>,
    pub term_perms: Vec<[usize; 3]>,
}

impl OwnedTables {
    pub fn setup(seed: u64, l_max: usize, pmax: usize, terms: usize) -> OwnedTables {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let n_degrees = l_max + 1;

        let positive = Uniform::new_inclusive(0.5, 1.5).unwrap();
        let mut draw_positive = || -> Vec<f64> {
            (0..n_degrees).map(|_| positive.sample(&mut rng)).collect()
        };
        let cl = draw_positive();
        let noise = draw_positive();
        let beam = draw_positive();
        let root_scale = root_scale_factors(&scale_factors(&cl, &noise, &beam).unwrap()).unwrap();

        let basis_dist = Uniform::new_inclusive(-1.0, 1.0).unwrap();
        let basis = Array2::from_shape_fn((n_degrees, pmax + 1), |_| basis_dist.sample(&mut rng));

        OwnedTables {
            root_scale,
            basis,
            term_perms: term_permutations(pmax, terms).unwrap(),
        }
    }

    pub fn inputs(&self) -> GammaInputs<'_> {
        GammaInputs {
            root_scale: &self.root_scale,
            basis: self.basis.view(),
            term_perms: &self.term_perms,
        }
    }
}

/// Integrates a smooth function of `x` over a fixed grid with the
/// trapezoid rule. Each thread stages the integrand values in its own
/// scratch buffer (mimicking per-thread interpolation state).
pub struct TrapezoidIntegrand {
    xs: Vec<f64>,
    geom: GeometricFactors,
}

impl TrapezoidIntegrand {
    pub fn new(l_max: usize, n_points: usize) -> Self {
        let xs = (0..n_points)
            .map(|idx| (idx as f64) / ((n_points - 1) as f64))
            .collect();
        TrapezoidIntegrand {
            xs,
            geom: GeometricFactors::new(l_max),
        }
    }
}

impl TripleIntegrand for TrapezoidIntegrand {
    type Scratch = Vec<f64>;

    fn new_scratch(&self) -> Vec<f64> {
        vec![0.0; self.xs.len()]
    }

    fn integral(&self, t: Triple, shell: usize, scratch: &mut Vec<f64>) -> f64 {
        let r = 1.0 + (shell as f64);
        for (y, x) in scratch.iter_mut().zip(self.xs.iter()) {
            let arg = r * x;
            *y = (arg * (t.i as f64) * 0.1).cos()
                * (arg * (t.j as f64) * 0.1).cos()
                * (arg * (t.k as f64) * 0.1).cos();
        }
        let dx = self.xs[1] - self.xs[0];
        let interior: f64 = scratch[1..scratch.len() - 1].iter().sum();
        dx * (interior + 0.5 * (scratch[0] + scratch[scratch.len() - 1]))
    }

    fn geometric_factor(&self, t: Triple) -> f64 {
        self.geom.factor(t)
    }
}
