//! One-time setup of the read-only tables consumed by the kernel
//!
//! These all get computed once, before partitioning, and are then shared
//! between every worker without any locking.

use crate::Error;

/// Computes the scale factor for each degree `l`:
/// `s_l = (2l + 1)^(1/3) * (cl[l] + noise[l] / beam[l]^2)`
///
/// The slices must all have the same length (one entry per degree).
pub fn scale_factors(cl: &[f64], noise: &[f64], beam: &[f64]) -> Result<Vec<f64>, Error> {
    let n_degrees = cl.len();
    if noise.len() != n_degrees {
        return Err(Error::table_shape("noise", n_degrees, noise.len()));
    } else if beam.len() != n_degrees {
        return Err(Error::table_shape("beam", n_degrees, beam.len()));
    }

    let third = 1.0 / 3.0;
    let out = (0..n_degrees)
        .map(|l| {
            let l_factor = (2.0 * (l as f64) + 1.0).powf(third);
            l_factor * (cl[l] + noise[l] / (beam[l] * beam[l]))
        })
        .collect();
    Ok(out)
}

/// Computes the square root of each scale factor.
///
/// The kernel divides by the product of 3 of these values. We report an error
/// for any scale factor that isn't positive & finite (taking the square root
/// of a negative value would just silently poison the whole calculation with
/// NaNs).
pub fn root_scale_factors(scale_factors: &[f64]) -> Result<Vec<f64>, Error> {
    scale_factors
        .iter()
        .enumerate()
        .map(|(l, &s)| {
            if s.is_finite() && s > 0.0 {
                Ok(s.sqrt())
            } else {
                Err(Error::scale_factor(l, s))
            }
        })
        .collect()
}

/// Rounds `terms` up to the next multiple of 8.
///
/// The accumulators are allocated with this length so that each one is
/// aligned to whole vector registers.
pub fn padded_terms(terms: usize) -> usize {
    (terms + 7) & !7
}

/// the number of triples `p1 <= p2 <= p3 <= pmax`
fn n_ordered_triples(pmax: usize) -> usize {
    let n = pmax + 1;
    n * (n + 1) * (n + 2) / 6
}

/// Builds the mapping from a term index to the `(p1, p2, p3)` basis indices.
///
/// The mapping enumerates every `p1 <= p2 <= p3 <= pmax`, ordered first by
/// `p1 + p2 + p3` and then lexicographically. The result holds the first
/// `terms` entries of this sequence.
pub fn term_permutations(pmax: usize, terms: usize) -> Result<Vec<[usize; 3]>, Error> {
    let available = n_ordered_triples(pmax);
    if terms > available {
        return Err(Error::integer_range(
            "terms",
            terms as i64,
            0,
            available as i64,
        ));
    }

    let mut out = Vec::with_capacity(terms);
    'outer: for total in 0..=(3 * pmax) {
        for p1 in 0..=pmax {
            for p2 in p1..=pmax {
                if p1 + p2 > total {
                    break;
                }
                let p3 = total - p1 - p2;
                if p3 < p2 || p3 > pmax {
                    continue;
                }
                if out.len() == terms {
                    break 'outer;
                }
                out.push([p1, p2, p3]);
            }
        }
    }
    Ok(out)
}
