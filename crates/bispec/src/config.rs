//! Configuration of a gamma calculation
//!
//! All validation happens while building a [`Gamma3dConfig`]. Once a config
//! exists, nothing downstream needs to do any error handling related to
//! these parameters.

use bispec_nostd_internal::{DecomposeSpec, ExecGroup, MAX_L_MAX, TripleDomain};

use crate::Error;

/// The validated parameters of a gamma calculation
#[derive(Clone, Debug, PartialEq)]
pub struct Gamma3dConfig {
    domain: TripleDomain,
    decompose: DecomposeSpec,
    group: ExecGroup,
    terms: usize,
    deltaphi: f64,
}

impl Gamma3dConfig {
    pub fn domain(&self) -> &TripleDomain {
        &self.domain
    }

    pub fn decompose_spec(&self) -> &DecomposeSpec {
        &self.decompose
    }

    pub fn group(&self) -> ExecGroup {
        self.group
    }

    pub fn n_threads(&self) -> usize {
        self.decompose.n_threads
    }

    pub fn terms(&self) -> usize {
        self.terms
    }

    pub fn deltaphi(&self) -> f64 {
        self.deltaphi
    }
}

fn check_range(
    description: &'static str,
    actual: usize,
    min_val: usize,
    max_val: usize,
) -> Result<usize, Error> {
    if (min_val..=max_val).contains(&actual) {
        Ok(actual)
    } else {
        // values too large for i64 are reported as i64::MAX
        let as_i64 = |val: usize| i64::try_from(val).unwrap_or(i64::MAX);
        Err(Error::integer_range(
            description,
            as_i64(actual),
            as_i64(min_val),
            as_i64(max_val),
        ))
    }
}

/// Builds a [`Gamma3dConfig`]
///
/// Only `l_max` is required. The defaults describe a single rank with a
/// single host thread that handles all of the work:
/// - `l1_cutoff`: `l_max + 1`
/// - `n_ranks`: 1, `rank`: 0, `n_threads`: 1
/// - `workshare`: 0.0, `group`: [`ExecGroup::Host`]
/// - `terms`: 1, `deltaphi`: 1.0
#[derive(Clone, Debug)]
pub struct Gamma3dConfigBuilder {
    l_max: Option<usize>,
    l1_cutoff: Option<usize>,
    n_ranks: usize,
    rank: usize,
    n_threads: usize,
    workshare: f64,
    group: ExecGroup,
    terms: usize,
    deltaphi: f64,
}

impl Default for Gamma3dConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Gamma3dConfigBuilder {
    pub fn new() -> Self {
        Gamma3dConfigBuilder {
            l_max: None,
            l1_cutoff: None,
            n_ranks: 1,
            rank: 0,
            n_threads: 1,
            workshare: 0.0,
            group: ExecGroup::Host,
            terms: 1,
            deltaphi: 1.0,
        }
    }

    /// the maximum degree
    pub fn l_max(mut self, l_max: usize) -> Self {
        self.l_max = Some(l_max);
        self
    }

    /// the exclusive upper bound on the outer index
    pub fn l1_cutoff(mut self, l1_cutoff: usize) -> Self {
        self.l1_cutoff = Some(l1_cutoff);
        self
    }

    pub fn n_ranks(mut self, n_ranks: usize) -> Self {
        self.n_ranks = n_ranks;
        self
    }

    pub fn rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn n_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads;
        self
    }

    /// the fraction of each rank's work reserved for the device group
    pub fn workshare(mut self, workshare: f64) -> Self {
        self.workshare = workshare;
        self
    }

    /// the execution group that the config describes
    pub fn group(mut self, group: ExecGroup) -> Self {
        self.group = group;
        self
    }

    pub fn terms(mut self, terms: usize) -> Self {
        self.terms = terms;
        self
    }

    pub fn deltaphi(mut self, deltaphi: f64) -> Self {
        self.deltaphi = deltaphi;
        self
    }

    pub fn build(&self) -> Result<Gamma3dConfig, Error> {
        let Some(l_max) = self.l_max else {
            return Err(Error::internal_legacy_adhoc("l_max was never specified"));
        };
        let l_max = check_range("l_max", l_max, 0, MAX_L_MAX)?;
        let l1_cutoff = check_range(
            "l1_cutoff",
            self.l1_cutoff.unwrap_or(l_max + 1),
            0,
            l_max + 1,
        )?;
        let n_ranks = check_range("n_ranks", self.n_ranks, 1, usize::MAX)?;
        let rank = check_range("rank", self.rank, 0, n_ranks - 1)?;
        let n_threads = check_range("n_threads", self.n_threads, 1, usize::MAX)?;
        let terms = check_range("terms", self.terms, 1, usize::MAX)?;
        if !(0.0..=1.0).contains(&self.workshare) {
            return Err(Error::workshare(self.workshare));
        }
        if !self.deltaphi.is_finite() {
            return Err(Error::internal_legacy_adhoc("deltaphi must be finite"));
        }

        let domain = TripleDomain::new(l_max, l1_cutoff).map_err(Error::internal_legacy_adhoc)?;
        let decompose = DecomposeSpec::new(n_ranks, rank, n_threads, self.workshare)
            .map_err(Error::internal_legacy_adhoc)?;
        Ok(Gamma3dConfig {
            domain,
            decompose,
            group: self.group,
            terms,
            deltaphi: self.deltaphi,
        })
    }
}
