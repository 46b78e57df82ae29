//! Two-stage random contraction (Karger–Stein style) for a cut of known size.
//!
//! Stage one contracts a fresh copy of the graph down to `k` supernodes and
//! keeps that state for a whole batch. Stage two repeatedly clones the cached
//! state and contracts it down to two supernodes; the first attempt whose
//! remaining multiplicity equals the target wins. A batch in which every
//! attempt misses is thrown away and a new stage-one sample is drawn.
//!
//! `k` comes from the survival bound of contraction: a fixed minimum cut
//! survives contraction from `n` to `k` vertices with probability at least
//! `C(k,2) / C(n,2)`. Stage two then runs `⌈C(k,2)·ln k⌉` attempts, which
//! leaves a failure probability of at most `1/k` for the batch.
//!
//! On large graphs that count runs into the millions, while a stage-one
//! sample that already merged both sides can never succeed. Batches are
//! therefore capped by `Config::max_batch_trials` and to a tenth of the
//! overall trial budget, so a doomed sample is always replaced.

use std::{
    collections::BTreeSet,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::{
    contraction::Multigraph,
    error::{Error, Result},
    graph::{Graph, VertexId},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base seed for every random choice; drawn from entropy when unset
    pub seed: Option<u64>,
    /// Stage-two attempts allowed in total; `None` searches forever
    pub max_trials: Option<usize>,
    /// Wall-clock budget for one search
    pub timeout: Option<Duration>,
    /// Lower bound on the probability that a minimum cut survives stage one
    pub stage_one_survival: f64,
    /// Overrides the stage-one vertex count derived from `stage_one_survival`
    pub stage_one_threshold: Option<usize>,
    /// Upper bound on the stage-two attempts spent on one stage-one sample
    pub max_batch_trials: usize,
    /// Run the stage-two attempts of a batch on the rayon pool
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            max_trials: Some(100_000),
            timeout: None,
            stage_one_survival: 0.5,
            stage_one_threshold: None,
            max_batch_trials: 10_000,
            parallel: true,
        }
    }
}

impl Config {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = Some(max_trials);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.max_trials = None;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_stage_one_survival(mut self, survival: f64) -> Self {
        self.stage_one_survival = survival;
        self
    }

    pub fn with_stage_one_threshold(mut self, k: usize) -> Self {
        self.stage_one_threshold = Some(k);
        self
    }

    pub fn with_max_batch_trials(mut self, max_batch_trials: usize) -> Self {
        self.max_batch_trials = max_batch_trials;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

fn choose2(n: usize) -> f64 {
    let n = n as f64;
    n * (n - 1.0) / 2.0
}

/// Smallest `k` in `2..=n` with `C(k,2) / C(n,2) >= survival`.
pub fn stage_one_threshold(n: usize, survival: f64) -> usize {
    if n <= 2 {
        return n;
    }

    let needed = survival.clamp(0.0, 1.0) * choose2(n);
    let k = ((1.0 + (1.0 + 8.0 * needed).sqrt()) / 2.0).ceil() as usize;

    // float rounding can leave the closed form one off either way
    let mut k = k.clamp(2, n);
    while k > 2 && choose2(k - 1) >= needed {
        k -= 1;
    }
    while k < n && choose2(k) < needed {
        k += 1;
    }
    k
}

/// `⌈C(k,2)·ln k⌉`, and at least one.
pub fn stage_two_trials(k: usize) -> usize {
    if k < 2 {
        return 1;
    }

    ((choose2(k) * (k as f64).ln()).ceil() as usize).max(1)
}

/// SplitMix64 finalizer over `(seed, batch, trial)`, so every attempt gets an
/// independent stream that does not depend on scheduling.
fn trial_seed(seed: u64, batch: u64, trial: u64) -> u64 {
    let mut z = seed
        ^ batch.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ trial.wrapping_mul(0xD1B5_4A32_D192_ED03);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

const STAGE_ONE: u64 = u64::MAX;

/// Fewest stage-one samples a bounded search gets to draw.
const MIN_BATCHES: usize = 10;

/// The two sides of a cut, by vertex name.
///
/// `first` is the side holding the alphabetically smallest vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub first: BTreeSet<String>,
    pub second: BTreeSet<String>,
    pub cut_size: usize,
}

impl Partition {
    fn from_contracted(graph: &Graph, multi: &Multigraph) -> Option<Self> {
        let cut_size = multi.cut_size()?;
        let names = |v: VertexId| -> Option<BTreeSet<String>> {
            Some(
                multi
                    .record(v)?
                    .iter()
                    .map(|&u| graph.name(u).to_string())
                    .collect(),
            )
        };

        let supernodes = multi.supernodes();
        let &[a, b] = supernodes.as_slice() else {
            return None;
        };
        let (mut first, mut second) = (names(a)?, names(b)?);
        if second.first() < first.first() {
            std::mem::swap(&mut first, &mut second);
        }

        Some(Self {
            first,
            second,
            cut_size,
        })
    }

    pub fn sizes(&self) -> (usize, usize) {
        (self.first.len(), self.second.len())
    }

    /// The puzzle answer: the product of both group sizes
    pub fn product(&self) -> usize {
        self.first.len() * self.second.len()
    }
}

/// A graph contracted down to the stage-one threshold, shared read-only by
/// all stage-two attempts of one batch.
#[derive(Debug, Clone)]
pub struct StageOneResult {
    pub batch: u64,
    pub threshold: usize,
    state: Multigraph,
}

impl StageOneResult {
    pub fn sample(graph: &Graph, threshold: usize, batch: u64, rng: &mut impl Rng) -> Self {
        let mut state = Multigraph::from_graph(graph);
        let steps = state.contract_to(threshold, rng);
        trace!(batch, steps, remaining = state.num_vertices(), "stage one");

        Self {
            batch,
            threshold,
            state,
        }
    }

    pub fn state(&self) -> &Multigraph {
        &self.state
    }
}

/// One stage-two attempt on its own copy of the cached state.
pub fn stage_two_attempt(
    graph: &Graph,
    stage_one: &StageOneResult,
    target_cut_size: usize,
    rng: &mut impl Rng,
) -> Option<Partition> {
    let mut multi = stage_one.state.clone();
    multi.contract_to(2, rng);
    debug_assert_eq!(multi.check_invariants(), Ok(()));

    let realized = multi.cut_size();
    if realized != Some(target_cut_size) {
        trace!(batch = stage_one.batch, ?realized, "stage two missed");
        return None;
    }

    Partition::from_contracted(graph, &multi)
}

enum Outcome {
    Found(usize, Partition),
    Expired,
}

/// A successful search: the cut and what it took to find it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
    pub partition: Partition,
    /// Stage-one samples drawn, including the successful one
    pub batches: u64,
    /// Stage-two attempts up to and including the successful one
    pub trials: usize,
}

pub struct KargerStein<'g> {
    graph: &'g Graph,
    config: Config,
}

impl<'g> KargerStein<'g> {
    pub fn new(graph: &'g Graph, config: Config) -> Self {
        Self { graph, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stage-one vertex count for this graph
    pub fn threshold(&self) -> usize {
        let n = self.graph.num_vertices();
        match self.config.stage_one_threshold {
            Some(k) => k.clamp(2.min(n), n),
            None => stage_one_threshold(n, self.config.stage_one_survival),
        }
    }

    /// Stage-two attempts per stage-one sample
    pub fn batch_trials(&self) -> usize {
        let mut per_batch = stage_two_trials(self.threshold()).min(self.config.max_batch_trials);
        if let Some(max) = self.config.max_trials {
            per_batch = per_batch.min(max / MIN_BATCHES);
        }
        per_batch.max(1)
    }

    /// Finds a bipartition of all vertices whose crossing edges number
    /// exactly `target_cut_size`.
    ///
    /// The target is trusted: when no such cut exists the search only ends
    /// through the configured trial budget or timeout.
    pub fn compute_min_cut(&self, target_cut_size: usize) -> Result<Partition> {
        self.search(target_cut_size).map(|search| search.partition)
    }

    /// [`compute_min_cut`](Self::compute_min_cut), also reporting how many
    /// batches and attempts the search needed.
    pub fn search(&self, target_cut_size: usize) -> Result<Search> {
        if target_cut_size == 0 {
            return Err(Error::InvalidTarget(target_cut_size));
        }
        let n = self.graph.num_vertices();
        if n < 2 {
            return Err(Error::TooFewVertices(n));
        }

        let seed = self.config.seed.unwrap_or_else(rand::random);
        let threshold = self.threshold();
        let per_batch = self.batch_trials();
        let started = Instant::now();
        let deadline = self
            .config
            .timeout
            .and_then(|timeout| started.checked_add(timeout));
        let expired = || deadline.is_some_and(|deadline| Instant::now() >= deadline);

        debug!(
            vertices = n,
            edges = self.graph.num_edges(),
            threshold,
            per_batch,
            seed,
            "searching for a cut of size {target_cut_size}"
        );

        let mut batch = 0u64;
        let mut done = 0;
        loop {
            if expired() {
                warn!(trials = done, "timed out");
                return Err(Error::Timeout {
                    elapsed: started.elapsed(),
                    trials: done,
                });
            }

            let budget = match self.config.max_trials {
                Some(max) => per_batch.min(max.saturating_sub(done)),
                None => per_batch,
            };
            if budget == 0 {
                warn!(trials = done, "trial budget exhausted");
                return Err(Error::CutNotFound {
                    target: target_cut_size,
                    trials: done,
                });
            }

            let mut rng = StdRng::seed_from_u64(trial_seed(seed, batch, STAGE_ONE));
            let stage_one = StageOneResult::sample(self.graph, threshold, batch, &mut rng);
            debug!(batch, budget, "stage one sampled");

            // attempts actually started, for timeouts; rayon may run some
            // past the winning index
            let started_attempts = AtomicUsize::new(0);
            let attempt = |trial: usize| {
                if expired() {
                    return Some(Outcome::Expired);
                }

                started_attempts.fetch_add(1, Ordering::Relaxed);
                let mut rng = StdRng::seed_from_u64(trial_seed(seed, batch, trial as u64));
                stage_two_attempt(self.graph, &stage_one, target_cut_size, &mut rng)
                    .map(|partition| Outcome::Found(trial, partition))
            };

            let outcome = if self.config.parallel {
                (0..budget).into_par_iter().find_map_first(attempt)
            } else {
                (0..budget).find_map(attempt)
            };

            match outcome {
                Some(Outcome::Found(trial, partition)) => {
                    let search = Search {
                        partition,
                        batches: batch + 1,
                        trials: done + trial + 1,
                    };
                    info!(
                        batches = search.batches,
                        trials = search.trials,
                        sizes = ?search.partition.sizes(),
                        elapsed = ?started.elapsed(),
                        "found cut of size {target_cut_size}"
                    );
                    return Ok(search);
                }
                Some(Outcome::Expired) => {
                    let done = done + started_attempts.load(Ordering::Relaxed);
                    warn!(trials = done, "timed out");
                    return Err(Error::Timeout {
                        elapsed: started.elapsed(),
                        trials: done,
                    });
                }
                None => {
                    done += budget;
                    batch += 1;
                }
            }
        }
    }
}

impl Graph {
    /// [`KargerStein::compute_min_cut`] with the default [`Config`]
    pub fn compute_min_cut(&self, target_cut_size: usize) -> Result<Partition> {
        KargerStein::new(self, Config::default()).compute_min_cut(target_cut_size)
    }
}
