//! Two-level simulated-annealing search for a minimal covering suite.

use std::time::Instant;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use trellis_constraint::ConflictCounter;
use trellis_model::{Model, TestCase, TestSuite};

use crate::occupancy::Occupancy;
use crate::rng::generation_rng;

/// Constraint handling during the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Any move producing an invalid complete test case is discarded.
    Hard,
    /// Invalid test cases are allowed but penalized per violated tuple.
    Tolerant,
}

const DEFAULT_TEMPERATURE: f64 = 0.2;
const DEFAULT_MAX_ROUNDS: u32 = 200_000;
const COOLING: f64 = 0.999_999;
const VIOLATION_PENALTY: f64 = 4.0;
/// Cap on hard-mode rejection sampling per seed row, so a fully
/// contradictory model degrades to an empty suite instead of spinning.
const MAX_SEED_ATTEMPTS: u32 = 100_000;

/// Simulated-annealing covering-array generator.
///
/// The outer search probes suite sizes within a heuristic window, biased
/// toward the upper bound; the inner search mutates one suite cell at a time
/// under the Metropolis criterion until every valid t-way combination is
/// covered (and, in tolerant mode, no row violates a forbidden tuple).
#[derive(Debug)]
pub struct Annealer {
    mode: Mode,
    initial_temperature: f64,
    max_rounds: u32,
    rng: ChaCha8Rng,
}

impl Annealer {
    pub fn new(mode: Mode) -> Self {
        Self::with_params(DEFAULT_TEMPERATURE, DEFAULT_MAX_ROUNDS, mode)
    }

    pub fn with_params(initial_temperature: f64, max_rounds: u32, mode: Mode) -> Self {
        Self {
            mode,
            initial_temperature,
            max_rounds,
            rng: generation_rng(None),
        }
    }

    /// Fix the random source; identical seeds yield identical runs.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = generation_rng(Some(seed));
        self
    }

    /// Generate a covering suite for a freshly constructed model.
    ///
    /// Runs the model's one-time initialization itself. Returns an empty
    /// suite when no size in the (adjusted) window admits a solution; a
    /// non-empty suite always consists of complete rows.
    pub fn generate(&mut self, model: &mut Model) -> TestSuite {
        let started = Instant::now();
        model.initialize();
        model.remove_invalid_combinations();

        let conflicts = match self.mode {
            Mode::Tolerant => Some(ConflictCounter::new(model.checker())),
            Mode::Hard => None,
        };
        let template = Occupancy::from_model(model);

        let (lower0, upper0) = size_bounds(model.domain_sizes(), model.strength());
        let mut best = self.outer_search(model, conflicts.as_ref(), &template, lower0, upper0);

        // Nothing anywhere in the window: double the upper bound, retry once.
        if best.is_empty() {
            best = self.outer_search(model, conflicts.as_ref(), &template, lower0, 2 * upper0);
        }

        // The heuristic lower bound was met exactly; push the window below
        // it, keeping the retry only when it finds something smaller.
        let mut lower = lower0;
        while best.len() as i64 == lower {
            let upper = lower - 1;
            lower = if lower > 5 { lower - 5 } else { lower / 2 };
            let retry = self.outer_search(model, conflicts.as_ref(), &template, lower, upper);
            if !retry.is_empty() {
                best = retry;
            }
        }

        TestSuite {
            cases: best.into_iter().map(TestCase::new).collect(),
            duration: started.elapsed(),
        }
    }

    /// Probe suite sizes between the bounds, biased toward `upper`;
    /// a success narrows from above, a failure from below.
    fn outer_search(
        &mut self,
        model: &Model,
        conflicts: Option<&ConflictCounter>,
        template: &Occupancy,
        mut lower: i64,
        mut upper: i64,
    ) -> Vec<Vec<i32>> {
        let mut best = Vec::new();
        while upper >= lower {
            let n = (lower + 2 * upper) / 3;
            let attempt = self.inner_search(model, conflicts, template, n as usize);
            if !attempt.is_empty() {
                best = attempt;
                upper = n - 1;
            } else {
                lower = n + 1;
            }
        }
        best
    }

    /// Local search for an N-row covering suite; empty on failure.
    fn inner_search(
        &mut self,
        model: &Model,
        conflicts: Option<&ConflictCounter>,
        template: &Occupancy,
        n: usize,
    ) -> Vec<Vec<i32>> {
        if n == 0 {
            return Vec::new();
        }
        let mut occupancy = template.clone();

        let mut suite: Vec<Vec<i32>> = Vec::with_capacity(n);
        for _ in 0..n {
            match self.seed_row(model) {
                Some(row) => suite.push(row),
                None => return Vec::new(),
            }
        }

        for row in &suite {
            occupancy.add_row(model, row);
        }
        let mut uncovered = model.comb_valid() as i64 - occupancy.covered();
        let mut violations = conflicts.map_or(0i64, |c| c.suite_violations(&suite) as i64);
        if uncovered == 0 && violations == 0 {
            return suite;
        }

        let mut temperature = self.initial_temperature;
        let mut round = 0u32;
        while round < self.max_rounds {
            round += 1;
            if round % 10 == 0 {
                temperature *= COOLING;
            }

            let row_idx = self.rng.gen_range(0..n);
            let column = self.rng.gen_range(0..model.parameter_count());
            let symbol = self.rng.gen_range(0..model.domain_sizes()[column]) as i32;
            if symbol == suite[row_idx][column] {
                continue;
            }

            let mut candidate = suite[row_idx].clone();
            candidate[column] = symbol;
            if self.mode == Mode::Hard && !model.is_valid(&candidate) {
                continue;
            }

            // Coverage loss from dropping the old row, gain from adding the
            // candidate in its place.
            let loss = occupancy.remove_row(model, &suite[row_idx]);
            let gain = occupancy.add_row(model, &candidate);
            let (v_before, v_after) = match conflicts {
                Some(c) => (
                    c.violations(&suite[row_idx]) as i64,
                    c.violations(&candidate) as i64,
                ),
                None => (0, 0),
            };

            let delta = (gain - loss) as f64 - VIOLATION_PENALTY * (v_after - v_before) as f64;
            let accept = delta >= 0.0 || self.rng.gen::<f64>() < (delta / temperature).exp();

            if accept {
                suite[row_idx][column] = symbol;
                uncovered -= gain - loss;
                violations += v_after - v_before;
                if uncovered == 0 && violations == 0 {
                    return suite;
                }
            } else {
                // Exact inverse of the two applications above.
                occupancy.remove_row(model, &candidate);
                occupancy.add_row(model, &suite[row_idx]);
            }
        }

        Vec::new()
    }

    /// One uniformly random complete row; hard mode resamples until the row
    /// is constraint-valid, up to [`MAX_SEED_ATTEMPTS`].
    fn seed_row(&mut self, model: &Model) -> Option<Vec<i32>> {
        let mut row = self.sample_row(model);
        if self.mode == Mode::Hard {
            let mut attempts = 1;
            while !model.is_valid(&row) {
                if attempts >= MAX_SEED_ATTEMPTS {
                    return None;
                }
                attempts += 1;
                row = self.sample_row(model);
            }
        }
        Some(row)
    }

    fn sample_row(&mut self, model: &Model) -> Vec<i32> {
        (0..model.parameter_count())
            .map(|p| self.rng.gen_range(0..model.domain_sizes()[p]) as i32)
            .collect()
    }
}

/// Heuristic suite-size window: the product of the `strength` largest
/// domains can never be beaten, and 5·(largest domain)^strength is a
/// generous ceiling.
fn size_bounds(domains: &[usize], strength: usize) -> (i64, i64) {
    let mut sorted = domains.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let lower: i64 = sorted.iter().take(strength).map(|&d| d as i64).product();
    let upper = 5 * (sorted[0] as i64).pow(strength as u32);
    (lower, upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_bounds_pairwise() {
        // Two largest domains 3 and 3; max is 3.
        assert_eq!(size_bounds(&[2, 2, 2, 3, 3], 2), (9, 45));
        assert_eq!(size_bounds(&[2, 2, 2], 2), (4, 20));
    }

    #[test]
    fn test_size_bounds_three_way() {
        assert_eq!(size_bounds(&[2, 4, 3, 2], 3), (24, 320));
    }
}
