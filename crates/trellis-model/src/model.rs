//! The combinatorial model: parameters, constraints and coverage state.

use std::collections::HashSet;
use std::fmt::Write as _;

use rand::Rng;
use trellis_constraint::{parse_literal, Forbidden, MftChecker, ValueMap, UNASSIGNED};

use crate::combinatorics::{
    enumerate_subsets, enumerate_value_combos, subset_rank, value_combo_count, value_combo_rank,
    value_combo_from_rank,
};
use crate::matrix::BitMatrix;
use crate::spec::{ModelSpec, SpecError};

/// A combinatorial test model < P, V, t, C >.
///
/// Construction validates the spec and derives the MFT set; [`initialize`]
/// must then run exactly once to materialize the subset enumeration and size
/// the coverage matrix before any coverage query.
///
/// [`initialize`]: Model::initialize
#[derive(Debug, Clone)]
pub struct Model {
    parameters: usize,
    domains: Vec<usize>,
    strength: usize,
    map: ValueMap,
    checker: MftChecker,
    /// Parameters referenced by at least one raw constraint.
    constrained: HashSet<usize>,
    raw_constraints: usize,

    /// All strength-sized parameter subsets, row index == subset rank.
    subsets: Vec<Vec<usize>>,
    coverage: BitMatrix,
    comb_raw: u64,
    comb_valid: u64,
    comb_uncovered: u64,
    initialized: bool,
}

impl Model {
    pub fn new(spec: &ModelSpec) -> Result<Self, SpecError> {
        let invalid = |msg: String| SpecError::InvalidConfiguration(msg);

        if spec.parameters == 0 {
            return Err(invalid("model needs at least one parameter".into()));
        }
        if spec.values.len() != spec.parameters {
            return Err(invalid(format!(
                "{} parameters but {} domain sizes",
                spec.parameters,
                spec.values.len()
            )));
        }
        if let Some(p) = spec.values.iter().position(|&d| d == 0) {
            return Err(invalid(format!("parameter {p} has an empty domain")));
        }
        // C(P, t) is undefined for t > P; refuse rather than degenerate.
        if spec.strength == 0 || spec.strength > spec.parameters {
            return Err(invalid(format!(
                "strength {} out of range for {} parameters",
                spec.strength, spec.parameters
            )));
        }

        let map = ValueMap::new(&spec.values);
        let mut constrained = HashSet::new();
        let mut forbidden = Vec::with_capacity(spec.constraints.len());
        for conjunction in &spec.constraints {
            let mut pairs = Vec::with_capacity(conjunction.len());
            for text in conjunction {
                let (p, v) = parse_literal(text)?;
                if p >= spec.parameters || v >= spec.values[p] {
                    return Err(invalid(format!(
                        "constraint literal '{text}' out of range"
                    )));
                }
                constrained.insert(p);
                pairs.push((p, v));
            }
            forbidden.push(Forbidden::from_assignments(&pairs, &map));
        }

        let checker = MftChecker::new(&map, forbidden);

        Ok(Self {
            parameters: spec.parameters,
            domains: spec.values.clone(),
            strength: spec.strength,
            map,
            checker,
            constrained,
            raw_constraints: spec.constraints.len(),
            subsets: Vec::new(),
            coverage: BitMatrix::default(),
            comb_raw: 0,
            comb_valid: 0,
            comb_uncovered: 0,
            initialized: false,
        })
    }

    /// Enumerate all strength-sized parameter subsets and size the coverage
    /// matrix, one row per subset, one column per value combination.
    pub fn initialize(&mut self) {
        assert!(!self.initialized, "model initialized twice");
        self.subsets = enumerate_subsets(self.parameters, self.strength);
        self.coverage = BitMatrix::with_rows(self.subsets.len());
        self.comb_raw = 0;
        for (i, pos) in self.subsets.iter().enumerate() {
            debug_assert_eq!(subset_rank(pos, self.parameters, self.strength), i);
            let cc = value_combo_count(pos, &self.domains);
            self.coverage.init_row(i, cc);
            self.comb_raw += cc as u64;
        }
        self.coverage.seed_pool();
        self.comb_valid = self.comb_raw;
        self.comb_uncovered = self.comb_raw;
        self.initialized = true;
    }

    /// Walk every t-way combination and subtract the constraint-invalid ones
    /// from the valid-combination count.
    ///
    /// The matrix cell of an invalid combination stays false here; it is
    /// marked covered lazily when sampling later lands on it. This keeps the
    /// pass a pure count and leaves the matrix monotonic.
    pub fn remove_invalid_combinations(&mut self) {
        assert!(self.initialized, "model not initialized");
        let mut removed = 0;
        for pos in &self.subsets {
            for sch in enumerate_value_combos(pos, &self.domains) {
                if !valid_where(&self.checker, &self.constrained, self.parameters, pos, &sch)
                    && !self.coverage.get(
                        subset_rank(pos, self.parameters, self.strength),
                        value_combo_rank(pos, &sch, &self.domains),
                    )
                {
                    removed += 1;
                }
            }
        }
        self.comb_valid -= removed;
    }

    /// Constraint validity of a complete or partial test case, full form.
    pub fn is_valid(&self, test: &[i32]) -> bool {
        self.checker.is_valid(test)
    }

    /// Constraint validity of a t-way combination given as (positions,
    /// values). Combinations touching no constrained parameter are valid
    /// without consulting the checker.
    pub fn is_valid_where(&self, positions: &[usize], values: &[i32]) -> bool {
        valid_where(&self.checker, &self.constrained, self.parameters, positions, values)
    }

    /// A uniformly random valid uncovered t-way combination, expanded to a
    /// full-length partial test case, or `None` once everything is covered.
    ///
    /// Lazy invalidation: a sampled combination found invalid is marked
    /// covered and sampling retries.
    pub fn uncovered_tuple(&mut self, rng: &mut impl Rng) -> Option<Vec<i32>> {
        assert!(self.initialized, "model not initialized");
        if self.comb_uncovered == 0 {
            return None;
        }
        loop {
            let (row, col) = self.coverage.random_false_cell(rng)?;
            let sch = value_combo_from_rank(col, &self.subsets[row], &self.domains);
            if valid_where(
                &self.checker,
                &self.constrained,
                self.parameters,
                &self.subsets[row],
                &sch,
            ) {
                let mut test = vec![UNASSIGNED; self.parameters];
                for (k, &p) in self.subsets[row].iter().enumerate() {
                    test[p] = sch[k];
                }
                return Some(test);
            }
            self.coverage.set(row, col, true);
            self.comb_uncovered -= 1;
        }
    }

    /// Whether a particular t-way combination is already covered.
    pub fn is_covered(&self, positions: &[usize], values: &[i32]) -> bool {
        let row = subset_rank(positions, self.parameters, self.strength);
        let col = value_combo_rank(positions, values, &self.domains);
        self.coverage.get(row, col)
    }

    /// Mark a t-way combination covered; returns its previous state.
    pub fn mark_covered(&mut self, positions: &[usize], values: &[i32]) -> bool {
        let row = subset_rank(positions, self.parameters, self.strength);
        let col = value_combo_rank(positions, values, &self.domains);
        let prior = self.coverage.get(row, col);
        if !prior {
            self.coverage.set(row, col, true);
            self.comb_uncovered -= 1;
        }
        prior
    }

    /// Number of currently uncovered combinations a test case would cover.
    /// Pure evaluation; the matrix is untouched.
    pub fn fitness(&self, test: &[i32]) -> u64 {
        assert!(self.initialized, "model not initialized");
        let mut num = 0;
        for (row, col) in self.projected_cells(test) {
            if !self.coverage.get(row, col) {
                num += 1;
            }
        }
        num
    }

    /// Commit a test case: mark every combination it covers and update the
    /// uncovered counter.
    pub fn cover(&mut self, test: &[i32]) {
        assert!(self.initialized, "model not initialized");
        let cells: Vec<(usize, usize)> = self.projected_cells(test).collect();
        for (row, col) in cells {
            if !self.coverage.get(row, col) {
                self.coverage.set(row, col, true);
                self.comb_uncovered -= 1;
            }
        }
    }

    /// Valid combinations an entire suite leaves uncovered. Pure evaluation
    /// over a private occupancy count, independent of the matrix state.
    pub fn suite_uncovered(&self, suite: &[Vec<i32>]) -> u64 {
        assert!(self.initialized, "model not initialized");
        let mut total_covered = 0u64;
        for pos in &self.subsets {
            let len = value_combo_count(pos, &self.domains);
            let mut seen = vec![false; len];
            let mut covered = 0u64;
            for tc in suite {
                let sch: Vec<i32> = pos.iter().map(|&p| tc[p]).collect();
                let index = value_combo_rank(pos, &sch, &self.domains);
                if !seen[index] {
                    seen[index] = true;
                    covered += 1;
                }
            }
            total_covered += covered;
        }
        self.comb_valid.saturating_sub(total_covered)
    }

    /// (row, column) matrix cells a complete test case projects onto, one
    /// per strength-sized subset.
    fn projected_cells<'a>(&'a self, test: &'a [i32]) -> impl Iterator<Item = (usize, usize)> + 'a {
        debug_assert_eq!(test.len(), self.parameters);
        self.subsets.iter().enumerate().map(move |(row, pos)| {
            let sch: Vec<i32> = pos.iter().map(|&p| test[p]).collect();
            (row, value_combo_rank(pos, &sch, &self.domains))
        })
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters
    }

    pub fn domain_sizes(&self) -> &[usize] {
        &self.domains
    }

    pub fn strength(&self) -> usize {
        self.strength
    }

    pub fn subsets(&self) -> &[Vec<usize>] {
        &self.subsets
    }

    pub fn value_map(&self) -> &ValueMap {
        &self.map
    }

    pub fn checker(&self) -> &MftChecker {
        &self.checker
    }

    pub fn comb_raw(&self) -> u64 {
        self.comb_raw
    }

    pub fn comb_valid(&self) -> u64 {
        self.comb_valid
    }

    pub fn comb_uncovered(&self) -> u64 {
        self.comb_uncovered
    }

    /// Human-readable summary of the model and its counters.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "parameters = {}", self.parameters);
        let _ = writeln!(out, "values = {:?}", self.domains);
        let _ = writeln!(out, "strength = {}", self.strength);
        let _ = writeln!(out, "raw constraints = {}", self.raw_constraints);
        let _ = writeln!(out, "minimal forbidden tuples = {}", self.checker.mft().len());
        let mut constrained: Vec<_> = self.constrained.iter().copied().collect();
        constrained.sort_unstable();
        let _ = writeln!(out, "constrained parameters = {constrained:?}");
        let _ = writeln!(
            out,
            "raw space = {}, valid combinations = {}, uncovered = {}",
            self.comb_raw, self.comb_valid, self.comb_uncovered
        );
        out
    }
}

/// Shared partial-validity check: expand (positions, values) to the full
/// wildcard form and consult the checker, skipping it when no position is
/// constrained.
fn valid_where(
    checker: &MftChecker,
    constrained: &HashSet<usize>,
    parameters: usize,
    positions: &[usize],
    values: &[i32],
) -> bool {
    if !positions.iter().any(|p| constrained.contains(p)) {
        return true;
    }
    let mut test = vec![UNASSIGNED; parameters];
    for (k, &p) in positions.iter().enumerate() {
        test[p] = values[k];
    }
    checker.is_valid(&test)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(parameters: usize, values: &[usize], strength: usize, cons: &[&[&str]]) -> ModelSpec {
        ModelSpec {
            parameters,
            values: values.to_vec(),
            strength,
            constraints: cons
                .iter()
                .map(|c| c.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_rejects_strength_above_parameter_count() {
        let err = Model::new(&spec(2, &[2, 2], 3, &[])).unwrap_err();
        assert!(matches!(err, SpecError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_rejects_malformed_literal() {
        let err = Model::new(&spec(2, &[2, 2], 2, &[&["0-0"]])).unwrap_err();
        assert!(matches!(err, SpecError::InputFormat(_)));
    }

    #[test]
    fn test_rejects_out_of_range_literal() {
        let err = Model::new(&spec(2, &[2, 2], 2, &[&["0/5"]])).unwrap_err();
        assert!(matches!(err, SpecError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_raw_count_is_sum_of_domain_products() {
        let mut model = Model::new(&spec(5, &[2, 2, 2, 3, 3], 2, &[])).unwrap();
        model.initialize();
        // Σ over all C(5,2) subsets of the product of their domain sizes.
        let expected: u64 = enumerate_subsets(5, 2)
            .iter()
            .map(|pos| value_combo_count(pos, &[2, 2, 2, 3, 3]) as u64)
            .sum();
        assert_eq!(model.comb_raw(), expected);
        assert_eq!(model.comb_raw(), 4 * 3 + 6 * 2 * 3 + 9);
        assert_eq!(model.comb_valid(), model.comb_raw());
        assert_eq!(model.comb_uncovered(), model.comb_raw());
    }

    #[test]
    fn test_remove_invalid_combinations_prunes_valid_count() {
        // Forbid p0=0 with p1=0: exactly one pair combination is invalid.
        let mut model = Model::new(&spec(3, &[2, 2, 2], 2, &[&["0/0", "1/0"]])).unwrap();
        model.initialize();
        model.remove_invalid_combinations();
        assert_eq!(model.comb_valid(), model.comb_raw() - 1);
        // Lazy: the matrix itself is untouched.
        assert_eq!(model.comb_uncovered(), model.comb_raw());
        assert!(!model.is_covered(&[0, 1], &[0, 0]));
    }

    #[test]
    fn test_fitness_and_cover() {
        let mut model = Model::new(&spec(3, &[2, 2, 2], 2, &[])).unwrap();
        model.initialize();
        // A fresh test case covers one combination per subset.
        assert_eq!(model.fitness(&[0, 1, 0]), 3);
        model.cover(&[0, 1, 0]);
        assert_eq!(model.comb_uncovered(), model.comb_raw() - 3);
        // The same case is now worth nothing; one differing value reopens
        // the two subsets containing p2.
        assert_eq!(model.fitness(&[0, 1, 0]), 0);
        assert_eq!(model.fitness(&[0, 1, 1]), 2);
    }

    #[test]
    fn test_suite_uncovered_counts_distinct() {
        let mut model = Model::new(&spec(3, &[2, 2, 2], 2, &[])).unwrap();
        model.initialize();
        let suite = vec![vec![0, 0, 0], vec![0, 0, 0]];
        // Duplicate rows cover 3 of 12 pair combinations.
        assert_eq!(model.suite_uncovered(&suite), 9);
        assert_eq!(model.suite_uncovered(&[]), 12);
    }

    #[test]
    fn test_uncovered_tuple_sampling() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(17);
        let mut model = Model::new(&spec(3, &[2, 2, 2], 2, &[&["0/0", "1/0"]])).unwrap();
        model.initialize();
        model.remove_invalid_combinations();

        let mut drawn = 0;
        while let Some(tuple) = model.uncovered_tuple(&mut rng) {
            assert_eq!(tuple.len(), 3);
            assert!(model.is_valid(&tuple));
            assert_eq!(tuple.iter().filter(|&&v| v != UNASSIGNED).count(), 2);
            model.cover(&fill_free(&tuple));
            drawn += 1;
            assert!(drawn <= 12, "sampling failed to exhaust");
        }
        assert_eq!(model.comb_uncovered(), 0);
    }

    /// Complete a partial tuple with value 1 everywhere (valid filler for
    /// the constraint p0=0 ∧ p1=0).
    fn fill_free(tuple: &[i32]) -> Vec<i32> {
        tuple
            .iter()
            .map(|&v| if v == UNASSIGNED { 1 } else { v })
            .collect()
    }

    #[test]
    fn test_describe_mentions_counters() {
        let mut model = Model::new(&spec(2, &[2, 3], 2, &[&["0/1", "1/2"]])).unwrap();
        model.initialize();
        let text = model.describe();
        assert!(text.contains("parameters = 2"));
        assert!(text.contains("raw space = 6"));
        assert!(text.contains("constrained parameters = [0, 1]"));
    }
}
