//! Constraint-violation counting for tolerant-mode search.

use crate::checker::{matches, MftChecker};
use crate::forbidden::Forbidden;
use crate::value_map::ValueMap;

/// Counts how many minimal forbidden tuples a test case violates.
///
/// Unlike [`MftChecker::is_valid`], which stops at the first match, this
/// checks every tuple. The generator's tolerant mode uses the count as a
/// penalty term instead of rejecting invalid rows outright.
#[derive(Debug, Clone)]
pub struct ConflictCounter {
    map: ValueMap,
    mft: Vec<Forbidden>,
}

impl ConflictCounter {
    /// Take a private copy of the checker's MFT set.
    pub fn new(checker: &MftChecker) -> Self {
        Self {
            map: checker.value_map().clone(),
            mft: checker.mft().to_vec(),
        }
    }

    pub fn mft_len(&self) -> usize {
        self.mft.len()
    }

    /// Number of forbidden tuples matched by a complete or partial test case.
    pub fn violations(&self, test: &[i32]) -> usize {
        if self.mft.is_empty() {
            return 0;
        }
        let ids = self.map.encode(test);
        self.mft
            .iter()
            .filter(|c| matches(c.literals(), &ids))
            .count()
    }

    /// Total violations across a whole suite.
    pub fn suite_violations(&self, suite: &[Vec<i32>]) -> usize {
        suite.iter().map(|row| self.violations(row)).sum()
    }
}
