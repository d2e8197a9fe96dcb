//! Global value-id mapping.
//!
//! Every (parameter, value) pair gets a unique integer id starting at 1,
//! assigned contiguously per parameter in parameter order. For a model with
//! domain sizes [3, 3, 3, 3, 3] the mapping is:
//!
//! ```text
//!  p0  p1  p2  p3  p4
//!   1   4   7  10  13
//!   2   5   8  11  14
//!   3   6   9  12  15
//! ```

use crate::UNASSIGNED;

/// Bijection between (parameter, value) pairs and global ids.
#[derive(Debug, Clone)]
pub struct ValueMap {
    domain_sizes: Vec<usize>,
    /// Global id of value 0 of each parameter.
    first: Vec<i32>,
}

impl ValueMap {
    pub fn new(domain_sizes: &[usize]) -> Self {
        let mut first = Vec::with_capacity(domain_sizes.len());
        let mut next = 1i32;
        for &d in domain_sizes {
            assert!(d > 0, "empty parameter domain");
            first.push(next);
            next += d as i32;
        }
        Self {
            domain_sizes: domain_sizes.to_vec(),
            first,
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.domain_sizes.len()
    }

    pub fn domain_size(&self, param: usize) -> usize {
        self.domain_sizes[param]
    }

    pub fn domain_sizes(&self) -> &[usize] {
        &self.domain_sizes
    }

    /// Global id of a (parameter, value) pair.
    pub fn id(&self, param: usize, value: usize) -> i32 {
        debug_assert!(value < self.domain_sizes[param], "value out of domain");
        self.first[param] + value as i32
    }

    /// Largest global id belonging to a parameter.
    pub fn last_id(&self, param: usize) -> i32 {
        self.first[param] + self.domain_sizes[param] as i32 - 1
    }

    /// Parameter owning a global id.
    pub fn param_of(&self, id: i32) -> usize {
        debug_assert!(id >= 1 && id <= self.last_id(self.parameter_count() - 1));
        let mut p = 0;
        while id > self.last_id(p) {
            p += 1;
        }
        p
    }

    /// Rewrite a full-length test case as positive global ids. Free
    /// parameters stay [`UNASSIGNED`].
    pub fn encode(&self, test: &[i32]) -> Vec<i32> {
        assert_eq!(test.len(), self.parameter_count(), "test case length");
        test.iter()
            .zip(&self.first)
            .map(|(&v, &base)| if v == UNASSIGNED { UNASSIGNED } else { base + v })
            .collect()
    }
}
