//! Test case and test suite types.

use std::fmt;
use std::time::Duration;

/// A complete, fixed-length assignment of one value index per parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub values: Vec<i32>,
}

impl TestCase {
    pub fn new(values: Vec<i32>) -> Self {
        Self { values }
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

/// An ordered sequence of test cases plus the wall-clock duration of the
/// generation run that produced it. Empty means generation failed.
#[derive(Debug, Clone, Default)]
pub struct TestSuite {
    pub cases: Vec<TestCase>,
    pub duration: Duration,
}

impl TestSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_equality_and_display() {
        let a = TestCase::new(vec![0, 1, 2]);
        let b = TestCase::new(vec![0, 1, 2]);
        let c = TestCase::new(vec![0, 1, 0]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "[0, 1, 2]");
    }

    #[test]
    fn test_empty_suite() {
        let suite = TestSuite::new();
        assert!(suite.is_empty());
        assert_eq!(suite.len(), 0);
    }
}
