//! Forbidden-tuple representation and raw literal parsing.

use crate::value_map::ValueMap;

/// A forbidden tuple: the De Morgan form of one raw constraint.
///
/// A raw constraint is a conjunction of forbidden (parameter, value)
/// assignments; it is stored as the disjunction of the negations of their
/// global ids, sorted in descending signed order. All literals are negative,
/// so the order is ascending in magnitude, which is what the two-pointer
/// matching in the checker relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forbidden {
    literals: Vec<i32>,
}

impl Forbidden {
    /// Build from an unordered literal list.
    pub fn new(mut literals: Vec<i32>) -> Self {
        literals.sort_unstable_by(|a, b| b.cmp(a));
        Self { literals }
    }

    /// Build from a literal list that is already in descending order.
    pub(crate) fn presorted(literals: Vec<i32>) -> Self {
        debug_assert!(literals.windows(2).all(|w| w[0] >= w[1]));
        Self { literals }
    }

    /// Build from forbidden (parameter, value) assignments.
    pub fn from_assignments(pairs: &[(usize, usize)], map: &ValueMap) -> Self {
        Self::new(pairs.iter().map(|&(p, v)| -map.id(p, v)).collect())
    }

    pub fn literals(&self) -> &[i32] {
        &self.literals
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// True when every literal of `self` also appears in `other`.
    pub fn is_subset_of(&self, other: &Forbidden) -> bool {
        if self.literals.len() > other.literals.len() {
            return false;
        }
        self.literals
            .iter()
            .all(|l| other.literals.contains(l))
    }
}

/// Errors in raw constraint literal text.
#[derive(Debug, thiserror::Error)]
pub enum LiteralError {
    #[error("malformed constraint literal '{0}': expected 'parameterIndex/valueIndex'")]
    Malformed(String),
}

/// Parse a `"parameterIndex/valueIndex"` literal.
///
/// Range checking against the model's domains happens at model construction;
/// this only rejects text that is not two integers joined by `/`.
pub fn parse_literal(text: &str) -> Result<(usize, usize), LiteralError> {
    let malformed = || LiteralError::Malformed(text.to_string());
    let (p, v) = text.split_once('/').ok_or_else(malformed)?;
    let p = p.trim().parse().map_err(|_| malformed())?;
    let v = v.trim().parse().map_err(|_| malformed())?;
    Ok((p, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_sorted_descending() {
        let f = Forbidden::new(vec![-7, -1, -9]);
        assert_eq!(f.literals(), &[-1, -7, -9]);
    }

    #[test]
    fn test_from_assignments() {
        let map = ValueMap::new(&[2, 2, 2]);
        // p0=0 and p2=1 forbidden together: ids 1 and 6.
        let f = Forbidden::from_assignments(&[(2, 1), (0, 0)], &map);
        assert_eq!(f.literals(), &[-1, -6]);
    }

    #[test]
    fn test_subset_relation() {
        let a = Forbidden::new(vec![-1, -7]);
        let b = Forbidden::new(vec![-1, -7, -9]);
        assert!(a.is_subset_of(&b));
        assert!(!b.is_subset_of(&a));
        assert!(a.is_subset_of(&a));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse_literal("0/1").unwrap(), (0, 1));
        assert_eq!(parse_literal("12/3").unwrap(), (12, 3));
        assert!(parse_literal("0:1").is_err());
        assert!(parse_literal("a/b").is_err());
        assert!(parse_literal("1/").is_err());
        assert!(parse_literal("-1/0").is_err());
    }
}
