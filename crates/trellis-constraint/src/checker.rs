//! Minimal forbidden tuple derivation and validity checking.
//!
//! The raw constraints only name assignments explicitly forbidden by the
//! model. Further tuples are implied: when every value of some parameter is
//! individually constrained (an *implicit parameter*), the Cartesian product
//! of the per-value residual constraints yields new forbidden tuples that
//! mention the parameter nowhere. The closure of this expansion, minimized
//! under subsumption, is the MFT set; matching it is equivalent to violating
//! some original constraint.

use crate::forbidden::Forbidden;
use crate::value_map::ValueMap;
use crate::UNASSIGNED;

/// Validity checker backed by a minimal forbidden tuple set.
#[derive(Debug, Clone)]
pub struct MftChecker {
    map: ValueMap,
    mft: Vec<Forbidden>,
}

impl MftChecker {
    /// Derive the MFT set from raw constraints over the given value mapping.
    pub fn new(map: &ValueMap, raw: Vec<Forbidden>) -> Self {
        let mut set = raw;
        minimize(&mut set);

        // A parameter is implicit when each of its values appears in at
        // least one current constraint.
        let implicit_all: Vec<usize> = (0..map.parameter_count())
            .filter(|&p| {
                (0..map.domain_size(p)).all(|v| {
                    let id = map.id(p, v);
                    set.iter()
                        .any(|c| c.literals().iter().any(|&l| l.abs() == id))
                })
            })
            .collect();

        let mut pending = implicit_all.clone();
        while !pending.is_empty() {
            let mut next_round: Vec<usize> = Vec::new();
            let mut derived: Vec<Forbidden> = Vec::new();

            for &ip in &pending {
                derived.extend(expand_parameter(ip, &set, map));
            }

            for cand in derived {
                // An existing smaller-or-equal tuple already covers this one.
                if set.iter().any(|c| c.is_subset_of(&cand)) {
                    continue;
                }
                // A new tuple that still touches an implicit parameter
                // schedules that parameter for another round.
                for &l in cand.literals() {
                    let p = map.param_of(l.abs());
                    if implicit_all.contains(&p) && !next_round.contains(&p) {
                        next_round.push(p);
                    }
                }
                set.push(cand);
            }

            pending = next_round;
            minimize(&mut set);
        }

        Self {
            map: map.clone(),
            mft: set,
        }
    }

    /// The surviving minimal forbidden tuples.
    pub fn mft(&self) -> &[Forbidden] {
        &self.mft
    }

    pub fn value_map(&self) -> &ValueMap {
        &self.map
    }

    /// Check a complete or partial test case against the MFT set.
    ///
    /// Free parameters carry [`UNASSIGNED`] and behave as wildcards: absence
    /// of information never triggers a match. Returns `false` on the first
    /// fully matched tuple.
    pub fn is_valid(&self, test: &[i32]) -> bool {
        if self.mft.is_empty() {
            return true;
        }
        let ids = self.map.encode(test);
        !self.mft.iter().any(|c| matches(c.literals(), &ids))
    }
}

/// Cartesian expansion of one implicit parameter.
///
/// Per value: collect every constraint containing that value, each with the
/// matching literal removed; then fold the per-value buckets together by
/// pairwise merging, dropping contradictory and duplicate merges.
fn expand_parameter(ip: usize, set: &[Forbidden], map: &ValueMap) -> Vec<Forbidden> {
    let mut cartesian: Vec<Forbidden> = Vec::new();
    for v in 0..map.domain_size(ip) {
        let id = map.id(ip, v);
        let mut bucket: Vec<Forbidden> = Vec::new();
        for c in set {
            if let Some(k) = c.literals().iter().position(|&l| l.abs() == id) {
                let mut rest = c.literals().to_vec();
                rest.remove(k);
                bucket.push(Forbidden::presorted(rest));
            }
        }

        if v == 0 {
            cartesian = bucket;
        } else {
            let prev = std::mem::take(&mut cartesian);
            for a in &prev {
                for b in &bucket {
                    if let Some(merged) = merge(a, b, map) {
                        if !cartesian.contains(&merged) {
                            cartesian.push(merged);
                        }
                    }
                }
            }
        }
    }
    cartesian
}

/// Merge two sorted literal lists, rejecting the pair when it would assign
/// two different values to the same parameter.
fn merge(a: &Forbidden, b: &Forbidden, map: &ValueMap) -> Option<Forbidden> {
    let (x, y) = (a.literals(), b.literals());
    let mut merged = Vec::with_capacity(x.len() + y.len());
    let (mut i, mut j) = (0, 0);
    while i < x.len() || j < y.len() {
        if i == x.len() {
            merged.push(y[j]);
            j += 1;
        } else if j == y.len() {
            merged.push(x[i]);
            i += 1;
        } else if x[i] > y[j] {
            merged.push(x[i]);
            i += 1;
        } else {
            merged.push(y[j]);
            j += 1;
        }
    }

    // Ascending magnitudes: two literals inside one parameter's id range are
    // adjacent, so a same-parameter contradiction is visible in one scan.
    let mut p = 0;
    for w in 0..merged.len().saturating_sub(1) {
        while merged[w].abs() > map.last_id(p) {
            p += 1;
        }
        if merged[w + 1].abs() <= map.last_id(p) && merged[w] != merged[w + 1] {
            return None;
        }
    }
    merged.dedup();
    Some(Forbidden::presorted(merged))
}

/// Drop every tuple that is a non-strict superset of another surviving tuple.
fn minimize(set: &mut Vec<Forbidden>) {
    let n = set.len();
    let mut drop = vec![false; n];
    for i in 0..n {
        for j in (i + 1)..n {
            if set[i].is_subset_of(&set[j]) || set[j].is_subset_of(&set[i]) {
                if set[i].len() <= set[j].len() {
                    drop[j] = true;
                } else {
                    drop[i] = true;
                }
            }
        }
    }
    let mut k = 0;
    set.retain(|_| {
        let d = drop[k];
        k += 1;
        !d
    });
}

/// Ordered two-pointer subsequence match of a tuple's literal list against
/// the positive-id form of a test case.
///
/// Both sides are ascending in magnitude. The test-case pointer advances past
/// wildcard slots and ids smaller than the current literal's magnitude; an
/// exact magnitude match advances the literal pointer. A full match of every
/// literal means the test case contains the forbidden tuple.
pub(crate) fn matches(literals: &[i32], ids: &[i32]) -> bool {
    let mut k = 0;
    for &lit in literals {
        let target = lit.abs();
        while k < ids.len() && (ids[k] == UNASSIGNED || target > ids[k]) {
            k += 1;
        }
        if k == ids.len() || ids[k] != target {
            return false;
        }
        k += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(domains: &[usize], raw: &[&[(usize, usize)]]) -> MftChecker {
        let map = ValueMap::new(domains);
        let constraints = raw
            .iter()
            .map(|pairs| Forbidden::from_assignments(pairs, &map))
            .collect();
        MftChecker::new(&map, constraints)
    }

    #[test]
    fn test_no_constraints_everything_valid() {
        let c = checker(&[2, 2, 2], &[]);
        assert!(c.mft().is_empty());
        assert!(c.is_valid(&[0, 1, 0]));
        assert!(c.is_valid(&[UNASSIGNED, UNASSIGNED, UNASSIGNED]));
    }

    #[test]
    fn test_direct_match() {
        // Forbid p0=0 together with p1=0.
        let c = checker(&[2, 2, 2], &[&[(0, 0), (1, 0)]]);
        assert!(!c.is_valid(&[0, 0, 0]));
        assert!(!c.is_valid(&[0, 0, 1]));
        assert!(c.is_valid(&[0, 1, 0]));
        assert!(c.is_valid(&[1, 0, 0]));
    }

    #[test]
    fn test_wildcards_never_match() {
        let c = checker(&[2, 2, 2], &[&[(0, 0), (1, 0)]]);
        // Free p1 cannot complete the tuple.
        assert!(c.is_valid(&[0, UNASSIGNED, 0]));
        assert!(!c.is_valid(&[0, 0, UNASSIGNED]));
    }

    #[test]
    fn test_implicit_parameter_derivation() {
        // Both values of p0 are constrained, so p0 is implicit:
        //   p0=0 ∧ p1=0 forbidden, p0=1 ∧ p2=0 forbidden
        // ⇒ p1=0 ∧ p2=0 is forbidden regardless of p0.
        let c = checker(&[2, 2, 2], &[&[(0, 0), (1, 0)], &[(0, 1), (2, 0)]]);
        assert!(!c.is_valid(&[UNASSIGNED, 0, 0]));
        assert!(c.is_valid(&[UNASSIGNED, 0, 1]));
        assert!(c.is_valid(&[UNASSIGNED, 1, 0]));
    }

    #[test]
    fn test_single_value_parameter_forbidden_outright() {
        // p0=0 forbidden alone, p0=1 ∧ p1=1 forbidden: derived tuple p1=1.
        let c = checker(&[2, 2], &[&[(0, 0)], &[(0, 1), (1, 1)]]);
        assert!(!c.is_valid(&[UNASSIGNED, 1]));
        assert!(c.is_valid(&[1, 0]));
    }

    #[test]
    fn test_minimality_no_tuple_subsumes_another() {
        let c = checker(
            &[2, 2, 2, 3, 3],
            &[&[(0, 0), (1, 0)], &[(2, 1), (4, 2)], &[(2, 0), (3, 0), (4, 1)]],
        );
        let mft = c.mft();
        for (i, a) in mft.iter().enumerate() {
            for (j, b) in mft.iter().enumerate() {
                if i != j {
                    assert!(!a.is_subset_of(b), "{a:?} subsumed by {b:?}");
                }
            }
        }
    }

    /// Enumerate every complete assignment of a small model and compare the
    /// checker's verdict with a naive check against the raw constraints.
    #[test]
    fn test_mft_equivalent_to_raw_constraints() {
        let domains = [2usize, 2, 2];
        let raw: &[&[(usize, usize)]] = &[
            &[(0, 0), (1, 0)],
            &[(0, 1), (1, 1)],
            &[(1, 0), (2, 1)],
        ];
        let c = checker(&domains, raw);

        for a in 0..2i32 {
            for b in 0..2i32 {
                for d in 0..2i32 {
                    let test = [a, b, d];
                    let naive = !raw.iter().any(|pairs| {
                        pairs.iter().all(|&(p, v)| test[p] == v as i32)
                    });
                    assert_eq!(c.is_valid(&test), naive, "assignment {test:?}");
                }
            }
        }
    }

    #[test]
    fn test_minimize_keeps_smaller_tuple() {
        let mut set = vec![
            Forbidden::new(vec![-1, -3, -5]),
            Forbidden::new(vec![-1, -3]),
            Forbidden::new(vec![-2, -4]),
        ];
        minimize(&mut set);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Forbidden::new(vec![-1, -3])));
        assert!(set.contains(&Forbidden::new(vec![-2, -4])));
    }

    #[test]
    fn test_merge_rejects_same_parameter_conflict() {
        let map = ValueMap::new(&[2, 2, 2]);
        // p1=0 (id 3) vs p1=1 (id 4): contradictory.
        let a = Forbidden::new(vec![-3]);
        let b = Forbidden::new(vec![-4]);
        assert!(merge(&a, &b, &map).is_none());
        // p1=0 in both: merge dedups to a single literal.
        let c = Forbidden::new(vec![-3, -5]);
        let d = Forbidden::new(vec![-3]);
        let m = merge(&c, &d, &map).unwrap();
        assert_eq!(m.literals(), &[-3, -5]);
    }
}
