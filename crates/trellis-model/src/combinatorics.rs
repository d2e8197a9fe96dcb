//! Ranking, unranking and enumeration of parameter subsets and value tuples.
//!
//! m-subsets of {0..n-1} are indexed by the combinatorial number system;
//! value tuples over a chosen subset are indexed by a mixed-radix code whose
//! most significant digit is the first position. Both codecs are bijections
//! onto a contiguous 0-based range, which is what lets the coverage matrix
//! address every t-way combination as a (row, column) pair.

/// Binomial coefficient C(n, m), with C(n, 0) = 1.
///
/// Sequential multiply-then-divide keeps intermediates small; the division
/// is exact at every step. Yields 0 when m > n.
pub fn binomial(n: usize, m: usize) -> usize {
    let mut ret = 1;
    let mut p = n;
    for x in 1..=m {
        ret = ret * p / x;
        if ret == 0 {
            return 0;
        }
        p -= 1;
    }
    ret
}

/// Rank of an ascending m-subset of {0..n-1} within C(n, m).
///
/// `subset_rank(&[1, 2], 4, 2) == 3`, since C(4, 2) enumerates as
/// 01, 02, 03, 12, 13, 23.
pub fn subset_rank(subset: &[usize], n: usize, m: usize) -> usize {
    debug_assert_eq!(subset.len(), m);
    debug_assert!(subset.windows(2).all(|w| w[0] < w[1]), "subset not ascending");
    let mut ret = binomial(n, m);
    for (i, &c) in subset.iter().enumerate() {
        ret -= binomial(n - c - 1, m - i);
    }
    ret - 1
}

/// Inverse of [`subset_rank`]: the rank-th m-subset of {0..n-1}.
///
/// `subset_from_rank(2, 4, 2) == [0, 3]`.
pub fn subset_from_rank(rank: usize, n: usize, m: usize) -> Vec<usize> {
    let mut ret = vec![0usize; m];
    let mut t = rank + 1;
    let mut j = 1;
    for i in 0..m {
        loop {
            let k = binomial(n - j, m - i - 1);
            if t > k {
                t -= k;
                j += 1;
            } else {
                break;
            }
        }
        ret[i] = j;
        j += 1;
    }
    for r in &mut ret {
        *r -= 1;
    }
    ret
}

/// All m-subsets of {0..n-1} in ascending combinatorial order.
///
/// Iterative builder; each emitted subset is an owned, independent vector.
pub fn enumerate_subsets(n: usize, m: usize) -> Vec<Vec<usize>> {
    if m == 0 {
        return vec![Vec::new()];
    }
    if m > n {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(binomial(n, m));
    let mut current: Vec<usize> = (0..m).collect();
    loop {
        out.push(current.clone());
        // rightmost element that can still move right
        let mut i = m;
        while i > 0 && current[i - 1] == n - m + (i - 1) {
            i -= 1;
        }
        if i == 0 {
            return out;
        }
        current[i - 1] += 1;
        for j in i..m {
            current[j] = current[j - 1] + 1;
        }
    }
}

/// Number of value combinations among the chosen positions.
pub fn value_combo_count(positions: &[usize], domains: &[usize]) -> usize {
    positions.iter().map(|&p| domains[p]).product()
}

/// Mixed-radix rank of a value combination over the chosen positions.
///
/// `value_combo_rank(&[0, 1], &[1, 2], &[3, 3, 3, 3]) == 5`: the 3² value
/// combinations over positions {0, 1} enumerate as 00, 01, 02, 10, 11, ...
pub fn value_combo_rank(positions: &[usize], combo: &[i32], domains: &[usize]) -> usize {
    debug_assert_eq!(positions.len(), combo.len());
    let mut radix = 1;
    let mut ret = 0;
    for k in (0..positions.len()).rev() {
        debug_assert!((combo[k] as usize) < domains[positions[k]]);
        ret += radix * combo[k] as usize;
        radix *= domains[positions[k]];
    }
    ret
}

/// Inverse of [`value_combo_rank`]: the rank-th value combination.
pub fn value_combo_from_rank(rank: usize, positions: &[usize], domains: &[usize]) -> Vec<i32> {
    let t = positions.len();
    let mut ret = vec![0i32; t];
    let mut rest = rank;
    let mut div: usize = positions[1..].iter().map(|&p| domains[p]).product();
    for k in 0..t - 1 {
        ret[k] = (rest / div) as i32;
        rest -= ret[k] as usize * div;
        div /= domains[positions[k + 1]];
    }
    ret[t - 1] = (rest / div) as i32;
    ret
}

/// All value combinations over the chosen positions in ascending odometer
/// order, `value_combo_count` of them.
pub fn enumerate_value_combos(positions: &[usize], domains: &[usize]) -> Vec<Vec<i32>> {
    if positions.is_empty() {
        return vec![Vec::new()];
    }
    let total = value_combo_count(positions, domains);
    let mut out = Vec::with_capacity(total);
    let mut counter = vec![0i32; positions.len()];
    for _ in 0..total {
        out.push(counter.clone());
        let mut ptr = positions.len() - 1;
        counter[ptr] += 1;
        while ptr > 0 && counter[ptr] as usize == domains[positions[ptr]] {
            counter[ptr] = 0;
            ptr -= 1;
            counter[ptr] += 1;
        }
    }
    out
}
