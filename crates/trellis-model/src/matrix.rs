//! Sparse boolean matrix with uniform sampling of an unset cell.

use rand::Rng;

/// A two-dimensional boolean matrix whose cells only ever flip false→true,
/// plus amortized O(1) uniform sampling of a currently-false cell.
///
/// Sampling draws from a live candidate pool of (row, column) pairs. A drawn
/// candidate found true is evicted by swapping it with the last live entry;
/// eviction is lazy, `set` never touches the pool.
#[derive(Debug, Clone, Default)]
pub struct BitMatrix {
    rows: Vec<Vec<bool>>,
    pool: Vec<(usize, usize)>,
}

impl BitMatrix {
    /// Pre-sized construction: `rows` × `cols`, all false, pool seeded.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut m = Self::with_rows(rows);
        for i in 0..rows {
            m.init_row(i, cols);
        }
        m.seed_pool();
        m
    }

    /// Row-by-row construction. Each row's width is set later with
    /// [`init_row`](Self::init_row); [`seed_pool`](Self::seed_pool) must run
    /// before the first random draw.
    pub fn with_rows(rows: usize) -> Self {
        Self {
            rows: vec![Vec::new(); rows],
            pool: Vec::new(),
        }
    }

    /// Size a single row. A row already sized is left untouched.
    pub fn init_row(&mut self, row: usize, cols: usize) {
        if self.rows[row].is_empty() {
            self.rows[row] = vec![false; cols];
        }
    }

    /// Fill the candidate pool from every cell. Required after row-by-row
    /// construction.
    pub fn seed_pool(&mut self) {
        self.pool.clear();
        for (i, row) in self.rows.iter().enumerate() {
            for j in 0..row.len() {
                self.pool.push((i, j));
            }
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_len(&self, row: usize) -> usize {
        self.rows[row].len()
    }

    /// Out-of-range access is a programming error and panics.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.rows[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.rows[row][col] = value;
    }

    /// Uniformly random currently-false cell, or `None` once every cell is
    /// true. A cell observed true at draw time is never returned.
    pub fn random_false_cell(&mut self, rng: &mut impl Rng) -> Option<(usize, usize)> {
        while !self.pool.is_empty() {
            let index = rng.gen_range(0..self.pool.len());
            let (row, col) = self.pool[index];
            if self.rows[row][col] {
                self.pool.swap_remove(index);
            } else {
                return Some((row, col));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_never_returns_a_true_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut m = BitMatrix::new(3, 4);
        m.set(0, 1, true);
        m.set(2, 3, true);
        m.set(1, 0, true);
        for _ in 0..200 {
            let (row, col) = m.random_false_cell(&mut rng).unwrap();
            assert!(!m.get(row, col));
        }
    }

    #[test]
    fn test_exhaustion_returns_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut m = BitMatrix::new(2, 2);
        let mut drawn = Vec::new();
        while let Some(cell) = m.random_false_cell(&mut rng) {
            m.set(cell.0, cell.1, true);
            drawn.push(cell);
        }
        assert_eq!(drawn.len(), 4);
        drawn.sort_unstable();
        drawn.dedup();
        assert_eq!(drawn.len(), 4);
        assert!(m.random_false_cell(&mut rng).is_none());
    }

    #[test]
    fn test_row_by_row_construction() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut m = BitMatrix::with_rows(2);
        m.init_row(0, 1);
        m.init_row(1, 3);
        m.seed_pool();
        assert_eq!(m.row_len(0), 1);
        assert_eq!(m.row_len(1), 3);
        let mut count = 0;
        while let Some((row, col)) = m.random_false_cell(&mut rng) {
            m.set(row, col, true);
            count += 1;
        }
        assert_eq!(count, 4);
    }

    #[test]
    fn test_init_row_is_idempotent() {
        let mut m = BitMatrix::with_rows(1);
        m.init_row(0, 2);
        m.set(0, 1, true);
        m.init_row(0, 5);
        assert_eq!(m.row_len(0), 2);
        assert!(m.get(0, 1));
    }
}
